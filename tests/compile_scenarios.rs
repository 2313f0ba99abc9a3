// ABOUTME: End-to-end compile scenarios exercised through the public driver API

use faber::config::EmitConfig;
use faber::driver::compile;
use pretty_assertions::assert_eq;

fn compile_ok(src: &str) -> String {
    let outcome = compile(src, None, &EmitConfig::default());
    assert!(outcome.success, "expected successful compile of: {src}");
    outcome.output.unwrap()
}

#[test]
fn hello_world_prints_to_stdout() {
    let out = compile_ok(r#"scribe "hello""#);
    assert!(out.contains(r#"console.log("hello")"#));
}

#[test]
fn type_first_declaration_emits_typed_const() {
    let out = compile_ok("fixum numerus count = 0");
    assert_eq!(out, "const count: number = 0;\n");
}

#[test]
fn discriminated_union_and_match_lower_to_records_and_if_chain() {
    let src = r#"
        discretio Forma { Circulus { fractus radius } Quadratus { fractus latus } }
        functio area(Forma f) -> fractus {
            discerne f {
                casu Circulus fixum radius { redde radius * radius * 3.14 }
                casu Quadratus fixum latus { redde latus * latus }
            }
        }
    "#;
    let out = compile_ok(src);
    assert!(out.contains("type Circulus = {"));
    assert!(out.contains("tag: \"Circulus\";"));
    assert!(out.contains("type Quadratus = {"));
    assert!(out.contains("type Forma = Circulus | Quadratus;"));
    assert!(out.contains("if (f.tag === \"Circulus\") {"));
    assert!(out.contains("const radius = f.radius;"));
    assert!(out.contains("} else if (f.tag === \"Quadratus\") {"));
    assert!(out.contains("const latus = f.latus;"));
    assert!(!out.contains("switch"));
}

#[test]
fn try_catch_finally_and_panic_lower_correctly() {
    let src = r#"
        tempta { iace "bad" } cape e { scribe e } demum { scribe "done" }
        mori "fatal"
    "#;
    let out = compile_ok(src);
    assert!(out.contains("try {"));
    assert!(out.contains("throw \"bad\";"));
    assert!(out.contains("} catch (e) {"));
    assert!(out.contains("console.log(e);"));
    assert!(out.contains("} finally {"));
    assert!(out.contains("console.log(\"done\");"));
    assert!(out.contains("throw new Error(\"fatal\");"));
}

#[test]
fn template_interpolation_emits_ordered_slots() {
    let out = compile_ok(r#"scribe scriptum("hi §, you are §", name, age)"#);
    assert!(out.contains("`hi ${name}, you are ${age}`"));
}

#[test]
fn nullability_and_null_coalesce() {
    let out = compile_ok("varia si numerus x = nihil\nscribe x vel 0");
    assert!(out.contains("let x: number | null = null;"));
    assert!(out.contains("console.log(x ?? 0);"));
}

#[test]
fn method_rename_soundness_ignores_computed_calls() {
    let out = compile_ok("items.adde(1)\nitems[\"adde\"](1)");
    assert!(out.contains("items.push(1);"));
    assert!(out.contains("items[\"adde\"](1);"));
}

#[test]
fn pattern_match_exhaustiveness_emits_one_branch_per_case_and_one_else() {
    let src = r#"
        discerne shape {
            casu A { redde 1 }
            casu B { redde 2 }
            casu _ { redde 0 }
        }
    "#;
    let out = compile_ok(src);
    assert_eq!(out.matches("shape.tag === \"A\"").count(), 1);
    assert_eq!(out.matches("shape.tag === \"B\"").count(), 1);
    assert_eq!(out.matches("} else {").count(), 1);
}

#[test]
fn invalid_source_reports_a_rendered_position() {
    let outcome = compile("fixum = 1", Some("broken.faber"), &EmitConfig::default());
    assert!(!outcome.success);
    let rendered = outcome.error.unwrap().render("fixum = 1");
    assert!(rendered.starts_with("broken.faber:1:"));
}
