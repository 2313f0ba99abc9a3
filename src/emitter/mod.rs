// ABOUTME: Walks the AST and emits target (JavaScript/TypeScript-flavored) source text

mod tables;

use crate::ast::*;
use crate::config::{Dialect, EmitConfig};
use tables::MemberRewrite;

pub fn emit(module: &Module, config: &EmitConfig) -> String {
    let mut out = String::new();
    for stmt in &module.statements {
        emit_top_level_statement(stmt, config, 0, &mut out);
    }
    out
}

fn indent_str(config: &EmitConfig, level: usize) -> String {
    config.indent.repeat(level)
}

fn term(config: &EmitConfig) -> &str {
    if config.semicolons {
        ";"
    } else {
        ""
    }
}

/// Entry blocks are the one statement form that changes shape depending
/// on whether they appear at the top of the module.
fn emit_top_level_statement(stmt: &Statement, config: &EmitConfig, indent: usize, out: &mut String) {
    if let Statement::Entry { body, is_async, .. } = stmt {
        if *is_async {
            out.push_str(&indent_str(config, indent));
            out.push_str("(async () => {\n");
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&indent_str(config, indent));
            out.push_str(&format!("}})(){}\n", term(config)));
        } else {
            for s in body {
                emit_statement(s, config, indent, out);
            }
        }
        return;
    }
    emit_statement(stmt, config, indent, out);
}

fn emit_statement(stmt: &Statement, config: &EmitConfig, indent: usize, out: &mut String) {
    let pad = indent_str(config, indent);
    match stmt {
        Statement::Block { body, .. } => {
            out.push_str(&pad);
            out.push_str("{\n");
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
        Statement::Expression { expr, .. } => {
            out.push_str(&pad);
            out.push_str(&emit_expr(expr, config));
            out.push_str(term(config));
            out.push('\n');
        }
        Statement::VarDecl {
            kind,
            name,
            type_,
            value,
            flags,
            ..
        } => {
            out.push_str(&pad);
            if flags.extern_ {
                out.push_str("declare ");
            }
            let binding_kw = match kind {
                VarKind::Fixum | VarKind::Figendum => "const",
                VarKind::Varia | VarKind::Variandum => "let",
            };
            out.push_str(binding_kw);
            out.push(' ');
            out.push_str(name);
            if let Some(ty) = type_ {
                out.push_str(": ");
                out.push_str(&emit_type(ty, flags.extern_));
            }
            if !flags.extern_ {
                if let Some(v) = value {
                    out.push_str(" = ");
                    out.push_str(&emit_expr(v, config));
                }
            }
            out.push_str(term(config));
            out.push('\n');
        }
        Statement::FunctionDecl(f) => emit_function(f, config, indent, out),
        Statement::ClassDecl(c) => emit_class(c, config, indent, out),
        Statement::ProtocolDecl(p) => emit_protocol(p, config, indent, out),
        Statement::EnumDecl { name, members, .. } => {
            out.push_str(&pad);
            out.push_str(&format!("enum {name} {{\n"));
            for m in members {
                out.push_str(&indent_str(config, indent + 1));
                out.push_str(&m.name);
                if let Some(v) = &m.value {
                    out.push_str(" = ");
                    out.push_str(&emit_expr(v, config));
                }
                out.push_str(",\n");
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
        Statement::UnionDecl { name, variants, .. } => emit_union(name, variants, config, indent, out),
        Statement::TypeAlias { name, type_, .. } => {
            out.push_str(&pad);
            out.push_str(&format!("type {name} = {};\n", emit_type(type_, false)));
        }
        Statement::Import {
            path, specifiers, ..
        } => emit_import(path, specifiers, config, indent, out),
        Statement::If { .. } => emit_if(stmt, config, indent, out),
        Statement::While {
            condition, body, ..
        } => {
            out.push_str(&pad);
            out.push_str(&format!("while ({}) {{\n", emit_expr(condition, config)));
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
        Statement::DoWhile {
            body, condition, ..
        } => {
            out.push_str(&pad);
            out.push_str("do {\n");
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str(&format!("}} while ({});\n", emit_expr(condition, config)));
        }
        Statement::ForEach {
            binding,
            kind,
            iterable,
            by_key,
            body,
            ..
        } => {
            let binding_kw = match kind {
                VarKind::Fixum | VarKind::Figendum => "const",
                VarKind::Varia | VarKind::Variandum => "let",
            };
            let joiner = if *by_key { "in" } else { "of" };
            out.push_str(&pad);
            out.push_str(&format!(
                "for ({binding_kw} {binding} {joiner} {}) {{\n",
                emit_expr(iterable, config)
            ));
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
        Statement::Switch {
            discriminant,
            cases,
            default,
            ..
        } => emit_switch(discriminant, cases, default, config, indent, out),
        Statement::Match {
            discriminants,
            cases,
            ..
        } => emit_match(discriminants, cases, config, indent, out),
        Statement::GuardChain {
            guards,
            else_branch,
            ..
        } => emit_guard_chain(guards, else_branch, config, indent, out),
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            out.push_str(&pad);
            out.push_str("try {\n");
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            if let Some(c) = catch {
                out.push_str(&format!("}} catch ({}) {{\n", c.binding));
                for s in &c.body {
                    emit_statement(s, config, indent + 1, out);
                }
                out.push_str(&pad);
            }
            if let Some(f) = finally {
                out.push_str("} finally {\n");
                for s in f {
                    emit_statement(s, config, indent + 1, out);
                }
                out.push_str(&pad);
            }
            out.push_str("}\n");
        }
        Statement::Return { value, .. } => {
            out.push_str(&pad);
            match value {
                Some(v) => out.push_str(&format!("return {};\n", emit_expr(v, config))),
                None => out.push_str("return;\n"),
            }
        }
        Statement::Throw { value, .. } => {
            out.push_str(&pad);
            out.push_str(&format!("throw {};\n", emit_expr(value, config)));
        }
        Statement::Panic { value, .. } => {
            out.push_str(&pad);
            out.push_str(&format!("throw new Error({});\n", emit_expr(value, config)));
        }
        Statement::Print {
            severity, value, ..
        } => {
            let fn_name = match severity {
                PrintSeverity::Info => "log",
                PrintSeverity::Debug => "debug",
                PrintSeverity::Warn => "warn",
            };
            out.push_str(&pad);
            out.push_str(&format!("console.{fn_name}({});\n", emit_expr(value, config)));
        }
        Statement::Assert {
            condition, message, ..
        } => {
            out.push_str(&pad);
            let msg = message
                .as_ref()
                .map(|m| emit_expr(m, config))
                .unwrap_or_else(|| "\"assertion failed\"".to_string());
            out.push_str(&format!(
                "if (!({})) {{ throw new Error({msg}); }}\n",
                emit_expr(condition, config)
            ));
        }
        Statement::Break { .. } => {
            out.push_str(&pad);
            out.push_str("break;\n");
        }
        Statement::Continue { .. } => {
            out.push_str(&pad);
            out.push_str("continue;\n");
        }
        Statement::Entry { body, is_async, .. } => {
            // A nested entry block (not at module top level) keeps its IIFE shape
            // regardless of sync/async, since it can't splice into the outer scope.
            out.push_str(&pad);
            let prefix = if *is_async { "async " } else { "" };
            out.push_str(&format!("({prefix}() => {{\n"));
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("})();\n");
        }
        Statement::TestSuite { name, body, .. } => {
            out.push_str(&pad);
            out.push_str(&format!("describe({}, () => {{\n", quote(name)));
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("});\n");
        }
        Statement::TestCase { name, body, .. } => {
            out.push_str(&pad);
            out.push_str(&format!("test({}, () => {{\n", quote(name)));
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("});\n");
        }
    }
}

fn emit_if(stmt: &Statement, config: &EmitConfig, indent: usize, out: &mut String) {
    let Statement::If {
        condition,
        then_branch,
        else_branch,
        ..
    } = stmt
    else {
        return;
    };
    let pad = indent_str(config, indent);
    out.push_str(&pad);
    out.push_str(&format!("if ({}) {{\n", emit_expr(condition, config)));
    for s in then_branch {
        emit_statement(s, config, indent + 1, out);
    }
    match else_branch {
        None => {
            out.push_str(&pad);
            out.push_str("}\n");
        }
        Some(branch) if branch.len() == 1 && matches!(branch[0], Statement::If { .. }) => {
            out.push_str(&pad);
            out.push_str("} else ");
            let nested = indent_str(config, 0);
            let mut inner = String::new();
            emit_if(&branch[0], config, indent, &mut inner);
            // Drop the re-emitted indent on the nested `if` so it reads as `} else if (...)`.
            out.push_str(inner.trim_start_matches(&nested[..]).trim_start());
        }
        Some(branch) => {
            out.push_str(&pad);
            out.push_str("} else {\n");
            for s in branch {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
    }
}

fn emit_function(f: &FunctionDecl, config: &EmitConfig, indent: usize, out: &mut String) {
    let pad = indent_str(config, indent);
    out.push_str(&pad);
    if f.flags.extern_ {
        out.push_str("declare ");
    }
    if f.flags.async_ {
        out.push_str("async ");
    }
    out.push_str("function ");
    out.push_str(&f.name);
    if !f.generics.is_empty() {
        out.push('<');
        out.push_str(&f.generics.join(", "));
        out.push('>');
    }
    out.push('(');
    out.push_str(&emit_params(&f.params, config));
    out.push(')');
    if let Some(ret) = &f.return_type {
        out.push_str(": ");
        out.push_str(&emit_type(ret, f.flags.extern_));
    }
    match &f.body {
        Some(body) => {
            out.push_str(" {\n");
            for s in body {
                emit_statement(s, config, indent + 1, out);
            }
            out.push_str(&pad);
            out.push_str("}\n");
        }
        None => out.push_str(";\n"),
    }
}

fn emit_params(params: &[Parameter], config: &EmitConfig) -> String {
    params
        .iter()
        .map(|p| {
            let mut s = String::new();
            if p.rest {
                s.push_str("...");
            }
            s.push_str(&p.name);
            if p.optional {
                s.push('?');
            }
            if let Some(ty) = &p.type_ {
                s.push_str(": ");
                s.push_str(&emit_type(ty, false));
            }
            if let Some(default) = &p.default {
                s.push_str(" = ");
                s.push_str(&emit_expr(default, config));
            }
            s
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_class(c: &ClassDecl, config: &EmitConfig, indent: usize, out: &mut String) {
    let pad = indent_str(config, indent);
    out.push_str(&pad);
    out.push_str("class ");
    out.push_str(&c.name);
    if !c.generics.is_empty() {
        out.push('<');
        out.push_str(&c.generics.join(", "));
        out.push('>');
    }
    if !c.protocols.is_empty() {
        out.push_str(" implements ");
        out.push_str(&c.protocols.join(", "));
    }
    out.push_str(" {\n");

    let field_indent = indent_str(config, indent + 1);
    for field in &c.fields {
        out.push_str(&field_indent);
        match field.visibility {
            Visibility::Private => out.push_str("private "),
            Visibility::Protected => out.push_str("protected "),
            Visibility::Public => {}
        }
        out.push_str(&field.name);
        out.push_str(": ");
        out.push_str(&emit_type(&field.type_, false));
        out.push_str(";\n");
    }

    emit_constructor(c, config, indent + 1, out);

    for method in &c.methods {
        let visible_method = resolve_method_visibility(method, config.dialect);
        out.push_str(&field_indent);
        if visible_method == Visibility::Private {
            out.push_str("private ");
        } else if visible_method == Visibility::Protected {
            out.push_str("protected ");
        }
        if method.flags.async_ {
            out.push_str("async ");
        }
        out.push_str(&method.name);
        if !method.generics.is_empty() {
            out.push('<');
            out.push_str(&method.generics.join(", "));
            out.push('>');
        }
        out.push('(');
        out.push_str(&emit_params(&method.params, config));
        out.push(')');
        if let Some(ret) = &method.return_type {
            out.push_str(": ");
            out.push_str(&emit_type(ret, false));
        }
        match &method.body {
            Some(body) => {
                out.push_str(" {\n");
                for s in body {
                    emit_statement(s, config, indent + 2, out);
                }
                out.push_str(&field_indent);
                out.push_str("}\n");
            }
            None => out.push_str(";\n"),
        }
    }

    out.push_str(&pad);
    out.push_str("}\n");
}

fn resolve_method_visibility(method: &FunctionDecl, dialect: Dialect) -> Visibility {
    if method.flags.private {
        Visibility::Private
    } else if method.flags.protected {
        Visibility::Protected
    } else if method.flags.public {
        Visibility::Public
    } else {
        match dialect {
            Dialect::Strict => Visibility::Private,
            Dialect::Loose => Visibility::Public,
        }
    }
}

/// Synthesize `constructor(overrides: Partial<Name> = {}) { … }`, assigning
/// each field from `overrides.field` when present, else its declared default.
fn emit_constructor(c: &ClassDecl, config: &EmitConfig, indent: usize, out: &mut String) {
    let pad = indent_str(config, indent);
    out.push_str(&pad);
    out.push_str(&format!(
        "constructor(overrides: Partial<{}> = {{}}) {{\n",
        c.name
    ));
    let body_pad = indent_str(config, indent + 1);
    for field in &c.fields {
        out.push_str(&body_pad);
        match &field.default {
            Some(default) => out.push_str(&format!(
                "this.{n} = overrides.{n} !== undefined ? overrides.{n} : {d};\n",
                n = field.name,
                d = emit_expr(default, config)
            )),
            None => out.push_str(&format!(
                "this.{n} = overrides.{n} as typeof this.{n};\n",
                n = field.name
            )),
        }
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

fn emit_protocol(p: &ProtocolDecl, config: &EmitConfig, indent: usize, out: &mut String) {
    let pad = indent_str(config, indent);
    out.push_str(&pad);
    out.push_str(&format!("interface {} {{\n", p.name));
    let inner = indent_str(config, indent + 1);
    for m in &p.methods {
        out.push_str(&inner);
        out.push_str(&m.name);
        out.push('(');
        out.push_str(&emit_params(&m.params, config));
        out.push(')');
        if let Some(ret) = &m.return_type {
            out.push_str(": ");
            out.push_str(&emit_type(ret, false));
        }
        out.push_str(";\n");
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

/// Two-step lowering: one record type per variant, then a union alias.
fn emit_union(name: &str, variants: &[VariantDecl], config: &EmitConfig, indent: usize, out: &mut String) {
    let pad = indent_str(config, indent);
    for variant in variants {
        out.push_str(&pad);
        out.push_str(&format!("type {} = {{\n", variant.name));
        let inner = indent_str(config, indent + 1);
        out.push_str(&inner);
        out.push_str(&format!("tag: \"{}\";\n", variant.name));
        for field in &variant.fields {
            out.push_str(&inner);
            out.push_str(&format!("{}: {};\n", field.name, emit_type(&field.type_, false)));
        }
        out.push_str(&pad);
        out.push_str("};\n");
    }
    let alias = variants
        .iter()
        .map(|v| v.name.as_str())
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(&pad);
    out.push_str(&format!("type {name} = {alias};\n"));
}

fn emit_import(
    path: &str,
    specifiers: &[ImportSpecifier],
    config: &EmitConfig,
    indent: usize,
    out: &mut String,
) {
    let pad = indent_str(config, indent);
    out.push_str(&pad);
    out.push_str("import { ");
    let parts: Vec<String> = specifiers
        .iter()
        .map(|s| {
            if s.wildcard {
                format!("* as {}", s.local.clone().unwrap_or_else(|| "ns".to_string()))
            } else {
                match &s.local {
                    Some(local) => format!("{} as {}", s.imported, local),
                    None => s.imported.clone(),
                }
            }
        })
        .collect();
    out.push_str(&parts.join(", "));
    out.push_str(&format!(" }} from {};\n", quote(path)));
}

fn emit_switch(
    discriminant: &Expression,
    cases: &[SwitchCase],
    default: &Option<Vec<Statement>>,
    config: &EmitConfig,
    indent: usize,
    out: &mut String,
) {
    let pad = indent_str(config, indent);
    let disc = emit_expr(discriminant, config);
    for (i, case) in cases.iter().enumerate() {
        out.push_str(&pad);
        let keyword = if i == 0 { "if" } else { "} else if" };
        out.push_str(&format!(
            "{keyword} ({} === {}) {{\n",
            disc,
            emit_expr(&case.value, config)
        ));
        for s in &case.body {
            emit_statement(s, config, indent + 1, out);
        }
    }
    if let Some(default_body) = default {
        out.push_str(&pad);
        out.push_str("} else {\n");
        for s in default_body {
            emit_statement(s, config, indent + 1, out);
        }
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

fn emit_match(
    discriminants: &[Expression],
    cases: &[MatchCase],
    config: &EmitConfig,
    indent: usize,
    out: &mut String,
) {
    let pad = indent_str(config, indent);
    let disc_names: Vec<String> = if discriminants.len() == 1 {
        vec![emit_expr(&discriminants[0], config)]
    } else {
        for (i, d) in discriminants.iter().enumerate() {
            out.push_str(&pad);
            out.push_str(&format!(
                "const discriminant_{i} = {};\n",
                emit_expr(d, config)
            ));
        }
        (0..discriminants.len())
            .map(|i| format!("discriminant_{i}"))
            .collect()
    };

    let mut first = true;
    for case in cases {
        let wildcard_only = case.patterns.len() == 1 && case.patterns[0] == CasePattern::Wildcard;
        out.push_str(&pad);
        if wildcard_only {
            out.push_str(if first { "{\n" } else { "} else {\n" });
        } else if disc_names.len() > 1 {
            // Multiple discriminants: a case supplies one pattern per
            // discriminant, matched positionally and AND-ed together.
            let conds: Vec<String> = case
                .patterns
                .iter()
                .zip(disc_names.iter())
                .map(|(p, disc)| render_case_condition(p, disc))
                .collect();
            let keyword = if first { "if" } else { "} else if" };
            out.push_str(&format!("{keyword} ({}) {{\n", conds.join(" && ")));
        } else {
            // Single discriminant: multiple patterns in one case are
            // alternatives, matched against the same value and OR-ed.
            let disc = disc_names.first().map(String::as_str).unwrap_or_default();
            let conds: Vec<String> = case
                .patterns
                .iter()
                .map(|p| render_case_condition(p, disc))
                .collect();
            let keyword = if first { "if" } else { "} else if" };
            out.push_str(&format!("{keyword} ({}) {{\n", conds.join(" || ")));
        }
        first = false;

        let inner = indent_str(config, indent + 1);
        for (i, pattern) in case.patterns.iter().enumerate() {
            if let CasePattern::Variant { binding, .. } = pattern {
                let disc_name = if disc_names.len() > 1 {
                    disc_names.get(i).cloned().unwrap_or_default()
                } else {
                    disc_names.first().cloned().unwrap_or_default()
                };
                match binding {
                    PatternBinding::Fields(fields) => {
                        for field in fields {
                            out.push_str(&inner);
                            out.push_str(&format!("const {field} = {disc_name}.{field};\n"));
                        }
                    }
                    PatternBinding::Alias(alias) => {
                        out.push_str(&inner);
                        out.push_str(&format!("const {alias} = {disc_name};\n"));
                    }
                    PatternBinding::None => {}
                }
            }
        }

        for s in &case.body {
            emit_statement(s, config, indent + 1, out);
        }
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

fn render_case_condition(pattern: &CasePattern, disc: &str) -> String {
    match pattern {
        CasePattern::Wildcard => "true".to_string(),
        CasePattern::Variant { name, .. } => format!("{disc}.tag === \"{name}\""),
    }
}

fn emit_guard_chain(
    guards: &[GuardClause],
    else_branch: &Option<Vec<Statement>>,
    config: &EmitConfig,
    indent: usize,
    out: &mut String,
) {
    let pad = indent_str(config, indent);
    for (i, guard) in guards.iter().enumerate() {
        out.push_str(&pad);
        let keyword = if i == 0 { "if" } else { "} else if" };
        out.push_str(&format!(
            "{keyword} ({}) {{\n",
            emit_expr(&guard.condition, config)
        ));
        for s in &guard.body {
            emit_statement(s, config, indent + 1, out);
        }
    }
    if let Some(branch) = else_branch {
        out.push_str(&pad);
        out.push_str("} else {\n");
        for s in branch {
            emit_statement(s, config, indent + 1, out);
        }
    }
    out.push_str(&pad);
    out.push_str("}\n");
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn needs_parens(e: &Expression) -> bool {
    matches!(
        e,
        Expression::Binary { .. }
            | Expression::Assignment { .. }
            | Expression::Ternary { .. }
            | Expression::Unary { .. }
            | Expression::Conversion { .. }
    )
}

fn emit_operand(e: &Expression, config: &EmitConfig) -> String {
    let rendered = emit_expr(e, config);
    if needs_parens(e) {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn emit_expr(expr: &Expression, config: &EmitConfig) -> String {
    match expr {
        Expression::Identifier { name, .. } => name.clone(),
        Expression::SelfRef { .. } => "this".to_string(),
        Expression::Literal { kind, .. } => emit_literal(kind),
        Expression::Binary {
            operator,
            left,
            right,
            ..
        } => format!(
            "{} {} {}",
            emit_operand(left, config),
            tables::binary_operator(operator),
            emit_operand(right, config)
        ),
        Expression::Unary {
            operator, operand, ..
        } => format!(
            "{}{}",
            tables::unary_operator(operator),
            emit_operand(operand, config)
        ),
        Expression::Assignment {
            operator,
            target,
            value,
            ..
        } => format!(
            "{} {} {}",
            emit_expr(target, config),
            tables::assignment_operator(operator),
            emit_expr(value, config)
        ),
        Expression::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => format!(
            "{} ? {} : {}",
            emit_operand(condition, config),
            emit_expr(consequent, config),
            emit_expr(alternate, config)
        ),
        Expression::Call { callee, args, .. } => emit_call(callee, args, config),
        Expression::Member { .. } => emit_member(expr, config),
        Expression::ArrayLiteral { elements, .. } => format!(
            "[{}]",
            elements
                .iter()
                .map(|e| emit_expr(e, config))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Expression::ObjectLiteral { properties, .. } => emit_object(properties, config),
        Expression::Lambda { params, body, .. } => emit_lambda(params, body, config),
        Expression::New {
            type_,
            args,
            initializer,
            ..
        } => emit_new(type_, args, initializer, config),
        Expression::Suspend { operand, .. } => format!("await {}", emit_operand(operand, config)),
        Expression::Cast { operand, type_, .. } => {
            format!("({} as {})", emit_expr(operand, config), emit_type(type_, false))
        }
        Expression::Reinterpret { operand, type_, .. } => format!(
            "({} as unknown as {})",
            emit_expr(operand, config),
            emit_type(type_, false)
        ),
        Expression::PostfixNew { operand, type_, .. } => {
            format!("new {}({})", emit_type(type_, false), emit_expr(operand, config))
        }
        Expression::VariantConstruct { variant, fields, .. } => {
            let body = std::iter::once(format!("tag: \"{variant}\""))
                .chain(
                    fields
                        .iter()
                        .map(|(k, v)| format!("{k}: {}", emit_expr(v, config))),
                )
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {body} }}")
        }
        Expression::Template { parts, args, .. } => emit_template(parts, args, config),
        Expression::Range { start, end, kind, .. } => emit_range(start, end, *kind, config),
        Expression::Conversion {
            operand,
            kind,
            fallback,
            ..
        } => emit_conversion(operand, *kind, fallback.as_deref(), config),
    }
}

fn emit_literal(kind: &LiteralKind) -> String {
    match kind {
        LiteralKind::Integer(s) | LiteralKind::Fractional(s) => s.clone(),
        LiteralKind::String(s) => quote(s),
        LiteralKind::True => "true".to_string(),
        LiteralKind::False => "false".to_string(),
        LiteralKind::Null => "null".to_string(),
    }
}

fn emit_call(callee: &Expression, args: &[Expression], config: &EmitConfig) -> String {
    if let Expression::Member {
        object,
        property,
        computed: false,
        non_null,
        ..
    } = callee
    {
        if let Some(rewrite) = tables::rewrite_member(property) {
            let obj = emit_operand(object, config);
            let accessor = if *non_null { "!." } else { "." };
            let arg_str = args
                .iter()
                .map(|a| emit_expr(a, config))
                .collect::<Vec<_>>()
                .join(", ");
            return match rewrite {
                MemberRewrite::Method(target) => format!("{obj}{accessor}{target}({arg_str})"),
                MemberRewrite::Property(target) => format!("{obj}{accessor}{target}"),
                MemberRewrite::Index(target) => format!("{obj}[{target}]"),
            };
        }
    }
    let callee_str = emit_operand(callee, config);
    let arg_str = args
        .iter()
        .map(|a| emit_expr(a, config))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{callee_str}({arg_str})")
}

fn emit_member(expr: &Expression, config: &EmitConfig) -> String {
    let Expression::Member {
        object,
        property,
        computed,
        computed_expr,
        non_null,
        ..
    } = expr
    else {
        return String::new();
    };
    let obj = emit_operand(object, config);
    if *computed {
        let index = computed_expr
            .as_ref()
            .map(|e| emit_expr(e, config))
            .unwrap_or_default();
        let accessor = if *non_null { "!" } else { "" };
        return format!("{obj}{accessor}[{index}]");
    }
    let accessor = if *non_null { "!." } else { "." };
    match tables::rewrite_member(property) {
        Some(MemberRewrite::Property(target)) => format!("{obj}{accessor}{target}"),
        Some(MemberRewrite::Index(target)) => format!("{obj}[{target}]"),
        Some(MemberRewrite::Method(target)) => format!("{obj}{accessor}{target}"),
        None => format!("{obj}{accessor}{property}"),
    }
}

fn emit_object(properties: &[ObjectProperty], config: &EmitConfig) -> String {
    let parts: Vec<String> = properties
        .iter()
        .map(|p| match p {
            ObjectProperty::KeyValue { key, value } => format!("{key}: {}", emit_expr(value, config)),
            ObjectProperty::Shorthand { name } => name.clone(),
            ObjectProperty::Computed { key, value } => {
                format!("[{}]: {}", emit_expr(key, config), emit_expr(value, config))
            }
        })
        .collect();
    format!("{{ {} }}", parts.join(", "))
}

fn emit_lambda(params: &[Parameter], body: &LambdaBody, config: &EmitConfig) -> String {
    let param_str = emit_params(params, config);
    match body {
        LambdaBody::Expression(expr) => format!("({param_str}) => {}", emit_expr(expr, config)),
        LambdaBody::Block(stmts) => {
            let mut inner = String::new();
            for s in stmts {
                emit_statement(s, config, 1, &mut inner);
            }
            format!("({param_str}) => {{\n{inner}}}")
        }
    }
}

fn emit_new(
    type_: &Type,
    args: &[Expression],
    initializer: &Option<ObjectInitializer>,
    config: &EmitConfig,
) -> String {
    let arg_str = args
        .iter()
        .map(|a| emit_expr(a, config))
        .collect::<Vec<_>>()
        .join(", ");
    let ctor = format!("new {}({arg_str})", emit_type(type_, false));
    match initializer {
        Some(init) => format!("Object.assign({ctor}, {})", emit_object(&init.properties, config)),
        None => ctor,
    }
}

fn emit_template(parts: &[TemplatePart], args: &[Expression], config: &EmitConfig) -> String {
    let mut out = String::from("`");
    let mut next_positional = 0usize;
    for part in parts {
        match part {
            TemplatePart::Text(text) => out.push_str(&text.replace('`', "\\`").replace("${", "\\${")),
            TemplatePart::Positional => {
                if let Some(arg) = args.get(next_positional) {
                    out.push_str("${");
                    out.push_str(&emit_expr(arg, config));
                    out.push('}');
                }
                next_positional += 1;
            }
            TemplatePart::Indexed(idx) => {
                if let Some(arg) = args.get(*idx) {
                    out.push_str("${");
                    out.push_str(&emit_expr(arg, config));
                    out.push('}');
                }
            }
        }
    }
    out.push('`');
    out
}

fn emit_range(start: &Expression, end: &Expression, kind: RangeKind, config: &EmitConfig) -> String {
    let start_s = emit_expr(start, config);
    let end_s = emit_expr(end, config);
    let length = match kind {
        RangeKind::Inclusive => format!("({end_s}) - ({start_s}) + 1"),
        RangeKind::Exclusive => format!("({end_s}) - ({start_s})"),
    };
    format!("Array.from({{ length: {length} }}, (_, i) => ({start_s}) + i)")
}

fn emit_conversion(
    operand: &Expression,
    kind: ConversionKind,
    fallback: Option<&Expression>,
    config: &EmitConfig,
) -> String {
    let operand_s = emit_expr(operand, config);
    let conv = match kind {
        ConversionKind::Numeratum => format!("parseInt({operand_s}, 10)"),
        ConversionKind::Fractatum => format!("parseFloat({operand_s})"),
        ConversionKind::Textatum => format!("String({operand_s})"),
        ConversionKind::Bivalentum => format!("Boolean({operand_s})"),
    };
    match fallback {
        Some(fb) => format!("({conv} ?? {})", emit_expr(fb, config)),
        None => conv,
    }
}

fn emit_type(ty: &Type, widen_unknown_for_extern: bool) -> String {
    match ty {
        Type::Named(name) => {
            if widen_unknown_for_extern && name == "ignotum" {
                "any".to_string()
            } else {
                tables::type_name(name).to_string()
            }
        }
        Type::Generic(name, args) => format!(
            "{}<{}>",
            tables::type_name(name),
            args.iter()
                .map(|a| emit_type(a, false))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Type::Nullable(inner) => format!("{} | null", emit_type(inner, false)),
        Type::Function(params, ret) => {
            let param_str = params
                .iter()
                .enumerate()
                .map(|(i, p)| format!("arg{i}: {}", emit_type(p, false)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({param_str}) => {}", emit_type(ret, false))
        }
        Type::Union(members) => members
            .iter()
            .map(|m| emit_type(m, false))
            .collect::<Vec<_>>()
            .join(" | "),
        Type::Literal(lit) => quote(lit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{lex, prepare};
    use crate::parser::parse;

    fn emit_src(src: &str) -> String {
        let tokens = prepare(lex(src, None).unwrap());
        let module = parse(tokens, None).unwrap();
        emit(&module, &EmitConfig::default())
    }

    #[test]
    fn emits_const_and_let_bindings() {
        let out = emit_src("fixum numerus x = 1\nvaria numerus y = 2");
        assert!(out.contains("const x: number = 1;"));
        assert!(out.contains("let y: number = 2;"));
    }

    #[test]
    fn emits_function_with_return_type() {
        let out = emit_src("functio add(numerus a, numerus b) -> numerus { redde a + b }");
        assert!(out.contains("function add(a: number, b: number): number {"));
        assert!(out.contains("return a + b;"));
    }

    #[test]
    fn emits_method_rename_table() {
        let out = emit_src("items.adde(1)");
        assert!(out.contains("items.push(1)"));
    }

    #[test]
    fn emits_property_only_rename_without_parens() {
        let out = emit_src("items.longitudo()");
        assert!(out.contains("items.length"));
        assert!(!out.contains("items.length("));
    }

    #[test]
    fn emits_ultimus_as_at_minus_one_without_double_call_parens() {
        let out = emit_src("items.ultimus()\nfixum x = items.ultimus");
        assert!(out.contains("items.at(-1);"));
        assert!(!out.contains("at(-1)("));
        assert!(out.contains("const x = items.at(-1);"));
    }

    #[test]
    fn emits_tagged_union_two_step_lowering() {
        let out = emit_src("discretio Forma { Circulus { fractus radius } Quadratus { fractus latus } }");
        assert!(out.contains("type Circulus = {"));
        assert!(out.contains("tag: \"Circulus\";"));
        assert!(out.contains("type Quadratus = {"));
        assert!(out.contains("type Forma = Circulus | Quadratus;"));
    }

    #[test]
    fn emits_match_as_if_else_chain_with_hoisted_bindings() {
        let src = r#"
            discerne shape {
                casu Circulus fixum radius { redde radius }
                casu _ { redde 0 }
            }
        "#;
        let out = emit_src(src);
        assert!(out.contains("if (shape.tag === \"Circulus\") {"));
        assert!(out.contains("const radius = shape.radius;"));
        assert!(out.contains("} else {"));
        assert!(!out.contains("switch"));
    }

    #[test]
    fn emits_match_over_multiple_discriminants_as_anded_conditions() {
        let src = r#"
            discerne a, b {
                casu X, Y { redde 1 }
                casu _ { redde 0 }
            }
        "#;
        let out = emit_src(src);
        assert!(out.contains("const discriminant_0 = a;"));
        assert!(out.contains("const discriminant_1 = b;"));
        assert!(out.contains(
            "if (discriminant_0.tag === \"X\" && discriminant_1.tag === \"Y\") {"
        ));
        assert!(!out.contains("||"));
    }

    #[test]
    fn emits_try_catch_finally_and_panic_as_throw_new_error() {
        let out = emit_src(r#"tempta { iace "x" } cape e { scribe e } demum { scribe "done" }
mori "fatal""#);
        assert!(out.contains("try {"));
        assert!(out.contains("} catch (e) {"));
        assert!(out.contains("} finally {"));
        assert!(out.contains("throw new Error(\"fatal\");"));
    }

    #[test]
    fn emits_template_literal_with_positional_interpolation() {
        let out = emit_src(r#"scribe scriptum("hi §!", name)"#);
        assert!(out.contains("console.log(`hi ${name}!`);"));
    }

    #[test]
    fn emits_range_as_array_from() {
        let out = emit_src("fixum r = 1 usque 5");
        assert!(out.contains("Array.from({ length: (5) - (1) + 1 }, (_, i) => (1) + i)"));
    }

    #[test]
    fn emits_conversion_with_fallback_as_null_coalesce() {
        let out = emit_src("fixum n = x numeratum vel 0");
        assert!(out.contains("(parseInt(x, 10) ?? 0)"));
    }

    #[test]
    fn emits_class_with_synthesized_constructor() {
        let out = emit_src("genus Punctum { numerus x = 0; numerus y = 0; }");
        assert!(out.contains("class Punctum {"));
        assert!(out.contains("constructor(overrides: Partial<Punctum> = {}) {"));
        assert!(out.contains("this.x = overrides.x !== undefined ? overrides.x : 0;"));
    }

    #[test]
    fn emit_is_deterministic() {
        let src = "functio add(numerus a, numerus b) -> numerus { redde a + b }";
        assert_eq!(emit_src(src), emit_src(src));
    }
}
