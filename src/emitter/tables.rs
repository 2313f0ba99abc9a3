// ABOUTME: Finite translation tables the emitter consults — operators, types, and method renames

/// How a table-mapped member access should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRewrite {
    /// Emit as a call: `recv.target(args…)`.
    Method(&'static str),
    /// Emit as a property, even if the source wrote it as a call: `recv.target`.
    Property(&'static str),
    /// Emit as an indexing expression, e.g. `primus` -> `recv[0]`.
    Index(&'static str),
}

/// `adde` -> `push`, `longitudo` -> property `.length`, and so on. Checked
/// only when the callee is a non-computed member expression.
pub fn rewrite_member(name: &str) -> Option<MemberRewrite> {
    Some(match name {
        "adde" => MemberRewrite::Method("push"),
        "remove" => MemberRewrite::Method("splice"),
        "accipe" => MemberRewrite::Method("get"),
        "pone" => MemberRewrite::Method("set"),
        "habet" => MemberRewrite::Method("has"),
        "dele" => MemberRewrite::Method("delete"),
        "filtrata" => MemberRewrite::Method("filter"),
        "mappata" => MemberRewrite::Method("map"),
        "iuncta" => MemberRewrite::Method("join"),
        "ordinata" => MemberRewrite::Method("sort"),
        "inversa" => MemberRewrite::Method("reverse"),
        "continet" => MemberRewrite::Method("includes"),
        "longitudo" => MemberRewrite::Property("length"),
        "primus" => MemberRewrite::Index("0"),
        "ultimus" => MemberRewrite::Property("at(-1)"),
        _ => return None,
    })
}

pub fn binary_operator(lexeme: &str) -> &str {
    match lexeme {
        "et" => "&&",
        "aut" => "||",
        "vel" => "??",
        "inter" => "in",
        "intra" => "instanceof",
        other => other,
    }
}

pub fn assignment_operator(lexeme: &str) -> &str {
    lexeme
}

pub fn unary_operator(lexeme: &str) -> &str {
    match lexeme {
        "non" | "nihil" | "nulla" => "!",
        "nonnihil" | "nonnulla" => "!!",
        "positivum" => "+",
        "negativum" => "-",
        other => other,
    }
}

pub fn type_name(name: &str) -> &str {
    match name {
        "numerus" => "number",
        "fractus" => "number",
        "textus" => "string",
        "bivalens" => "boolean",
        "vacuum" | "vacuus" => "void",
        "ignotum" => "any",
        "lista" => "Array",
        "tabula" => "Map",
        "copia" => "Set",
        "collectio" => "Array",
        other => other,
    }
}
