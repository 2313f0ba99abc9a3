// ABOUTME: Closed lookup tables for the lexer and parser — keywords, punctuators, operators

/// The full set of Latin-rooted reserved words. Fixed at compile time;
/// shared freely across threads per spec.md §5 (no mutation, no locks).
pub const KEYWORDS: &[&str] = &[
    // declarations
    "varia", "fixum", "figendum", "variandum", "externa",
    "functio", "genus", "pactum", "ordo", "discretio", "finge",
    // visibility / flags
    "publica", "privata", "protecta", "futura", "abstractus",
    // control flow
    "si", "secus", "sin", "dum", "fac", "ex", "de", "in", "elige", "ceterum",
    "discerne", "casu", "pro", "ut", "custodi",
    "tempta", "cape", "demum",
    "redde", "iace", "mori",
    "scribe", "vide", "mone",
    "frange", "perge",
    "incipit", "incipiet",
    "probatio", "exemplaria", "exemplum",
    // shorthand bodies
    "ergo", "reddit", "iacit", "moritor", "tacet",
    // self
    "ego",
    // literals / atoms
    "nihil", "verum", "falsum", "novum", "cede",
    // operators-as-words
    "et", "aut", "vel", "inter", "intra",
    "non", "nonnihil", "nulla", "nonnulla",
    "positivum", "negativum",
    "qua", "innatum",
    "numeratum", "fractatum", "textatum", "bivalentum",
    "usque", "ante",
    "sic",
    "scriptum",
    // types
    "numerus", "fractus", "textus", "bivalens", "vacuum", "vacuus", "ignotum",
    "lista", "tabula", "copia", "collectio",
    // imports
    "importa",
];

pub fn is_keyword(lexeme: &str) -> bool {
    KEYWORDS.contains(&lexeme)
}

/// Single-character punctuators. Matched literally, never by prefix search.
pub const PUNCTUATORS: &[char] = &[
    '(', ')', '{', '}', '[', ']', ',', '.', ':', ';', '@', '#', '§', '?', '!',
];

pub fn is_punctuator(ch: char) -> bool {
    PUNCTUATORS.contains(&ch)
}

/// Multi-character operators, ordered longest-prefix-first so the lexer's
/// greedy match never mistakes `==` for `=` or `&&` for `&`.
pub const MULTI_CHAR_OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "+=", "-=", "*=", "/=", "->", "..",
];

pub const SINGLE_CHAR_OPERATORS: &[char] =
    &['+', '-', '*', '/', '%', '<', '>', '=', '&', '|', '^', '~'];

/// Annotation names the parser consumes as boolean/visibility flags
/// rather than treating as declarations.
pub const FLAG_ANNOTATIONS: &[&str] =
    &["publica", "privata", "protecta", "futura", "externa", "abstractus"];

/// Annotation names in the closed "skippable" set: unknown to the core,
/// consumed up to the next `@`, `§`, or declaration keyword. These only
/// reach a real emitter via the external norma/CLI-generation registry.
pub const SKIPPABLE_ANNOTATIONS: &[&str] = &[
    "cli", "versio", "descriptio", "optio", "operandus", "imperium", "alias", "imperia", "nomen",
    "innatum", "radix", "verte", "subsidia",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_declaration_keywords() {
        assert!(is_keyword("varia"));
        assert!(is_keyword("discretio"));
        assert!(!is_keyword("count"));
    }

    #[test]
    fn multi_char_operators_are_ordered_longest_first() {
        // '===' must be tried before '==' or the lexer would split it wrong.
        let pos_eqeqeq = MULTI_CHAR_OPERATORS.iter().position(|o| *o == "===").unwrap();
        let pos_eqeq = MULTI_CHAR_OPERATORS.iter().position(|o| *o == "==").unwrap();
        assert!(pos_eqeqeq < pos_eqeq);
    }
}
