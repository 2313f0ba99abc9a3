// ABOUTME: Emission configuration — indentation, statement style, and dialect defaults

/// Resolves spec.md §9's open question about a method's default visibility
/// when no `publica`/`privata`/`protecta` annotation is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Unannotated class methods default to private.
    Strict,
    /// Unannotated class methods default to public. The default dialect.
    Loose,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Loose
    }
}

#[derive(Debug, Clone)]
pub struct EmitConfig {
    /// Repeated once per indent level.
    pub indent: String,
    /// Whether statements are terminated with `;`.
    pub semicolons: bool,
    pub dialect: Dialect,
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            indent: "  ".to_string(),
            semicolons: true,
            dialect: Dialect::default(),
        }
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dialect_is_loose() {
        assert_eq!(EmitConfig::default().dialect, Dialect::Loose);
    }
}
