// ABOUTME: Compiler error types, covering lexical, syntactic, structural, and I/O failures

use crate::position::Position;
use thiserror::Error;

/// A single compiler error, bound to a position and (when known) a filename.
///
/// The core only ever produces one of these per pipeline run (spec.md's
/// "first unrecoverable error aborts the pipeline" policy); `check` mode
/// collects several into a `Vec<CompileError>` instead of stopping.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("unexpected character '{character}'")]
    Lexical {
        character: char,
        position: Position,
        filename: Option<String>,
    },

    #[error("unterminated string literal")]
    UnterminatedString {
        position: Position,
        filename: Option<String>,
    },

    #[error("expected {expected}, got '{got}'")]
    Syntactic {
        expected: String,
        got: String,
        position: Position,
        filename: Option<String>,
    },

    #[error("unknown annotation '@{name}'")]
    UnknownAnnotation {
        name: String,
        position: Position,
        filename: Option<String>,
    },

    /// An AST shape the emitter does not know how to handle. This is a
    /// programmer bug in an upstream stage, not a user-facing mistake.
    #[error("internal error: unknown node '{node}'")]
    Structural { node: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl CompileError {
    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Lexical { position, .. }
            | CompileError::UnterminatedString { position, .. }
            | CompileError::Syntactic { position, .. }
            | CompileError::UnknownAnnotation { position, .. } => Some(*position),
            CompileError::Structural { .. } | CompileError::Io(_) => None,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            CompileError::Lexical { filename, .. }
            | CompileError::UnterminatedString { filename, .. }
            | CompileError::Syntactic { filename, .. }
            | CompileError::UnknownAnnotation { filename, .. } => filename.as_deref(),
            CompileError::Structural { .. } | CompileError::Io(_) => None,
        }
    }

    /// Render the `filename:line:col: error: message` block with the
    /// offending source line underlined by a caret, per spec.md §7.
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        let file = self.filename().unwrap_or("<input>");

        match self.position() {
            Some(pos) => {
                out.push_str(&format!("{}:{}: error: {}\n\n", file, pos, self));
                if let Some(line) = source.lines().nth(pos.line.saturating_sub(1)) {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                    out.push_str("  ");
                    out.push_str(&" ".repeat(pos.column.saturating_sub(1)));
                    out.push('^');
                }
            }
            None => {
                out.push_str(&format!("{}: error: {}", file, self));
            }
        }
        out
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_underlines_offending_column() {
        let err = CompileError::Syntactic {
            expected: "identifier".into(),
            got: "=".into(),
            position: Position {
                line: 1,
                column: 5,
                byte_offset: 4,
            },
            filename: Some("x.faber".into()),
        };
        let rendered = err.render("varia = 1");
        assert!(rendered.contains("x.faber:1:5: error: expected identifier, got '='"));
        assert!(rendered.contains("varia = 1"));
        let caret_line = rendered.lines().last().unwrap();
        assert_eq!(caret_line.trim_start(), "^");
    }

    #[test]
    fn structural_error_has_no_position() {
        let err = CompileError::Structural {
            node: "Unknown".into(),
        };
        assert!(err.position().is_none());
        assert_eq!(
            err.render("x"),
            "<input>: error: internal error: unknown node 'Unknown'"
        );
    }
}
