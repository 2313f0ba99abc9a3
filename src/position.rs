// ABOUTME: Source position model shared by the lexer, parser, and error rendering

use std::fmt;

/// A 1-based human-facing source location, plus the 0-based byte offset
/// editor tooling needs to slice back into the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

impl Position {
    pub const fn start() -> Self {
        Position {
            line: 1,
            column: 1,
            byte_offset: 0,
        }
    }

    pub fn advance(&mut self, ch: char) {
        self.byte_offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_line_and_column() {
        let mut pos = Position::start();
        pos.advance('a');
        pos.advance('b');
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.byte_offset, 2);
    }

    #[test]
    fn advance_resets_column_on_newline() {
        let mut pos = Position::start();
        pos.advance('a');
        pos.advance('\n');
        pos.advance('b');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn advance_counts_multibyte_chars_by_byte_len() {
        let mut pos = Position::start();
        pos.advance('λ');
        assert_eq!(pos.byte_offset, 2);
        assert_eq!(pos.column, 2);
    }
}
