// ABOUTME: Flat token record produced by the lexer and consumed by the parser

use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    String,
    Operator,
    Punctuator,
    Newline,
    Comment,
    Eof,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True if this token is the keyword or operator with the given lexeme.
    pub fn is(&self, lexeme: &str) -> bool {
        matches!(self.kind, TokenKind::Keyword | TokenKind::Operator | TokenKind::Punctuator)
            && self.lexeme == lexeme
    }
}
