// ABOUTME: Handwritten single-pass scanner turning source text into a token stream

use crate::error::CompileError;
use crate::keywords::{is_keyword, is_punctuator, MULTI_CHAR_OPERATORS, SINGLE_CHAR_OPERATORS};
use crate::position::Position;
use crate::token::{Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    pos: Position,
    filename: Option<String>,
}

impl Lexer {
    pub fn new(source: &str, filename: Option<&str>) -> Self {
        Lexer {
            chars: source.chars().collect(),
            index: 0,
            pos: Position::start(),
            filename: filename.map(|s| s.to_string()),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += 1;
        self.pos.advance(ch);
        Some(ch)
    }

    fn starts_with(&self, s: &str) -> bool {
        let needed = s.chars().count();
        if self.index + needed > self.chars.len() {
            return false;
        }
        self.chars[self.index..self.index + needed]
            .iter()
            .collect::<String>()
            == s
    }

    fn lex_err(&self, ch: char, at: Position) -> CompileError {
        CompileError::Lexical {
            character: ch,
            position: at,
            filename: self.filename.clone(),
        }
    }

    /// Produce the full token stream, ending in exactly one `Eof` token,
    /// or the first fatal lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, "", self.pos));
                break;
            };

            let start = self.pos;

            if ch == '\n' {
                self.bump();
                tokens.push(Token::new(TokenKind::Newline, "\n", start));
                continue;
            }
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.bump();
                continue;
            }
            if ch == '#' {
                let mut lexeme = String::new();
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    lexeme.push(c);
                    self.bump();
                }
                tokens.push(Token::new(TokenKind::Comment, lexeme, start));
                continue;
            }
            if ch == '"' || ch == '\'' {
                tokens.push(self.lex_string(ch, start)?);
                continue;
            }
            if ch.is_ascii_digit() {
                tokens.push(self.lex_number(start));
                continue;
            }
            if ch.is_ascii_alphabetic() || ch == '_' {
                tokens.push(self.lex_identifier(start));
                continue;
            }
            if let Some(op) = self.match_multi_char_operator() {
                tokens.push(Token::new(TokenKind::Operator, op, start));
                continue;
            }
            if is_punctuator(ch) {
                self.bump();
                tokens.push(Token::new(TokenKind::Punctuator, ch.to_string(), start));
                continue;
            }
            if SINGLE_CHAR_OPERATORS.contains(&ch) {
                self.bump();
                tokens.push(Token::new(TokenKind::Operator, ch.to_string(), start));
                continue;
            }

            return Err(self.lex_err(ch, start));
        }
        Ok(tokens)
    }

    fn match_multi_char_operator(&mut self) -> Option<String> {
        for op in MULTI_CHAR_OPERATORS {
            if self.starts_with(op) {
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                return Some((*op).to_string());
            }
        }
        None
    }

    fn lex_identifier(&mut self, start: Position) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let kind = if is_keyword(&lexeme) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, lexeme, start)
    }

    fn lex_number(&mut self, start: Position) -> Token {
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' || c == '_' {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Number, lexeme, start)
    }

    fn lex_string(&mut self, quote: char, start: Position) -> Result<Token, CompileError> {
        if self.starts_with(&format!("{q}{q}{q}", q = quote)) {
            return self.lex_triple_string(quote, start);
        }

        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(CompileError::UnterminatedString {
                        position: start,
                        filename: self.filename.clone(),
                    })
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    value.push(self.lex_escape()?);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Ok(Token::new(TokenKind::String, value, start))
    }

    fn lex_triple_string(&mut self, quote: char, start: Position) -> Result<Token, CompileError> {
        for _ in 0..3 {
            self.bump();
        }
        if self.peek() == Some('\n') {
            self.bump();
        }
        let mut value = String::new();
        loop {
            if self.starts_with(&format!("{q}{q}{q}", q = quote)) {
                for _ in 0..3 {
                    self.bump();
                }
                break;
            }
            match self.bump() {
                None => {
                    return Err(CompileError::UnterminatedString {
                        position: start,
                        filename: self.filename.clone(),
                    })
                }
                Some(c) => value.push(c),
            }
        }
        if value.ends_with('\n') {
            value.pop();
        }
        Ok(Token::new(TokenKind::String, value, start))
    }

    fn lex_escape(&mut self) -> Result<char, CompileError> {
        let Some(c) = self.bump() else {
            return Err(CompileError::UnterminatedString {
                position: self.pos,
                filename: self.filename.clone(),
            });
        };
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'x' => self.lex_hex_escape(2)?,
            'u' => self.lex_hex_escape(4)?,
            other => other,
        })
    }

    fn lex_hex_escape(&mut self, digits: usize) -> Result<char, CompileError> {
        let mut hex = String::new();
        for _ in 0..digits {
            match self.bump() {
                Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                Some(c) => return Ok(c),
                None => {
                    return Err(CompileError::UnterminatedString {
                        position: self.pos,
                        filename: self.filename.clone(),
                    })
                }
            }
        }
        let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
        Ok(char::from_u32(code).unwrap_or('\u{FFFD}'))
    }
}

pub fn lex(source: &str, filename: Option<&str>) -> Result<Vec<Token>, CompileError> {
    Lexer::new(source, filename).tokenize()
}

/// Strip comments, and (for this newline-insensitive grammar) newlines too,
/// leaving the token stream the parser actually walks.
pub fn prepare(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Newline))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_simple_declaration() {
        let tokens = lex("fixum numerus count = 0", None).unwrap();
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(
            lexemes,
            vec!["fixum", "numerus", "count", "=", "0", ""]
        );
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn greedily_matches_longest_operator() {
        let tokens = lex("a === b", None).unwrap();
        assert_eq!(tokens[1].lexeme, "===");
    }

    #[test]
    fn distinguishes_double_eq_from_triple() {
        let tokens = lex("a == b", None).unwrap();
        assert_eq!(tokens[1].lexeme, "==");
    }

    #[test]
    fn string_escapes_are_decoded() {
        let tokens = lex(r#""a\nb""#, None).unwrap();
        assert_eq!(tokens[0].lexeme, "a\nb");
    }

    #[test]
    fn triple_quoted_strings_skip_escape_processing() {
        let tokens = lex("\"\"\"a\\nb\"\"\"", None).unwrap();
        assert_eq!(tokens[0].lexeme, "a\\nb");
    }

    #[test]
    fn triple_quoted_strips_leading_and_trailing_newline() {
        let tokens = lex("\"\"\"\nhello\n\"\"\"", None).unwrap();
        assert_eq!(tokens[0].lexeme, "hello");
    }

    #[test]
    fn line_comment_ends_at_newline() {
        let tokens = lex("varia x # comment\n= 1", None).unwrap();
        assert_eq!(kinds(&tokens)[3], TokenKind::Comment);
        assert_eq!(tokens[3].lexeme, "# comment");
    }

    #[test]
    fn identifier_that_is_keyword_is_tagged_keyword() {
        let tokens = lex("discretio", None).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
    }

    #[test]
    fn unexpected_character_is_fatal() {
        let err = lex("varia x = `", None).unwrap_err();
        match err {
            CompileError::Lexical { character, .. } => assert_eq!(character, '`'),
            other => panic!("expected Lexical error, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = lex("\"abc", None).unwrap_err();
        assert!(matches!(err, CompileError::UnterminatedString { .. }));
    }

    #[test]
    fn prepare_filters_comments_and_newlines() {
        let tokens = lex("varia\n# c\nx", None).unwrap();
        let prepared = prepare(tokens);
        assert!(prepared
            .iter()
            .all(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::Newline)));
    }

    #[test]
    fn position_of_token_matches_source_location() {
        let tokens = lex("a\nb c", None).unwrap();
        // 'b' is on line 2, column 1
        let b_token = &tokens[1];
        assert_eq!(b_token.lexeme, "b");
        assert_eq!(b_token.position.line, 2);
        assert_eq!(b_token.position.column, 1);
    }
}
