//! Character stream → token stream (§4.1).
//!
//! A small hand-rolled scanner; no external parsing crate sits in front of
//! it; the grammar is simple enough that a single `peekable` char iterator
//! is the natural fit.

mod token;

pub use token::{Keyword, Token, TokenKind};

use crate::error::LexError;

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { chars: source.chars().peekable() }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(&c) = self.chars.peek() else {
                tokens.push(Token::new(TokenKind::Eof, ""));
                return Ok(tokens);
            };

            let token = match c {
                '\'' | '"' => self.lex_string(c)?,
                '0'..='9' => self.lex_number(false),
                '-' => self.lex_minus()?,
                '=' => {
                    self.chars.next();
                    Token::new(TokenKind::Eq, "=")
                }
                '!' => self.lex_not_eq()?,
                '<' => self.lex_lt(),
                '>' => self.lex_gt(),
                ',' => {
                    self.chars.next();
                    Token::new(TokenKind::Comma, ",")
                }
                '(' => {
                    self.chars.next();
                    Token::new(TokenKind::LeftParen, "(")
                }
                ')' => {
                    self.chars.next();
                    Token::new(TokenKind::RightParen, ")")
                }
                '*' => {
                    self.chars.next();
                    Token::new(TokenKind::Star, "*")
                }
                c if is_identifier_start(c) => self.lex_identifier(),
                other => return Err(LexError::InvalidCharacter(other)),
            };
            tokens.push(token);
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn lex_minus(&mut self) -> Result<Token, LexError> {
        self.chars.next();
        match self.chars.peek() {
            Some(c) if c.is_ascii_digit() => Ok(self.lex_number(true)),
            _ => Err(LexError::StrayMinus),
        }
    }

    fn lex_not_eq(&mut self) -> Result<Token, LexError> {
        self.chars.next();
        match self.chars.peek() {
            Some('=') => {
                self.chars.next();
                Ok(Token::new(TokenKind::NotEq, "!="))
            }
            Some(&other) => Err(LexError::InvalidCharacter(other)),
            None => Err(LexError::InvalidCharacter('!')),
        }
    }

    fn lex_lt(&mut self) -> Token {
        self.chars.next();
        match self.chars.peek() {
            Some('=') => {
                self.chars.next();
                Token::new(TokenKind::LtEq, "<=")
            }
            Some('>') => {
                self.chars.next();
                Token::new(TokenKind::NotEq, "<>")
            }
            _ => Token::new(TokenKind::Lt, "<"),
        }
    }

    fn lex_gt(&mut self) -> Token {
        self.chars.next();
        match self.chars.peek() {
            Some('=') => {
                self.chars.next();
                Token::new(TokenKind::GtEq, ">=")
            }
            _ => Token::new(TokenKind::Gt, ">"),
        }
    }

    fn lex_number(&mut self, negative: bool) -> Token {
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.chars.next().unwrap());
        }
        let mut is_float = false;
        if self.chars.peek() == Some(&'.') {
            is_float = true;
            text.push(self.chars.next().unwrap());
            while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.chars.next().unwrap());
            }
        }
        if is_float {
            Token::new(TokenKind::Float(text.parse().unwrap_or(0.0)), text)
        } else {
            Token::new(TokenKind::Integer(text.parse().unwrap_or(0)), text)
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        self.chars.next();
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => return Err(LexError::UnterminatedString),
                Some(c) if c == quote => break,
                Some('\\') => match self.chars.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('\\') => value.push('\\'),
                    Some(c) if c == quote => value.push(quote),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Err(LexError::UnterminatedString),
                },
                Some(c) => value.push(c),
            }
        }
        Ok(Token::new(TokenKind::String(value.clone()), value))
    }

    fn lex_identifier(&mut self) -> Token {
        let mut text = String::new();
        while matches!(self.chars.peek(), Some(&c) if is_identifier_continue(c)) {
            text.push(self.chars.next().unwrap());
        }
        match Keyword::lookup(&text) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), text),
            None => Token::new(TokenKind::Identifier, text),
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        lex(sql).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_simple_select() {
        let k = kinds("SELECT * FROM t");
        assert_eq!(
            k,
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Star,
                TokenKind::Keyword(Keyword::From),
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_lookup_is_case_insensitive_but_preserves_text() {
        let tokens = lex("select").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Select));
        assert_eq!(tokens[0].text, "select");
    }

    #[test]
    fn bare_path_is_one_identifier() {
        let tokens = lex("data/file-1.parquet").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "data/file-1.parquet");
    }

    #[test]
    fn stray_minus_is_lex_error() {
        assert_eq!(lex("a - b"), Err(LexError::StrayMinus));
    }

    #[test]
    fn negative_literal_lexes_as_one_token() {
        let k = kinds("-5");
        assert_eq!(k[0], TokenKind::Integer(-5));
    }

    #[test]
    fn unknown_character_is_lex_error() {
        assert_eq!(lex("SELECT ~"), Err(LexError::InvalidCharacter('~')));
    }

    #[test]
    fn string_escapes() {
        let tokens = lex(r#"'a\nb\t\\c\'d'"#).unwrap();
        match &tokens[0].kind {
            TokenKind::String(s) => assert_eq!(s, "a\nb\t\\c'd"),
            other => panic!("expected string, got {other:?}"),
        }
    }
}
