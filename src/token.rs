//! Token model: the closed set of lexical categories and the keyword table.

use std::fmt;

/// Lexical category of a token.
///
/// `Display` renders the upper-case name used in parse error messages
/// (`IDENT`, `RPAREN`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    Ident,
    Int,
    String,

    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Eq,
    NotEq,

    Comma,
    Semicolon,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    Function,
    Let,
    If,
    Else,
    True,
    False,
    Return,
    Macro,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Bang => "BANG",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Slash => "SLASH",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Eq => "EQ",
            TokenKind::NotEq => "NOT_EQ",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Return => "RETURN",
            TokenKind::Macro => "MACRO",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reserved words and the token kind each one produces
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("fn", TokenKind::Function),
    ("let", TokenKind::Let),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("return", TokenKind::Return),
    ("macro", TokenKind::Macro),
];

/// Classify an identifier-shaped word as a keyword or a plain identifier
pub fn lookup_ident(ident: &str) -> TokenKind {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == ident)
        .map_or(TokenKind::Ident, |(_, kind)| *kind)
}

/// A single token: its kind, its literal text and the byte offset where it starts.
///
/// For string literals the literal is the text between the quotes; for EOF it
/// is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            offset,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ident() {
        let cases = [
            ("fn", TokenKind::Function),
            ("let", TokenKind::Let),
            ("if", TokenKind::If),
            ("else", TokenKind::Else),
            ("true", TokenKind::True),
            ("false", TokenKind::False),
            ("return", TokenKind::Return),
            ("macro", TokenKind::Macro),
            ("foobar", TokenKind::Ident),
            ("Let", TokenKind::Ident),
            ("fns", TokenKind::Ident),
        ];
        for (i, (word, expected)) in cases.iter().enumerate() {
            assert_eq!(lookup_ident(word), *expected, "case #{} ({word})", i + 1);
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::NotEq.to_string(), "NOT_EQ");
        assert_eq!(TokenKind::RBrace.to_string(), "RBRACE");
        assert_eq!(Token::new(TokenKind::Int, "5", 0).to_string(), "INT(5)");
    }
}
