//! Lexer: converts source text into tokens, one token per call.
//!
//! Each call to [`Lexer::next_token`] skips whitespace and recognizes exactly one
//! token from the remaining input with small `nom` scanners. Once the input is
//! exhausted the lexer keeps returning EOF. Characters that start no token come
//! out as `Illegal` tokens; rejecting them is the parser's job.

use log::trace;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{opt, value},
};

use crate::token::{Token, TokenKind, lookup_ident};

/// Scan an identifier or keyword: a maximal run of ASCII letters and underscores
fn scan_word(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, word) = take_while1(|c: char| c.is_ascii_alphabetic() || c == '_').parse(input)?;
    Ok((rest, (lookup_ident(word), word)))
}

/// Scan an integer literal: a maximal run of ASCII digits, no sign
fn scan_integer(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, digits) = digit1.parse(input)?;
    Ok((rest, (TokenKind::Int, digits)))
}

/// Scan a string literal. The literal is the raw text up to the next `"`
/// or the end of input; there are no escape sequences.
fn scan_string(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, _) = char('"').parse(input)?;
    let (rest, content) = take_till(|c: char| c == '"').parse(rest)?;
    let (rest, _) = opt(char('"')).parse(rest)?;
    Ok((rest, (TokenKind::String, content)))
}

/// Scan an operator or punctuation character. Two-character operators are
/// tried before their one-character prefixes.
fn scan_symbol(input: &str) -> IResult<&str, (TokenKind, &str)> {
    let (rest, kind) = alt((
        alt((
            value(TokenKind::Eq, tag("==")),
            value(TokenKind::NotEq, tag("!=")),
            value(TokenKind::Assign, char('=')),
            value(TokenKind::Bang, char('!')),
            value(TokenKind::Plus, char('+')),
            value(TokenKind::Minus, char('-')),
            value(TokenKind::Asterisk, char('*')),
            value(TokenKind::Slash, char('/')),
            value(TokenKind::Lt, char('<')),
            value(TokenKind::Gt, char('>')),
        )),
        alt((
            value(TokenKind::Comma, char(',')),
            value(TokenKind::Semicolon, char(';')),
            value(TokenKind::Colon, char(':')),
            value(TokenKind::LParen, char('(')),
            value(TokenKind::RParen, char(')')),
            value(TokenKind::LBrace, char('{')),
            value(TokenKind::RBrace, char('}')),
            value(TokenKind::LBracket, char('[')),
            value(TokenKind::RBracket, char(']')),
        )),
    ))
    .parse(input)?;
    Ok((rest, (kind, &input[..input.len() - rest.len()])))
}

fn scan_token(input: &str) -> IResult<&str, (TokenKind, &str)> {
    alt((scan_word, scan_integer, scan_string, scan_symbol)).parse(input)
}

/// Streaming lexer over a source string.
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    rest: &'src str,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            rest: source,
        }
    }

    /// The full source text being lexed
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Byte offset of the read cursor
    fn cursor(&self) -> usize {
        self.source.len() - self.rest.len()
    }

    fn skip_whitespace(&mut self) {
        // multispace0 only matches ' ', '\t', '\n' and '\r'
        if let Ok((rest, _)) = multispace0::<&str, nom::error::Error<&str>>(self.rest) {
            self.rest = rest;
        }
    }

    /// Consume and return the next token. Returns EOF forever once the input
    /// is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let offset = self.cursor();

        let token = match scan_token(self.rest) {
            Ok((rest, (kind, literal))) => {
                self.rest = rest;
                Token::new(kind, literal, offset)
            }
            Err(_) => match self.rest.chars().next() {
                None => Token::new(TokenKind::Eof, "", offset),
                Some(ch) => {
                    self.rest = &self.rest[ch.len_utf8()..];
                    Token::new(TokenKind::Illegal, ch.to_string(), offset)
                }
            },
        };

        trace!("token: {token}");
        token
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token before EOF
    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds_and_literals(input: &str) -> Vec<(TokenKind, std::string::String)> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.is(Eof);
            out.push((token.kind, token.literal));
            if done {
                return out;
            }
        }
    }

    #[test]
    fn test_next_token_program() {
        let input = r#"let five = 5;
let ten = 10;

let add = fn(x, y) {
  x + y;
};

let result = add(five, ten);
!-/*5;
5 < 10 > 5;

if (5 < 10) {
    return true;
} else {
    return false;
}

10 == 10;
10 != 9;
"foobar"
"foo bar"
[1, 2];
{"foo": "bar"}
macro(x, y) { x + y; };
"#;

        let expected: Vec<(TokenKind, &str)> = vec![
            (Let, "let"),
            (Ident, "five"),
            (Assign, "="),
            (Int, "5"),
            (Semicolon, ";"),
            (Let, "let"),
            (Ident, "ten"),
            (Assign, "="),
            (Int, "10"),
            (Semicolon, ";"),
            (Let, "let"),
            (Ident, "add"),
            (Assign, "="),
            (Function, "fn"),
            (LParen, "("),
            (Ident, "x"),
            (Comma, ","),
            (Ident, "y"),
            (RParen, ")"),
            (LBrace, "{"),
            (Ident, "x"),
            (Plus, "+"),
            (Ident, "y"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Semicolon, ";"),
            (Let, "let"),
            (Ident, "result"),
            (Assign, "="),
            (Ident, "add"),
            (LParen, "("),
            (Ident, "five"),
            (Comma, ","),
            (Ident, "ten"),
            (RParen, ")"),
            (Semicolon, ";"),
            (Bang, "!"),
            (Minus, "-"),
            (Slash, "/"),
            (Asterisk, "*"),
            (Int, "5"),
            (Semicolon, ";"),
            (Int, "5"),
            (Lt, "<"),
            (Int, "10"),
            (Gt, ">"),
            (Int, "5"),
            (Semicolon, ";"),
            (If, "if"),
            (LParen, "("),
            (Int, "5"),
            (Lt, "<"),
            (Int, "10"),
            (RParen, ")"),
            (LBrace, "{"),
            (Return, "return"),
            (True, "true"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Else, "else"),
            (LBrace, "{"),
            (Return, "return"),
            (False, "false"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Int, "10"),
            (Eq, "=="),
            (Int, "10"),
            (Semicolon, ";"),
            (Int, "10"),
            (NotEq, "!="),
            (Int, "9"),
            (Semicolon, ";"),
            (String, "foobar"),
            (String, "foo bar"),
            (LBracket, "["),
            (Int, "1"),
            (Comma, ","),
            (Int, "2"),
            (RBracket, "]"),
            (Semicolon, ";"),
            (LBrace, "{"),
            (String, "foo"),
            (Colon, ":"),
            (String, "bar"),
            (RBrace, "}"),
            (Macro, "macro"),
            (LParen, "("),
            (Ident, "x"),
            (Comma, ","),
            (Ident, "y"),
            (RParen, ")"),
            (LBrace, "{"),
            (Ident, "x"),
            (Plus, "+"),
            (Ident, "y"),
            (Semicolon, ";"),
            (RBrace, "}"),
            (Semicolon, ";"),
            (Eof, ""),
        ];

        let actual = kinds_and_literals(input);
        assert_eq!(actual.len(), expected.len(), "token count");
        for (i, ((kind, literal), (exp_kind, exp_literal))) in
            actual.iter().zip(expected.iter()).enumerate()
        {
            assert_eq!(kind, exp_kind, "token #{i}: kind");
            assert_eq!(literal, exp_literal, "token #{i}: literal");
        }
    }

    #[test]
    fn test_edge_cases() {
        let cases: Vec<(&str, Vec<(TokenKind, &str)>)> = vec![
            ("", vec![(Eof, "")]),
            (" \t\r\n ", vec![(Eof, "")]),
            ("a_b", vec![(Ident, "a_b"), (Eof, "")]),
            // digits end an identifier
            ("abc1", vec![(Ident, "abc"), (Int, "1"), (Eof, "")]),
            ("12ab", vec![(Int, "12"), (Ident, "ab"), (Eof, "")]),
            // unterminated string runs to end of input
            ("\"abc", vec![(String, "abc"), (Eof, "")]),
            ("\"\"", vec![(String, ""), (Eof, "")]),
            // no escape processing
            (r#""a\n""#, vec![(String, r"a\n"), (Eof, "")]),
            ("=!", vec![(Assign, "="), (Bang, "!"), (Eof, "")]),
            ("===", vec![(Eq, "=="), (Assign, "="), (Eof, "")]),
            ("@", vec![(Illegal, "@"), (Eof, "")]),
            ("1 # 2", vec![(Int, "1"), (Illegal, "#"), (Int, "2"), (Eof, "")]),
            ("é", vec![(Illegal, "é"), (Eof, "")]),
        ];

        for (i, (input, expected)) in cases.iter().enumerate() {
            let actual = kinds_and_literals(input);
            let expected: Vec<(TokenKind, std::string::String)> = expected
                .iter()
                .map(|(k, l)| (*k, (*l).to_owned()))
                .collect();
            assert_eq!(actual, expected, "case #{} ({input:?})", i + 1);
        }
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert!(lexer.next_token().is(Ident));
        for _ in 0..3 {
            let token = lexer.next_token();
            assert!(token.is(Eof));
            assert_eq!(token.offset, 1);
        }
    }

    #[test]
    fn test_offsets_after_whitespace_and_illegal() {
        let mut lexer = Lexer::new("  @ \"s\" ==");
        let tokens: Vec<(TokenKind, usize)> = std::iter::from_fn(|| {
            let token = lexer.next_token();
            Some((token.kind, token.offset))
        })
        .take(5)
        .collect();
        assert_eq!(
            tokens,
            vec![(Illegal, 2), (String, 4), (Eq, 8), (Eof, 10), (Eof, 10)]
        );
    }

    #[test]
    fn test_offsets_and_iterator() {
        let tokens: Vec<Token> = Lexer::new("let  x =\n 42;").collect();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 5, 7, 10, 12]);
        assert_eq!(tokens.len(), 5);
    }
}
