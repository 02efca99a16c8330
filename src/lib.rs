//! Monkey - a small dynamically-typed expression language
//!
//! This crate implements the whole interpreter pipeline for Monkey: a lexer, a
//! Pratt parser producing an AST, a tree-walking evaluator over a tagged object
//! model, and a syntactic macro facility built on quote/unquote.
//!
//! ```text
//! let twice = fn(f, x) { f(f(x)) };
//! twice(fn(n) { n * 2 }, 5);            // 20
//!
//! let unless = macro(c, t, f) { quote(if (!(unquote(c))) { unquote(t) } else { unquote(f) }) };
//! unless(10 > 5, puts("no"), puts("yes"));
//! ```
//!
//! ## Pipeline
//!
//! source text → [`lexer`] → tokens → [`parser`] → [`ast::Program`] →
//! [`macro_expansion`] (define, then expand) → [`evaluator`] → [`object::Object`]
//!
//! [`session::Session`] runs the whole pipeline and keeps the environments
//! alive between inputs, which is what the REPL and the file runner use.
//!
//! ## Errors
//!
//! There are two disjoint classes of failure:
//! - Structural failures (bad syntax, broken macro expansion) are host-level
//!   [`Error`]s. The parser stops at the first one and returns no partial AST.
//! - Runtime failures are [`object::Object::Error`] values that flow through
//!   the evaluator like any other result and stop evaluation of the enclosing
//!   program.
//!
//! ## Modules
//!
//! - `token`, `lexer`: lexical analysis
//! - `ast`, `parser`: syntax tree and precedence-climbing parser
//! - `object`, `evaluator`: runtime values and evaluation
//! - `builtinops`: the fixed builtin function table
//! - `macro_expansion`: macro definition and expansion
//! - `session`: the driver contract shared by the REPL and the file runner

use std::fmt;

use crate::token::TokenKind;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Clone)]
pub enum ParseErrorKind {
    /// The next token was not one of the kinds the grammar requires here
    UnexpectedToken {
        expected: Vec<TokenKind>,
        found: TokenKind,
    },
    /// The token cannot start an expression
    NoPrefixParse(TokenKind),
    /// A digit run that does not fit the native integer width
    InvalidInteger,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token literal, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with all fields
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a simple ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None, None)
    }

    /// Create a ParseError with context extracted from input at a given byte offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        let error_char = input
            .char_indices()
            .take_while(|(idx, _)| *idx < error_offset)
            .count();
        let context_start = error_char.saturating_sub(20);

        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < input.chars().count() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, Some(display_context), found)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParseError: {}", self.message)?;
        if let Some(found) = &self.found {
            write!(f, "\nFound: {found}")?;
        }
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

/// Host-level errors of the interpreter.
///
/// Runtime errors of evaluated programs are not represented here; they are
/// [`object::Object::Error`] values.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Parse(ParseError),
    /// Macro expansion broke one of its invariants (body did not produce a
    /// quote, wrong argument count)
    Macro(String),
    /// The driver could not read its input
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Macro(msg) => write!(f, "MacroError: {msg}"),
            Error::Io(msg) => write!(f, "IoError: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod lexer;
pub mod macro_expansion;
pub mod object;
pub mod parser;
pub mod session;
pub mod token;
