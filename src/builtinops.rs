//! Built-in functions registry.
//!
//! The builtins are a fixed table resolved by name when an identifier has no
//! user binding, so a `let len = ...` shadows the builtin for the rest of that
//! scope.
//!
//! ```text
//! len("four")          // 4
//! first([1, 2, 3])     // 1
//! rest([1, 2, 3])      // [2, 3]
//! push([1], 2)         // [1, 2]
//! puts("hello")        // prints hello, returns null
//! ```
//!
//! ## Error Handling
//!
//! Builtins never fail at the host level. A wrong argument count or an
//! argument of the wrong type produces an [`Object::Error`] value, e.g.
//! `wrong number of arguments. got=2, want=1` or
//! `argument to `len` not supported, got INTEGER`.
//!
//! ## Adding New Operations
//!
//! 1. Implement the function with the signature `fn(&[Object]) -> Object`;
//!    the argument count has already been checked when it runs.
//! 2. Add a `BuiltinOp` entry with its name and arity to `BUILTIN_OPS`.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::LazyLock;

use log::warn;

use crate::object::Object;

/// Accepted argument counts of a builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
}

impl Arity {
    /// Check an argument count, producing the error object on mismatch
    pub fn validate(self, got: usize) -> Result<(), Object> {
        match self {
            Arity::Exact(want) if got == want => Ok(()),
            Arity::Exact(want) => Err(wrong_arguments(got, want)),
        }
    }
}

/// The arity error shared by builtins and user function application
pub fn wrong_arguments(got: usize, want: usize) -> Object {
    Object::error(format!("wrong number of arguments. got={got}, want={want}"))
}

/// Definition of a built-in function
#[derive(Debug)]
pub struct BuiltinOp {
    /// The identifier the function is called by
    pub name: &'static str,
    func: fn(&[Object]) -> Object,
    /// Expected number of arguments
    pub arity: Arity,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl BuiltinOp {
    /// Validate the argument count, then run the function
    pub fn call(&self, args: &[Object]) -> Object {
        match self.arity.validate(args.len()) {
            Ok(()) => (self.func)(args),
            Err(error) => error,
        }
    }
}

//
// Builtin Function Implementations
//

fn builtin_len(args: &[Object]) -> Object {
    match &args[0] {
        Object::String(value) => Object::Integer(value.chars().count() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::error(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        )),
    }
}

fn array_argument<'a>(name: &str, arg: &'a Object) -> Result<&'a [Object], Object> {
    match arg {
        Object::Array(elements) => Ok(elements),
        other => Err(Object::error(format!(
            "argument to `{name}` must be ARRAY, got {}",
            other.object_type()
        ))),
    }
}

fn builtin_first(args: &[Object]) -> Object {
    match array_argument("first", &args[0]) {
        Ok(elements) => elements.first().cloned().unwrap_or(Object::Null),
        Err(error) => error,
    }
}

fn builtin_last(args: &[Object]) -> Object {
    match array_argument("last", &args[0]) {
        Ok(elements) => elements.last().cloned().unwrap_or(Object::Null),
        Err(error) => error,
    }
}

fn builtin_rest(args: &[Object]) -> Object {
    match array_argument("rest", &args[0]) {
        Ok(elements) => Object::Array(elements.iter().skip(1).cloned().collect()),
        Err(error) => error,
    }
}

fn builtin_push(args: &[Object]) -> Object {
    match array_argument("push", &args[0]) {
        Ok(elements) => {
            let mut pushed = elements.to_vec();
            pushed.push(args[1].clone());
            Object::Array(pushed)
        }
        Err(error) => error,
    }
}

/// Write the inspect form of `value` as one line
fn write_line(out: &mut impl Write, value: &Object) -> io::Result<()> {
    writeln!(out, "{value}")
}

fn builtin_puts(args: &[Object]) -> Object {
    if let Err(err) = write_line(&mut io::stdout().lock(), &args[0]) {
        warn!("puts: could not write to stdout: {err}");
    }
    Object::Null
}

/// Global registry of all built-in functions.
static BUILTIN_OPS: LazyLock<Vec<BuiltinOp>> = LazyLock::new(|| {
    vec![
        BuiltinOp {
            name: "len",
            func: builtin_len,
            arity: Arity::Exact(1),
        },
        BuiltinOp {
            name: "first",
            func: builtin_first,
            arity: Arity::Exact(1),
        },
        BuiltinOp {
            name: "last",
            func: builtin_last,
            arity: Arity::Exact(1),
        },
        BuiltinOp {
            name: "rest",
            func: builtin_rest,
            arity: Arity::Exact(1),
        },
        BuiltinOp {
            name: "push",
            func: builtin_push,
            arity: Arity::Exact(2),
        },
        BuiltinOp {
            name: "puts",
            func: builtin_puts,
            arity: Arity::Exact(1),
        },
    ]
});

/// Lazy static map from name to BuiltinOp (private - use find_builtin)
static BUILTIN_BY_NAME: LazyLock<HashMap<&'static str, &'static BuiltinOp>> =
    LazyLock::new(|| {
        let ops: &'static [BuiltinOp] = BUILTIN_OPS.as_slice();
        ops.iter().map(|op| (op.name, op)).collect()
    });

/// Get all builtin functions, in registry order
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS.as_slice()
}

/// Find a builtin function by name
pub fn find_builtin(name: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_NAME.get(name).copied()
}
