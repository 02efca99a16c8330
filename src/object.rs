//! Runtime values produced by the evaluator.
//!
//! Every value is an [`Object`]. Two variants are control-flow carriers rather
//! than data: [`Object::ReturnValue`] marks that a `return` fired and is
//! unwrapped at the nearest function-call boundary, and [`Object::Error`] is a
//! recoverable runtime failure that stops evaluation of the enclosing program.
//!
//! `Display` renders the inspect string shown by the REPL.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{BlockStatement, Expression, Identifier};
use crate::builtinops::BuiltinOp;
use crate::evaluator::environment::Env;

/// Type tag of an object, as it appears in runtime error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Null,
    ReturnValue,
    Error,
    Function,
    Builtin,
    Array,
    Hash,
    Quote,
    Macro,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Null => "NULL",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Quote => "QUOTE",
            ObjectType::Macro => "MACRO",
        })
    }
}

/// Key under which a hashable object is stored in a Hash: its type tag plus
/// an integer derived from its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub value: u64,
}

/// A hash entry keeps the original key object for display
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A user-defined function closing over its definition environment
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

/// A macro: like a function, but applied to unevaluated syntax
pub struct Macro {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

// The captured environment is left out: it can contain the closure itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macro")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Object>),
    /// Entries in insertion order
    Hash(IndexMap<HashKey, HashPair>),
    Function(Rc<Function>),
    Builtin(&'static BuiltinOp),
    Macro(Rc<Macro>),
    ReturnValue(Box<Object>),
    Error(String),
    /// An unevaluated syntax tree, produced by `quote`
    Quote(Expression),
    Null,
}

/// Closures compare by identity, builtins by name, everything else by value.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::Macro(a), Object::Macro(b)) => Rc::ptr_eq(a, b),
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Quote(a), Object::Quote(b)) => a == b,
            (Object::Null, Object::Null) => true,
            _ => false,
        }
    }
}

impl Object {
    /// Shorthand for building an error value
    pub fn error(message: impl Into<String>) -> Self {
        Object::Error(message.into())
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Macro(_) => ObjectType::Macro,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
            Object::Quote(_) => ObjectType::Quote,
            Object::Null => ObjectType::Null,
        }
    }

    /// Hash key of an Integer, Boolean or String; `None` for every other type.
    ///
    /// String keys are a 64-bit hash of the content, so two distinct strings
    /// only share a key if their hashes collide.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::String(value) => {
                let mut hasher = DefaultHasher::new();
                value.hash(&mut hasher);
                hasher.finish()
            }
            _ => return None,
        };
        Some(HashKey {
            object_type: self.object_type(),
            value,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Null and false are falsy; every other value is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{value}"),
            Object::Boolean(value) => write!(f, "{value}"),
            Object::String(value) => f.write_str(value),
            Object::Array(elements) => {
                f.write_str("[")?;
                write_joined(f, elements)?;
                f.write_str("]")
            }
            Object::Hash(pairs) => {
                f.write_str("{")?;
                write_joined(
                    f,
                    pairs
                        .values()
                        .map(|pair| format!("{}: {}", pair.key, pair.value)),
                )?;
                f.write_str("}")
            }
            Object::Function(function) => {
                f.write_str("fn(")?;
                write_joined(f, &function.parameters)?;
                write!(f, ") {{\n{}\n}}", function.body)
            }
            Object::Macro(mac) => {
                f.write_str("macro(")?;
                write_joined(f, &mac.parameters)?;
                write!(f, ") {{\n{}\n}}", mac.body)
            }
            Object::Builtin(op) => write!(f, "builtin function {}", op.name),
            Object::ReturnValue(value) => write!(f, "{value}"),
            Object::Error(message) => write!(f, "ERROR: {message}"),
            Object::Quote(node) => write!(f, "QUOTE({node})"),
            Object::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::builtinops::find_builtin;
    use crate::evaluator::environment::Environment;

    #[test]
    fn test_distinct_strings_get_distinct_keys() {
        let words = ["", "a", "b", "ab", "ba", "name", "Name", "name ", "1", "true"];
        let keys: std::collections::HashSet<HashKey> = words
            .iter()
            .map(|w| Object::String((*w).to_owned()).hash_key().unwrap())
            .collect();
        assert_eq!(keys.len(), words.len());
    }

    #[test]
    fn test_hash_keys() {
        let hello1 = Object::String("Hello World".into());
        let hello2 = Object::String("Hello World".into());
        let diff1 = Object::String("My name is johnny".into());
        let diff2 = Object::String("My name is johnny".into());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_eq!(diff1.hash_key(), diff2.hash_key());
        assert_ne!(hello1.hash_key(), diff1.hash_key());

        assert_eq!(
            Object::Integer(1).hash_key(),
            Object::Integer(1).hash_key()
        );
        assert_ne!(
            Object::Integer(1).hash_key(),
            Object::Integer(2).hash_key()
        );
        // same underlying integer, different types
        assert_ne!(
            Object::Integer(1).hash_key(),
            Object::Boolean(true).hash_key()
        );
        assert_eq!(
            Object::Boolean(false).hash_key().unwrap().object_type,
            ObjectType::Boolean
        );

        let unhashable = vec![
            Object::Null,
            Object::Array(vec![]),
            Object::error("x"),
            Object::Hash(IndexMap::new()),
        ];
        for (i, object) in unhashable.iter().enumerate() {
            assert!(object.hash_key().is_none(), "case #{}", i + 1);
        }
    }

    #[test]
    fn test_inspect() {
        let mut hash = IndexMap::new();
        for (key, value) in [
            (Object::String("one".into()), Object::Integer(1)),
            (Object::Integer(2), Object::Boolean(true)),
        ] {
            hash.insert(key.hash_key().unwrap(), HashPair { key, value });
        }

        let function = Object::Function(Rc::new(Function {
            parameters: vec![Identifier::new("x"), Identifier::new("y")],
            body: BlockStatement::new(vec![crate::ast::Statement::Expression(
                Expression::infix(
                    Expression::ident("x"),
                    crate::ast::InfixOperator::Plus,
                    Expression::ident("y"),
                ),
            )]),
            env: Environment::new_global(),
        }));

        let test_cases = vec![
            (Object::Integer(-5), "-5"),
            (Object::Boolean(true), "true"),
            (Object::String("hi there".into()), "hi there"),
            (Object::Null, "null"),
            (
                Object::Array(vec![Object::Integer(1), Object::String("a".into())]),
                "[1, a]",
            ),
            (Object::Hash(hash), "{one: 1, 2: true}"),
            (function, "fn(x, y) {\n(x + y)\n}"),
            (
                Object::Builtin(find_builtin("len").unwrap()),
                "builtin function len",
            ),
            (
                Object::ReturnValue(Box::new(Object::Integer(10))),
                "10",
            ),
            (Object::error("boom"), "ERROR: boom"),
            (Object::Quote(Expression::Integer(4)), "QUOTE(4)"),
        ];

        for (i, (object, expected)) in test_cases.iter().enumerate() {
            assert_eq!(object.to_string(), *expected, "case #{}", i + 1);
        }
    }

    #[test]
    fn test_truthiness_and_types() {
        assert!(!Object::Null.is_truthy());
        assert!(!Object::Boolean(false).is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::String(String::new()).is_truthy());
        assert_eq!(ObjectType::ReturnValue.to_string(), "RETURN_VALUE");
        assert_eq!(Object::Array(vec![]).object_type().to_string(), "ARRAY");
    }
}
