//! Tree-walking evaluator.
//!
//! Evaluation never fails at the host level. Runtime failures are
//! [`Object::Error`] values that are checked and forwarded at every composite
//! evaluation site, and `return` travels outward as an [`Object::ReturnValue`]
//! until a function-call boundary (or the program) unwraps it.

pub mod environment;

use std::rc::Rc;

use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, Node, PrefixOperator, Program, Statement,
};
use crate::builtinops::{find_builtin, wrong_arguments};
use crate::object::{Function, HashPair, Macro, Object};
use self::environment::{Env, Environment};

use indexmap::IndexMap;

/// Evaluate an expression and return early from the enclosing function if it
/// produced an error
macro_rules! propagate {
    ($value:expr) => {{
        let value = $value;
        if value.is_error() {
            return value;
        }
        value
    }};
}

/// Evaluate any node (public API)
pub fn eval(node: &Node, env: &Env) -> Object {
    match node {
        Node::Program(program) => eval_program(program, env),
        Node::Statement(statement) => eval_statement(statement, env),
        Node::Block(block) => eval_block(block, env),
        Node::Expression(expr) => eval_expression(expr, env),
    }
}

/// Evaluate a program's statements in order. A `return` at top level ends the
/// program with the returned value; an error ends it with the error.
pub fn eval_program(program: &Program, env: &Env) -> Object {
    let mut result = Object::Null;
    for statement in &program.statements {
        result = eval_statement(statement, env);
        match result {
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => return result,
            _ => {}
        }
    }
    result
}

/// Like [`eval_program`], except a ReturnValue is passed up still wrapped
pub fn eval_block(block: &BlockStatement, env: &Env) -> Object {
    let mut result = Object::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }
    result
}

pub fn eval_statement(statement: &Statement, env: &Env) -> Object {
    match statement {
        Statement::Let { name, value } => {
            let value = propagate!(eval_expression(value, env));
            env.borrow_mut().set(name.name(), value.clone());
            value
        }
        Statement::Return(value) => {
            let value = match value {
                Some(expr) => propagate!(eval_expression(expr, env)),
                None => Object::Null,
            };
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression(expr) => eval_expression(expr, env),
    }
}

pub fn eval_expression(expr: &Expression, env: &Env) -> Object {
    match expr {
        Expression::Integer(value) => Object::Integer(*value),
        Expression::Boolean(value) => Object::Boolean(*value),
        Expression::String(value) => Object::String(value.clone()),
        Expression::Identifier(ident) => eval_identifier(ident, env),

        Expression::Prefix { operator, right } => {
            let right = propagate!(eval_expression(right, env));
            eval_prefix_expression(*operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = propagate!(eval_expression(left, env));
            let right = propagate!(eval_expression(right, env));
            eval_infix_expression(*operator, left, right)
        }

        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = propagate!(eval_expression(condition, env));
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Object::Null
            }
        }

        Expression::Function { parameters, body } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),
        Expression::Macro { parameters, body } => Object::Macro(Rc::new(Macro {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        })),

        Expression::Call {
            function,
            arguments,
        } => {
            if let Expression::Identifier(callee) = function.as_ref()
                && callee.name() == "quote"
            {
                return match arguments.as_slice() {
                    [node] => quote(node, env),
                    _ => wrong_arguments(arguments.len(), 1),
                };
            }

            let function = propagate!(eval_expression(function, env));
            let args = match eval_expressions(arguments, env) {
                Ok(args) => args,
                Err(error) => return error,
            };
            apply_function(&function, args)
        }

        Expression::Array(elements) => match eval_expressions(elements, env) {
            Ok(elements) => Object::Array(elements),
            Err(error) => error,
        },
        Expression::Hash(pairs) => eval_hash_literal(pairs, env),
        Expression::Index { left, index } => {
            let left = propagate!(eval_expression(left, env));
            let index = propagate!(eval_expression(index, env));
            eval_index_expression(left, index)
        }
    }
}

/// Evaluate expressions left to right, stopping at the first error
fn eval_expressions(exprs: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    exprs
        .iter()
        .map(|expr| {
            let value = eval_expression(expr, env);
            if value.is_error() { Err(value) } else { Ok(value) }
        })
        .collect()
}

/// User bindings first, then the builtin table
fn eval_identifier(ident: &Identifier, env: &Env) -> Object {
    if let Some(value) = env.borrow().get(ident.name()) {
        return value;
    }
    match find_builtin(ident.name()) {
        Some(op) => Object::Builtin(op),
        None => Object::error(format!("identifier not found: {ident}")),
    }
}

fn eval_prefix_expression(operator: PrefixOperator, right: Object) -> Object {
    match operator {
        PrefixOperator::Bang => Object::Boolean(match right {
            Object::Boolean(value) => !value,
            Object::Null => true,
            _ => false,
        }),
        PrefixOperator::Minus => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            other => Object::error(format!("unknown operator: -{}", other.object_type())),
        },
    }
}

fn eval_infix_expression(operator: InfixOperator, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::Boolean(l), Object::Boolean(r)) if operator == InfixOperator::Eq => {
            Object::Boolean(l == r)
        }
        (Object::Boolean(l), Object::Boolean(r)) if operator == InfixOperator::NotEq => {
            Object::Boolean(l != r)
        }
        (Object::String(l), Object::String(r)) if operator == InfixOperator::Plus => {
            Object::String(format!("{l}{r}"))
        }
        _ => {
            let (left_type, right_type) = (left.object_type(), right.object_type());
            if left_type != right_type {
                Object::error(format!("type mismatch: {left_type} {operator} {right_type}"))
            } else {
                Object::error(format!("unknown operator: {left_type} {operator} {right_type}"))
            }
        }
    }
}

fn eval_integer_infix_expression(operator: InfixOperator, left: i64, right: i64) -> Object {
    match operator {
        InfixOperator::Plus => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Asterisk => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Slash if right == 0 => Object::error("division by zero"),
        InfixOperator::Slash => Object::Integer(left.wrapping_div(right)),
        InfixOperator::Lt => Object::Boolean(left < right),
        InfixOperator::Gt => Object::Boolean(left > right),
        InfixOperator::Eq => Object::Boolean(left == right),
        InfixOperator::NotEq => Object::Boolean(left != right),
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> Object {
    let mut hash = IndexMap::new();
    for (key_expr, value_expr) in pairs {
        let key = propagate!(eval_expression(key_expr, env));
        let Some(hash_key) = key.hash_key() else {
            return Object::error(format!("unusable as hash key: {}", key.object_type()));
        };
        let value = propagate!(eval_expression(value_expr, env));
        hash.insert(hash_key, HashPair { key, value });
    }
    Object::Hash(hash)
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(Object::Null),
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map_or(Object::Null, |pair| pair.value.clone()),
            None => Object::error(format!("unusable as hash key: {}", index.object_type())),
        },
        _ => Object::error(format!(
            "index operator not supported: {}",
            left.object_type()
        )),
    }
}

/// Call a function or builtin with already-evaluated arguments
pub fn apply_function(function: &Object, args: Vec<Object>) -> Object {
    match function {
        Object::Function(function) => {
            if function.parameters.len() != args.len() {
                return wrong_arguments(args.len(), function.parameters.len());
            }

            let call_env = Environment::enclosed(&function.env);
            for (param, arg) in function.parameters.iter().zip(args) {
                call_env.borrow_mut().set(param.name(), arg);
            }

            match eval_block(&function.body, &call_env) {
                Object::ReturnValue(value) => *value,
                other => other,
            }
        }
        Object::Builtin(op) => op.call(&args),
        other => Object::error(format!("not a function: {}", other.object_type())),
    }
}

//
// Quasiquotation
//

/// Build a Quote of `node`, first replacing every `unquote(expr)` reachable
/// through [`Expression::modify`] with the syntax of `expr`'s value.
pub fn quote(node: &Expression, env: &Env) -> Object {
    let mut failure = None;
    let node = node.clone().modify(&mut |expr| {
        if failure.is_some() {
            return expr;
        }
        let value = match unquote_argument(&expr) {
            Some(argument) => eval_expression(argument, env),
            None => return expr,
        };
        match object_to_expression(value) {
            Ok(spliced) => spliced,
            Err(error) => {
                failure = Some(error);
                expr
            }
        }
    });

    match failure {
        Some(error) => error,
        None => Object::Quote(node),
    }
}

/// The argument of an `unquote(...)` call with exactly one argument
fn unquote_argument(expr: &Expression) -> Option<&Expression> {
    match expr {
        Expression::Call {
            function,
            arguments,
        } => match (function.as_ref(), arguments.as_slice()) {
            (Expression::Identifier(callee), [argument]) if callee.name() == "unquote" => {
                Some(argument)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Turn an unquoted value back into syntax
fn object_to_expression(value: Object) -> Result<Expression, Object> {
    match value {
        Object::Integer(value) => Ok(Expression::Integer(value)),
        Object::Boolean(value) => Ok(Expression::Boolean(value)),
        Object::String(value) => Ok(Expression::String(value)),
        Object::Quote(node) => Ok(node),
        error @ Object::Error(_) => Err(error),
        other => Err(Object::error(format!(
            "unquote: cannot convert {} to a syntax node",
            other.object_type()
        ))),
    }
}
