//! Macro definition and expansion.
//!
//! Macros run between parsing and evaluation. [`define_macros`] lifts
//! top-level `let name = macro(...) { ... };` statements out of the program
//! into a macro environment, then [`expand_macros`] replaces every call of a
//! defined macro with the syntax tree its body quotes:
//!
//! ```text
//! let reverse = macro(a, b) { quote(unquote(b) - unquote(a)) };
//! reverse(2 + 2, 10 - 5);      // expands to (10 - 5) - (2 + 2)
//! ```
//!
//! Arguments are passed unevaluated, each wrapped in a Quote object, so a
//! macro body decides what to evaluate through `unquote`.

use std::rc::Rc;

use log::debug;

use crate::Error;
use crate::ast::{Expression, Program, Statement};
use crate::evaluator::environment::{Env, Environment};
use crate::evaluator::eval_block;
use crate::object::{Macro, Object};

fn is_macro_definition(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::Let {
            value: Expression::Macro { .. },
            ..
        }
    )
}

/// Bind every top-level macro definition in `env` and return the program
/// without them. Other statements keep their order.
pub fn define_macros(program: Program, env: &Env) -> Program {
    let mut statements = Vec::with_capacity(program.statements.len());
    for statement in program.statements {
        match statement {
            Statement::Let {
                name,
                value: Expression::Macro { parameters, body },
            } => {
                debug!("defining macro {name}");
                let mac = Macro {
                    parameters,
                    body,
                    env: Rc::clone(env),
                };
                env.borrow_mut().set(name.name(), Object::Macro(Rc::new(mac)));
            }
            other => statements.push(other),
        }
    }
    debug_assert!(!statements.iter().any(is_macro_definition));
    Program::new(statements)
}

/// The macro a call refers to, if its callee is an identifier bound to one
fn macro_for_call(expr: &Expression, env: &Env) -> Option<Rc<Macro>> {
    let callee = expr.called_identifier()?;
    match env.borrow().get(callee.name()) {
        Some(Object::Macro(mac)) => Some(mac),
        _ => None,
    }
}

/// Run one macro on the unevaluated arguments of a call site
fn expand_call(name: &str, mac: &Macro, arguments: &[Expression]) -> Result<Expression, Error> {
    if arguments.len() != mac.parameters.len() {
        return Err(Error::Macro(format!(
            "wrong number of arguments to macro `{name}`. got={}, want={}",
            arguments.len(),
            mac.parameters.len()
        )));
    }

    let macro_env = Environment::enclosed(&mac.env);
    for (param, argument) in mac.parameters.iter().zip(arguments) {
        macro_env
            .borrow_mut()
            .set(param.name(), Object::Quote(argument.clone()));
    }

    let evaluated = match eval_block(&mac.body, &macro_env) {
        Object::ReturnValue(value) => *value,
        other => other,
    };

    match evaluated {
        Object::Quote(node) => {
            debug!("expanded macro {name} to {node}");
            Ok(node)
        }
        Object::Error(message) => Err(Error::Macro(format!("macro `{name}` failed: {message}"))),
        other => Err(Error::Macro(format!(
            "macro `{name}` must return a quote, got {}",
            other.object_type()
        ))),
    }
}

/// Replace every call of a macro bound in `env` with the node its body
/// quotes. Fails on the first macro whose body does not produce a quote.
pub fn expand_macros(program: Program, env: &Env) -> Result<Program, Error> {
    let mut failure = None;
    let program = program.modify(&mut |expr| {
        if failure.is_some() {
            return expr;
        }
        let Some(mac) = macro_for_call(&expr, env) else {
            return expr;
        };
        match expr {
            Expression::Call {
                function,
                arguments,
            } => match expand_call(&function.to_string(), &mac, &arguments) {
                Ok(expanded) => expanded,
                Err(err) => {
                    failure = Some(err);
                    Expression::Call {
                        function,
                        arguments,
                    }
                }
            },
            other => other,
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(program),
    }
}
