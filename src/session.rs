//! The interpreter driver shared by the REPL and the file runner.

use crate::Error;
use crate::evaluator::environment::{Env, Environment};
use crate::evaluator::eval_program;
use crate::macro_expansion::{define_macros, expand_macros};
use crate::object::Object;
use crate::parser::parse;

/// One interpreter session: a top-level environment for evaluation and a
/// separate one for macro definitions. Both persist across inputs, so later
/// inputs see the bindings and macros of earlier ones.
#[derive(Debug)]
pub struct Session {
    env: Env,
    macro_env: Env,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            env: Environment::new_global(),
            macro_env: Environment::new_global(),
        }
    }

    /// Run one source text through the whole pipeline: parse, define macros,
    /// expand them, evaluate.
    ///
    /// Structural failures come back as `Err`; a runtime failure is an
    /// `Ok(Object::Error(..))`.
    pub fn eval_source(&mut self, source: &str) -> Result<Object, Error> {
        let program = parse(source)?;
        let program = define_macros(program, &self.macro_env);
        let program = expand_macros(program, &self.macro_env)?;
        Ok(eval_program(&program, &self.env))
    }

    /// The session's top-level environment
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Names of the macros defined so far, sorted
    pub fn macro_names(&self) -> Vec<String> {
        self.macro_env
            .borrow()
            .bindings()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    #[test]
    fn test_bindings_persist_across_inputs() {
        let mut session = Session::new();
        let inputs = vec![
            ("let a = 5;", "5"),
            ("let add = fn(x, y) { x + y };", "fn(x, y) {\n(x + y)\n}"),
            ("add(a, 10)", "15"),
            ("let unless = macro(c, t, f) { quote(if (!(unquote(c))) { unquote(t) } else { unquote(f) }) };", "null"),
            ("unless(a > 10, \"small\", \"big\")", "small"),
            ("b", "ERROR: identifier not found: b"),
            ("a", "5"),
        ];

        for (i, (input, expected)) in inputs.iter().enumerate() {
            let result = session.eval_source(input).unwrap();
            assert_eq!(result.to_string(), *expected, "input #{} ({input})", i + 1);
        }

        assert_eq!(session.macro_names(), vec!["unless".to_owned()]);
        assert!(session.env().borrow().get("unless").is_none());
    }

    #[test]
    fn test_structural_failures() {
        let mut session = Session::new();
        assert!(matches!(session.eval_source("let = 1;"), Err(Error::Parse(_))));
        assert!(matches!(
            session.eval_source("let m = macro() { 1 }; m()"),
            Err(Error::Macro(_))
        ));
        // the session stays usable
        assert_eq!(session.eval_source("1 + 1").unwrap(), Object::Integer(2));
    }
}
