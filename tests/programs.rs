// End-to-end tests: whole programs through the session pipeline
// (parse, define macros, expand, evaluate), checked by their inspect output.

use monkey::Error;
use monkey::object::Object;
use monkey::session::Session;

fn run(input: &str) -> String {
    match Session::new().eval_source(input) {
        Ok(result) => result.to_string(),
        Err(err) => panic!("unexpected failure for '{input}': {err}"),
    }
}

#[test]
fn test_programs() {
    let test_cases = vec![
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", "50"),
        (
            "let newAdder = fn(a, b) { fn(c) { a + b + c } }; let add = newAdder(1, 2); add(3);",
            "6",
        ),
        ("5 + true;", "ERROR: type mismatch: INTEGER + BOOLEAN"),
        ("true + false;", "ERROR: unknown operator: BOOLEAN + BOOLEAN"),
        (r#"{"one": 1, "two": 2}["one"]"#, "1"),
        ("[1, 2, 3][3]", "null"),
        ("[1, 2, 3][-1]", "null"),
        (
            r#"{"name": "Monkey"}[fn(x) { x }]"#,
            "ERROR: unusable as hash key: FUNCTION",
        ),
        ("len(1)", "ERROR: argument to `len` not supported, got INTEGER"),
        (
            r#"len("one", "two")"#,
            "ERROR: wrong number of arguments. got=2, want=1",
        ),
        ("quote(unquote(4 + 4) + 8)", "QUOTE((8 + 8))"),
        (r#"{"a": 1, 2: true, false: "x"}"#, "{a: 1, 2: true, false: x}"),
        ("[1, \"two\", [3]]", "[1, two, [3]]"),
        ("fn(x) { x * 2 }", "fn(x) {\n(x * 2)\n}"),
        ("len", "builtin function len"),
        ("if (false) { 1 }", "null"),
    ];

    for (i, (input, expected)) in test_cases.iter().enumerate() {
        assert_eq!(run(input), *expected, "case #{} ({input})", i + 1);
    }
}

#[test]
fn test_higher_order_functions() {
    let program = r#"
let map = fn(arr, f) {
    let iter = fn(arr, accumulated) {
        if (len(arr) == 0) {
            accumulated
        } else {
            iter(rest(arr), push(accumulated, f(first(arr))));
        }
    };
    iter(arr, []);
};

let reduce = fn(arr, initial, f) {
    let iter = fn(arr, result) {
        if (len(arr) == 0) {
            result
        } else {
            iter(rest(arr), f(result, first(arr)));
        }
    };
    iter(arr, initial);
};

let sum = fn(arr) { reduce(arr, 0, fn(initial, el) { initial + el }) };
let doubled = map([1, 2, 3, 4], fn(x) { x * 2 });
[doubled, sum(doubled)]
"#;
    assert_eq!(run(program), "[[2, 4, 6, 8], 20]");
}

#[test]
fn test_recursion_and_early_return() {
    let test_cases = vec![
        (
            "let fib = fn(n) { if (n < 2) { return n; } fib(n - 1) + fib(n - 2) }; fib(20)",
            "6765",
        ),
        (
            "let find = fn(arr, x) { let go = fn(i) { if (i == len(arr)) { return -1; } if (arr[i] == x) { return i; } go(i + 1) }; go(0) }; find([5, 6, 7], 7)",
            "2",
        ),
        (
            "let counter = fn(x) { if (x > 100) { return true; } else { let foobar = 9999; counter(x + 1); } }; counter(0);",
            "true",
        ),
    ];

    for (i, (input, expected)) in test_cases.iter().enumerate() {
        assert_eq!(run(input), *expected, "case #{}", i + 1);
    }
}

#[test]
fn test_macros() {
    let program = r#"
let unless = macro(condition, consequence, alternative) {
    quote(if (!(unquote(condition))) {
        unquote(consequence);
    } else {
        unquote(alternative);
    });
};

unless(10 > 5, "not greater", "greater");
"#;
    assert_eq!(run(program), "greater");

    // arguments are passed unevaluated: the unused branch never runs
    let program = r#"
let unless = macro(c, t, f) { quote(if (!(unquote(c))) { unquote(t) } else { unquote(f) }) };
unless(1 > 2, 10, missing);
"#;
    assert_eq!(run(program), "10");

    let program = "let reverse = macro(a, b) { quote(unquote(b) - unquote(a)) }; reverse(2 + 2, 10 - 5)";
    assert_eq!(run(program), "1");
}

#[test]
fn test_session_persists_state() {
    let mut session = Session::new();
    let inputs = vec![
        ("let x = 10;", Object::Integer(10)),
        ("let double = fn(n) { n * 2 };", Object::Null),
        ("let twice = macro(e) { quote(unquote(e) + unquote(e)) };", Object::Null),
        ("double(x)", Object::Integer(20)),
        ("twice(x)", Object::Integer(20)),
    ];

    for (i, (input, expected)) in inputs.into_iter().enumerate() {
        let result = session.eval_source(input);
        if let Object::Null = expected {
            assert!(result.is_ok(), "input #{}", i + 1);
        } else {
            assert_eq!(result, Ok(expected), "input #{}", i + 1);
        }
    }
}

#[test]
fn test_structural_errors() {
    let test_cases = vec![
        ("let x 5;", "ParseError: expected next token to be ASSIGN, got INT"),
        ("(1 + 2", "ParseError: expected next token to be RPAREN, got EOF"),
        (
            "let m = macro() { 1 }; m()",
            "MacroError: macro `m` must return a quote, got INTEGER",
        ),
    ];

    for (i, (input, expected)) in test_cases.iter().enumerate() {
        match Session::new().eval_source(input) {
            Err(err @ (Error::Parse(_) | Error::Macro(_))) => {
                let message = err.to_string();
                assert!(
                    message.starts_with(expected),
                    "case #{}: got {message}",
                    i + 1
                );
            }
            other => panic!("case #{}: expected structural error, got {other:?}", i + 1),
        }
    }
}
