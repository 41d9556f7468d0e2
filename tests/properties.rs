//! Property tests for expression evaluation

use beeflang::interp::{BufferConsole, Environment, Interpreter, Value};
use proptest::prelude::*;

fn eval(source: &str) -> Value {
    let program = beeflang::parse(source).expect("Parse failed");
    let env = Environment::new().into_ref();
    Interpreter::with_console(BufferConsole::new()).eval_program(&program, &env)
}

/// Render an integer so the scanner sees it; negatives go through prefix minus
fn lit(n: i64) -> String {
    if n < 0 { format!("(-{})", -n) } else { n.to_string() }
}

proptest! {
    #[test]
    fn arithmetic_matches_i64(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let (x, y) = (lit(a), lit(b));
        prop_assert_eq!(eval(&format!("{} + {}", x, y)), Value::Integer(a + b));
        prop_assert_eq!(eval(&format!("{} - {}", x, y)), Value::Integer(a - b));
        prop_assert_eq!(eval(&format!("{} * {}", x, y)), Value::Integer(a * b));
    }

    #[test]
    fn division_truncates(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        prop_assume!(b != 0);
        let (x, y) = (lit(a), lit(b));
        prop_assert_eq!(eval(&format!("{} / {}", x, y)), Value::Integer(a / b));
        prop_assert_eq!(eval(&format!("{} % {}", x, y)), Value::Integer(a % b));
    }

    #[test]
    fn comparisons_match_i64(a in -1_000i64..1_000, b in -1_000i64..1_000) {
        let (x, y) = (lit(a), lit(b));
        prop_assert_eq!(eval(&format!("{} < {}", x, y)), Value::from(a < b));
        prop_assert_eq!(eval(&format!("{} > {}", x, y)), Value::from(a > b));
        prop_assert_eq!(eval(&format!("{} <= {}", x, y)), Value::from(a <= b));
        prop_assert_eq!(eval(&format!("{} >= {}", x, y)), Value::from(a >= b));
        prop_assert_eq!(eval(&format!("{} == {}", x, y)), Value::from(a == b));
        prop_assert_eq!(eval(&format!("{} != {}", x, y)), Value::from(a != b));
    }

    #[test]
    fn string_concatenation(a in "[a-zA-Z0-9 ]{0,12}", b in "[a-zA-Z0-9 ]{0,12}") {
        let result = eval(&format!("\"{}\" + \"{}\"", a, b));
        prop_assert_eq!(result, Value::String(format!("{}{}", a, b)));
    }

    #[test]
    fn double_negation_is_truthiness(n in -1_000i64..1_000) {
        prop_assert_eq!(eval(&format!("!!{}", lit(n))), Value::from(true));
        prop_assert_eq!(eval(&format!("!{}", lit(n))), Value::from(false));
    }

    #[test]
    fn declared_variables_read_back(n in 0i64..1_000_000, name in "[a-z][a-z0-9_]{0,8}") {
        prop_assume!(!is_keyword(&name));
        let source = format!("cut {} = {}\n{}", name, n, name);
        prop_assert_eq!(eval(&source), Value::Integer(n));
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "praise" | "serve" | "beef" | "wrangle" | "feast" | "while" | "if" | "else" | "cut" | "true" | "false"
    )
}
