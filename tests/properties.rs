// Property tests for arithmetic and numeral reading.
//
// Operands are small integers so every expected value is exact in f64.
#![expect(clippy::unwrap_used)] // test code OK

use minilisp::number::parse_number_exact;
use minilisp::{Error, Value, create_global_env, eval};
use proptest::prelude::*;

fn eval_fresh(input: &str) -> Result<Value, Error> {
    let mut globals = create_global_env();
    eval(input, &mut globals)
}

fn join(nums: &[i32]) -> String {
    nums.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_zero() -> impl Strategy<Value = i32> {
    (-100i32..100).prop_filter("divisor must be non-zero", |n| *n != 0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Variadic arithmetic
    // =========================================================================

    #[test]
    fn sum_folds_all_operands(nums in prop::collection::vec(-10_000i32..10_000, 1..8)) {
        let expected = nums.iter().map(|&n| f64::from(n)).fold(0.0, |acc, n| acc + n);
        let r = eval_fresh(&format!("(+ {})", join(&nums))).unwrap();
        prop_assert_eq!(r, Value::Number(expected));
    }

    #[test]
    fn product_folds_all_operands(nums in prop::collection::vec(-20i32..20, 1..6)) {
        let expected = nums.iter().map(|&n| f64::from(n)).fold(1.0, |acc, n| acc * n);
        let r = eval_fresh(&format!("(* {})", join(&nums))).unwrap();
        prop_assert_eq!(r, Value::Number(expected));
    }

    #[test]
    fn add_commutative(a in -10_000i32..10_000, b in -10_000i32..10_000) {
        let r1 = eval_fresh(&format!("(+ {a} {b})")).unwrap();
        let r2 = eval_fresh(&format!("(+ {b} {a})")).unwrap();
        prop_assert_eq!(r1, r2, "addition not commutative for {} + {}", a, b);
    }

    #[test]
    fn unary_minus_negates(a in -100_000i32..100_000) {
        let r = eval_fresh(&format!("(- {a})")).unwrap();
        prop_assert_eq!(r, Value::Number(-f64::from(a)));
    }

    #[test]
    fn minus_subtracts_sum_of_rest(a in -1000i32..1000, b in -1000i32..1000, c in -1000i32..1000) {
        let r = eval_fresh(&format!("(- {a} {b} {c})")).unwrap();
        prop_assert_eq!(r, Value::Number(f64::from(a) - (f64::from(b) + f64::from(c))));
    }

    #[test]
    fn unary_divide_inverts(a in non_zero()) {
        let r = eval_fresh(&format!("(/ {a})")).unwrap();
        prop_assert_eq!(r, Value::Number(1.0 / f64::from(a)));
    }

    #[test]
    fn divide_by_product_of_rest(a in -1000i32..1000, b in non_zero(), c in non_zero()) {
        let r = eval_fresh(&format!("(/ {a} {b} {c})")).unwrap();
        prop_assert_eq!(r, Value::Number(f64::from(a) / (f64::from(b) * f64::from(c))));
    }

    #[test]
    fn pure_expression_is_repeatable(a in -100i32..100, b in -100i32..100, c in -100i32..100) {
        let mut globals = create_global_env();
        let input = format!("(+ {a} (* {b} {c}))");
        let r1 = eval(&input, &mut globals).unwrap();
        let r2 = eval(&input, &mut globals).unwrap();
        prop_assert_eq!(r1, r2);
    }

    // =========================================================================
    // Quote and numerals
    // =========================================================================

    #[test]
    fn quote_keeps_elements(nums in prop::collection::vec(-1000i32..1000, 0..6)) {
        let r = eval_fresh(&format!("(quote ({}))", join(&nums))).unwrap();
        let expected = Value::List(nums.iter().map(|&n| Value::Number(f64::from(n))).collect());
        prop_assert_eq!(r, expected);
    }

    #[test]
    fn integer_numerals_read_exactly(n in -1_000_000i32..1_000_000) {
        prop_assert_eq!(parse_number_exact(&n.to_string()), Some(f64::from(n)));
    }

    #[test]
    fn fractional_numerals_read_closely(whole in 0u32..100_000, fraction in "[0-9]{1,6}") {
        let text = format!("{whole}.{fraction}");
        let expected: f64 = text.parse().unwrap();
        let got = parse_number_exact(&text).unwrap();
        prop_assert!(
            (got - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "{} read as {}, expected {}", text, got, expected
        );
    }

    #[test]
    fn exponent_numerals_read_closely(mantissa in 1u32..1000, exponent in -5i32..6) {
        let text = format!("{mantissa}e{exponent}");
        let expected: f64 = text.parse().unwrap();
        let got = parse_number_exact(&text).unwrap();
        prop_assert!(
            (got - expected).abs() <= 1e-12 * expected.abs(),
            "{} read as {}, expected {}", text, got, expected
        );
    }
}
