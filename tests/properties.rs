// Property-based tests for the universal interpreter invariants.

mod common;

use common::{eval_last, Session};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: truncating division and its remainder reassemble the
    /// dividend: x == (x/y)*y + (x - (x/y)*y).
    #[test]
    fn division_identity(x in -100_000i64..100_000, y in -1000i64..1000) {
        prop_assume!(y != 0);
        let code = format!(
            "(= {x} (+ (* (/ {x} {y}) {y}) (- {x} (* (/ {x} {y}) {y}))))"
        );
        prop_assert_eq!(eval_last(&code), Ok("t".into()));
    }

    /// Property: car and cdr of a fresh cons recover its halves.
    #[test]
    fn cons_car_cdr_round_trip(v in -1000i64..1000, w in -1000i64..1000) {
        prop_assert_eq!(
            eval_last(&format!("(car (cons {v} {w}))")),
            Ok(v.to_string())
        );
        prop_assert_eq!(
            eval_last(&format!("(cdr (cons {v} {w}))")),
            Ok(w.to_string())
        );
    }

    /// Property: printing a proper list of atoms and reading it back
    /// round-trips modulo whitespace.
    #[test]
    fn read_print_round_trip(items in proptest::collection::vec(-1000i64..1000, 0..8)) {
        let text: Vec<String> = items.iter().map(|n| n.to_string()).collect();
        let literal = format!("({})", text.join(" "));
        let printed = eval_last(&format!("'{literal}")).unwrap();
        // Reading the printed form again prints identically.
        prop_assert_eq!(eval_last(&format!("'{printed}")), Ok(printed.clone()));
        if items.is_empty() {
            prop_assert_eq!(printed, "nil".to_string());
        } else {
            prop_assert_eq!(printed, literal);
        }
    }

    /// Property: 'x and (quote x) produce equal values.
    #[test]
    fn quote_shorthand_is_quote(n in -1000i64..1000, name in "[a-z][a-z0-9]{0,5}") {
        for expr in [n.to_string(), name.clone(), format!("({name} {n})")] {
            prop_assert_eq!(
                eval_last(&format!("'{expr}")),
                eval_last(&format!("(quote {expr})"))
            );
        }
    }

    /// Property: (if t A B C ...) is A; (if nil A B C ...) is (progn B C ...).
    #[test]
    fn if_dispatches_on_t(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        prop_assert_eq!(
            eval_last(&format!("(if t {a} {b} {c})")),
            Ok(a.to_string())
        );
        prop_assert_eq!(
            eval_last(&format!("(if nil {a} {b} {c})")),
            eval_last(&format!("(progn {b} {c})"))
        );
    }

    /// Property: an error leaves earlier global assignments from the same
    /// form intact and later ones unexecuted.
    #[test]
    fn recoverability_preserves_completed_assignments(n in -1000i64..1000) {
        let mut session = Session::new();
        session.run(&format!("(setq g {n})"));
        let results = session.run(&format!("(progn (setq g {}) (boom) (setq g 0))", n + 1));
        prop_assert_eq!(results, vec![Err("undeclared identifier: boom".into())]);
        prop_assert_eq!(session.last("g"), Ok((n + 1).to_string()));
    }

    /// Property: a countdown while-loop accumulates the triangular sum.
    /// (< i 0) reads as "i is strictly greater than 0" here.
    #[test]
    fn while_countdown_sums(n in 0i64..30) {
        let mut session = Session::new();
        session.run(&format!("(setq i {n}) (setq acc 0)"));
        session.run("(while (< i 0) (setq acc (+ acc i)) (setq i (- i 1)))");
        prop_assert_eq!(session.last("acc"), Ok((n * (n + 1) / 2).to_string()));
    }

    /// Property: the variadic rest parameter always receives the surplus
    /// arguments in order.
    #[test]
    fn rest_parameter_collects_in_order(items in proptest::collection::vec(-100i64..100, 0..6)) {
        let mut session = Session::new();
        session.run("(fn rest-of (first . more) more)");
        let text: Vec<String> = items.iter().map(|n| n.to_string()).collect();
        let expected = if items.is_empty() {
            "nil".to_string()
        } else {
            format!("({})", text.join(" "))
        };
        prop_assert_eq!(
            session.last(&format!("(rest-of 0 {})", text.join(" "))),
            Ok(expected)
        );
    }
}
