//! Property-based tests for the benchmark ledger
//!
//! These tests verify, over arbitrary mixes of valid and invalid statements,
//! that:
//! - every statement is recorded exactly once, in call order
//! - the running total equals the sum of the recorded times

#[cfg(test)]
mod tests {
    use prefsql::{ConnectParams, PrefSql, SqliteDriver};
    use proptest::prelude::*;

    fn arb_statement() -> impl Strategy<Value = String> {
        prop_oneof![
            (0i64..1000).prop_map(|n| format!("SELECT {}", n)),
            "[a-z]{1,12}".prop_map(|t| format!("SELECT * FROM missing_{}", t)),
            Just("INVALID SQL".to_string()),
            Just("CREATE TABLE IF NOT EXISTS t (v INTEGER)".to_string()),
            (0i64..1000).prop_map(|n| format!("INSERT INTO t VALUES ({})", n)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_ledger_counts_and_totals(
            statements in prop::collection::vec(arb_statement(), 0..20),
            show_errors in any::<bool>(),
        ) {
            let params = ConnectParams::new("localhost", "", "", ":memory:");
            let mut db = PrefSql::connect(&SqliteDriver::new(), &params, show_errors).unwrap();

            for sql in &statements {
                // Failures may be surfaced or silent; either way they are recorded
                let _ = db.query(sql);
            }

            let bench = db.benchmark();
            prop_assert_eq!(bench.request_count(), statements.len());
            prop_assert_eq!(bench.entries().len(), statements.len());

            let sum: f64 = bench.entries().iter().map(|e| e.time_ms).sum();
            prop_assert_eq!(bench.summary().total_time_ms, sum);
            prop_assert!(bench.entries().iter().all(|e| e.time_ms >= 0.0));
        }

        #[test]
        fn prop_ledger_preserves_call_order(statements in prop::collection::vec(arb_statement(), 1..20)) {
            let params = ConnectParams::new("localhost", "", "", ":memory:");
            let mut db = PrefSql::connect(&SqliteDriver::new(), &params, false).unwrap();

            for sql in &statements {
                db.query(sql).unwrap();
            }

            let recorded: Vec<&str> = db.benchmark().entries().iter().map(|e| e.request.as_str()).collect();
            let issued: Vec<&str> = statements.iter().map(String::as_str).collect();
            prop_assert_eq!(recorded, issued);
        }
    }
}
