// Property-based tests for the CSV table codec.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use qbank_io::csv;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn headers() -> Vec<String> {
    vec!["topic".to_string(), "questionText".to_string(), "answer".to_string()]
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Field value without edge whitespace: plain words, quotes, commas, and
/// embedded newlines all appear.
fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-zA-Z0-9]{1,10}",
        2 => r#"[a-zA-Z0-9,"]([a-zA-Z0-9,"\n ]{0,12}[a-zA-Z0-9,"])?"#,
        1 => Just("".to_string()),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(arb_value(), 3), 0..12)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Serializing then parsing yields the same headers and field values.
    #[test]
    fn prop_write_then_read_preserves_fields(rows in arb_rows()) {
        let headers = headers();
        let text = csv::to_string(&headers, &rows).unwrap();
        let table = csv::parse(&text).unwrap();

        prop_assert_eq!(&table.headers, &headers);
        prop_assert_eq!(table.rows.len(), rows.len());
        for (parsed, original) in table.rows.iter().zip(&rows) {
            for (h, v) in headers.iter().zip(original) {
                prop_assert_eq!(&parsed[h], v);
            }
        }
    }

    /// Fields are quoted exactly when they need to be.
    #[test]
    fn prop_plain_fields_are_never_quoted(rows in prop::collection::vec(
        prop::collection::vec(r"[a-zA-Z0-9]{1,10}", 3), 1..6)
    ) {
        let text = csv::to_string(&headers(), &rows).unwrap();
        prop_assert!(!text.contains('"'));
    }
}
