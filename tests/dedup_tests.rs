//! Integration tests for deduplication
//!
//! Trace events often repeat the same state; run-length compression keeps
//! only the transitions while global deduplication keeps unique values.

mod utils;

use tracesignal::config::AnalysisConfig;
use tracesignal::dedup::{df_deduplicate, series_deduplicate, Keep};
use tracesignal::table::{Series, Table};
use tracesignal::SignalError;
use utils::int_column;

fn series(values: &[f64]) -> Series {
    let index = (0..values.len()).map(|i| i as f64).collect();
    Series::new("s", index, values.to_vec()).unwrap()
}

#[test]
fn test_round_trip_examples() {
    let s = series(&[1.0, 2.0, 2.0, 3.0, 4.0, 2.0]);
    let runs = series_deduplicate(&s, Keep::First, true);
    assert_eq!(runs.values(), &[1.0, 2.0, 3.0, 4.0, 2.0]);

    let unique = series_deduplicate(&s, Keep::First, false);
    assert_eq!(unique.values(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_deduplicating_twice_changes_nothing() {
    let s = series(&[5.0, 5.0, 5.0, 1.0, 1.0, 5.0]);
    for keep in [Keep::First, Keep::Last] {
        for consecutives in [true, false] {
            let once = series_deduplicate(&s, keep, consecutives);
            let twice = series_deduplicate(&once, keep, consecutives);
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn test_missing_values_collapse_together() {
    let s = series(&[f64::NAN, f64::NAN, 1.0]);
    let out = series_deduplicate(&s, Keep::First, true);
    assert_eq!(out.len(), 2);
    assert!(out.values()[0].is_nan());
}

fn frequency_events() -> Table {
    Table::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
        .unwrap()
        .with_column("cpu", [0, 0, 1, 1, 0, 0])
        .unwrap()
        .with_column("frequency", [500, 500, 500, 1000, 1000, 500])
        .unwrap()
}

#[test]
fn test_table_transitions_only() {
    let out = df_deduplicate(&frequency_events(), Keep::First, true, None, true).unwrap();
    assert_eq!(out.index(), &[0.0, 2.0, 3.0, 4.0, 5.0]);

    let last = df_deduplicate(&frequency_events(), Keep::Last, true, None, true).unwrap();
    assert_eq!(last.index(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_table_any_column_repeat() {
    // Every later row repeats the CPU or the frequency of its predecessor
    let out = df_deduplicate(&frequency_events(), Keep::First, true, None, false).unwrap();
    assert_eq!(out.index(), &[0.0]);
}

#[test]
fn test_table_global_unique_pairs() {
    let out = df_deduplicate(&frequency_events(), Keep::First, false, None, true).unwrap();
    assert_eq!(out.index(), &[0.0, 2.0, 3.0, 4.0]);
    assert_eq!(int_column(&out, "frequency"), vec![500, 500, 1000, 1000]);
}

#[test]
fn test_unsupported_combination() {
    let err = df_deduplicate(&frequency_events(), Keep::Last, false, None, false).unwrap_err();
    assert!(matches!(err, SignalError::InvalidArgument(_)));
}

#[test]
fn test_empty_table() {
    let empty = frequency_events().empty_like();
    let out = df_deduplicate(&empty, Keep::First, false, Some(&["cpu"]), true).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_config_dedup_on_signal_columns() {
    let config = AnalysisConfig {
        signal_columns: vec!["frequency".to_string()],
        dedup_keep: Keep::Last,
        ..AnalysisConfig::default()
    };
    let out = config.deduplicate(&frequency_events()).unwrap();
    assert_eq!(out.index(), &[2.0, 4.0, 5.0]);
}
