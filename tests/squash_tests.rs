//! Integration tests for interval squashing
//!
//! Squashing must account for exactly the time inside the window, and
//! squashing adjacent windows must agree with squashing their union.

mod utils;

use tracesignal::config::AnalysisConfig;
use tracesignal::signals::df_split_signals;
use tracesignal::squash::df_squash;
use tracesignal::table::Value;
use utils::{assert_close, float_column, idle_intervals, int_column, intervals_from_durations};

#[test]
fn test_worked_examples() {
    let out = df_squash(&idle_intervals(), 16.5, 17.5, "delta").unwrap();
    assert_eq!(out.index(), &[16.5, 17.0]);
    assert_eq!(float_column(&out, "delta"), vec![0.5, 0.5]);
    assert_eq!(int_column(&out, "state"), vec![0, 1]);

    let out = df_squash(&idle_intervals(), 16.2, 16.8, "delta").unwrap();
    assert_eq!(out.index(), &[16.2]);
    assert_close(float_column(&out, "delta")[0], 0.6);
    assert_eq!(int_column(&out, "state"), vec![0]);
}

#[test]
fn test_durations_sum_to_window_length() {
    let df = intervals_from_durations(0.0, &[0.5, 2.0, 0.25, 1.0, 3.0]);
    for (start, end) in [(0.1, 6.6), (0.5, 2.5), (2.6, 2.7), (1.0, 6.75)] {
        let out = df_squash(&df, start, end, "delta").unwrap();
        let total: f64 = float_column(&out, "delta").iter().sum();
        assert_close(total, end - start);
    }
}

#[test]
fn test_split_on_a_row_reproduces_the_union() {
    let df = idle_intervals();
    let whole = df_squash(&df, 15.5, 18.5, "delta").unwrap();
    let left = df_squash(&df, 15.5, 17.0, "delta").unwrap();
    let right = df_squash(&df, 17.0, 18.5, "delta").unwrap();

    let index: Vec<f64> = left.index().iter().chain(right.index()).copied().collect();
    assert_eq!(whole.index(), index.as_slice());

    let deltas: Vec<f64> = float_column(&left, "delta")
        .into_iter()
        .chain(float_column(&right, "delta"))
        .collect();
    assert_eq!(float_column(&whole, "delta"), deltas);
}

#[test]
fn test_split_inside_an_interval_conserves_time() {
    let df = intervals_from_durations(10.0, &[1.5, 0.5, 2.0, 1.0]);
    let whole = df_squash(&df, 10.2, 14.7, "delta").unwrap();
    let left = df_squash(&df, 10.2, 12.9, "delta").unwrap();
    let right = df_squash(&df, 12.9, 14.7, "delta").unwrap();

    let sum = |t| float_column(t, "delta").iter().sum::<f64>();
    assert_close(sum(&left) + sum(&right), sum(&whole));
    // The interval cut at 12.9 shows up on both sides with the same state
    assert_eq!(int_column(&left, "state").last(), int_column(&right, "state").first());
}

#[test]
fn test_end_row_marks_transition_out() {
    let out = df_squash(&idle_intervals(), 15.0, 17.0, "delta").unwrap();
    assert_eq!(out.index(), &[15.0, 16.0]);
    assert_eq!(int_column(&out, "state"), vec![1, 0]);
}

#[test]
fn test_unchanged_rows_keep_their_cells() {
    let out = df_squash(&idle_intervals(), 15.5, 18.5, "delta").unwrap();
    let deltas = out.column("delta").unwrap().values();
    assert_eq!(deltas[1], Value::Float(1.0));
    assert_eq!(deltas[3], Value::Float(0.5));
}

#[test]
fn test_squash_each_signal_independently() {
    let df = idle_intervals()
        .with_column("cpu", [0, 1, 0, 1])
        .unwrap();
    let signals = df_split_signals(&df, &["cpu"], false).unwrap();
    let squashed: Vec<_> = signals
        .iter()
        .map(|s| df_squash(&s.data, 15.5, 17.5, "delta").unwrap())
        .collect();
    assert_eq!(squashed[0].index(), &[15.5, 17.0]);
    assert_eq!(squashed[1].index(), &[16.0]);
}

#[test]
fn test_config_uses_its_delta_column() {
    let df = idle_intervals();
    let config = AnalysisConfig::default();
    assert_eq!(config.squash(&df, 16.5, 17.5).unwrap().len(), 2);

    let config = AnalysisConfig {
        delta_column: "len".to_string(),
        ..AnalysisConfig::default()
    };
    assert!(config.squash(&df, 16.5, 17.5).is_err());
}
