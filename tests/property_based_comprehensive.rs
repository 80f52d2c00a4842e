//! Property-based tests for the interval operations
//!
//! Core properties tested:
//! 1. Refitting lands exactly on the requested boundaries
//! 2. Squashing conserves time and composes over adjacent windows
//! 3. Windowing twice with the same window changes nothing
//! 4. Clipped windows outside the data select a single edge row
//! 5. Alignment shifts stay within `max_shift`
//! 6. Consecutive deduplication leaves no adjacent duplicates

mod utils;

use proptest::prelude::*;
use tracesignal::align::series_align_signal;
use tracesignal::dedup::{series_deduplicate, Keep};
use tracesignal::squash::df_squash;
use tracesignal::table::{Series, Table};
use tracesignal::window::{df_refit_index, df_window, EdgeMethod};
use utils::{float_column, intervals_from_durations};

const METHODS: [EdgeMethod; 5] = [
    EdgeMethod::Inclusive,
    EdgeMethod::Exclusive,
    EdgeMethod::Nearest,
    EdgeMethod::Pre,
    EdgeMethod::Post,
];

fn table_from_steps(origin: f64, steps: &[f64]) -> Table {
    let mut index = vec![origin];
    for step in steps {
        let next = index[index.len() - 1] + step;
        index.push(next);
    }
    let states: Vec<i64> = (0..index.len() as i64).map(|i| i % 4).collect();
    Table::new(index).unwrap().with_column("state", states).unwrap()
}

fn total_delta(table: &Table) -> f64 {
    float_column(table, "delta").iter().sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_refit_hits_requested_boundaries(
        origin in -100.0f64..100.0,
        steps in prop::collection::vec(0.5f64..5.0, 1..30),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let df = table_from_steps(origin, &steps);
        let first = df.index()[0];
        let last = df.index()[df.len() - 1];

        // Boundaries may fall a little outside the data on either side
        let span = last - first;
        let lo = first - 2.0 + a.min(b) * (span + 4.0);
        let hi = first - 2.0 + a.max(b) * (span + 4.0);
        prop_assume!(lo < hi);
        prop_assume!(hi > first && lo < last);

        let out = df_refit_index(&df, Some(lo), Some(hi), EdgeMethod::Inclusive).unwrap();
        prop_assert_eq!(out.index()[0], lo);
        prop_assert_eq!(out.index()[out.len() - 1], hi);
        prop_assert!(out.index().windows(2).all(|w| w[0] < w[1]));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_squash_conserves_time(
        durations in prop::collection::vec(0.5f64..5.0, 1..20),
        a in 0.0f64..1.0,
        b in 0.01f64..1.0,
    ) {
        let df = intervals_from_durations(10.0, &durations);
        let data_end = 10.0 + durations.iter().sum::<f64>();
        let start = 10.0 + a * (data_end - 10.0);
        let end = start + b * (data_end - start);
        prop_assume!(start < end);

        let squashed = df_squash(&df, start, end, "delta").unwrap();
        prop_assert!((total_delta(&squashed) - (end - start)).abs() < 1e-6);
        if let Some(&first) = squashed.index().first() {
            prop_assert_eq!(first, start);
        }
    }

    #[test]
    fn prop_squash_splits_compose(
        durations in prop::collection::vec(0.5f64..5.0, 1..20),
        a in 0.0f64..1.0,
        m in 0.01f64..0.99,
    ) {
        let df = intervals_from_durations(0.0, &durations);
        let data_end: f64 = durations.iter().sum();
        let start = a * data_end;
        let mid = start + m * (data_end - start);
        prop_assume!(start < mid && mid < data_end);

        let whole = df_squash(&df, start, data_end, "delta").unwrap();
        let left = df_squash(&df, start, mid, "delta").unwrap();
        let right = df_squash(&df, mid, data_end, "delta").unwrap();
        let parts = total_delta(&left) + total_delta(&right);
        prop_assert!((total_delta(&whole) - parts).abs() < 1e-6);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_window_is_idempotent(
        steps in prop::collection::vec(0.5f64..5.0, 1..30),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let df = table_from_steps(0.0, &steps);
        let span = df.index()[df.len() - 1];
        let start = -1.0 + a.min(b) * (span + 2.0);
        let end = -1.0 + a.max(b) * (span + 2.0);

        for method in METHODS {
            let once = df_window(&df, (start, end), method, true).unwrap();
            let twice = df_window(&once, (start, end), method, true).unwrap();
            prop_assert_eq!(&once, &twice, "{}", method);
        }
    }

    #[test]
    fn prop_clipped_window_outside_data_keeps_edge_row(
        steps in prop::collection::vec(0.5f64..5.0, 1..30),
        gap in 0.1f64..10.0,
        width in 0.0f64..10.0,
    ) {
        let df = table_from_steps(0.0, &steps);
        let last = df.index()[df.len() - 1];

        for method in METHODS {
            let before = df_window(&df, (-gap - width, -gap), method, true).unwrap();
            prop_assert_eq!(before.index(), &[0.0][..]);

            let after = df_window(&df, (last + gap, last + gap + width), method, true).unwrap();
            prop_assert_eq!(after.index(), &[last][..]);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_alignment_shift_is_bounded(
        reference in prop::collection::vec(-10.0f64..10.0, 4..40),
        to_align in prop::collection::vec(-10.0f64..10.0, 4..40),
        max_shift in 0.0f64..10.0,
    ) {
        let index = |n: usize| (0..n).map(|i| i as f64).collect::<Vec<f64>>();
        let reference = Series::new("ref", index(reference.len()), reference).unwrap();
        let to_align = Series::new("sig", index(to_align.len()), to_align).unwrap();

        let alignment = series_align_signal(&reference, &to_align, Some(max_shift)).unwrap();
        let cap = max_shift.trunc() as i64;
        prop_assert!(alignment.shift.abs() <= cap);
        if alignment.correlation_shift.abs() > cap {
            prop_assert_eq!(alignment.shift, cap * alignment.correlation_shift.signum());
        } else {
            prop_assert_eq!(alignment.shift, alignment.correlation_shift);
        }
        prop_assert_eq!(alignment.aligned.len(), alignment.reference.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_consecutive_dedup_leaves_no_repeats(
        values in prop::collection::vec(0u8..3, 1..50),
        keep_last in any::<bool>(),
    ) {
        let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        let values: Vec<f64> = values.into_iter().map(f64::from).collect();
        let series = Series::new("state", index, values).unwrap();
        let keep = if keep_last { Keep::Last } else { Keep::First };

        let out = series_deduplicate(&series, keep, true);
        prop_assert!(out.values().windows(2).all(|w| w[0] != w[1]));
        prop_assert!(out.len() <= series.len());
        prop_assert!(!out.is_empty());
    }
}
