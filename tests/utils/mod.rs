// Shared fixtures for integration tests
//
// Small hand-checked traces: task state transitions, a duration-encoded
// idle state sequence and a sampled frequency signal.

#![allow(dead_code)]

use tracesignal::table::{Series, Table};

/// Task state transitions of two tasks; pid 2 first shows up at 1.0
pub fn task_states() -> Table {
    Table::new(vec![0.0, 1.0, 3.0, 4.0, 6.0, 7.0])
        .and_then(|t| t.with_column("pid", [1, 2, 2, 1, 1, 2]))
        .and_then(|t| t.with_column("comm", ["init", "sh", "sh", "init", "init", "sh"]))
        .and_then(|t| t.with_column("state", ["R", "S", "R", "S", "R", "S"]))
        .expect("valid task state fixture")
}

/// Gap-free idle state sequence: (time, delta, state)
pub fn idle_intervals() -> Table {
    Table::new(vec![15.0, 16.0, 17.0, 18.0])
        .and_then(|t| t.with_column("delta", [1.0, 1.0, 1.0, 1.0]))
        .and_then(|t| t.with_column("state", [1, 0, 1, 0]))
        .expect("valid idle fixture")
}

/// Gap-free interval sequence built from durations, starting at `start`
pub fn intervals_from_durations(start: f64, durations: &[f64]) -> Table {
    let mut index = Vec::with_capacity(durations.len());
    let mut t = start;
    for d in durations {
        index.push(t);
        t += d;
    }
    let states: Vec<i64> = (0..durations.len() as i64).map(|i| i % 3).collect();
    Table::new(index)
        .and_then(|t| t.with_column("delta", durations.iter().copied()))
        .and_then(|t| t.with_column("state", states))
        .expect("valid interval fixture")
}

/// CPU frequency sampled every 0.25s
pub fn frequency() -> Series {
    let index: Vec<f64> = (0..8).map(|i| i as f64 * 0.25).collect();
    let values = vec![500.0, 500.0, 1000.0, 1000.0, 1000.0, 1500.0, 500.0, 500.0];
    Series::new("frequency", index, values).expect("valid frequency fixture")
}

/// Square wave with 10-sample half periods, delayed by `delay` samples
pub fn square_wave(name: &str, samples: usize, period: f64, delay: i64) -> Series {
    let index: Vec<f64> = (0..samples).map(|i| i as f64 * period).collect();
    let values = (0..samples as i64)
        .map(|i| if (i - delay).rem_euclid(20) < 10 { 1.0 } else { 0.0 })
        .collect();
    Series::new(name, index, values).expect("valid square wave")
}

pub fn int_column(table: &Table, name: &str) -> Vec<i64> {
    table
        .column(name)
        .expect("column exists")
        .values()
        .iter()
        .map(|v| v.as_i64().expect("integer cell"))
        .collect()
}

pub fn float_column(table: &Table, name: &str) -> Vec<f64> {
    table
        .column(name)
        .expect("column exists")
        .values()
        .iter()
        .map(|v| v.as_f64().expect("numeric cell"))
        .collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
