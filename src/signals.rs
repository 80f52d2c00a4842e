//! Multi-signal tables: splitting and windowing with initial values
//!
//! A table often interleaves several logical signals, e.g. one per task,
//! told apart by a set of identifying columns. [`df_split_signals`] separates
//! them; [`df_window_signals`] windows the whole table while making sure
//! every signal alive at the window start contributes its last known value.

use crate::error::Result;
use crate::table::{Indexed, Table, Value};
use crate::window::{df_refit_index, df_window, EdgeMethod, Window};
use fnv::FnvHashMap;

/// One logical signal of a multi-signal table
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Values of the identifying columns, in the order they were requested
    pub key: Vec<(String, Value)>,
    /// Rows of the parent table belonging to this signal
    pub data: Table,
}

impl Signal {
    /// Identifying value for `column`
    pub fn key_value(&self, column: &str) -> Option<&Value> {
        self.key
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Split `df` into one sub-table per unique combination of `signal_cols`
///
/// Groups come back sorted by key. With no identifying columns the whole
/// table is a single signal. When `align_start` is set, every signal is
/// refitted to start at the parent table's first index value.
pub fn df_split_signals(df: &Table, signal_cols: &[&str], align_start: bool) -> Result<Vec<Signal>> {
    if signal_cols.is_empty() {
        return Ok(vec![Signal {
            key: Vec::new(),
            data: df.clone(),
        }]);
    }

    let positions = df.require_columns(signal_cols)?;
    let mut groups: FnvHashMap<Vec<Value>, Vec<usize>> = FnvHashMap::default();
    for row in 0..df.len() {
        let key = positions
            .iter()
            .map(|&col| df.columns()[col].values()[row].clone())
            .collect();
        groups.entry(key).or_default().push(row);
    }

    let mut groups: Vec<(Vec<Value>, Vec<usize>)> = groups.into_iter().collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::debug!(signals = groups.len(), columns = ?signal_cols, "split signals");

    let parent_start = df.first_index();
    groups
        .into_iter()
        .map(|(key, rows)| {
            let mut data = df.take(&rows);
            if align_start {
                data = df_refit_index(&data, parent_start, None, EdgeMethod::Inclusive)?;
            }
            Ok(Signal {
                key: signal_cols
                    .iter()
                    .map(|c| c.to_string())
                    .zip(key)
                    .collect(),
                data,
            })
        })
        .collect()
}

/// Largest `f64` strictly below `x` (finite `x`)
fn next_down(x: f64) -> f64 {
    if x == 0.0 {
        return -f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits - 1)
    } else {
        f64::from_bits(bits + 1)
    }
}

/// Like [`df_window`] with `pre` edges, but guarantees each signal has a
/// value at the beginning of the window.
///
/// For every signal whose rows span the window start, its last row at or
/// before the start is prepended, in timestamp order. Rows already present
/// in the windowed table are not repeated.
///
/// With `compress_init`, the prepended rows are relabelled to the closest
/// representable timestamps just below the window's first row, keeping
/// their order, instead of their historical timestamps.
pub fn df_window_signals(
    df: &Table,
    window: impl Into<Window>,
    signal_cols: &[&str],
    compress_init: bool,
) -> Result<Table> {
    let window = window.into();
    let signals = df_split_signals(df, signal_cols, false)?;
    let windowed = df_window(df, window, EdgeMethod::Pre, true)?;
    let window_first = match windowed.first_index() {
        Some(first) => first,
        None => return Ok(windowed),
    };
    let start = match (window.start, df.first_index()) {
        (Some(start), _) => start,
        (None, Some(first)) => first,
        (None, None) => return Ok(windowed),
    };

    // Signals are encoded as transitions: a signal is relevant as soon as the
    // window start falls within its span.
    let alive: Vec<&Signal> = signals
        .iter()
        .filter(|s| match (s.data.first_index(), s.data.last_index()) {
            (Some(first), Some(last)) => first <= start && start <= last,
            _ => false,
        })
        .collect();
    if alive.is_empty() {
        tracing::warn!(start, "no signal alive at window start");
        return Ok(windowed);
    }

    let mut init_rows = alive
        .into_iter()
        .map(|s| df_window(&s.data, window, EdgeMethod::Pre, true).map(|w| w.slice_rows(0..1)))
        .collect::<Result<Vec<Table>>>()?;
    init_rows.retain(|row| row.first_index().is_some_and(|t| t < window_first));
    init_rows.sort_by(|a, b| a.index()[0].total_cmp(&b.index()[0]));
    tracing::debug!(init = init_rows.len(), compress_init, "prepending initial values");

    let mut rows = init_rows.into_iter();
    let mut out = match rows.next() {
        Some(first) => first,
        None => return Ok(windowed),
    };
    for row in rows {
        out.append_unchecked(&row);
    }

    if compress_init {
        let mut index = Vec::with_capacity(out.len());
        let mut current = window_first;
        for _ in 0..out.len() {
            current = next_down(current);
            index.push(current);
        }
        index.reverse();
        out = out.with_index(index)?;
    }

    out.append_unchecked(&windowed);
    Ok(out)
}
