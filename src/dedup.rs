//! Duplicate row removal for series and tables
//!
//! Two independent choices drive deduplication:
//!
//! - `keep`: which row of a group of equal rows survives (`first` or `last`)
//! - `consecutives`: only collapse runs of adjacent equal rows (run-length
//!   compression, a value reappearing later is kept), or drop duplicates
//!   across the whole input
//!
//! ```text
//! values:              [1, 2, 2, 3, 4, 2]
//! consecutives=true:   [1, 2,    3, 4, 2]
//! consecutives=false:  [1, 2,    3, 4   ]
//! ```
//!
//! Values compare with total equality, so `NaN` equals `NaN`, and `-0.0`
//! equals `0.0`.
//! Neither the index nor the duration of the surviving rows is modified.

use crate::error::{Result, SignalError};
use crate::table::{canonical_float, Series, Table, Value};
use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which occurrence of a duplicate survives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keep {
    #[default]
    First,
    Last,
}

impl FromStr for Keep {
    type Err = SignalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(Keep::First),
            "last" => Ok(Keep::Last),
            other => Err(SignalError::invalid(format!("Unknown keep value: {}", other))),
        }
    }
}

/// Neighbour a row is compared against in consecutive mode
fn neighbour(row: usize, len: usize, keep: Keep) -> Option<usize> {
    match keep {
        Keep::First => row.checked_sub(1),
        Keep::Last => (row + 1 < len).then_some(row + 1),
    }
}

/// Mask of rows surviving global deduplication on `key(row)`
fn global_mask<K, F>(len: usize, keep: Keep, key: F) -> Vec<bool>
where
    K: std::hash::Hash + Eq,
    F: Fn(usize) -> K,
{
    let mut mask = vec![false; len];
    let mut seen: FnvHashSet<K> = FnvHashSet::default();
    let mut visit = |row: usize| {
        if seen.insert(key(row)) {
            mask[row] = true;
        }
    };
    match keep {
        Keep::First => (0..len).for_each(&mut visit),
        Keep::Last => (0..len).rev().for_each(&mut visit),
    }
    mask
}

/// Remove duplicate values in a [`Series`]
///
/// ```
/// use tracesignal::dedup::{series_deduplicate, Keep};
/// use tracesignal::table::Series;
///
/// # fn main() -> anyhow::Result<()> {
/// let s = Series::new(
///     "s",
///     vec![1.0, 2.0, 20.0, 30.0, 40.0, 50.0],
///     vec![1.0, 2.0, 2.0, 3.0, 4.0, 2.0],
/// )?;
/// let runs = series_deduplicate(&s, Keep::First, true);
/// assert_eq!(runs.values(), &[1.0, 2.0, 3.0, 4.0, 2.0]);
///
/// let unique = series_deduplicate(&s, Keep::First, false);
/// assert_eq!(unique.values(), &[1.0, 2.0, 3.0, 4.0]);
/// # Ok(())
/// # }
/// ```
pub fn series_deduplicate(series: &Series, keep: Keep, consecutives: bool) -> Series {
    let key = |v: f64| canonical_float(v).to_bits();
    let values = series.values();
    let len = values.len();

    let mask: Vec<bool> = if consecutives {
        (0..len)
            .map(|row| match neighbour(row, len, keep) {
                Some(other) => key(values[row]) != key(values[other]),
                None => true,
            })
            .collect()
    } else {
        global_mask(len, keep, |row| key(values[row]))
    };

    let rows: Vec<usize> = (0..len).filter(|&row| mask[row]).collect();
    series.take(&rows)
}

/// Same as [`series_deduplicate`] but for a [`Table`]
///
/// `cols` restricts the comparison to some columns (all columns by default).
/// With `all_col`, a row is a duplicate only when every considered column
/// repeats; otherwise any repeating column marks it. Global deduplication
/// (`consecutives == false`) only supports `all_col == true`.
pub fn df_deduplicate(
    df: &Table,
    keep: Keep,
    consecutives: bool,
    cols: Option<&[&str]>,
    all_col: bool,
) -> Result<Table> {
    if !consecutives && !all_col {
        return Err(SignalError::invalid(
            "all_col=false is not supported with consecutives=false",
        ));
    }
    let positions = match cols {
        Some(cols) => df.require_columns(cols)?,
        None => (0..df.columns().len()).collect(),
    };
    let considered: Vec<&[Value]> = positions
        .iter()
        .map(|&p| df.columns()[p].values())
        .collect();
    let len = df.len();

    let mask: Vec<bool> = if consecutives {
        (0..len)
            .map(|row| match neighbour(row, len, keep) {
                Some(other) => {
                    let mut changed = considered.iter().map(|col| col[row] != col[other]);
                    // Kept when it is not a duplicate: some column changed
                    // (all_col) or every column changed (any-column mode)
                    if all_col {
                        changed.any(|c| c)
                    } else {
                        changed.all(|c| c)
                    }
                }
                None => true,
            })
            .collect()
    } else {
        global_mask(len, keep, |row| {
            considered.iter().map(|col| &col[row]).collect::<Vec<&Value>>()
        })
    };

    Ok(df.select_mask(&mask))
}
