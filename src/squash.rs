//! Splitting duration-encoded interval sequences at window boundaries
//!
//! Each row of the input states how long its value lasts in a duration
//! column (`delta` by default). The input is expected to be gap-free: a row
//! at `t` with duration `d` is followed by a row at `t + d`, unless it is the
//! last one.
//!
//! [`df_squash`] returns the exact interval content of `[start, end)`:
//!
//! ```text
//! |   [   |   ]   |
//! e0  s0  e1  s1  e2
//! ```
//!
//! `e0` is pulled forward to `s0` with its duration cut to
//! `min(e1 - s0, s1 - s0)`. Rows strictly inside the window are carried
//! through, and the last one is cut so it stops at `s1`. A row sitting
//! exactly on `s1` marks a transition out of the window and is dropped.
//!
//! # Example
//!
//! ```
//! use tracesignal::squash::df_squash;
//! use tracesignal::table::Table;
//!
//! # fn main() -> anyhow::Result<()> {
//! let df = Table::new(vec![15.0, 16.0, 17.0, 18.0])?
//!     .with_column("len", [1.0, 1.0, 1.0, 1.0])?
//!     .with_column("state", [1, 0, 1, 0])?;
//!
//! let squashed = df_squash(&df, 16.5, 17.5, "len")?;
//! assert_eq!(squashed.index(), &[16.5, 17.0]);
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SignalError};
use crate::table::{Column, Table, Value};

/// Default name of the duration column
pub const DEFAULT_DELTA_COLUMN: &str = "delta";

/// One output row: where it comes from and, if changed, its new duration
struct Piece {
    timestamp: f64,
    source: usize,
    delta: Option<f64>,
}

fn durations(df: &Table, column: &str) -> Result<Vec<f64>> {
    df.column(column)?
        .values()
        .iter()
        .map(|v| {
            v.as_f64().filter(|d| d.is_finite()).ok_or_else(|| {
                SignalError::DataQuality(format!(
                    "duration column '{}' holds non-numeric or missing value {}",
                    column, v
                ))
            })
        })
        .collect()
}

/// Slice an interval sequence to `[start, end]`, truncating the boundary
/// intervals so the result accounts for exactly `end - start` of time
/// (less when `start` precedes the data).
///
/// - `end` beyond the data is clamped to `last_index + last_delta`.
/// - `start > end` (after clamping) yields an empty table.
/// - Empty input is returned unchanged.
pub fn df_squash(df: &Table, start: f64, end: f64, column: &str) -> Result<Table> {
    if !start.is_finite() || !end.is_finite() {
        return Err(SignalError::invalid(format!(
            "squash bounds must be finite, got [{}, {}]",
            start, end
        )));
    }
    if df.is_empty() {
        return Ok(df.clone());
    }

    let deltas = durations(df, column)?;
    let index = df.index();
    let last = index.len() - 1;

    let data_end = index[last] + deltas[last];
    let end = if end > data_end {
        tracing::debug!(
            requested = end,
            clamped = data_end,
            "squash end beyond data, clamping"
        );
        data_end
    } else {
        end
    };

    if start > end {
        return Ok(df.empty_like());
    }

    // Rows at or before start, and rows inside [start, end]
    let prev_end = index.partition_point(|&t| t <= start);
    let middle = index.partition_point(|&t| t < start)..index.partition_point(|&t| t <= end);
    let start_in_middle = !middle.is_empty() && index[middle.start] == start;

    let mut pieces: Vec<Piece> = Vec::with_capacity(middle.len() + 1);

    // Pull the interval in progress at start into the window
    if prev_end > 0 && !start_in_middle {
        let next = if middle.is_empty() {
            end
        } else {
            index[middle.start]
        };
        pieces.push(Piece {
            timestamp: start,
            source: prev_end - 1,
            delta: Some((next - start).min(end - start)),
        });
    }

    if !middle.is_empty() {
        pieces.extend(middle.clone().map(|row| Piece {
            timestamp: index[row],
            source: row,
            delta: None,
        }));

        if index[middle.end - 1] == end {
            // The row at end starts the next interval, it is not window content
            pieces.pop();
        } else if let Some(last_piece) = pieces.last_mut() {
            let original = deltas[last_piece.source];
            last_piece.delta = Some((end - last_piece.timestamp).min(original));
        }
    }

    Ok(assemble(df, column, &pieces))
}

fn assemble(df: &Table, column: &str, pieces: &[Piece]) -> Table {
    let index = pieces.iter().map(|p| p.timestamp).collect();
    let columns = df
        .columns()
        .iter()
        .map(|c| {
            let values = pieces
                .iter()
                .map(|p| match p.delta {
                    Some(delta) if c.name() == column => Value::Float(delta),
                    _ => c.values()[p.source].clone(),
                })
                .collect();
            Column::new(c.name(), values)
        })
        .collect();
    Table::from_parts_unchecked(index, columns)
}
