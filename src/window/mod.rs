// Window selection over indexed data
//
// Slices a table or series to the rows matching a [start, end] window.
// Boundaries resolve through `locate` under an edge method; clipping first
// clamps the window into the data's own extent so a non-empty input never
// yields an empty window.

mod locate;
mod refit;

pub use locate::{locate, EdgeMethod, Seek};
pub use refit::{data_refit_index, df_refit_index, series_refit_index};

use crate::error::{Result, SignalError};
use crate::table::{Indexed, Series, Table};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A pair of optional boundaries; `None` extends to the data's own edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Window {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl Window {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self { start, end }
    }

    /// Window with both boundaries set
    pub fn between(start: f64, end: f64) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Open-ended window starting at `start`
    pub fn starting_at(start: f64) -> Self {
        Self::new(Some(start), None)
    }

    /// Open-started window ending at `end`
    pub fn ending_at(end: f64) -> Self {
        Self::new(None, Some(end))
    }

    /// Whole extent of the data
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        for bound in [self.start, self.end].into_iter().flatten() {
            if bound.is_nan() {
                return Err(SignalError::invalid("window bounds must not be NaN"));
            }
        }
        Ok(())
    }

    /// Clamp into `[first, last]`, filling unset bounds
    fn clip(&self, first: f64, last: f64) -> (f64, f64) {
        let start = self.start.unwrap_or(first);
        let end = self.end.unwrap_or(last);

        if start <= first && end <= first {
            // Entirely before the data
            (first, first)
        } else if start >= last && end >= last {
            // Entirely after the data
            (last, last)
        } else {
            (start.max(first), end.min(last))
        }
    }
}

impl From<(f64, f64)> for Window {
    fn from((start, end): (f64, f64)) -> Self {
        Window::between(start, end)
    }
}

impl From<(Option<f64>, Option<f64>)> for Window {
    fn from((start, end): (Option<f64>, Option<f64>)) -> Self {
        Window::new(start, end)
    }
}

/// Row positions selected by `window`
///
/// The end position is inclusive in the window, so the returned range is
/// `pos(start)..pos(end) + 1`. An empty range means no row matched.
pub fn window_range(
    index: &[f64],
    window: Window,
    method: EdgeMethod,
    clip_window: bool,
) -> Result<Range<usize>> {
    window.validate()?;
    let (first, last) = match (index.first(), index.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(0..0),
    };

    let window = if clip_window {
        let (start, end) = window.clip(first, last);
        Window::between(start, end)
    } else {
        window
    };

    let start = match window.start {
        None => 0,
        Some(v) => match locate(index, v, method.start_seek()) {
            Some(pos) => pos,
            // Nothing before the data to pad from: the window starts at row 0
            None if v < first => 0,
            None => return Ok(0..0),
        },
    };
    let end = match window.end {
        None => index.len() - 1,
        Some(v) => match locate(index, v, method.end_seek()) {
            Some(pos) => pos,
            // Nothing after the data to backfill from: the window ends at the last row
            None if v > last => index.len() - 1,
            None => return Ok(0..0),
        },
    };

    tracing::trace!(
        ?window,
        %method,
        start,
        end,
        "resolved window positions"
    );

    if start > end {
        return Ok(0..0);
    }
    Ok(start..end + 1)
}

/// Select the part of `data` covered by `window`
///
/// Empty input is returned unchanged.
pub fn data_window<D: Indexed>(
    data: &D,
    window: impl Into<Window>,
    method: EdgeMethod,
    clip_window: bool,
) -> Result<D> {
    let window = window.into();
    if data.is_empty() {
        window.validate()?;
        return Ok(data.clone());
    }
    let rows = window_range(data.index(), window, method, clip_window)?;
    Ok(data.slice_rows(rows))
}

/// Select a portion of a [`Series`]
///
/// `method` chooses how edges that miss the index are handled:
///
/// * `inclusive`: smallest range containing all samples within the window
/// * `exclusive`: only samples strictly inside the window
/// * `nearest`: closest sample on each side
/// * `pre`: previous sample on each side
/// * `post`: next sample on each side
///
/// With `clip_window`, the window is clamped to the series' extent first.
pub fn series_window(
    series: &Series,
    window: impl Into<Window>,
    method: EdgeMethod,
    clip_window: bool,
) -> Result<Series> {
    data_window(series, window, method, clip_window)
}

/// Same as [`series_window`] but acting on a [`Table`]
pub fn df_window(
    df: &Table,
    window: impl Into<Window>,
    method: EdgeMethod,
    clip_window: bool,
) -> Result<Table> {
    data_window(df, window, method, clip_window)
}
