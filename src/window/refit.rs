// Window selection that guarantees exact boundary keys
//
// After windowing, the first and last rows are relabelled to the requested
// start and end so callers always find those timestamps in the result.

use super::{data_window, EdgeMethod, Window};
use crate::error::{Result, SignalError};
use crate::table::{Indexed, Series, Table};

/// Window `data` with clipping, then force its first/last index values to
/// `start`/`end`.
///
/// `start` is applied last, so a single-row result carries `start`. When
/// `start == end` the relabelled rows would collide; only the row holding
/// the value at `start` is kept.
pub fn data_refit_index<D: Indexed>(
    data: &D,
    start: Option<f64>,
    end: Option<f64>,
    method: EdgeMethod,
) -> Result<D> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(SignalError::invalid(format!(
                "refit start {} is after end {}",
                s, e
            )));
        }
    }
    if [start, end].into_iter().flatten().any(|b| !b.is_finite()) {
        return Err(SignalError::invalid("refit bounds must be finite"));
    }
    if data.is_empty() {
        return Ok(data.clone());
    }

    let windowed = data_window(data, Window::new(start, end), method, true)?;
    if windowed.is_empty() {
        return Ok(windowed);
    }

    let windowed = match (start, end) {
        (Some(s), Some(e)) if s == e && windowed.len() > 1 => windowed.slice_rows(0..1),
        _ => windowed,
    };

    let mut index = windowed.index().to_vec();
    if let Some(end) = end {
        if let Some(last) = index.last_mut() {
            *last = end;
        }
    }
    if let Some(start) = start {
        index[0] = start;
    }

    windowed.with_index(index)
}

/// Slice a series with [`super::series_window`] and make sure it has values
/// at exactly the requested boundaries
///
/// `method` defaults to `inclusive` in most callers; `pre` suits signals where
/// every value change has its own row, `nearest` suits downsampled data.
pub fn series_refit_index(
    series: &Series,
    start: Option<f64>,
    end: Option<f64>,
    method: EdgeMethod,
) -> Result<Series> {
    data_refit_index(series, start, end, method)
}

/// Same as [`series_refit_index`] but acting on a [`Table`]
pub fn df_refit_index(
    df: &Table,
    start: Option<f64>,
    end: Option<f64>,
    method: EdgeMethod,
) -> Result<Table> {
    data_refit_index(df, start, end, method)
}
