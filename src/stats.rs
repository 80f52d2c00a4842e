//! Calculus and summary helpers on series
//!
//! Missing samples are `NaN`. Unless stated otherwise the `x` axis of a
//! computation is the series index; an explicit `x` series must be sampled
//! on the same index.

use crate::error::{Result, SignalError};
use crate::table::Series;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which part of the signal contributes to an integral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    /// Ignore negative samples (`+`)
    #[serde(rename = "+")]
    Positive,
    /// Ignore positive samples (`-`)
    #[serde(rename = "-")]
    Negative,
}

impl FromStr for Sign {
    type Err = SignalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "+" => Ok(Sign::Positive),
            "-" => Ok(Sign::Negative),
            other => Err(SignalError::invalid(format!("Unsupported sign: {}", other))),
        }
    }
}

/// Step behaviour of the rectangle method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectStep {
    /// A sample holds until the next one
    #[default]
    Post,
    /// A sample holds since the previous one
    Pre,
}

impl FromStr for RectStep {
    type Err = SignalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "post" => Ok(RectStep::Post),
            "pre" => Ok(RectStep::Pre),
            other => Err(SignalError::invalid(format!(
                "Unsupported rect step: {}",
                other
            ))),
        }
    }
}

/// Area computation method for [`series_integrate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationMethod {
    Rect(RectStep),
    Trapz,
    Simpson,
}

impl Default for IntegrationMethod {
    fn default() -> Self {
        IntegrationMethod::Rect(RectStep::Post)
    }
}

impl FromStr for IntegrationMethod {
    type Err = SignalError;

    /// `rect` (post step), `rect-pre`, `trapz`, `simps` or `simpson`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rect" | "rect-post" => Ok(IntegrationMethod::Rect(RectStep::Post)),
            "rect-pre" => Ok(IntegrationMethod::Rect(RectStep::Pre)),
            "trapz" => Ok(IntegrationMethod::Trapz),
            "simps" | "simpson" => Ok(IntegrationMethod::Simpson),
            other => Err(SignalError::invalid(format!(
                "Unsupported integration method: {}",
                other
            ))),
        }
    }
}

/// Kind of local extremum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremumKind {
    Min,
    Max,
}

impl FromStr for ExtremumKind {
    type Err = SignalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "min" => Ok(ExtremumKind::Min),
            "max" => Ok(ExtremumKind::Max),
            other => Err(SignalError::invalid(format!("Unsupported kind: {}", other))),
        }
    }
}

fn resolve_x<'a>(y: &'a Series, x: Option<&'a Series>) -> Result<&'a [f64]> {
    match x {
        None => Ok(y.index()),
        Some(x) if x.index() == y.index() => Ok(x.values()),
        Some(x) => Err(SignalError::invalid(format!(
            "series '{}' and '{}' are not sampled on the same index",
            y.name(),
            x.name()
        ))),
    }
}

fn diff(values: &[f64]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .take(values.len())
        .collect()
}

/// `order`-th derivative `dy/dx` as successive finite differences
///
/// The first `order` samples of the result are `NaN`.
pub fn series_derivate(y: &Series, x: Option<&Series>, order: usize) -> Result<Series> {
    let x = resolve_x(y, x)?;
    let dx = diff(x);
    let mut values = y.values().to_vec();
    for _ in 0..order {
        values = diff(&values)
            .into_iter()
            .zip(&dx)
            .map(|(dy, dx)| dy / dx)
            .collect();
    }
    Series::new(y.name(), y.index().to_vec(), values)
}

/// Composite Simpson rule over the sample pairs starting at `start`, `start + 2`, ...
/// up to `stop` (exclusive), on irregular spacing
fn basic_simpson(y: &[f64], x: &[f64], start: usize, stop: usize) -> f64 {
    (start..stop)
        .step_by(2)
        .map(|i| {
            let h0 = x[i + 1] - x[i];
            let h1 = x[i + 2] - x[i + 1];
            let hsum = h0 + h1;
            let hprod = h0 * h1;
            let ratio = h0 / h1;
            hsum / 6.0
                * (y[i] * (2.0 - 1.0 / ratio)
                    + y[i + 1] * hsum * hsum / hprod
                    + y[i + 2] * (2.0 - ratio))
        })
        .sum()
}

fn simpson(y: &[f64], x: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    if n % 2 == 1 {
        return basic_simpson(y, x, 0, n - 2);
    }
    // Even sample count: average the two ways of closing with one trapezoid
    let last = 0.5 * (x[n - 1] - x[n - 2]) * (y[n - 1] + y[n - 2]);
    let first = 0.5 * (x[1] - x[0]) * (y[1] + y[0]);
    if n == 2 {
        return first;
    }
    let head = basic_simpson(y, x, 0, n - 3);
    let tail = basic_simpson(y, x, 1, n - 2);
    (head + last + first + tail) / 2.0
}

/// Integral of `y` with respect to `x`
///
/// # Arguments
///
/// * `y` - Samples to integrate
/// * `x` - Integration variable, the index of `y` when `None`
/// * `sign` - Clip samples to the positive or negative region
/// * `method` - Area computation; the rectangle method skips `NaN` terms,
///   the other methods drop rows where `x` or `y` is `NaN`
pub fn series_integrate(
    y: &Series,
    x: Option<&Series>,
    sign: Option<Sign>,
    method: IntegrationMethod,
) -> Result<f64> {
    let x = resolve_x(y, x)?;
    let y: Vec<f64> = y
        .values()
        .iter()
        .map(|&v| match sign {
            Some(Sign::Positive) if v < 0.0 => 0.0,
            Some(Sign::Negative) if v > 0.0 => 0.0,
            _ => v,
        })
        .collect();

    let area = match method {
        IntegrationMethod::Rect(step) => {
            let dx = diff(x);
            (0..y.len())
                .map(|k| match step {
                    RectStep::Post => dx.get(k + 1).map_or(f64::NAN, |d| y[k] * d),
                    RectStep::Pre => y[k] * dx[k],
                })
                .filter(|term| !term.is_nan())
                .sum()
        }
        IntegrationMethod::Trapz | IntegrationMethod::Simpson => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = x
                .iter()
                .zip(&y)
                .filter(|(x, y)| !x.is_nan() && !y.is_nan())
                .map(|(&x, &y)| (x, y))
                .unzip();
            if method == IntegrationMethod::Trapz {
                xs.windows(2)
                    .zip(ys.windows(2))
                    .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
                    .sum()
            } else {
                simpson(&ys, &xs)
            }
        }
    };
    Ok(area)
}

/// Average of `y`: its integral divided by the range of `x`
pub fn series_mean(
    y: &Series,
    x: Option<&Series>,
    sign: Option<Sign>,
    method: IntegrationMethod,
) -> Result<f64> {
    let integral = series_integrate(y, x, sign, method)?;
    let xs = resolve_x(y, x)?;
    let (min, max) = xs
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    Ok(integral / (max - min))
}

/// Samples that are local minimums or maximums
///
/// A sample is kept when it compares `<=` (min) or `>=` (max) to both of its
/// neighbours; at either end the missing neighbour is the sample itself.
pub fn series_local_extremum(series: &Series, kind: ExtremumKind) -> Series {
    let values = series.values();
    let n = values.len();
    let cmp = |a: f64, b: f64| match kind {
        ExtremumKind::Min => a <= b,
        ExtremumKind::Max => a >= b,
    };
    let rows: Vec<usize> = (0..n)
        .filter(|&i| {
            let prev = values[i.saturating_sub(1)];
            let next = values[(i + 1).min(n - 1)];
            cmp(values[i], prev) && cmp(values[i], next)
        })
        .collect();
    series.take(&rows)
}

/// Center of the tunnel the values range in: the midpoint between the mean
/// of local maximums and the mean of local minimums
pub fn series_tunnel_mean(series: &Series) -> Result<f64> {
    let method = IntegrationMethod::default();
    let maxs = series_local_extremum(series, ExtremumKind::Max);
    let mins = series_local_extremum(series, ExtremumKind::Min);
    let maxs_mean = series_mean(&maxs, None, None, method)?;
    let mins_mean = series_mean(&mins, None, None, method)?;
    Ok((maxs_mean - mins_mean) / 2.0 + mins_mean)
}

/// Apply `func` on a rolling time window of `series`
///
/// For a sample at `t` the window holds the samples with index in
/// `(t - window, t]`. The result is labelled `t`, or `t - window / 2` when
/// `center` is set.
pub fn series_rolling_apply<F>(series: &Series, func: F, window: f64, center: bool) -> Result<Series>
where
    F: Fn(&Series) -> f64,
{
    if !window.is_finite() || window <= 0.0 {
        return Err(SignalError::invalid(format!(
            "rolling window must be a positive duration, got {}",
            window
        )));
    }
    let index = series.index();
    let values = (0..index.len())
        .map(|end| {
            let t = index[end];
            let start = index.partition_point(|&i| i <= t - window);
            let rows: Vec<usize> = (start..=end).collect();
            func(&series.take(&rows))
        })
        .collect();

    let new_index = if center {
        index.iter().map(|t| t - window / 2.0).collect()
    } else {
        index.to_vec()
    };
    Series::new(series.name(), new_index, values)
}
