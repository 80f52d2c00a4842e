//! Cross-correlation alignment of two signals
//!
//! Both signals are resampled on their overlapping range onto a fixed-rate
//! grid, evenly dividing the overlap, whose step is at most the smallest
//! sample spacing found in either input.
//! The lag maximizing the cross-correlation of the resampled sequences is
//! the shift, in samples, that moves `to_align` onto `ref`.
//!
//! Short sequences are correlated directly. Longer ones go through an FFT,
//! so a trace with a single pair of close samples, which makes the grid
//! very fine, still aligns in `O(n log n)`.

use crate::error::{Result, SignalError};
use crate::table::Series;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Sequences up to this length are correlated without an FFT
const DIRECT_CORRELATION_MAX_LEN: usize = 512;

/// Correlations closer to the peak than this fraction of the largest
/// correlation magnitude count as ties
const CORRELATION_TIE_TOLERANCE: f64 = 1e-9;

/// Outcome of [`series_align_signal`]
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Reference signal resampled on the common grid
    pub reference: Series,
    /// Signal to align, resampled on the same grid and shifted; samples
    /// shifted in from outside the overlap are `NaN`
    pub aligned: Series,
    /// Applied shift in samples, after `max_shift` capping
    pub shift: i64,
    /// Shift maximizing the correlation, before capping
    pub correlation_shift: i64,
    /// Smallest sample spacing of the inputs; `max_shift` is converted to
    /// samples with it
    pub period: f64,
    /// Actual step of the common grid, at most `period`; 0 for a single
    /// point overlap
    pub step: f64,
}

impl Alignment {
    /// Applied shift converted to index units
    pub fn shift_in_index_units(&self) -> f64 {
        self.shift as f64 * self.step
    }
}

fn min_spacing(series: &Series) -> Result<f64> {
    series
        .index()
        .windows(2)
        .map(|w| w[1] - w[0])
        .reduce(f64::min)
        .ok_or_else(|| {
            SignalError::invalid(format!(
                "series '{}' needs at least 2 samples to be aligned",
                series.name()
            ))
        })
}

/// `num` evenly spaced points from `start` to `end`, both included
fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    if num == 1 {
        return vec![start];
    }
    let step = (end - start) / (num - 1) as f64;
    let mut grid: Vec<f64> = (0..num).map(|k| start + k as f64 * step).collect();
    grid[num - 1] = end;
    grid
}

fn resample(series: &Series, grid: &[f64]) -> Series {
    let values = grid
        .iter()
        .map(|&t| series.value_at(t).unwrap_or(f64::NAN))
        .collect();
    Series::from_parts_unchecked(series.name().to_string(), grid.to_vec(), values)
}

/// Cross-correlation of `a` against `r`, both of length `n`
///
/// Laid out over `2n` slots, slot `j` holding lag `j - n`:
/// `c[j] = sum over m of a[m + j - n] * r[m]`.
fn cross_correlation(a: &[f64], r: &[f64]) -> Vec<f64> {
    if a.len() <= DIRECT_CORRELATION_MAX_LEN {
        direct_correlation(a, r)
    } else {
        fft_correlation(a, r)
    }
}

fn direct_correlation(a: &[f64], r: &[f64]) -> Vec<f64> {
    let n = a.len() as i64;
    (0..2 * n)
        .map(|j| {
            let lag = j - n;
            (0..n)
                .filter_map(|m| {
                    let k = m + lag;
                    (0..n).contains(&k).then(|| a[k as usize] * r[m as usize])
                })
                .sum()
        })
        .collect()
}

fn fft_correlation(a: &[f64], r: &[f64]) -> Vec<f64> {
    let n = a.len();
    // At least 2n - 1 points so the circular correlation does not wrap
    let len = (2 * n).next_power_of_two();
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(len);
    let inverse = planner.plan_fft_inverse(len);

    let spectrum = |x: &[f64]| {
        let mut buf: Vec<Complex<f64>> = x.iter().map(|&v| Complex::new(v, 0.0)).collect();
        buf.resize(len, Complex::new(0.0, 0.0));
        forward.process(&mut buf);
        buf
    };
    let mut product: Vec<Complex<f64>> = spectrum(a)
        .into_iter()
        .zip(spectrum(r))
        .map(|(fa, fr)| fa * fr.conj())
        .collect();
    inverse.process(&mut product);

    let scale = len as f64;
    (0..2 * n)
        .map(|j| {
            // Negative lags sit at the end of the buffer
            let slot = if j < n { len - (n - j) } else { j - n };
            product[slot].re / scale
        })
        .collect()
}

/// Lag of `a` relative to `r` maximizing their correlation
///
/// The lag is the argmax slot re-centered by the sequence length. Ties,
/// up to [`CORRELATION_TIE_TOLERANCE`], go to the smallest absolute lag.
fn best_lag(a: &[f64], r: &[f64]) -> i64 {
    let n = a.len() as i64;
    let correlation = cross_correlation(a, r);
    let peak = correlation.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let magnitude = correlation.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    let threshold = peak - magnitude * CORRELATION_TIE_TOLERANCE;

    let mut best: Option<i64> = None;
    for (j, &c) in correlation.iter().enumerate() {
        let lag = j as i64 - n;
        if c >= threshold && best.map_or(true, |b| lag.abs() < b.abs()) {
            best = Some(lag);
        }
    }
    best.unwrap_or(0)
}

/// Align `to_align` onto `reference` by maximizing their cross-correlation
///
/// `max_shift`, in index units, caps the magnitude of the applied shift while
/// keeping its sign. Inputs must not contain missing values.
pub fn series_align_signal(
    reference: &Series,
    to_align: &Series,
    max_shift: Option<f64>,
) -> Result<Alignment> {
    if let Some(max_shift) = max_shift {
        if !max_shift.is_finite() || max_shift < 0.0 {
            return Err(SignalError::invalid(format!(
                "max_shift must be a non-negative number, got {}",
                max_shift
            )));
        }
    }
    for series in [reference, to_align] {
        if series.has_missing() {
            return Err(SignalError::DataQuality(format!(
                "series '{}' holds missing values, drop them before alignment",
                series.name()
            )));
        }
    }
    let period = min_spacing(reference)?.min(min_spacing(to_align)?);

    // Both indices have at least 2 entries at this point
    let start = reference.index()[0].max(to_align.index()[0]);
    let end = reference.index()[reference.len() - 1].min(to_align.index()[to_align.len() - 1]);
    if start > end {
        return Err(SignalError::invalid(format!(
            "series '{}' and '{}' do not overlap",
            reference.name(),
            to_align.name()
        )));
    }

    let num = ((end - start) / period).ceil() as usize + 1;
    let step = if num > 1 {
        (end - start) / (num - 1) as f64
    } else {
        0.0
    };
    let grid = linspace(start, end, num);
    let reference = resample(reference, &grid);
    let resampled = resample(to_align, &grid);

    let correlation_shift = best_lag(resampled.values(), reference.values());
    let mut shift = correlation_shift;
    if let Some(max_shift) = max_shift {
        let cap = (max_shift / period).trunc() as i64 * correlation_shift.signum();
        if shift.abs() > cap.abs() {
            tracing::warn!(
                shift = correlation_shift,
                capped = cap,
                "alignment shift capped by max_shift"
            );
            shift = cap;
        }
    }
    tracing::debug!(shift, period, step, samples = num, "aligned signals");

    let values = resampled.values();
    let shifted = (0..values.len() as i64)
        .map(|i| {
            let k = i + shift;
            if (0..values.len() as i64).contains(&k) {
                values[k as usize]
            } else {
                f64::NAN
            }
        })
        .collect();
    let aligned = Series::from_parts_unchecked(resampled.name().to_string(), grid, shifted);

    Ok(Alignment {
        reference,
        aligned,
        shift,
        correlation_shift,
        period,
        step,
    })
}
