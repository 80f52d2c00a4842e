//! Integration tests for series calculus helpers

mod utils;

use tracesignal::stats::{
    series_derivate, series_integrate, series_local_extremum, series_mean, series_rolling_apply,
    series_tunnel_mean, ExtremumKind, IntegrationMethod, RectStep, Sign,
};
use tracesignal::table::Series;
use utils::{assert_close, frequency};

#[test]
fn test_energy_from_power_samples() {
    // Power held constant between samples
    let power = Series::new("power", vec![0.0, 1.0, 3.0, 4.0], vec![2.0, 4.0, 1.0, 0.0]).unwrap();
    let post = series_integrate(&power, None, None, IntegrationMethod::Rect(RectStep::Post));
    assert_close(post.unwrap(), 2.0 + 8.0 + 1.0);

    let pre = series_integrate(&power, None, None, IntegrationMethod::Rect(RectStep::Pre));
    assert_close(pre.unwrap(), 4.0 + 2.0 + 0.0);

    let trapz = series_integrate(&power, None, None, IntegrationMethod::Trapz).unwrap();
    assert_close(trapz, 3.0 + 5.0 + 0.5);
}

#[test]
fn test_integrate_skips_missing_samples() {
    let y = Series::new("y", vec![0.0, 1.0, 2.0, 3.0], vec![1.0, f64::NAN, 1.0, 1.0]).unwrap();
    let rect = series_integrate(&y, None, None, IntegrationMethod::default()).unwrap();
    assert_close(rect, 2.0);
    let trapz = series_integrate(&y, None, None, IntegrationMethod::Trapz).unwrap();
    assert_close(trapz, 3.0);
}

#[test]
fn test_simpson_matches_polynomial_area() {
    let x: Vec<f64> = vec![0.0, 0.5, 1.5, 2.0, 3.0];
    let y: Vec<f64> = x.iter().map(|v| v * v).collect();
    let series = Series::new("sq", x, y).unwrap();
    let area = series_integrate(&series, None, None, IntegrationMethod::Simpson).unwrap();
    assert_close(area, 9.0);
}

#[test]
fn test_mean_frequency() {
    let mean = series_mean(&frequency(), None, None, IntegrationMethod::default()).unwrap();
    // Seven 0.25s steps: 500, 500, 1000, 1000, 1000, 1500, 500
    assert_close(mean, (500.0 * 3.0 + 1000.0 * 3.0 + 1500.0) * 0.25 / 1.75);
}

#[test]
fn test_signed_area() {
    let y = Series::new("y", vec![0.0, 1.0, 2.0], vec![3.0, -2.0, 0.0]).unwrap();
    let method = IntegrationMethod::default();
    assert_close(series_integrate(&y, None, Some(Sign::Positive), method).unwrap(), 3.0);
    assert_close(series_integrate(&y, None, Some(Sign::Negative), method).unwrap(), -2.0);
}

#[test]
fn test_derivative_of_counter() {
    let counter = Series::new("bytes", vec![0.0, 2.0, 4.0], vec![0.0, 10.0, 30.0]).unwrap();
    let rate = series_derivate(&counter, None, 1).unwrap();
    assert!(rate.values()[0].is_nan());
    assert_eq!(&rate.values()[1..], &[5.0, 10.0]);
}

#[test]
fn test_tunnel_of_oscillating_signal() {
    let index: Vec<f64> = (0..9).map(|i| i as f64).collect();
    let values = vec![1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0];
    let series = Series::new("osc", index, values).unwrap();

    let maxs = series_local_extremum(&series, ExtremumKind::Max);
    assert!(maxs.values().iter().all(|&v| v == 3.0));
    assert_close(series_tunnel_mean(&series).unwrap(), 2.0);
}

#[test]
fn test_rolling_mean_over_time_window() {
    let mean = |w: &Series| w.values().iter().sum::<f64>() / w.len() as f64;
    let out = series_rolling_apply(&frequency(), mean, 0.5, false).unwrap();
    assert_eq!(out.len(), frequency().len());
    // Window (0.0, 0.5] holds the samples at 0.25 and 0.5
    assert_close(out.values()[2], 750.0);
}
