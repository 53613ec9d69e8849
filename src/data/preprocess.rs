// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Preprocessing: interpolation, smoothing, quantile clipping.
//!
//! Runs column-wise over the merged table. Interior NaN gaps are
//! linearly interpolated, edge gaps take the nearest observed value,
//! a centered rolling mean smooths year-to-year jitter, and extreme
//! readings are clipped to configurable quantiles.

use tracing::debug;

use super::ingest::ClimateTable;

/// Preprocessing options
#[derive(Debug, Clone, Copy)]
pub struct PreprocessOptions {
    /// Centered rolling-mean window; values below 2 disable smoothing
    pub smoothing_window: usize,
    /// Lower/upper clip quantiles; `None` disables clipping
    pub clip_quantiles: Option<(f64, f64)>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            clip_quantiles: Some((0.01, 0.99)),
        }
    }
}

/// Preprocess the merged table in place
pub fn preprocess(table: &mut ClimateTable, options: PreprocessOptions) {
    for column in table.columns_mut() {
        interpolate(column);
        if options.smoothing_window > 1 {
            rolling_mean(column, options.smoothing_window);
        }
        if let Some((lo, hi)) = options.clip_quantiles {
            clip_quantiles(column, lo, hi);
        }
    }
    debug!(rows = table.len(), "preprocessing complete");
}

/// Fill NaN gaps: linear interpolation for interior runs, nearest
/// observed value at the edges. A column with no finite value at all
/// is left untouched.
pub fn interpolate(values: &mut [f64]) {
    let first_finite = match values.iter().position(|v| v.is_finite()) {
        Some(i) => i,
        None => return,
    };
    let last_finite = values.iter().rposition(|v| v.is_finite()).unwrap_or(first_finite);

    // Edge fill with the nearest observation
    let first_value = values[first_finite];
    for v in values[..first_finite].iter_mut() {
        *v = first_value;
    }
    let last_value = values[last_finite];
    for v in values[last_finite + 1..].iter_mut() {
        *v = last_value;
    }

    // Interior gaps: connect the bracketing observations linearly
    let mut i = first_finite;
    while i < last_finite {
        if values[i + 1].is_finite() {
            i += 1;
            continue;
        }
        let gap_end = (i + 1..=last_finite)
            .find(|&j| values[j].is_finite())
            .unwrap_or(last_finite);
        let span = (gap_end - i) as f64;
        let (lo, hi) = (values[i], values[gap_end]);
        for (step, v) in values[i + 1..gap_end].iter_mut().enumerate() {
            *v = lo + (hi - lo) * (step + 1) as f64 / span;
        }
        i = gap_end;
    }
}

/// Centered rolling mean. Edge positions without a full window keep
/// the nearest fully-smoothed value, so the column length never
/// changes.
pub fn rolling_mean(values: &mut [f64], window: usize) {
    let n = values.len();
    if n == 0 || window < 2 || window > n {
        return;
    }

    let half = window / 2;
    let source = values.to_vec();
    for (i, v) in values.iter_mut().enumerate() {
        // Clamp the center so edges reuse the first/last full window
        let center = i.clamp(half, n - 1 - (window - 1 - half));
        let start = center - half;
        let sum: f64 = source[start..start + window].iter().sum();
        *v = sum / window as f64;
    }
}

/// Clip a column to its [lo, hi] quantiles
pub fn clip_quantiles(values: &mut [f64], lo: f64, hi: f64) {
    let low = quantile(values, lo);
    let high = quantile(values, hi);
    for v in values.iter_mut() {
        *v = v.clamp(low, high);
    }
}

/// Linear-interpolation quantile over the finite values
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}
