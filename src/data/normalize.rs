// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Normalization into [0,1] feature rows.
//!
//! Min-max scaling against quantile cutoffs with a hard clamp, so a
//! single outlier year cannot compress the rest of the piece into a
//! narrow band. Degenerate columns (no spread) collapse to the
//! neutral midpoint. Sea-ice extent is inverted: 1.0 means least ice,
//! keeping "higher = more climate stress" consistent across all four
//! indicators.

use tracing::debug;

use super::ingest::ClimateTable;
use super::preprocess::quantile;
use crate::engine::FeatureRow;

/// Normalization options
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Quantile cutoffs anchoring the min-max scale
    pub cutoff_quantiles: (f64, f64),
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            cutoff_quantiles: (0.005, 0.995),
        }
    }
}

/// Scale one column into [0,1] against its quantile cutoffs.
///
/// `invert` flips the direction (used for sea-ice extent). NaN inputs
/// and zero-spread columns map to the neutral 0.5.
pub fn normalize_column(values: &[f64], options: NormalizeOptions, invert: bool) -> Vec<f64> {
    let (lo_q, hi_q) = options.cutoff_quantiles;
    let lo = quantile(values, lo_q);
    let hi = quantile(values, hi_q);
    let denom = hi - lo;

    values
        .iter()
        .map(|&v| {
            let norm = if !denom.is_finite() || denom == 0.0 || !v.is_finite() {
                0.5
            } else {
                ((v.clamp(lo, hi) - lo) / denom).clamp(0.0, 1.0)
            };
            if invert {
                1.0 - norm
            } else {
                norm
            }
        })
        .collect()
}

/// Normalize a preprocessed table into engine-ready feature rows
pub fn normalize(table: &ClimateTable, options: NormalizeOptions) -> Vec<FeatureRow> {
    let temp = normalize_column(&table.temp, options, false);
    let co2 = normalize_column(&table.co2, options, false);
    let ice = normalize_column(&table.ice, options, true);
    let extreme = normalize_column(&table.extreme, options, false);

    let rows: Vec<FeatureRow> = table
        .years
        .iter()
        .enumerate()
        .map(|(i, &year)| FeatureRow::new(year, temp[i], co2[i], ice[i], extreme[i]))
        .collect();

    debug!(rows = rows.len(), "normalization complete");
    rows
}

/// Thin the row sequence so the rendered piece approximates a target
/// duration.
///
/// Keeps every n-th row (always including the first). With no target,
/// or when the piece already fits, the rows pass through unchanged.
pub fn subsample_rows(
    rows: Vec<FeatureRow>,
    target_duration_secs: Option<f64>,
    seconds_per_bar: f64,
) -> Vec<FeatureRow> {
    let Some(target) = target_duration_secs else {
        return rows;
    };
    if target <= 0.0 || seconds_per_bar <= 0.0 {
        return rows;
    }

    let max_bars = (target / seconds_per_bar).floor().max(1.0) as usize;
    if rows.len() <= max_bars {
        return rows;
    }

    let step = rows.len().div_ceil(max_bars);
    let kept: Vec<FeatureRow> = rows.into_iter().step_by(step).collect();
    debug!(kept = kept.len(), step, "subsampled rows to fit target duration");
    kept
}
