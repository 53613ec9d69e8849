// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! CSV ingestion and year-keyed merging.
//!
//! Each indicator ships as its own table with a year column and one
//! value column. Tables are standardized to (year, value), then
//! inner-joined on the year key: only years present in every source
//! survive. Empty or unparseable value cells become NaN and are left
//! for the preprocessing stage to interpolate.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Expected source files and their value columns
const SOURCES: [(&str, &str, &str); 4] = [
    ("temperature.csv", "Year", "Anomaly"),
    ("co2.csv", "Year", "CO2_Mean"),
    ("sea_ice.csv", "Year", "Extent"),
    ("extreme_events.csv", "Year", "Extremes_Index"),
];

/// Merged indicator table, sorted by year ascending.
///
/// Column vectors all share the length of `years`. Values may be NaN
/// until preprocessing has run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateTable {
    pub years: Vec<i32>,
    pub temp: Vec<f64>,
    pub co2: Vec<f64>,
    pub ice: Vec<f64>,
    pub extreme: Vec<f64>,
}

impl ClimateTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Whether the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Mutable access to the four indicator columns
    pub(crate) fn columns_mut(&mut self) -> [&mut Vec<f64>; 4] {
        [
            &mut self.temp,
            &mut self.co2,
            &mut self.ice,
            &mut self.extreme,
        ]
    }
}

/// Read one indicator CSV into a year-keyed series.
///
/// The header row names the columns; `year_col` and `value_col` select
/// the two that matter. Blank value cells parse to NaN.
fn read_series(path: &Path, year_col: &str, value_col: &str) -> Result<BTreeMap<i32, f64>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read data file {}", path.display()))?;

    let mut lines = contents.lines();
    let header = lines
        .next()
        .with_context(|| format!("{} is empty", path.display()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let year_idx = columns
        .iter()
        .position(|&c| c == year_col)
        .with_context(|| format!("{} has no '{year_col}' column", path.display()))?;
    let value_idx = columns
        .iter()
        .position(|&c| c == value_col)
        .with_context(|| format!("{} has no '{value_col}' column", path.display()))?;

    let mut series = BTreeMap::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let year_field = fields.get(year_idx).copied().unwrap_or_default();
        let year: i32 = year_field.parse().with_context(|| {
            format!(
                "{} line {}: bad year '{year_field}'",
                path.display(),
                line_no + 2
            )
        })?;

        let value = fields
            .get(value_idx)
            .and_then(|f| f.parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        series.insert(year, value);
    }

    Ok(series)
}

/// Load and merge all indicator tables from a data directory.
///
/// Inner join on the year key, sorted ascending. Fails when any source
/// file is missing or the join comes up empty.
pub fn load_all_data<P: AsRef<Path>>(data_dir: P) -> Result<ClimateTable> {
    let dir = data_dir.as_ref();

    let mut tables = Vec::with_capacity(SOURCES.len());
    for (file, year_col, value_col) in SOURCES {
        tables.push(read_series(&dir.join(file), year_col, value_col)?);
    }

    // Inner join: keep only years present in every source
    let years: Vec<i32> = tables[0]
        .keys()
        .copied()
        .filter(|year| tables.iter().all(|t| t.contains_key(year)))
        .collect();

    if years.is_empty() {
        bail!("no common years across the data sources in {}", dir.display());
    }

    let column = |idx: usize| -> Vec<f64> { years.iter().map(|y| tables[idx][y]).collect() };
    let table = ClimateTable {
        temp: column(0),
        co2: column(1),
        ice: column(2),
        extreme: column(3),
        years,
    };

    info!(
        rows = table.len(),
        first = table.years.first(),
        last = table.years.last(),
        "loaded climate data"
    );
    Ok(table)
}
