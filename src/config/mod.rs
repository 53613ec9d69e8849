// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for terratone.
//!
//! This module provides the piece configuration loaded from YAML:
//! data location, tempo, random seed, register and pitch-pool bounds,
//! per-family range overrides, and the preprocessing/normalization
//! knobs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::preprocess::PreprocessOptions;
use crate::data::normalize::NormalizeOptions;
use crate::engine::harmony::HarmonyConfig;
use crate::engine::range::{InstrumentFamily, InstrumentRange};
use crate::engine::rhythm::RhythmConfig;
use crate::engine::EngineConfig;

/// Root configuration for one rendered piece
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceFile {
    /// Piece settings
    pub piece: PieceConfig,
}

impl PieceFile {
    /// Load a piece configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a piece configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }
}

/// Piece-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceConfig {
    /// Piece name
    pub name: String,
    /// Directory holding the indicator CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Random seed for the generative draws
    #[serde(default)]
    pub seed: u64,
    /// Target total duration in seconds; rows are thinned to fit
    #[serde(default)]
    pub target_duration_secs: Option<f64>,
    /// Lowest root pitch
    #[serde(default = "default_base_register_low")]
    pub base_register_low: u8,
    /// Semitone span the root travels
    #[serde(default = "default_register_span")]
    pub register_span: u8,
    /// Lower bound of the chord pitch pool
    #[serde(default = "default_pool_min")]
    pub pool_min: u8,
    /// Upper bound of the chord pitch pool
    #[serde(default = "default_pool_max")]
    pub pool_max: u8,
    /// Per-family playable range overrides, keyed by family name
    #[serde(default)]
    pub instrument_ranges: BTreeMap<InstrumentFamily, InstrumentRange>,
    /// Centered smoothing window for preprocessing
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// Preprocessing clip quantiles
    #[serde(default = "default_clip_quantiles")]
    pub clip_quantiles: Option<(f64, f64)>,
    /// Normalization cutoff quantiles
    #[serde(default = "default_cutoff_quantiles")]
    pub cutoff_quantiles: (f64, f64),
}

fn default_data_dir() -> String {
    "data".to_string()
}
fn default_tempo() -> f64 {
    100.0
}
fn default_base_register_low() -> u8 {
    48
}
fn default_register_span() -> u8 {
    24
}
fn default_pool_min() -> u8 {
    48
}
fn default_pool_max() -> u8 {
    84
}
fn default_smoothing_window() -> usize {
    3
}
fn default_clip_quantiles() -> Option<(f64, f64)> {
    Some((0.01, 0.99))
}
fn default_cutoff_quantiles() -> (f64, f64) {
    (0.005, 0.995)
}

impl Default for PieceConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            data_dir: default_data_dir(),
            tempo: default_tempo(),
            seed: 0,
            target_duration_secs: None,
            base_register_low: default_base_register_low(),
            register_span: default_register_span(),
            pool_min: default_pool_min(),
            pool_max: default_pool_max(),
            instrument_ranges: BTreeMap::new(),
            smoothing_window: default_smoothing_window(),
            clip_quantiles: default_clip_quantiles(),
            cutoff_quantiles: default_cutoff_quantiles(),
        }
    }
}

impl PieceConfig {
    /// Engine configuration derived from this piece
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tempo_bpm: self.tempo,
            harmony: HarmonyConfig {
                base_register_low: self.base_register_low,
                register_span: self.register_span,
                pool_min: self.pool_min,
                pool_max: self.pool_max,
                ..HarmonyConfig::default()
            },
            rhythm: RhythmConfig::default(),
            instrument_ranges: self.instrument_ranges.clone(),
        }
    }

    /// Preprocessing options derived from this piece
    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            smoothing_window: self.smoothing_window,
            clip_quantiles: self.clip_quantiles,
        }
    }

    /// Normalization options derived from this piece
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            cutoff_quantiles: self.cutoff_quantiles,
        }
    }
}
