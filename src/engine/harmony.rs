// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Harmony generator: feature row to chord.
//!
//! Temperature picks the pentatonic mode and the register, CO2 drives
//! chord density and semitone clustering. Per chord-assembly iteration
//! the generator draws twice from the shared stream: the cluster
//! decision first, then the pool index.

use rand::rngs::StdRng;
use rand::Rng;

use super::FeatureRow;
use crate::music::scale::{MidiNote, Scale, ScaleType};

/// Octave offsets scanned when building the candidate pitch pool
const POOL_OCTAVES: u8 = 2;

/// A chord for one bar: unique pitches sorted ascending, plus the
/// scale and root they were derived from
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    /// Unique pitches, sorted ascending
    pub pitches: Vec<MidiNote>,
    /// Scale the chord was drawn from
    pub scale: Scale,
    /// Root pitch of the bar
    pub root: MidiNote,
}

/// Configuration for the harmony generator
#[derive(Debug, Clone)]
pub struct HarmonyConfig {
    /// Lowest root pitch (temp_n = 0.0 lands here)
    pub base_register_low: u8,
    /// Semitone span the root travels across temp_n
    pub register_span: u8,
    /// Lower bound of the candidate pitch pool
    pub pool_min: u8,
    /// Upper bound of the candidate pitch pool
    pub pool_max: u8,
    /// Smallest chord size (co2_n = 0.0)
    pub min_chord_size: usize,
    /// Largest chord size (co2_n = 1.0)
    pub max_chord_size: usize,
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            base_register_low: 48,
            register_span: 24,
            pool_min: 48,
            pool_max: 84,
            min_chord_size: 2,
            max_chord_size: 8,
        }
    }
}

/// Harmony generator
#[derive(Debug, Clone, Default)]
pub struct HarmonyGenerator {
    config: HarmonyConfig,
}

impl HarmonyGenerator {
    /// Create a generator with the given configuration
    pub fn new(config: HarmonyConfig) -> Self {
        Self { config }
    }

    /// Select the scale for a row. Exactly 0.5 selects minor.
    pub fn scale_for(&self, row: &FeatureRow) -> ScaleType {
        if row.temp_n < 0.5 {
            ScaleType::MajorPentatonic
        } else {
            ScaleType::MinorPentatonic
        }
    }

    /// Root pitch for a row, truncated to an integer
    pub fn root_for(&self, row: &FeatureRow) -> MidiNote {
        let root = self.config.base_register_low as f64 + row.temp_n * self.config.register_span as f64;
        (root as i64).clamp(0, 127) as MidiNote
    }

    /// Chord size for a row, linear in co2_n, clamped to the
    /// configured bounds
    pub fn chord_size_for(&self, row: &FeatureRow) -> usize {
        let span = (self.config.max_chord_size - self.config.min_chord_size + 1) as f64;
        let size = self.config.min_chord_size + (row.co2_n * span) as usize;
        size.clamp(self.config.min_chord_size, self.config.max_chord_size)
    }

    /// Generate the chord for one row
    pub fn generate(&self, row: &FeatureRow, rng: &mut StdRng) -> Chord {
        let root = self.root_for(row);
        let scale = Scale::new(root, self.scale_for(row));

        let pool = scale.pitch_pool(POOL_OCTAVES, self.config.pool_min, self.config.pool_max);
        if pool.is_empty() {
            // Should not occur with the fixed bounds; keep the bar playable
            return Chord {
                pitches: vec![root],
                scale,
                root,
            };
        }

        let chord_size = self.chord_size_for(row);
        let cluster_probability = (row.co2_n * 0.6).min(0.6);

        let mut pitches = Vec::with_capacity(chord_size * 2);
        for _ in 0..chord_size {
            let cluster = rng.gen::<f64>() < cluster_probability;
            let pick = pool[rng.gen_range(0..pool.len())];
            pitches.push(pick);
            if cluster && pick < self.config.pool_max {
                // Semitone cluster for harmonic tension
                pitches.push(pick + 1);
            }
        }

        pitches.sort_unstable();
        pitches.dedup();

        Chord {
            pitches,
            scale,
            root,
        }
    }
}
