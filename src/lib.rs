// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! terratone - climate data sonification.
//!
//! Converts yearly climate-indicator readings (temperature anomaly,
//! CO2 concentration, sea-ice extent, extreme-event index) into a
//! deterministic three-voice musical timeline and exports it as a
//! Standard MIDI File.
//!
//! The crate splits into the composition engine ([`engine`]), the
//! data pipeline feeding it ([`data`]), the MIDI sink consuming its
//! output ([`midi`]), and configuration ([`config`]).

pub mod config;
pub mod data;
pub mod engine;
pub mod midi;
pub mod music;

use rand::rngs::StdRng;
use rand::SeedableRng;

use engine::{validate_rows, EngineError, FeatureRow, Score, TimelineAssembler};

/// Compose a score from validated feature rows.
///
/// Validates first, then runs the timeline assembler with a generator
/// seeded from `seed`. Same seed and rows always produce the same
/// score.
pub fn compose(
    rows: &[FeatureRow],
    config: engine::EngineConfig,
    seed: u64,
) -> Result<Score, EngineError> {
    validate_rows(rows)?;
    let assembler = TimelineAssembler::new(config, StdRng::seed_from_u64(seed));
    Ok(assembler.compose(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_rejects_invalid_rows() {
        let rows = vec![FeatureRow::new(1960, 2.0, 0.5, 0.5, 0.5)];
        assert!(compose(&rows, engine::EngineConfig::default(), 0).is_err());
    }

    #[test]
    fn test_compose_produces_score() {
        let rows = vec![
            FeatureRow::new(1960, 0.2, 0.3, 0.4, 0.1),
            FeatureRow::new(1961, 0.3, 0.4, 0.5, 0.2),
        ];
        let score = compose(&rows, engine::EngineConfig::default(), 7).unwrap();
        assert!(score.note_count() > 0);
        assert!(score.duration > 0.0);
    }
}
