// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The composition engine.
//!
//! Turns an ordered sequence of normalized climate feature rows into a
//! multi-voice musical timeline. Each row becomes one bar: harmony,
//! rhythm and timbre are derived from the row's indicators, three
//! voices (bass, melody, counter-melody) are arranged over the bar,
//! and the results accumulate into a [`Score`].
//!
//! The engine performs no I/O. It assumes rows were validated with
//! [`validate_rows`] beforehand and draws all randomness from a single
//! injected generator so a fixed seed reproduces the piece exactly.

pub mod harmony;
pub mod range;
pub mod rhythm;
pub mod timbre;
pub mod timeline;
pub mod voices;

use thiserror::Error;

use crate::music::scale::MidiNote;
pub use timbre::Instrument;
pub use timeline::{EngineConfig, TimelineAssembler};

/// One normalized climate reading. Immutable input unit of the engine.
///
/// All four indicators are expected in `[0,1]`; supplying anything else
/// is rejected by [`validate_rows`], never silently clamped here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    /// Observation year (unique, ascending across the input)
    pub year: i32,
    /// Normalized temperature anomaly
    pub temp_n: f64,
    /// Normalized CO2 concentration
    pub co2_n: f64,
    /// Normalized sea-ice indicator (1.0 = least ice)
    pub ice_n: f64,
    /// Normalized extreme-event index
    pub extreme_n: f64,
}

impl FeatureRow {
    /// Create a new feature row
    pub fn new(year: i32, temp_n: f64, co2_n: f64, ice_n: f64, extreme_n: f64) -> Self {
        Self {
            year,
            temp_n,
            co2_n,
            ice_n,
            extreme_n,
        }
    }

    /// The row's indicators as (name, value) pairs, for validation
    fn indicators(&self) -> [(&'static str, f64); 4] {
        [
            ("temp_n", self.temp_n),
            ("co2_n", self.co2_n),
            ("ice_n", self.ice_n),
            ("extreme_n", self.extreme_n),
        ]
    }
}

/// Validation errors raised before the engine runs
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("row for year {year}: {name} = {value} is not finite")]
    NonFiniteIndicator {
        year: i32,
        name: &'static str,
        value: f64,
    },

    #[error("row for year {year}: {name} = {value} outside [0,1]")]
    IndicatorOutOfRange {
        year: i32,
        name: &'static str,
        value: f64,
    },

    #[error("rows out of order: year {year} follows year {previous}")]
    UnorderedYears { year: i32, previous: i32 },

    #[error("no feature rows supplied")]
    EmptyInput,
}

/// Validate an ordered sequence of feature rows.
///
/// Fails fast on the first non-finite or out-of-`[0,1]` indicator and
/// on non-ascending or duplicate years. The engine itself assumes
/// validated input.
pub fn validate_rows(rows: &[FeatureRow]) -> Result<(), EngineError> {
    if rows.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let mut previous: Option<i32> = None;
    for row in rows {
        for (name, value) in row.indicators() {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteIndicator {
                    year: row.year,
                    name,
                    value,
                });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::IndicatorOutOfRange {
                    year: row.year,
                    name,
                    value,
                });
            }
        }

        if let Some(prev) = previous {
            if row.year <= prev {
                return Err(EngineError::UnorderedYears {
                    year: row.year,
                    previous: prev,
                });
            }
        }
        previous = Some(row.year);
    }

    Ok(())
}

/// A single timed note within an instrument track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI pitch, clamped to the owning track's instrument range
    pub pitch: MidiNote,
    /// Velocity in [30,127] after variation
    pub velocity: u8,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds (always after `start`)
    pub end: f64,
}

impl NoteEvent {
    /// Note length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Voice roles of the three concurrent musical lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceRole {
    Bass,
    Melody,
    Counter,
}

impl VoiceRole {
    /// All roles in slot order (bass, melody, counter-melody)
    pub const ALL: [VoiceRole; 3] = [VoiceRole::Bass, VoiceRole::Melody, VoiceRole::Counter];

    /// Slot index of this role
    pub fn slot(self) -> usize {
        match self {
            VoiceRole::Bass => 0,
            VoiceRole::Melody => 1,
            VoiceRole::Counter => 2,
        }
    }
}

/// An instrument track: one instrument identity and its notes, in time order
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentTrack {
    /// Instrument playing this track
    pub instrument: Instrument,
    /// Voice slot the track was opened for
    pub role: VoiceRole,
    /// Notes in start-time order
    pub notes: Vec<NoteEvent>,
}

impl InstrumentTrack {
    /// Create a new empty track
    pub fn new(instrument: Instrument, role: VoiceRole) -> Self {
        Self {
            instrument,
            role,
            notes: Vec::new(),
        }
    }
}

/// A meter change marker on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterMarker {
    /// Beats per bar from this point on
    pub beats_per_bar: u8,
    /// Time offset in seconds
    pub time: f64,
}

/// The assembled piece: instrument tracks plus meter markers.
///
/// Created empty at engine start, grows monotonically as bars are
/// processed, immutable once returned by the assembler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Score {
    /// All instrument tracks, in creation order
    pub tracks: Vec<InstrumentTrack>,
    /// Meter change markers, in time order
    pub meters: Vec<MeterMarker>,
    /// Total elapsed duration in seconds
    pub duration: f64,
}

impl Score {
    /// Total number of notes across all tracks
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32) -> FeatureRow {
        FeatureRow::new(year, 0.5, 0.5, 0.5, 0.5)
    }

    #[test]
    fn test_validate_accepts_ordered_rows() {
        let rows = vec![row(1960), row(1961), row(1962)];
        assert!(validate_rows(&rows).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_input() {
        assert!(matches!(validate_rows(&[]), Err(EngineError::EmptyInput)));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad = FeatureRow::new(1960, 0.5, 1.2, 0.5, 0.5);
        let err = validate_rows(&[bad]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::IndicatorOutOfRange { name: "co2_n", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let bad = FeatureRow::new(1960, f64::NAN, 0.5, 0.5, 0.5);
        let err = validate_rows(&[bad]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::NonFiniteIndicator { name: "temp_n", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_years() {
        let rows = vec![row(1960), row(1960)];
        let err = validate_rows(&rows).unwrap_err();
        assert!(matches!(err, EngineError::UnorderedYears { .. }));
    }

    #[test]
    fn test_note_event_duration() {
        let note = NoteEvent {
            pitch: 60,
            velocity: 100,
            start: 1.0,
            end: 1.5,
        };
        assert!((note.duration() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_voice_role_slots() {
        assert_eq!(VoiceRole::Bass.slot(), 0);
        assert_eq!(VoiceRole::Melody.slot(), 1);
        assert_eq!(VoiceRole::Counter.slot(), 2);
    }
}
