// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale system for harmonic derivation.
//!
//! Provides the two pentatonic pitch-class sets the engine composes
//! with, candidate pitch-pool construction over a fixed octave band,
//! and nearest-pitch snapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Scale types supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    MajorPentatonic,
    MinorPentatonic,
}

impl ScaleType {
    /// Get the intervals (semitones from root) for this scale type
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
        }
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::MajorPentatonic => "Major Pentatonic",
            ScaleType::MinorPentatonic => "Minor Pentatonic",
        }
    }

    /// Get the parallel scale type
    pub fn parallel(self) -> Self {
        match self {
            ScaleType::MajorPentatonic => ScaleType::MinorPentatonic,
            ScaleType::MinorPentatonic => ScaleType::MajorPentatonic,
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A scale rooted on a concrete MIDI pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    root: MidiNote,
    scale_type: ScaleType,
}

impl Scale {
    /// Create a new scale from root pitch and type
    pub fn new(root: MidiNote, scale_type: ScaleType) -> Self {
        Self { root, scale_type }
    }

    /// Get the root pitch
    pub fn root(&self) -> MidiNote {
        self.root
    }

    /// Get the scale type
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Get the intervals (semitones from root)
    pub fn intervals(&self) -> &'static [u8] {
        self.scale_type.intervals()
    }

    /// Check if a MIDI note's pitch class belongs to this scale
    pub fn contains_midi(&self, midi_note: MidiNote) -> bool {
        let pc = (midi_note as i16 - self.root as i16).rem_euclid(12) as u8;
        self.intervals().contains(&pc)
    }

    /// Build the candidate pitch pool: every scale degree over `octaves`
    /// octave offsets above the root, kept within `[low, high]`.
    pub fn pitch_pool(&self, octaves: u8, low: MidiNote, high: MidiNote) -> Vec<MidiNote> {
        let mut pool = Vec::new();
        for octave in 0..=octaves as i16 {
            for &degree in self.intervals() {
                let pitch = self.root as i16 + degree as i16 + 12 * octave;
                if pitch >= low as i16 && pitch <= high as i16 {
                    pool.push(pitch as MidiNote);
                }
            }
        }
        pool
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.scale_type, self.root)
    }
}

/// Find the pitch in `pitches` nearest to `target`.
///
/// Ties resolve to the lower pitch. Returns `None` on an empty slice.
pub fn nearest_pitch(pitches: &[MidiNote], target: MidiNote) -> Option<MidiNote> {
    pitches
        .iter()
        .copied()
        .min_by_key(|&p| ((p as i16 - target as i16).abs(), p))
}
