// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timbre selector: feature row to instrument palette and dynamics.
//!
//! Selection depends only on the sea-ice indicator. Convention adopted
//! here: higher `ice_n` means less ice, which maps to a darker palette
//! and louder base dynamics. Low `ice_n` bars sound bright and light.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::range::InstrumentFamily;

/// Instrument identities the engine can assign.
///
/// Each carries a General MIDI program number and an explicit range
/// family tag; no name inspection happens anywhere downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    AcousticBass,
    WarmPad,
    Flute,
    StringEnsemble,
    Clarinet,
    NewAgePad,
    Contrabass,
    SynthBass,
    SynthStrings,
}

impl Instrument {
    /// General MIDI program number (0-based)
    pub fn program(self) -> u8 {
        match self {
            Instrument::AcousticBass => 32,
            Instrument::WarmPad => 89,
            Instrument::Flute => 73,
            Instrument::StringEnsemble => 48,
            Instrument::Clarinet => 71,
            Instrument::NewAgePad => 88,
            Instrument::Contrabass => 43,
            Instrument::SynthBass => 38,
            Instrument::SynthStrings => 50,
        }
    }

    /// Range family this instrument belongs to
    pub fn family(self) -> InstrumentFamily {
        match self {
            Instrument::AcousticBass | Instrument::Contrabass => InstrumentFamily::Bass,
            Instrument::SynthBass => InstrumentFamily::Synth,
            Instrument::StringEnsemble | Instrument::SynthStrings => InstrumentFamily::LowMid,
            Instrument::WarmPad | Instrument::Clarinet | Instrument::NewAgePad => {
                InstrumentFamily::Mid
            }
            Instrument::Flute => InstrumentFamily::High,
        }
    }

    /// Display name, as written into MIDI track names
    pub fn name(self) -> &'static str {
        match self {
            Instrument::AcousticBass => "Acoustic Bass",
            Instrument::WarmPad => "Warm Pad",
            Instrument::Flute => "Flute",
            Instrument::StringEnsemble => "String Ensemble",
            Instrument::Clarinet => "Clarinet",
            Instrument::NewAgePad => "New Age Pad",
            Instrument::Contrabass => "Contrabass",
            Instrument::SynthBass => "Synth Bass",
            Instrument::SynthStrings => "Synth Strings",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Instrument and base dynamics for one voice slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceTimbre {
    /// Instrument identity
    pub instrument: Instrument,
    /// Base velocity before per-note variation
    pub base_velocity: u8,
}

/// Ordered 3-voice assignment: bass, melody, counter-melody
pub type TimbreAssignment = [VoiceTimbre; 3];

/// Velocity tier spans per voice slot: (low, span), velocity =
/// low + ice_n * span
const VELOCITY_TIERS: [(f64, f64); 3] = [(50.0, 60.0), (40.0, 50.0), (60.0, 40.0)];

/// Timbre selector
#[derive(Debug, Clone, Copy, Default)]
pub struct TimbreSelector;

impl TimbreSelector {
    /// Instrument palette for a row, thresholded on ice_n
    pub fn palette_for(&self, ice_n: f64) -> [Instrument; 3] {
        if ice_n < 0.33 {
            // Plenty of ice: bright, high-register palette
            [
                Instrument::AcousticBass,
                Instrument::WarmPad,
                Instrument::Flute,
            ]
        } else if ice_n < 0.66 {
            [
                Instrument::StringEnsemble,
                Instrument::Clarinet,
                Instrument::NewAgePad,
            ]
        } else {
            // Ice loss: dark, low-register palette
            [
                Instrument::Contrabass,
                Instrument::SynthBass,
                Instrument::SynthStrings,
            ]
        }
    }

    /// Select the 3-voice timbre assignment for a row
    pub fn select(&self, ice_n: f64) -> TimbreAssignment {
        let palette = self.palette_for(ice_n);
        let mut voices = [VoiceTimbre {
            instrument: palette[0],
            base_velocity: 0,
        }; 3];

        for (slot, voice) in voices.iter_mut().enumerate() {
            let (low, span) = VELOCITY_TIERS[slot];
            voice.instrument = palette[slot];
            voice.base_velocity = (low + ice_n * span) as u8;
        }
        voices
    }
}
