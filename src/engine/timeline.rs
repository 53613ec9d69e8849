// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline assembler: sequences bars into a score.
//!
//! One feature row becomes one bar. Per bar the assembler runs the
//! harmony, rhythm and timbre generators, resolves the three voice
//! slots to instrument tracks (reused while the instrument identity
//! holds, replaced on change), delegates note construction to the
//! voice arranger, and advances the time cursor by the bar's real
//! duration. The assembler owns the only mutable state in the engine:
//! the cursor and the open-track table.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use tracing::{debug, warn};

use super::harmony::{HarmonyConfig, HarmonyGenerator};
use super::range::{InstrumentFamily, InstrumentRange};
use super::rhythm::{RhythmConfig, RhythmGenerator, RhythmPattern};
use super::timbre::TimbreSelector;
use super::voices::{BarContext, VoiceArranger};
use super::{FeatureRow, InstrumentTrack, MeterMarker, Score, VoiceRole};

/// Meters the target format accepts; anything else recovers to 4/4
const SUPPORTED_METERS: [u8; 5] = [3, 4, 5, 6, 7];

/// Engine-wide configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tempo in beats per minute; seconds-per-beat is constant for
    /// the whole timeline
    pub tempo_bpm: f64,
    /// Harmony generator settings
    pub harmony: HarmonyConfig,
    /// Rhythm generator settings
    pub rhythm: RhythmConfig,
    /// Per-family range overrides; families absent here keep their
    /// built-in bounds
    pub instrument_ranges: BTreeMap<InstrumentFamily, InstrumentRange>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: 100.0,
            harmony: HarmonyConfig::default(),
            rhythm: RhythmConfig::default(),
            instrument_ranges: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Seconds per beat at the configured tempo
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo_bpm
    }

    /// Playable range for a family, honoring any configured override
    pub fn range_for(&self, family: InstrumentFamily) -> InstrumentRange {
        self.instrument_ranges
            .get(&family)
            .copied()
            .unwrap_or_else(|| family.default_range())
    }
}

/// Timeline assembler
pub struct TimelineAssembler {
    config: EngineConfig,
    harmony: HarmonyGenerator,
    rhythm: RhythmGenerator,
    timbre: TimbreSelector,
    arranger: VoiceArranger,
    rng: StdRng,
    /// Time cursor in seconds, non-decreasing
    cursor: f64,
    /// Open track per voice slot, as an index into the score's tracks
    open_tracks: [Option<usize>; 3],
    score: Score,
}

impl TimelineAssembler {
    /// Create an assembler with an injected random source.
    ///
    /// All stochastic choices in the pipeline draw from this one
    /// generator, so a fixed seed reproduces the piece byte for byte.
    pub fn new(config: EngineConfig, rng: StdRng) -> Self {
        let harmony = HarmonyGenerator::new(config.harmony.clone());
        let rhythm = RhythmGenerator::new(config.rhythm.clone());
        Self {
            config,
            harmony,
            rhythm,
            timbre: TimbreSelector,
            arranger: VoiceArranger,
            rng,
            cursor: 0.0,
            open_tracks: [None; 3],
            score: Score::default(),
        }
    }

    /// Current cursor position in seconds
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Compose the full timeline from validated rows.
    ///
    /// Consumes the assembler; the returned score is final.
    pub fn compose(mut self, rows: &[FeatureRow]) -> Score {
        for (row_index, row) in rows.iter().enumerate() {
            self.process_bar(row_index, row);
        }
        self.score.duration = self.cursor;
        debug!(
            tracks = self.score.tracks.len(),
            notes = self.score.note_count(),
            duration = self.score.duration,
            "timeline complete"
        );
        self.score
    }

    /// Process one row into one bar
    fn process_bar(&mut self, row_index: usize, row: &FeatureRow) {
        // Draw order: harmony first, then rhythm; timbre draws nothing
        let chord = self.harmony.generate(row, &mut self.rng);
        let mut pattern = self.rhythm.generate(row, &mut self.rng);
        let timbre = self.timbre.select(row.ice_n);

        pattern.beats_per_bar = self.resolve_meter(row.year, &pattern);
        self.mark_meter(pattern.beats_per_bar);

        // Resolve the three voice slots to tracks
        let mut ranges = [InstrumentRange::new(0, 127); 3];
        let mut track_indices = [0usize; 3];
        for role in VoiceRole::ALL {
            let slot = role.slot();
            let instrument = timbre[slot].instrument;
            track_indices[slot] = self.resolve_track(slot, role, instrument);
            ranges[slot] = self.config.range_for(instrument.family());
        }

        let ctx = BarContext {
            chord: &chord,
            pattern: &pattern,
            timbre: &timbre,
            ranges,
            row_index,
            bar_start: self.cursor,
            seconds_per_beat: self.config.seconds_per_beat(),
        };
        let voices = self.arranger.arrange(&ctx);

        for (slot, notes) in voices.into_iter().enumerate() {
            self.score.tracks[track_indices[slot]].notes.extend(notes);
        }

        self.cursor += pattern.beats_per_bar as f64 * self.config.seconds_per_beat();
    }

    /// Validate a bar's meter, recovering to 4/4 on unsupported values
    fn resolve_meter(&self, year: i32, pattern: &RhythmPattern) -> u8 {
        if SUPPORTED_METERS.contains(&pattern.beats_per_bar) {
            pattern.beats_per_bar
        } else {
            warn!(
                year,
                beats_per_bar = pattern.beats_per_bar,
                "unsupported meter, falling back to 4/4"
            );
            4
        }
    }

    /// Append a meter marker when the meter changes
    fn mark_meter(&mut self, beats_per_bar: u8) {
        let changed = self
            .score
            .meters
            .last()
            .map_or(true, |m| m.beats_per_bar != beats_per_bar);
        if changed {
            self.score.meters.push(MeterMarker {
                beats_per_bar,
                time: self.cursor,
            });
        }
    }

    /// Reuse the slot's open track while its instrument matches;
    /// otherwise open a new track and make it current
    fn resolve_track(
        &mut self,
        slot: usize,
        role: VoiceRole,
        instrument: super::Instrument,
    ) -> usize {
        if let Some(index) = self.open_tracks[slot] {
            if self.score.tracks[index].instrument == instrument {
                return index;
            }
            debug!(
                slot,
                from = %self.score.tracks[index].instrument,
                to = %instrument,
                "program change, opening new track"
            );
        }

        self.score.tracks.push(InstrumentTrack::new(instrument, role));
        let index = self.score.tracks.len() - 1;
        self.open_tracks[slot] = Some(index);
        index
    }
}
