// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Voice arranger: chord + rhythm + timbre into per-voice notes.
//!
//! Three voices share one bar. The bass walks root and fifth on a
//! sparse onset grid, the melody runs a deterministic index over the
//! in-range chord pitches, and the counter-melody harmonizes a major
//! third below the nearest melody onset. Pitch choice is a pure
//! function of `(row_index, onset_index)`, so identical inputs always
//! reproduce identical lines.

use super::harmony::Chord;
use super::range::InstrumentRange;
use super::rhythm::RhythmPattern;
use super::timbre::TimbreAssignment;
use super::{NoteEvent, VoiceRole};
use crate::music::scale::{nearest_pitch, MidiNote};

/// Gap under which a note (typically a glitch note) is shortened
const SHORT_GAP_BEATS: f64 = 0.2;

/// Sustain factors: bass, melody duration cycle, counter-melody
const BASS_SUSTAIN: f64 = 0.95;
const MELODY_CYCLE: [f64; 4] = [0.4, 0.6, 0.8, 0.95];
const COUNTER_SUSTAIN: f64 = 0.7;

/// Interval the counter-melody sits below the melody (major third)
const HARMONIZE_BELOW: u8 = 4;

/// Everything the arranger needs for one bar
#[derive(Debug)]
pub struct BarContext<'a> {
    /// Chord for this bar
    pub chord: &'a Chord,
    /// Rhythm pattern for this bar
    pub pattern: &'a RhythmPattern,
    /// Instrument and base velocity per voice slot
    pub timbre: &'a TimbreAssignment,
    /// Playable range per voice slot
    pub ranges: [InstrumentRange; 3],
    /// Index of the row driving this bar
    pub row_index: usize,
    /// Bar start time in seconds
    pub bar_start: f64,
    /// Seconds per beat (constant over the piece)
    pub seconds_per_beat: f64,
}

/// Voice arranger
#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceArranger;

impl VoiceArranger {
    /// Arrange all three voices for one bar.
    ///
    /// Returns note events per voice slot, in onset order. A voice
    /// whose subsampled onset set is empty contributes no notes.
    pub fn arrange(&self, ctx: &BarContext<'_>) -> [Vec<NoteEvent>; 3] {
        let melody_onsets = subsample(&ctx.pattern.onsets, VoiceRole::Melody);
        let melody = self.arrange_melody(ctx, &melody_onsets);

        // Counter-melody harmonizes against what the melody just played
        let melody_line: Vec<(f64, MidiNote)> = melody_onsets
            .iter()
            .copied()
            .zip(melody.iter().map(|n| n.pitch))
            .collect();

        [
            self.arrange_bass(ctx),
            melody,
            self.arrange_counter(ctx, &melody_line),
        ]
    }

    fn arrange_bass(&self, ctx: &BarContext<'_>) -> Vec<NoteEvent> {
        let range = ctx.ranges[VoiceRole::Bass.slot()];
        let valid = range.fit_chord(&ctx.chord.pitches);
        let onsets = subsample(&ctx.pattern.onsets, VoiceRole::Bass);

        let mut notes = Vec::with_capacity(onsets.len());
        for (k, &onset) in onsets.iter().enumerate() {
            // Alternate root and fifth across successive onsets
            let raw = if k % 2 == 0 {
                ctx.chord.root
            } else {
                ctx.chord.root.saturating_add(7)
            };
            let target = range.fit(raw).unwrap_or(range.min);
            let Some(pitch) = nearest_pitch(&valid, target) else {
                continue;
            };

            let gap = gap_at(&onsets, k, ctx.pattern.beats_per_bar);
            notes.push(self.note(ctx, VoiceRole::Bass, pitch, onset, gap, BASS_SUSTAIN, k));
        }
        notes
    }

    fn arrange_melody(&self, ctx: &BarContext<'_>, onsets: &[f64]) -> Vec<NoteEvent> {
        let range = ctx.ranges[VoiceRole::Melody.slot()];
        let valid = range.fit_chord(&ctx.chord.pitches);

        let mut notes = Vec::with_capacity(onsets.len());
        for (k, &onset) in onsets.iter().enumerate() {
            let pitch = valid[pitch_index(ctx.row_index, k, valid.len())];
            let gap = gap_at(onsets, k, ctx.pattern.beats_per_bar);
            let sustain = MELODY_CYCLE[k % MELODY_CYCLE.len()];
            notes.push(self.note(ctx, VoiceRole::Melody, pitch, onset, gap, sustain, k));
        }
        notes
    }

    fn arrange_counter(
        &self,
        ctx: &BarContext<'_>,
        melody_line: &[(f64, MidiNote)],
    ) -> Vec<NoteEvent> {
        let range = ctx.ranges[VoiceRole::Counter.slot()];
        let valid = range.fit_chord(&ctx.chord.pitches);
        let onsets = subsample(&ctx.pattern.onsets, VoiceRole::Counter);

        let mut notes = Vec::with_capacity(onsets.len());
        for (k, &onset) in onsets.iter().enumerate() {
            let target = match closest_melody_pitch(melody_line, onset) {
                Some(melody_pitch) => {
                    let below = melody_pitch.saturating_sub(HARMONIZE_BELOW);
                    range.fit(below).unwrap_or(range.min)
                }
                // No melody this bar: fall back to the melody's scheme
                None => valid[pitch_index(ctx.row_index, k, valid.len())],
            };
            let Some(pitch) = nearest_pitch(&valid, target) else {
                continue;
            };

            let gap = gap_at(&onsets, k, ctx.pattern.beats_per_bar);
            notes.push(self.note(ctx, VoiceRole::Counter, pitch, onset, gap, COUNTER_SUSTAIN, k));
        }
        notes
    }

    /// Build one note event with duration and velocity policy applied
    #[allow(clippy::too_many_arguments)]
    fn note(
        &self,
        ctx: &BarContext<'_>,
        role: VoiceRole,
        pitch: MidiNote,
        onset: f64,
        gap: f64,
        sustain: f64,
        onset_index: usize,
    ) -> NoteEvent {
        // Glitch-dense gaps get clipped short regardless of voice
        let sustain = if gap < SHORT_GAP_BEATS { 0.5 } else { sustain };

        let start = ctx.bar_start + onset * ctx.seconds_per_beat;
        let end = start + gap * sustain * ctx.seconds_per_beat;

        let mut velocity = ctx.timbre[role.slot()].base_velocity as f64;
        if ctx.pattern.has_glitch && onset_index % 2 == 0 {
            velocity = (velocity * 1.3).min(127.0);
        }
        let jitter = velocity_jitter(ctx.row_index, onset_index);
        let velocity = (velocity as i16 + jitter).clamp(30, 127) as u8;

        NoteEvent {
            pitch,
            velocity,
            start,
            end,
        }
    }
}

/// Per-voice onset subsampling: bass takes every 3rd onset (every 2nd
/// when fewer than 4 exist), melody all, counter-melody every 2nd
fn subsample(onsets: &[f64], role: VoiceRole) -> Vec<f64> {
    let step = match role {
        VoiceRole::Bass => {
            if onsets.len() < 4 {
                2
            } else {
                3
            }
        }
        VoiceRole::Melody => 1,
        VoiceRole::Counter => 2,
    };
    onsets.iter().copied().step_by(step).collect()
}

/// Gap in beats from onset `k` to the next onset in this voice's
/// sequence; the last note fills to the bar end
fn gap_at(onsets: &[f64], k: usize, beats_per_bar: u8) -> f64 {
    match onsets.get(k + 1) {
        Some(&next) => next - onsets[k],
        None => beats_per_bar as f64 - onsets[k],
    }
}

/// Deterministic pitch index over the valid pitch set
fn pitch_index(row_index: usize, onset_index: usize, len: usize) -> usize {
    (row_index * 5 + onset_index * 3) % len.max(1)
}

/// Small deterministic velocity offset in [-5, +5]
fn velocity_jitter(row_index: usize, onset_index: usize) -> i16 {
    ((row_index * 31 + onset_index * 17) % 11) as i16 - 5
}

/// Melody pitch at the onset closest in time to `onset`
fn closest_melody_pitch(melody_line: &[(f64, MidiNote)], onset: f64) -> Option<MidiNote> {
    melody_line
        .iter()
        .min_by(|a, b| (a.0 - onset).abs().total_cmp(&(b.0 - onset).abs()))
        .map(|&(_, pitch)| pitch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::range::InstrumentFamily;
    use crate::engine::timbre::TimbreSelector;
    use crate::music::scale::{Scale, ScaleType};

    fn chord() -> Chord {
        Chord {
            pitches: vec![52, 56, 59, 64],
            scale: Scale::new(52, ScaleType::MajorPentatonic),
            root: 52,
        }
    }

    fn pattern(onsets: Vec<f64>, has_glitch: bool) -> RhythmPattern {
        RhythmPattern {
            onsets,
            beats_per_bar: 4,
            has_glitch,
            has_metric_shift: false,
        }
    }

    fn context<'a>(
        chord: &'a Chord,
        pattern: &'a RhythmPattern,
        timbre: &'a TimbreAssignment,
    ) -> BarContext<'a> {
        BarContext {
            chord,
            pattern,
            timbre,
            ranges: [
                InstrumentFamily::Bass.default_range(),
                InstrumentFamily::Mid.default_range(),
                InstrumentFamily::High.default_range(),
            ],
            row_index: 3,
            bar_start: 10.0,
            seconds_per_beat: 0.5,
        }
    }

    #[test]
    fn test_subsample_steps() {
        let onsets = vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5];

        let bass = subsample(&onsets, VoiceRole::Bass);
        assert_eq!(bass, vec![0.0, 1.5, 3.0]); // every 3rd of 8

        let melody = subsample(&onsets, VoiceRole::Melody);
        assert_eq!(melody.len(), 8);

        let counter = subsample(&onsets, VoiceRole::Counter);
        assert_eq!(counter.len(), 4);
    }

    #[test]
    fn test_subsample_sparse_bass() {
        let onsets = vec![0.0, 1.3, 2.6];
        let bass = subsample(&onsets, VoiceRole::Bass);
        // Fewer than 4 onsets: every 2nd instead of every 3rd
        assert_eq!(bass.len(), 2);
    }

    #[test]
    fn test_all_pitches_within_voice_ranges() {
        let chord = chord();
        let pattern = pattern(vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5], false);
        let timbre = TimbreSelector.select(0.5);
        let ctx = context(&chord, &pattern, &timbre);

        let voices = VoiceArranger.arrange(&ctx);
        for (slot, notes) in voices.iter().enumerate() {
            for note in notes {
                assert!(
                    ctx.ranges[slot].contains(note.pitch),
                    "slot {slot} pitch {} outside {}",
                    note.pitch,
                    ctx.ranges[slot]
                );
            }
        }
    }

    #[test]
    fn test_notes_have_positive_duration() {
        let chord = chord();
        let pattern = pattern(vec![0.0, 0.1, 0.2, 1.0, 2.0, 3.0], true);
        let timbre = TimbreSelector.select(0.8);
        let ctx = context(&chord, &pattern, &timbre);

        for notes in VoiceArranger.arrange(&ctx) {
            for note in notes {
                assert!(note.start < note.end);
                assert!(note.start >= ctx.bar_start);
            }
        }
    }

    #[test]
    fn test_bass_alternates_root_and_fifth() {
        let chord = Chord {
            pitches: vec![52, 59],
            scale: Scale::new(52, ScaleType::MajorPentatonic),
            root: 52,
        };
        let pattern = pattern(vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5], false);
        let timbre = TimbreSelector.select(0.5);
        let ctx = context(&chord, &pattern, &timbre);

        let bass = &VoiceArranger.arrange(&ctx)[0];
        // Root 52 and fifth 59 already sit inside the bass range
        assert_eq!(bass[0].pitch, 52);
        assert_eq!(bass[1].pitch, 59);
    }

    #[test]
    fn test_melody_is_deterministic() {
        let chord = chord();
        let pattern = pattern(vec![0.0, 1.0, 2.0, 3.0], false);
        let timbre = TimbreSelector.select(0.2);
        let ctx = context(&chord, &pattern, &timbre);

        let a = VoiceArranger.arrange(&ctx);
        let b = VoiceArranger.arrange(&ctx);
        assert_eq!(a[1], b[1]);
    }

    #[test]
    fn test_counter_harmonizes_below_melody() {
        let chord = chord();
        let pattern = pattern(vec![0.0, 1.0, 2.0, 3.0], false);
        let timbre = TimbreSelector.select(0.5);
        let ctx = context(&chord, &pattern, &timbre);

        let voices = VoiceArranger.arrange(&ctx);
        let melody = &voices[1];
        let counter = &voices[2];

        assert_eq!(counter.len(), 2);
        // Counter notes snap to valid chord pitches near melody - 4,
        // possibly octave-shifted into the high range
        let valid = ctx.ranges[2].fit_chord(&chord.pitches);
        for note in counter {
            assert!(valid.contains(&note.pitch));
        }
        assert!(!melody.is_empty());
    }

    #[test]
    fn test_glitch_boosts_alternating_onsets() {
        let chord = chord();
        let glitchy = pattern(vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5], true);
        let calm = pattern(vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5], false);
        let timbre = TimbreSelector.select(0.5);

        let boosted = VoiceArranger.arrange(&context(&chord, &glitchy, &timbre));
        let plain = VoiceArranger.arrange(&context(&chord, &calm, &timbre));

        // Even melody onsets get the 1.3x boost
        assert!(boosted[1][0].velocity > plain[1][0].velocity);
        assert_eq!(boosted[1][1].velocity, plain[1][1].velocity);
    }

    #[test]
    fn test_velocities_clamped() {
        let chord = chord();
        let pattern = pattern(vec![0.0, 0.05, 0.1, 0.15, 2.0, 3.0], true);
        let timbre = TimbreSelector.select(1.0);
        let ctx = context(&chord, &pattern, &timbre);

        for notes in VoiceArranger.arrange(&ctx) {
            for note in notes {
                assert!((30..=127).contains(&note.velocity));
            }
        }
    }

    #[test]
    fn test_empty_onsets_produce_no_notes() {
        let chord = chord();
        let pattern = pattern(vec![], false);
        let timbre = TimbreSelector.select(0.5);
        let ctx = context(&chord, &pattern, &timbre);

        for notes in VoiceArranger.arrange(&ctx) {
            assert!(notes.is_empty());
        }
    }

    #[test]
    fn test_short_gaps_are_halved() {
        let chord = chord();
        // Two onsets 0.1 beats apart: first note's gap is under 0.2
        let pattern = pattern(vec![0.0, 0.1, 2.0], false);
        let timbre = TimbreSelector.select(0.5);
        let ctx = context(&chord, &pattern, &timbre);

        let melody = &VoiceArranger.arrange(&ctx)[1];
        let first_dur = melody[0].duration();
        // 0.1 beats * 0.5 sustain * 0.5 s/beat
        assert!((first_dur - 0.1 * 0.5 * 0.5).abs() < 1e-9);
    }
}
