// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rhythm generator: feature row to onset pattern.
//!
//! The extreme-event index drives note density, odd meters and glitch
//! bursts. Draw order per bar: metric-shift roll (only when
//! `extreme_n > 0.5`), then glitch trigger, burst length and burst
//! position (only when `extreme_n > 0.7`).

use rand::rngs::StdRng;
use rand::Rng;

use super::FeatureRow;

/// Meters a metric shift may select
const SHIFT_METERS: [u8; 4] = [3, 5, 6, 7];

/// Span of a glitch burst, in beats
const GLITCH_SPAN: f64 = 0.5;

/// Onset pattern for one bar
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmPattern {
    /// Beat offsets, ascending, each in [0, beats_per_bar)
    pub onsets: Vec<f64>,
    /// Beats in this bar
    pub beats_per_bar: u8,
    /// A glitch burst was merged into the onsets
    pub has_glitch: bool,
    /// The bar left the default meter
    pub has_metric_shift: bool,
}

/// Configuration for the rhythm generator
#[derive(Debug, Clone)]
pub struct RhythmConfig {
    /// Default beats per bar
    pub default_beats_per_bar: u8,
    /// Fewest onsets per bar (extreme_n = 0.0)
    pub min_notes: usize,
    /// Most base onsets per bar (extreme_n = 1.0)
    pub max_notes: usize,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            default_beats_per_bar: 4,
            min_notes: 4,
            max_notes: 12,
        }
    }
}

/// Rhythm generator
#[derive(Debug, Clone, Default)]
pub struct RhythmGenerator {
    config: RhythmConfig,
}

impl RhythmGenerator {
    /// Create a generator with the given configuration
    pub fn new(config: RhythmConfig) -> Self {
        Self { config }
    }

    /// Base onset count for a row, linear in extreme_n
    pub fn note_count_for(&self, row: &FeatureRow) -> usize {
        let span = (self.config.max_notes - self.config.min_notes + 1) as f64;
        let count = self.config.min_notes + (row.extreme_n * span) as usize;
        count.clamp(self.config.min_notes, self.config.max_notes)
    }

    /// Generate the rhythm pattern for one row
    pub fn generate(&self, row: &FeatureRow, rng: &mut StdRng) -> RhythmPattern {
        let note_count = self.note_count_for(row);

        // Metric shift: odd meters become reachable past the midpoint
        let mut beats_per_bar = self.config.default_beats_per_bar;
        let mut has_metric_shift = false;
        if row.extreme_n > 0.5 && rng.gen::<f64>() < row.extreme_n - 0.5 {
            beats_per_bar = SHIFT_METERS[rng.gen_range(0..SHIFT_METERS.len())];
            has_metric_shift = beats_per_bar != self.config.default_beats_per_bar;
        }

        // Evenly spaced base onsets across the bar
        let beats = beats_per_bar as f64;
        let mut onsets: Vec<f64> = (0..note_count)
            .map(|i| i as f64 * beats / note_count as f64)
            .collect();

        // Glitch burst: a dense cluster of extra onsets
        let mut has_glitch = false;
        if row.extreme_n > 0.7 && rng.gen::<f64>() < row.extreme_n {
            let burst_len = rng.gen_range(3..=8);
            let start = rng.gen::<f64>() * (beats - GLITCH_SPAN);
            let spacing = GLITCH_SPAN / burst_len as f64;
            for i in 0..burst_len {
                onsets.push(start + i as f64 * spacing);
            }
            has_glitch = true;
        }

        onsets.sort_by(f64::total_cmp);
        onsets.dedup();

        RhythmPattern {
            onsets,
            beats_per_bar,
            has_glitch,
            has_metric_shift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn row(extreme_n: f64) -> FeatureRow {
        FeatureRow::new(1960, 0.5, 0.5, 0.5, extreme_n)
    }

    #[test]
    fn test_note_count_interpolation() {
        let gen = RhythmGenerator::default();
        assert_eq!(gen.note_count_for(&row(0.0)), 4);
        assert_eq!(gen.note_count_for(&row(0.5)), 8);
        assert_eq!(gen.note_count_for(&row(1.0)), 12);
    }

    #[test]
    fn test_calm_rows_stay_in_common_time() {
        let gen = RhythmGenerator::default();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            let pattern = gen.generate(&row(0.0), &mut rng);
            assert_eq!(pattern.beats_per_bar, 4);
            assert!(!pattern.has_metric_shift);
            assert!(!pattern.has_glitch);
            assert_eq!(pattern.onsets.len(), 4);
        }
    }

    #[test]
    fn test_onsets_sorted_and_in_bar() {
        let gen = RhythmGenerator::default();
        let mut rng = StdRng::seed_from_u64(2);

        for i in 0..100 {
            let extreme = i as f64 / 100.0;
            let pattern = gen.generate(&row(extreme), &mut rng);

            let beats = pattern.beats_per_bar as f64;
            for window in pattern.onsets.windows(2) {
                assert!(window[0] < window[1], "onsets not strictly ascending");
            }
            for &onset in &pattern.onsets {
                assert!((0.0..beats).contains(&onset), "onset {onset} outside bar");
            }
        }
    }

    #[test]
    fn test_extreme_rows_glitch_eventually() {
        let gen = RhythmGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);

        let glitched = (0..50).any(|_| gen.generate(&row(0.95), &mut rng).has_glitch);
        assert!(glitched, "no glitch in 50 highly extreme bars");
    }

    #[test]
    fn test_glitch_adds_onsets() {
        let gen = RhythmGenerator::default();
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..50 {
            let pattern = gen.generate(&row(0.95), &mut rng);
            if pattern.has_glitch {
                assert!(pattern.onsets.len() > 12 - 8, "burst onsets missing");
                return;
            }
        }
        panic!("no glitch observed");
    }

    #[test]
    fn test_metric_shift_uses_odd_meters() {
        let gen = RhythmGenerator::default();
        let mut rng = StdRng::seed_from_u64(5);

        let mut seen_shift = false;
        for _ in 0..200 {
            let pattern = gen.generate(&row(0.99), &mut rng);
            if pattern.has_metric_shift {
                assert!(SHIFT_METERS.contains(&pattern.beats_per_bar));
                seen_shift = true;
            }
        }
        assert!(seen_shift, "no metric shift in 200 extreme bars");
    }

    #[test]
    fn test_determinism_per_seed() {
        let gen = RhythmGenerator::default();
        let r = row(0.85);

        let a = gen.generate(&r, &mut StdRng::seed_from_u64(9));
        let b = gen.generate(&r, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
