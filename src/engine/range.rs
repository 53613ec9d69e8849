// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Instrument range mapping.
//!
//! Every instrument belongs to a closed range family with fixed
//! playable bounds. Pitches are transposed into range by octave
//! shifts; a pitch that cannot reach the range is discarded, and a
//! chord that loses every pitch gets a synthetic fallback scale so a
//! voice never falls silent for range reasons alone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::music::scale::MidiNote;

/// Range families instruments are classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentFamily {
    Bass,
    LowMid,
    Mid,
    High,
    Synth,
}

impl InstrumentFamily {
    /// Default playable bounds for this family
    pub fn default_range(self) -> InstrumentRange {
        let (min, max) = match self {
            InstrumentFamily::Bass => (28, 60),
            InstrumentFamily::LowMid => (40, 72),
            InstrumentFamily::Mid => (48, 76),
            InstrumentFamily::High => (60, 84),
            InstrumentFamily::Synth => (36, 72),
        };
        InstrumentRange { min, max }
    }
}

impl fmt::Display for InstrumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentFamily::Bass => "bass",
            InstrumentFamily::LowMid => "low-mid",
            InstrumentFamily::Mid => "mid",
            InstrumentFamily::High => "high",
            InstrumentFamily::Synth => "synth",
        };
        write!(f, "{name}")
    }
}

/// Playable pitch interval of an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRange {
    /// Lowest playable pitch
    pub min: MidiNote,
    /// Highest playable pitch
    pub max: MidiNote,
}

impl InstrumentRange {
    /// Create a range; `min` must be below `max`
    pub fn new(min: MidiNote, max: MidiNote) -> Self {
        debug_assert!(min < max);
        Self { min, max }
    }

    /// Check containment
    pub fn contains(&self, pitch: MidiNote) -> bool {
        (self.min..=self.max).contains(&pitch)
    }

    /// Transpose a pitch into range by octave shifts.
    ///
    /// Returns `None` when no octave of the pitch lands inside the
    /// range (range narrower than the needed shift).
    pub fn fit(&self, pitch: MidiNote) -> Option<MidiNote> {
        let mut p = pitch as i16;
        let (min, max) = (self.min as i16, self.max as i16);

        while p < min {
            p += 12;
        }
        while p > max {
            p -= 12;
        }

        if p >= min && p <= max {
            Some(p as MidiNote)
        } else {
            None
        }
    }

    /// Transpose a whole chord into range, dropping unreachable
    /// pitches. The result is deduplicated and sorted ascending; an
    /// empty result is replaced by [`InstrumentRange::fallback_scale`].
    pub fn fit_chord(&self, pitches: &[MidiNote]) -> Vec<MidiNote> {
        let mut fitted: Vec<MidiNote> = pitches.iter().filter_map(|&p| self.fit(p)).collect();
        fitted.sort_unstable();
        fitted.dedup();

        if fitted.is_empty() {
            tracing::warn!(min = self.min, max = self.max, "empty chord after range mapping, using fallback scale");
            return self.fallback_scale();
        }
        fitted
    }

    /// Synthetic ascending scale of even-numbered pitches from `min`,
    /// spanning at most 24 semitones
    pub fn fallback_scale(&self) -> Vec<MidiNote> {
        let top = self.max.min(self.min.saturating_add(24));
        (self.min..=top).step_by(2).collect()
    }
}

impl fmt::Display for InstrumentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_ranges_are_ordered() {
        for family in [
            InstrumentFamily::Bass,
            InstrumentFamily::LowMid,
            InstrumentFamily::Mid,
            InstrumentFamily::High,
            InstrumentFamily::Synth,
        ] {
            let range = family.default_range();
            assert!(range.min < range.max);
        }
    }

    #[test]
    fn test_fit_transposes_down_into_bass() {
        let range = InstrumentFamily::Bass.default_range();
        // 72 -> 60 (one octave down lands on the ceiling)
        assert_eq!(range.fit(72), Some(60));
        // 84 -> 60 after two octaves
        assert_eq!(range.fit(84), Some(60));
    }

    #[test]
    fn test_fit_transposes_up_into_high() {
        let range = InstrumentFamily::High.default_range();
        assert_eq!(range.fit(48), Some(60));
        assert_eq!(range.fit(30), Some(66));
    }

    #[test]
    fn test_fit_keeps_in_range_pitches() {
        let range = InstrumentRange::new(48, 76);
        assert_eq!(range.fit(60), Some(60));
    }

    #[test]
    fn test_fit_rejects_unreachable_pitch() {
        // Range narrower than an octave: some pitch classes can't land
        let range = InstrumentRange::new(60, 65);
        assert_eq!(range.fit(67), None);
        assert_eq!(range.fit(62), Some(62));
    }

    #[test]
    fn test_fit_chord_sorted_unique() {
        let range = InstrumentFamily::Mid.default_range();
        let fitted = range.fit_chord(&[84, 48, 60, 72, 60]);

        let mut expected = fitted.clone();
        expected.sort_unstable();
        expected.dedup();
        assert_eq!(fitted, expected);
        assert!(fitted.iter().all(|&p| range.contains(p)));
    }

    #[test]
    fn test_fit_chord_empty_falls_back() {
        let range = InstrumentRange::new(60, 65);
        // 67 and 79 share a pitch class outside the narrow range
        let fitted = range.fit_chord(&[67, 79]);
        assert_eq!(fitted, range.fallback_scale());
        assert!(!fitted.is_empty());
    }

    #[test]
    fn test_fallback_scale_span() {
        let range = InstrumentRange::new(28, 60);
        let fallback = range.fallback_scale();

        assert_eq!(fallback[0], 28);
        assert!(fallback.iter().all(|&p| p <= 52)); // 28 + 24
        for window in fallback.windows(2) {
            assert_eq!(window[1] - window[0], 2);
        }
    }
}
