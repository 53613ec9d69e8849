// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export for scores.
//!
//! Writes a Type 1 file: one tempo/meter track followed by one MTrk
//! per instrument track, each opening with a track name and a program
//! change. Note times arrive in seconds and are quantized to ticks at
//! the sink's PPQN.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::engine::{InstrumentTrack, Score};

/// A raw MIDI event at an absolute tick
#[derive(Debug, Clone)]
struct MidiExportEvent {
    tick: u64,
    data: Vec<u8>,
}

impl MidiExportEvent {
    fn note_on(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            tick,
            data: vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        }
    }

    fn note_off(tick: u64, channel: u8, note: u8) -> Self {
        Self {
            tick,
            data: vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
        }
    }

    fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self {
            tick,
            data: vec![0xC0 | (channel & 0x0F), program & 0x7F],
        }
    }

    fn tempo(tick: u64, bpm: f64) -> Self {
        let microseconds = (60_000_000.0 / bpm) as u32;
        Self {
            tick,
            data: vec![
                0xFF,
                0x51,
                0x03,
                ((microseconds >> 16) & 0xFF) as u8,
                ((microseconds >> 8) & 0xFF) as u8,
                (microseconds & 0xFF) as u8,
            ],
        }
    }

    fn time_signature(tick: u64, numerator: u8) -> Self {
        // Denominator fixed at quarter-note beats (2^2)
        Self {
            tick,
            data: vec![
                0xFF, 0x58, 0x04, numerator, 2, 24, // MIDI clocks per metronome click
                8,  // 32nd notes per MIDI quarter note
            ],
        }
    }

    fn track_name(tick: u64, name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut data = vec![0xFF, 0x03, bytes.len() as u8];
        data.extend_from_slice(bytes);
        Self { tick, data }
    }

    fn end_of_track() -> Self {
        Self {
            tick: 0,
            data: vec![0xFF, 0x2F, 0x00],
        }
    }
}

/// MIDI file sink for composed scores
#[derive(Debug, Clone)]
pub struct MidiSink {
    /// Ticks per quarter note
    ppqn: u16,
}

impl MidiSink {
    /// Create a sink with the default resolution (480 PPQN)
    pub fn new() -> Self {
        Self { ppqn: 480 }
    }

    /// Create a sink with an explicit resolution
    pub fn with_ppqn(ppqn: u16) -> Self {
        Self { ppqn: ppqn.max(1) }
    }

    /// Get the resolution
    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    /// Serialize a score to a MIDI file at `destination`
    pub fn write<P: AsRef<Path>>(&self, score: &Score, tempo_bpm: f64, destination: P) -> Result<()> {
        let path = destination.as_ref();
        let mut file = File::create(path)
            .with_context(|| format!("failed to create MIDI file {}", path.display()))?;
        self.write_to(score, tempo_bpm, &mut file)
            .with_context(|| format!("failed to write MIDI file {}", path.display()))?;
        info!(
            path = %path.display(),
            tracks = score.tracks.len(),
            notes = score.note_count(),
            "wrote MIDI file"
        );
        Ok(())
    }

    /// Serialize a score into a byte buffer
    pub fn to_bytes(&self, score: &Score, tempo_bpm: f64) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.write_to(score, tempo_bpm, &mut buffer)
            .expect("write to vec should not fail");
        buffer
    }

    /// Convert a time in seconds to ticks at the given tempo
    fn seconds_to_ticks(&self, seconds: f64, tempo_bpm: f64) -> u64 {
        (seconds * tempo_bpm / 60.0 * self.ppqn as f64).round() as u64
    }

    fn write_to<W: Write>(&self, score: &Score, tempo_bpm: f64, writer: &mut W) -> io::Result<()> {
        let num_tracks = score.tracks.len() as u16 + 1; // +1 for tempo track
        self.write_header(writer, num_tracks)?;

        // Tempo/meter track
        let mut meta_events = vec![
            MidiExportEvent::track_name(0, "Tempo"),
            MidiExportEvent::tempo(0, tempo_bpm),
        ];
        for marker in &score.meters {
            let tick = self.seconds_to_ticks(marker.time, tempo_bpm);
            meta_events.push(MidiExportEvent::time_signature(tick, marker.beats_per_bar));
        }
        meta_events.sort_by_key(|e| e.tick);
        self.write_track(writer, &meta_events)?;

        // One MTrk per instrument track; channels cycle, skipping 9 (drums)
        let mut channel = 0u8;
        for track in &score.tracks {
            self.write_instrument_track(writer, track, channel, tempo_bpm)?;
            channel = (channel + 1) % 16;
            if channel == 9 {
                channel = 10;
            }
        }

        Ok(())
    }

    fn write_instrument_track<W: Write>(
        &self,
        writer: &mut W,
        track: &InstrumentTrack,
        channel: u8,
        tempo_bpm: f64,
    ) -> io::Result<()> {
        let mut events = Vec::with_capacity(track.notes.len() * 2 + 2);
        events.push(MidiExportEvent::track_name(0, track.instrument.name()));
        events.push(MidiExportEvent::program_change(
            0,
            channel,
            track.instrument.program(),
        ));

        for note in &track.notes {
            let on = self.seconds_to_ticks(note.start, tempo_bpm);
            let mut off = self.seconds_to_ticks(note.end, tempo_bpm);
            // Quantization must not collapse a note to zero length
            if off <= on {
                off = on + 1;
            }
            events.push(MidiExportEvent::note_on(on, channel, note.pitch, note.velocity));
            events.push(MidiExportEvent::note_off(off, channel, note.pitch));
        }

        events.sort_by_key(|e| e.tick);
        self.write_track(writer, &events)
    }

    fn write_header<W: Write>(&self, writer: &mut W, num_tracks: u16) -> io::Result<()> {
        writer.write_all(b"MThd")?;
        writer.write_all(&[0, 0, 0, 6])?;
        writer.write_all(&1u16.to_be_bytes())?; // Type 1
        writer.write_all(&num_tracks.to_be_bytes())?;
        writer.write_all(&self.ppqn.to_be_bytes())?;
        Ok(())
    }

    fn write_track<W: Write>(&self, writer: &mut W, events: &[MidiExportEvent]) -> io::Result<()> {
        let mut track_data = Vec::new();
        let mut last_tick = 0u64;

        for event in events {
            let delta = event.tick.saturating_sub(last_tick);
            write_variable_length(&mut track_data, delta as u32)?;
            track_data.extend_from_slice(&event.data);
            last_tick = event.tick;
        }

        let end_event = MidiExportEvent::end_of_track();
        write_variable_length(&mut track_data, 0)?;
        track_data.extend_from_slice(&end_event.data);

        writer.write_all(b"MTrk")?;
        writer.write_all(&(track_data.len() as u32).to_be_bytes())?;
        writer.write_all(&track_data)?;
        Ok(())
    }
}

impl Default for MidiSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a MIDI variable-length quantity
fn write_variable_length<W: Write>(writer: &mut W, mut value: u32) -> io::Result<()> {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    writer.write_all(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Instrument, InstrumentTrack, MeterMarker, NoteEvent, VoiceRole};

    fn score() -> Score {
        let mut track = InstrumentTrack::new(Instrument::Clarinet, VoiceRole::Melody);
        track.notes.push(NoteEvent {
            pitch: 60,
            velocity: 100,
            start: 0.0,
            end: 0.5,
        });
        track.notes.push(NoteEvent {
            pitch: 64,
            velocity: 90,
            start: 0.5,
            end: 1.0,
        });

        Score {
            tracks: vec![track],
            meters: vec![MeterMarker {
                beats_per_bar: 4,
                time: 0.0,
            }],
            duration: 2.4,
        }
    }

    #[test]
    fn test_header_framing() {
        let sink = MidiSink::with_ppqn(480);
        let bytes = sink.to_bytes(&score(), 100.0);

        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[8..10], &1u16.to_be_bytes()); // Type 1
        assert_eq!(&bytes[10..12], &2u16.to_be_bytes()); // tempo + 1 track
        assert_eq!(&bytes[12..14], &480u16.to_be_bytes());
        assert_eq!(&bytes[14..18], b"MTrk");
    }

    #[test]
    fn test_tempo_meta_event() {
        let event = MidiExportEvent::tempo(0, 120.0);
        // 120 BPM = 500000 microseconds per beat = 0x07A120
        assert_eq!(&event.data, &[0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
    }

    #[test]
    fn test_time_signature_event() {
        let event = MidiExportEvent::time_signature(0, 7);
        assert_eq!(&event.data[..5], &[0xFF, 0x58, 0x04, 7, 2]);
    }

    #[test]
    fn test_seconds_to_ticks() {
        let sink = MidiSink::with_ppqn(480);
        // One beat at 100 BPM = 0.6 seconds = 480 ticks
        assert_eq!(sink.seconds_to_ticks(0.6, 100.0), 480);
        assert_eq!(sink.seconds_to_ticks(0.0, 100.0), 0);
    }

    #[test]
    fn test_variable_length() {
        let mut buffer = Vec::new();
        write_variable_length(&mut buffer, 0).unwrap();
        assert_eq!(buffer, vec![0x00]);

        buffer.clear();
        write_variable_length(&mut buffer, 127).unwrap();
        assert_eq!(buffer, vec![0x7F]);

        buffer.clear();
        write_variable_length(&mut buffer, 128).unwrap();
        assert_eq!(buffer, vec![0x81, 0x00]);

        buffer.clear();
        write_variable_length(&mut buffer, 16383).unwrap();
        assert_eq!(buffer, vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.mid");

        let sink = MidiSink::new();
        sink.write(&score(), 100.0, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
    }

    #[test]
    fn test_zero_length_notes_get_one_tick() {
        let sink = MidiSink::with_ppqn(1);
        // At 1 PPQN this note quantizes to zero ticks
        let mut track = InstrumentTrack::new(Instrument::Flute, VoiceRole::Melody);
        track.notes.push(NoteEvent {
            pitch: 70,
            velocity: 80,
            start: 0.0,
            end: 0.01,
        });
        let score = Score {
            tracks: vec![track],
            meters: vec![],
            duration: 0.01,
        };

        let bytes = sink.to_bytes(&score, 100.0);
        // Note off must land after note on
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_byte_identical_for_same_score() {
        let sink = MidiSink::new();
        let s = score();
        assert_eq!(sink.to_bytes(&s, 100.0), sink.to_bytes(&s, 100.0));
    }
}
