// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI serialization.
//!
//! The sink that turns a finished [`Score`](crate::engine::Score) into
//! a Standard MIDI File. The engine never touches this module; it is
//! the downstream collaborator of the composition pipeline.

pub mod export;

pub use export::MidiSink;
