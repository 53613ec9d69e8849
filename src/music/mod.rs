// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for terratone.
//!
//! This module provides the pentatonic scale definitions and pitch
//! helpers used by the composition engine.

pub mod scale;

pub use scale::{MidiNote, Scale, ScaleType};
