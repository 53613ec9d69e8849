// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Climate data pipeline.
//!
//! This module provides the three stages that run before the engine:
//! - CSV ingestion and year-keyed merging
//! - preprocessing (interpolation, smoothing, quantile clipping)
//! - normalization into [0,1] feature rows
//!
//! Missing readings are carried as NaN between stages and resolved by
//! interpolation; nothing downstream of [`normalize`] ever sees one.

pub mod ingest;
pub mod normalize;
pub mod preprocess;

pub use ingest::{load_all_data, ClimateTable};
pub use normalize::{normalize, subsample_rows};
pub use preprocess::preprocess;
