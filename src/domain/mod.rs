//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the rate-area join key (`RateArea`)
//! - raw and normalized lookup tables (`RateAreaRates`, `ZipRateAreas`)
//! - output rows and run configuration (`ResultRow`, `SlcspConfig`)

pub mod types;

pub use types::*;
