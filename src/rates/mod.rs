//! Second-lowest-cost plan lookup.
//!
//! Responsibilities:
//!
//! - discard plans outside the target metal tier (`metal`)
//! - dedupe and sort the ingested tables (`normalize`)
//! - resolve each requested ZIP to its second-lowest distinct rate (`resolve`)

pub mod metal;
pub mod normalize;
pub mod resolve;

pub use metal::*;
pub use normalize::*;
pub use resolve::*;
