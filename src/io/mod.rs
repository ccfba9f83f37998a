//! Input/output helpers.
//!
//! - CSV ingest of plans, ZIPs, and requests (`ingest`)
//! - result writers (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
