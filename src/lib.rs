//! `slcsp` library crate.
//!
//! Finds the second-lowest-cost silver plan (SLCSP) rate for a list of ZIP
//! codes from a plans table and a ZIP-to-rate-area table.
//!
//! The binary (`slcsp`) is a thin wrapper around this library so the lookup
//! can be tested without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod rates;
pub mod report;
