//! Shared domain types.
//!
//! This module defines:
//!
//! - the join key between plans and ZIP codes (`RateArea`)
//! - raw (as-ingested) and normalized lookup tables
//! - per-ZIP output rows (`ResultRow`)
//! - run configuration (`SlcspConfig`)

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// Metal tier the resolver prices against unless configured otherwise.
pub const DEFAULT_METAL_LEVEL: &str = "Silver";

/// A pricing region: `(state, numeric area code)`.
///
/// Area codes compare numerically, so `("NY", "05")` and `("NY", "5")` are the
/// same rate area.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RateArea {
    pub state: String,
    pub area: u32,
}

impl RateArea {
    pub fn new(state: impl Into<String>, area: u32) -> Self {
        Self {
            state: state.into(),
            area,
        }
    }
}

impl fmt::Display for RateArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.state, self.area)
    }
}

/// Plan rates per rate area exactly as ingested: unsorted, possibly repeated,
/// still in their textual form.
pub type RawRateAreaRates = HashMap<RateArea, Vec<String>>;

/// Rate areas per ZIP exactly as ingested (a ZIP listed once per county).
pub type RawZipRateAreas = HashMap<String, Vec<RateArea>>;

/// Distinct plan rates per rate area, ascending by decimal value.
///
/// Built once by `rates::normalize_rate_areas` and never mutated afterwards.
///
/// Areas that lost a plan row on ingest are marked incomplete: with a rate
/// missing, the second-lowest of what remains may be the wrong plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateAreaRates {
    rates: HashMap<RateArea, Vec<Decimal>>,
    incomplete: HashSet<RateArea>,
}

impl RateAreaRates {
    /// Build from per-area sets; a `BTreeSet` already holds distinct values in
    /// ascending order.
    pub fn from_sets(sets: HashMap<RateArea, BTreeSet<Decimal>>) -> Self {
        let rates = sets
            .into_iter()
            .map(|(area, set)| (area, set.into_iter().collect()))
            .collect();
        Self {
            rates,
            incomplete: HashSet::new(),
        }
    }

    pub fn with_incomplete(mut self, areas: impl IntoIterator<Item = RateArea>) -> Self {
        self.incomplete.extend(areas);
        self
    }

    pub fn get(&self, area: &RateArea) -> Option<&[Decimal]> {
        self.rates.get(area).map(Vec::as_slice)
    }

    pub fn is_incomplete(&self, area: &RateArea) -> bool {
        self.incomplete.contains(area)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RateArea, &[Decimal])> {
        self.rates.iter().map(|(area, rates)| (area, rates.as_slice()))
    }
}

/// Distinct rate areas per ZIP code.
///
/// Only the cardinality of each set matters to the resolver: a ZIP in more than
/// one rate area cannot be priced. A ZIP that lost a row on ingest is marked
/// incomplete, since the dropped row may have named a second area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipRateAreas {
    zips: HashMap<String, BTreeSet<RateArea>>,
    incomplete: HashSet<String>,
}

impl ZipRateAreas {
    pub fn from_sets(zips: HashMap<String, BTreeSet<RateArea>>) -> Self {
        Self {
            zips,
            incomplete: HashSet::new(),
        }
    }

    pub fn with_incomplete(mut self, zipcodes: impl IntoIterator<Item = String>) -> Self {
        self.incomplete.extend(zipcodes);
        self
    }

    pub fn get(&self, zipcode: &str) -> Option<&BTreeSet<RateArea>> {
        self.zips.get(zipcode)
    }

    pub fn is_incomplete(&self, zipcode: &str) -> bool {
        self.incomplete.contains(zipcode)
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<RateArea>)> {
        self.zips.iter()
    }
}

/// One output line: the requested ZIP and its SLCSP rate, if one exists.
///
/// `rate` is already formatted to two decimal places. An absent rate is written
/// as an empty value, never `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub zipcode: String,
    #[serde(serialize_with = "absent_as_empty")]
    pub rate: Option<String>,
}

impl ResultRow {
    pub fn rate_or_empty(&self) -> &str {
        self.rate.as_deref().unwrap_or("")
    }
}

fn absent_as_empty<S: Serializer>(rate: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(rate.as_deref().unwrap_or(""))
}

/// Serialization of the result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Header labels for the CSV output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFields {
    pub zipcode: String,
    pub rate: String,
}

impl Default for OutputFields {
    fn default() -> Self {
        Self {
            zipcode: "zipcode".to_string(),
            rate: "rate".to_string(),
        }
    }
}

/// Full configuration for a single run.
#[derive(Debug, Clone)]
pub struct SlcspConfig {
    pub plans_path: PathBuf,
    pub zips_path: PathBuf,
    pub requests_path: PathBuf,
    /// `None` writes to stdout.
    pub output_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub output_fields: OutputFields,
    /// Plans whose metal level does not match this label are discarded on load.
    pub metal_level: String,
    /// Treat malformed input rows as fatal instead of skipping them.
    pub strict: bool,
    pub summary: bool,
}
