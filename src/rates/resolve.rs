//! Per-ZIP second-lowest-cost lookup.
//!
//! A ZIP resolves only when it is well formed, known, sits in exactly one rate
//! area, and that area has at least two distinct rates. Every other case is an
//! [`Absence`]; nothing here returns an error or panics.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::domain::{RateAreaRates, ResultRow, ZipRateAreas};

/// Why a ZIP has no second-lowest rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Absence {
    /// Not exactly five ASCII digits.
    MalformedZip,
    /// Not present in the ZIP table.
    UnknownZip,
    /// A row for this ZIP was skipped on ingest, so its areas are not known.
    IncompleteZip,
    /// Present, but mapped to no rate area.
    NoRateArea,
    /// Spans several rate areas, so no single market applies.
    AmbiguousRateArea { count: usize },
    /// The rate area has no plans of the target tier.
    NoPlanRates,
    /// Fewer than two distinct rates in the rate area.
    TooFewRates { count: usize },
    /// A plan row for the rate area was skipped on ingest.
    IncompleteRates,
}

impl Absence {
    /// Stable label used in logs and the run summary.
    pub fn label(self) -> &'static str {
        match self {
            Absence::MalformedZip => "malformed zip",
            Absence::UnknownZip => "unknown zip",
            Absence::IncompleteZip => "incomplete zip rows",
            Absence::NoRateArea => "no rate area",
            Absence::AmbiguousRateArea { .. } => "ambiguous rate area",
            Absence::NoPlanRates => "no plan rates",
            Absence::TooFewRates { .. } => "too few rates",
            Absence::IncompleteRates => "incomplete plan rows",
        }
    }
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Absence::AmbiguousRateArea { count } => write!(f, "{} ({count} areas)", self.label()),
            Absence::TooFewRates { count } => write!(f, "{} ({count} distinct)", self.label()),
            _ => f.write_str(self.label()),
        }
    }
}

/// The outcome of looking up one requested ZIP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub zipcode: String,
    pub outcome: Result<Decimal, Absence>,
}

impl Resolution {
    pub fn to_row(&self) -> ResultRow {
        ResultRow {
            zipcode: self.zipcode.clone(),
            rate: self.outcome.ok().map(format_rate),
        }
    }
}

/// `true` for exactly five ASCII digits.
///
/// Non-ASCII digits such as `"١١١١١"` are rejected on purpose.
pub fn is_valid_zipcode(zipcode: &str) -> bool {
    zipcode.len() == 5 && zipcode.bytes().all(|b| b.is_ascii_digit())
}

/// Render a rate with exactly two fractional digits, rounding half to even.
pub fn format_rate(rate: Decimal) -> String {
    let rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{rounded:.2}")
}

/// Find the second-lowest distinct rate for `zipcode`, or the reason there is none.
pub fn lookup(zipcode: &str, zips: &ZipRateAreas, rates: &RateAreaRates) -> Result<Decimal, Absence> {
    if !is_valid_zipcode(zipcode) {
        return Err(Absence::MalformedZip);
    }

    if zips.is_incomplete(zipcode) {
        return Err(Absence::IncompleteZip);
    }
    let areas = zips.get(zipcode).ok_or(Absence::UnknownZip)?;

    let mut iter = areas.iter();
    let area = match (iter.next(), iter.next()) {
        (Some(area), None) => area,
        (None, _) => return Err(Absence::NoRateArea),
        (Some(_), Some(_)) => return Err(Absence::AmbiguousRateArea { count: areas.len() }),
    };

    if rates.is_incomplete(area) {
        return Err(Absence::IncompleteRates);
    }
    let area_rates = rates.get(area).ok_or(Absence::NoPlanRates)?;
    match area_rates {
        [] => Err(Absence::NoPlanRates),
        [_] => Err(Absence::TooFewRates { count: 1 }),
        [_, second, ..] => Ok(*second),
    }
}

/// Second-lowest distinct rate for `zipcode`, formatted to two decimals.
///
/// `None` means no rate could be determined; see [`lookup`] for the reason.
pub fn resolve(zipcode: &str, zips: &ZipRateAreas, rates: &RateAreaRates) -> Option<String> {
    lookup(zipcode, zips, rates).ok().map(format_rate)
}

/// Resolve every requested ZIP independently, in request order.
///
/// The output has one entry per request, repeats included.
pub fn resolve_requests(requests: &[String], zips: &ZipRateAreas, rates: &RateAreaRates) -> Vec<Resolution> {
    requests
        .iter()
        .map(|zipcode| {
            let outcome = lookup(zipcode, zips, rates);
            if let Err(reason) = outcome {
                debug!(zipcode = %zipcode, %reason, "no rate");
            }
            Resolution {
                zipcode: zipcode.clone(),
                outcome,
            }
        })
        .collect()
}
