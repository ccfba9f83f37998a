//! Dedupe and sort the ingested tables before lookup.
//!
//! Both normalizers are pure: they read the raw tables and build fresh
//! normalized ones. Running them on already-normalized data changes nothing.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::{RateArea, RateAreaRates, RawRateAreaRates, RawZipRateAreas, ZipRateAreas};

/// Parse a textual rate as an exact decimal.
///
/// `None` for anything that is not plain decimal notation, and for values
/// `Decimal` cannot hold without dropping digits: it silently rounds past 28
/// significant digits, which could move a rate across a rounding boundary.
pub fn parse_rate(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let parsed = Decimal::from_str(raw).ok()?;
    let canonical = canonical_decimal(raw)?;
    (parsed.normalize().abs().to_string() == canonical).then_some(parsed)
}

/// Magnitude of a plain decimal string with redundant zeros removed:
/// `"-0294.500"` → `"294.5"`.
fn canonical_decimal(raw: &str) -> Option<String> {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let int = int.trim_start_matches('0');
    let frac = frac.trim_end_matches('0');
    let mut out = if int.is_empty() { "0".to_string() } else { int.to_string() };
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    Some(out)
}

/// Collapse each rate area's rates into distinct values, ascending.
///
/// Equality is by decimal value, so `"294.0"` and `"294.00"` count once.
/// Rates that do not parse are dropped (the loaders reject them earlier).
pub fn normalize_rate_areas(raw: &RawRateAreaRates) -> RateAreaRates {
    let sets: HashMap<RateArea, BTreeSet<Decimal>> = raw
        .iter()
        .map(|(area, rates)| {
            let set = rates
                .iter()
                .filter_map(|rate| {
                    let parsed = parse_rate(rate);
                    if parsed.is_none() {
                        warn!(rate_area = %area, rate = %rate, "dropping unparseable rate");
                    }
                    parsed
                })
                .collect();
            (area.clone(), set)
        })
        .collect();

    RateAreaRates::from_sets(sets)
}

/// Collapse each ZIP's rate areas into a set of distinct areas.
pub fn normalize_zip_rate_areas(raw: &RawZipRateAreas) -> ZipRateAreas {
    let sets = raw
        .iter()
        .map(|(zipcode, areas)| (zipcode.clone(), areas.iter().cloned().collect()))
        .collect();

    ZipRateAreas::from_sets(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_rates(entries: &[(&str, u32, &[&str])]) -> RawRateAreaRates {
        entries
            .iter()
            .map(|(state, area, rates)| {
                (
                    RateArea::new(*state, *area),
                    rates.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rates_are_distinct_and_ascending() {
        let raw = raw_rates(&[(
            "NY",
            5,
            &["304.5", "422.28", "386.79", "382.7", "332.21", "422.28", "382.7"],
        )]);
        let normalized = normalize_rate_areas(&raw);

        let rates = normalized.get(&RateArea::new("NY", 5)).unwrap();
        let expected: Vec<Decimal> = ["304.5", "332.21", "382.7", "386.79", "422.28"]
            .into_iter()
            .map(dec)
            .collect();
        assert_eq!(rates, expected.as_slice());
    }

    #[test]
    fn sorting_is_numeric_not_lexicographic() {
        let raw = raw_rates(&[("WI", 2, &["1000.00", "99.5", "250"])]);
        let normalized = normalize_rate_areas(&raw);

        let rates = normalized.get(&RateArea::new("WI", 2)).unwrap();
        assert_eq!(rates, &[dec("99.5"), dec("250"), dec("1000.00")]);
    }

    #[test]
    fn equal_values_with_different_scale_dedupe() {
        let raw = raw_rates(&[("FL", 63, &["294.0", "294.00", "294", "0294.000"])]);
        let normalized = normalize_rate_areas(&raw);

        assert_eq!(normalized.get(&RateArea::new("FL", 63)).unwrap().len(), 1);
    }

    #[test]
    fn parse_rate_keeps_every_digit_or_rejects() {
        assert_eq!(parse_rate("294.005"), Some(dec("294.005")));
        assert_eq!(parse_rate(" -0.50 "), Some(dec("-0.5")));
        assert_eq!(parse_rate("294.00500000"), Some(dec("294.005")));

        // 31 significant digits: more than `Decimal` holds.
        assert_eq!(parse_rate("294.0050000000000000000000000001"), None);
        assert_eq!(parse_rate("1_000"), None);
        assert_eq!(parse_rate("2.94e2"), None);
        assert_eq!(parse_rate("."), None);
    }

    #[test]
    fn empty_rate_list_stays_empty() {
        let raw = raw_rates(&[("CA", 7, &[])]);
        let normalized = normalize_rate_areas(&raw);

        assert_eq!(normalized.get(&RateArea::new("CA", 7)), Some(&[][..]));
    }

    #[test]
    fn unparseable_rates_are_dropped() {
        let raw = raw_rates(&[("CA", 7, &["n/a", "310.12", ""])]);
        let normalized = normalize_rate_areas(&raw);

        assert_eq!(normalized.get(&RateArea::new("CA", 7)).unwrap(), &[dec("310.12")]);
    }

    #[test]
    fn normalizing_rates_twice_is_a_no_op() {
        let raw = raw_rates(&[
            ("NY", 5, &["304.5", "422.28", "304.50", "332.21"]),
            ("WI", 2, &["10", "9.99"]),
        ]);
        let once = normalize_rate_areas(&raw);

        let as_raw: RawRateAreaRates = once
            .iter()
            .map(|(area, rates)| (area.clone(), rates.iter().map(Decimal::to_string).collect()))
            .collect();
        let twice = normalize_rate_areas(&as_raw);

        assert_eq!(once, twice);
    }

    #[test]
    fn zip_rate_areas_are_deduplicated() {
        let ny = RateArea::new("NY", 5);
        let wi = RateArea::new("WI", 2);
        let ca = RateArea::new("CA", 7);

        let raw: RawZipRateAreas = [
            ("11111", vec![ny.clone()]),
            ("33333", vec![wi.clone(), ny.clone()]),
            ("44444", vec![wi.clone(), wi.clone()]),
            ("77777", vec![wi.clone(), wi.clone(), ny.clone(), ny.clone(), ca.clone()]),
        ]
        .into_iter()
        .map(|(zip, areas)| (zip.to_string(), areas))
        .collect();

        let normalized = normalize_zip_rate_areas(&raw);

        assert_eq!(normalized.get("11111").unwrap().len(), 1);
        assert_eq!(normalized.get("33333").unwrap().len(), 2);
        assert_eq!(normalized.get("44444").unwrap().iter().collect::<Vec<_>>(), vec![&wi]);
        assert_eq!(normalized.get("77777").unwrap().len(), 3);
    }

    #[test]
    fn normalizing_zips_twice_is_a_no_op() {
        let raw: RawZipRateAreas = [(
            "55555".to_string(),
            vec![RateArea::new("WI", 2), RateArea::new("WI", 2), RateArea::new("NY", 5)],
        )]
        .into_iter()
        .collect();
        let once = normalize_zip_rate_areas(&raw);

        let as_raw: RawZipRateAreas = once
            .iter()
            .map(|(zip, areas)| (zip.clone(), areas.iter().cloned().collect()))
            .collect();

        assert_eq!(normalize_zip_rate_areas(&as_raw), once);
    }
}
