//! Run summary: how many requests resolved, and why the rest did not.
//!
//! Formatting lives here so the lookup code stays free of presentation.

use std::collections::BTreeMap;

use crate::io::ingest::{PlansTable, RowError, ZipsTable};
use crate::rates::Resolution;

/// Input table sizes after ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub plan_rows: usize,
    pub plans_retained: usize,
    pub rate_areas: usize,
    pub zip_rows: usize,
    pub zipcodes: usize,
    pub skipped_rows: usize,
}

impl LoadStats {
    pub fn from_tables(plans: &PlansTable, zips: &ZipsTable) -> Self {
        Self {
            plan_rows: plans.rows_read,
            plans_retained: plans.rows_retained,
            rate_areas: plans.rates.len(),
            zip_rows: zips.rows_read,
            zipcodes: zips.areas.len(),
            skipped_rows: plans.row_errors.len() + zips.row_errors.len(),
        }
    }
}

/// Resolution counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub requested: usize,
    pub resolved: usize,
    /// Absent results keyed by reason label.
    pub absent: BTreeMap<&'static str, usize>,
}

impl RunSummary {
    pub fn absent_total(&self) -> usize {
        self.absent.values().sum()
    }
}

pub fn summarize(resolutions: &[Resolution]) -> RunSummary {
    let mut summary = RunSummary {
        requested: resolutions.len(),
        ..RunSummary::default()
    };
    for r in resolutions {
        match r.outcome {
            Ok(_) => summary.resolved += 1,
            Err(reason) => *summary.absent.entry(reason.label()).or_default() += 1,
        }
    }
    summary
}

pub fn format_run_summary(stats: &LoadStats, summary: &RunSummary, row_errors: &[RowError]) -> String {
    let mut out = String::new();

    out.push_str("=== slcsp run summary ===\n");
    out.push_str(&format!(
        "Plans: {} rows, {} retained across {} rate areas\n",
        stats.plan_rows, stats.plans_retained, stats.rate_areas
    ));
    out.push_str(&format!(
        "Zips: {} rows, {} distinct zipcodes\n",
        stats.zip_rows, stats.zipcodes
    ));
    out.push_str(&format!(
        "Requests: {} | resolved: {} | absent: {}\n",
        summary.requested,
        summary.resolved,
        summary.absent_total()
    ));
    for (reason, count) in &summary.absent {
        out.push_str(&format!("  {reason}: {count}\n"));
    }

    if stats.skipped_rows > 0 {
        out.push_str(&format!("Skipped rows: {}\n", stats.skipped_rows));
        for err in row_errors.iter().take(10) {
            out.push_str(&format!("  {err}\n"));
        }
        if row_errors.len() > 10 {
            out.push_str(&format!("  ... and {} more\n", row_errors.len() - 10));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::Table;
    use crate::rates::Absence;
    use rust_decimal::Decimal;

    fn resolution(zip: &str, outcome: Result<Decimal, Absence>) -> Resolution {
        Resolution {
            zipcode: zip.to_string(),
            outcome,
        }
    }

    #[test]
    fn summary_counts_absences_by_reason() {
        let resolutions = vec![
            resolution("11111", Ok(Decimal::new(33221, 2))),
            resolution("33333", Err(Absence::AmbiguousRateArea { count: 2 })),
            resolution("44444", Err(Absence::AmbiguousRateArea { count: 3 })),
            resolution("bad", Err(Absence::MalformedZip)),
            resolution("11111", Ok(Decimal::new(33221, 2))),
        ];

        let summary = summarize(&resolutions);

        assert_eq!(summary.requested, 5);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.absent_total(), 3);
        assert_eq!(summary.absent.get("ambiguous rate area"), Some(&2));
        assert_eq!(summary.absent.get("malformed zip"), Some(&1));
    }

    #[test]
    fn formatted_summary_lists_skipped_rows() {
        let stats = LoadStats {
            plan_rows: 3,
            plans_retained: 1,
            rate_areas: 1,
            zip_rows: 2,
            zipcodes: 1,
            skipped_rows: 1,
        };
        let errors = vec![RowError {
            table: Table::Plans,
            line: 3,
            message: "Invalid `rate` 'abc' (expected a plain decimal of at most 28 significant digits).".to_string(),
        }];

        let text = format_run_summary(&stats, &summarize(&[]), &errors);

        assert!(text.contains("Plans: 3 rows, 1 retained across 1 rate areas"));
        assert!(text.contains("Requests: 0 | resolved: 0 | absent: 0"));
        assert!(text.contains("plans line 3: Invalid `rate` 'abc'"));
    }
}
