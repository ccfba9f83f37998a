//! The SLCSP pipeline: load → normalize → resolve.
//!
//! Kept separate from `app` so the whole run can be driven from tests without
//! touching stdout or the process exit code.

use tracing::info;

use crate::domain::{RateAreaRates, ResultRow, SlcspConfig, ZipRateAreas};
use crate::error::AppError;
use crate::io::ingest::{RowError, load_plans, load_requests, load_zips};
use crate::rates::{Resolution, normalize_rate_areas, normalize_zip_rate_areas, resolve_requests};
use crate::report::{LoadStats, RunSummary, summarize};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub resolutions: Vec<Resolution>,
    pub rows: Vec<ResultRow>,
    pub stats: LoadStats,
    pub summary: RunSummary,
    pub row_errors: Vec<RowError>,
}

/// Load the three input tables named in `config` and resolve every request.
pub fn run_slcsp(config: &SlcspConfig) -> Result<RunOutput, AppError> {
    // 1) Load raw tables.
    let plans = load_plans(&config.plans_path, &config.metal_level, config.strict)?;
    let zips = load_zips(&config.zips_path, config.strict)?;
    let requests = load_requests(&config.requests_path)?;

    // 2) Normalize. Areas and ZIPs that lost rows on ingest must not resolve
    // from the rows that survived.
    let stats = LoadStats::from_tables(&plans, &zips);
    let rates = normalize_rate_areas(&plans.rates).with_incomplete(plans.incomplete_areas);
    let zip_areas = normalize_zip_rate_areas(&zips.areas).with_incomplete(zips.incomplete_zips);
    info!(rate_areas = rates.len(), zipcodes = zip_areas.len(), "normalized tables");

    let mut row_errors = plans.row_errors;
    row_errors.extend(zips.row_errors);

    // 3) Resolve in request order.
    Ok(resolve_all(&requests, &zip_areas, &rates, stats, row_errors))
}

/// Resolve `requests` against already-normalized tables.
pub fn resolve_all(
    requests: &[String],
    zips: &ZipRateAreas,
    rates: &RateAreaRates,
    stats: LoadStats,
    row_errors: Vec<RowError>,
) -> RunOutput {
    let resolutions = resolve_requests(requests, zips, rates);
    let rows = resolutions.iter().map(Resolution::to_row).collect();
    let summary = summarize(&resolutions);
    info!(
        requested = summary.requested,
        resolved = summary.resolved,
        absent = summary.absent_total(),
        "resolved requests"
    );

    RunOutput {
        resolutions,
        rows,
        stats,
        summary,
        row_errors,
    }
}
