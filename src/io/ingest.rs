//! CSV ingest for the three input tables.
//!
//! Each loader turns one CSV file into the raw in-memory structure the
//! normalizers consume:
//!
//! - plans → rates per rate area (target metal tier only)
//! - zips → rate areas per ZIP
//! - slcsp → the ordered list of requested ZIPs
//!
//! Headers are matched case-insensitively (BOM stripped). Missing required
//! columns are fatal. Malformed rows are skipped and reported, or fatal under
//! `strict`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{RateArea, RawRateAreaRates, RawZipRateAreas};
use crate::error::AppError;
use crate::rates::{matches_metal_level, parse_rate};

/// Which input table a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Plans,
    Zips,
    Requests,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Plans => "plans",
            Table::Zips => "zips",
            Table::Requests => "slcsp",
        })
    }
}

/// A row skipped during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub table: Table,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}: {}", self.table, self.line, self.message)
    }
}

/// Plans ingest output.
#[derive(Debug, Clone, Default)]
pub struct PlansTable {
    pub rates: RawRateAreaRates,
    pub rows_read: usize,
    /// Rows in the target metal tier that parsed cleanly.
    pub rows_retained: usize,
    pub row_errors: Vec<RowError>,
    /// Rate areas that lost a possibly-in-tier row to a parse error.
    pub incomplete_areas: HashSet<RateArea>,
}

/// ZIP ingest output.
#[derive(Debug, Clone, Default)]
pub struct ZipsTable {
    pub areas: RawZipRateAreas,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    /// ZIPs that lost a row to a parse error.
    pub incomplete_zips: HashSet<String>,
}

/// Load the plans CSV, keeping only plans whose metal level matches `metal_level`.
pub fn load_plans(path: &Path, metal_level: &str, strict: bool) -> Result<PlansTable, AppError> {
    let table = read_plans(open(path, Table::Plans)?, metal_level, strict)?;
    info!(
        path = %path.display(),
        rows = table.rows_read,
        retained = table.rows_retained,
        rate_areas = table.rates.len(),
        "loaded plans"
    );
    Ok(table)
}

/// Load the ZIP-to-rate-area CSV.
pub fn load_zips(path: &Path, strict: bool) -> Result<ZipsTable, AppError> {
    let table = read_zips(open(path, Table::Zips)?, strict)?;
    info!(
        path = %path.display(),
        rows = table.rows_read,
        zipcodes = table.areas.len(),
        "loaded zips"
    );
    Ok(table)
}

/// Load the requested ZIPs, in file order.
pub fn load_requests(path: &Path) -> Result<Vec<String>, AppError> {
    let requests = read_requests(open(path, Table::Requests)?)?;
    info!(path = %path.display(), requests = requests.len(), "loaded requests");
    Ok(requests)
}

pub fn read_plans<R: Read>(source: R, metal_level: &str, strict: bool) -> Result<PlansTable, AppError> {
    let mut reader = csv_reader(source);
    let header_map = read_header_map(&mut reader, Table::Plans, &["state", "metal_level", "rate", "rate_area"])?;

    let mut out = PlansTable::default();
    let mut sink = RowSink::new(Table::Plans, strict);

    for (idx, result) in reader.records().enumerate() {
        out.rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                sink.reject(idx + 2, format!("CSV parse error: {e}"))?;
                continue;
            }
        };
        let line = record_line(&record, idx);

        // A row with no metal level may still be in the tier, so it taints its
        // area like any other rejected in-tier row.
        let parsed = get_required(&record, &header_map, "metal_level").and_then(|metal| {
            if matches_metal_level(metal, metal_level) {
                parse_plan(&record, &header_map).map(Some)
            } else {
                Ok(None)
            }
        });

        match parsed {
            Ok(Some((area, rate))) => {
                out.rates.entry(area).or_default().push(rate);
                out.rows_retained += 1;
            }
            Ok(None) => {}
            Err(e) => {
                sink.reject(line, e)?;
                // An unparseable `rate_area` cannot be attributed to any area.
                if let Some(area) = plan_area(&record, &header_map) {
                    out.incomplete_areas.insert(area);
                }
            }
        }
    }

    out.row_errors = sink.into_errors();
    Ok(out)
}

pub fn read_zips<R: Read>(source: R, strict: bool) -> Result<ZipsTable, AppError> {
    let mut reader = csv_reader(source);
    let header_map = read_header_map(&mut reader, Table::Zips, &["zipcode", "state", "rate_area"])?;

    let mut out = ZipsTable::default();
    let mut sink = RowSink::new(Table::Zips, strict);

    for (idx, result) in reader.records().enumerate() {
        out.rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                sink.reject(idx + 2, format!("CSV parse error: {e}"))?;
                continue;
            }
        };
        let line = record_line(&record, idx);

        match parse_zip(&record, &header_map) {
            Ok((zipcode, area)) => out.areas.entry(zipcode).or_default().push(area),
            Err(e) => {
                sink.reject(line, e)?;
                // The dropped row may have named a second rate area for this ZIP.
                if let Ok(zipcode) = get_required(&record, &header_map, "zipcode") {
                    out.incomplete_zips.insert(zipcode.to_string());
                }
            }
        }
    }

    out.row_errors = sink.into_errors();
    Ok(out)
}

/// Read the request list.
///
/// Every row is kept, blank ZIP cells included, since the list fixes the
/// length and order of the output. An unreadable row is therefore fatal.
pub fn read_requests<R: Read>(source: R) -> Result<Vec<String>, AppError> {
    let mut reader = csv_reader(source);
    let header_map = read_header_map(&mut reader, Table::Requests, &["zipcode"])?;

    let mut requests = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::io(format!("{} line {}: CSV parse error: {e}", Table::Requests, idx + 2))
        })?;
        let zipcode = get_optional(&record, &header_map, "zipcode").unwrap_or_default();
        requests.push(zipcode.to_string());
    }
    Ok(requests)
}

fn parse_plan(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<(RateArea, String), String> {
    let state = get_required(record, header_map, "state")?;
    let area = parse_area(get_required(record, header_map, "rate_area")?)?;
    let rate = get_required(record, header_map, "rate")?;
    if parse_rate(rate).is_none() {
        return Err(format!(
            "Invalid `rate` '{rate}' (expected a plain decimal of at most 28 significant digits)."
        ));
    }
    Ok((RateArea::new(state, area), rate.to_string()))
}

fn plan_area(record: &StringRecord, header_map: &HashMap<String, usize>) -> Option<RateArea> {
    let state = get_required(record, header_map, "state").ok()?;
    let area = parse_area(get_required(record, header_map, "rate_area").ok()?).ok()?;
    Some(RateArea::new(state, area))
}

fn parse_zip(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<(String, RateArea), String> {
    let zipcode = get_required(record, header_map, "zipcode")?;
    let state = get_required(record, header_map, "state")?;
    let area = parse_area(get_required(record, header_map, "rate_area")?)?;
    Ok((zipcode.to_string(), RateArea::new(state, area)))
}

fn parse_area(s: &str) -> Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("Invalid `rate_area` '{s}' (expected a non-negative integer)."))
}

/// Collects skipped rows, or fails on the first one in strict mode.
struct RowSink {
    table: Table,
    strict: bool,
    errors: Vec<RowError>,
}

impl RowSink {
    fn new(table: Table, strict: bool) -> Self {
        Self {
            table,
            strict,
            errors: Vec::new(),
        }
    }

    fn reject(&mut self, line: usize, message: String) -> Result<(), AppError> {
        let err = RowError {
            table: self.table,
            line,
            message,
        };
        if self.strict {
            return Err(AppError::data(err.to_string()));
        }
        warn!(table = %err.table, line = err.line, "skipping row: {}", err.message);
        self.errors.push(err);
        Ok(())
    }

    fn into_errors(self) -> Vec<RowError> {
        self.errors
    }
}

fn open(path: &Path, table: Table) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::io(format!("Failed to open {table} CSV '{}': {e}", path.display())))
}

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

fn read_header_map<R: Read>(
    reader: &mut csv::Reader<R>,
    table: Table,
    required: &[&str],
) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::io(format!("Failed to read {table} CSV headers: {e}")))?;
    let header_map = build_header_map(headers);

    for name in required {
        if !header_map.contains_key(*name) {
            return Err(AppError::io(format!("Missing required column in {table} CSV: `{name}`")));
        }
    }
    Ok(header_map)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// 1-based line of a record, falling back to its index when the reader
/// reports no position.
fn record_line(record: &StringRecord, idx: usize) -> usize {
    record
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(idx + 2)
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim)
}
