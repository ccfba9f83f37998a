//! Write result rows as CSV or JSON.
//!
//! Absent rates are written as empty values in both formats.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::info;

use crate::domain::{OutputFields, OutputFormat, ResultRow, SlcspConfig};
use crate::error::AppError;

/// Write `rows` to the configured destination (a file, or stdout).
pub fn write_results_to(config: &SlcspConfig, rows: &[ResultRow]) -> Result<(), AppError> {
    match &config.output_path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::io(format!("Failed to create output '{}': {e}", path.display())))?;
            write_results(BufWriter::new(file), rows, config.format, &config.output_fields)?;
            info!(path = %path.display(), rows = rows.len(), "wrote results");
        }
        None => {
            let stdout = io::stdout();
            write_results(stdout.lock(), rows, config.format, &config.output_fields)?;
        }
    }
    Ok(())
}

pub fn write_results<W: Write>(
    writer: W,
    rows: &[ResultRow],
    format: OutputFormat,
    fields: &OutputFields,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Csv => write_csv(writer, rows, fields),
        OutputFormat::Json => write_json(writer, rows),
    }
}

fn write_csv<W: Write>(writer: W, rows: &[ResultRow], fields: &OutputFields) -> Result<(), AppError> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    out.write_record([fields.zipcode.as_str(), fields.rate.as_str()])
        .map_err(|e| AppError::io(format!("Failed to write CSV header: {e}")))?;
    for row in rows {
        out.write_record([row.zipcode.as_str(), row.rate_or_empty()])
            .map_err(|e| AppError::io(format!("Failed to write CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV output: {e}")))
}

fn write_json<W: Write>(mut writer: W, rows: &[ResultRow]) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, rows)
        .map_err(|e| AppError::io(format!("Failed to write JSON output: {e}")))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|e| AppError::io(format!("Failed to flush JSON output: {e}")))
}
