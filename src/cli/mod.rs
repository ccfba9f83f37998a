//! Command-line parsing.
//!
//! Keeps argument parsing separate from the lookup code; `app` turns the
//! parsed arguments into an `SlcspConfig`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::domain::{DEFAULT_METAL_LEVEL, OutputFormat};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "slcsp",
    version,
    about = "Second-lowest-cost silver plan rate for each requested ZIP code"
)]
pub struct Cli {
    /// Plans CSV (plan_id, state, metal_level, rate, rate_area).
    #[arg(long, value_name = "CSV", default_value = "slcsp/plans.csv")]
    pub plans: PathBuf,

    /// ZIP-to-rate-area CSV (zipcode, state, county_code, name, rate_area).
    #[arg(long, value_name = "CSV", default_value = "slcsp/zips.csv")]
    pub zips: PathBuf,

    /// Requested ZIPs CSV (zipcode[, rate]); fixes output order.
    #[arg(long, value_name = "CSV", default_value = "slcsp/slcsp.csv")]
    pub slcsp: PathBuf,

    /// Write results here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Metal tier to price (matched case-insensitively).
    #[arg(long, default_value = DEFAULT_METAL_LEVEL)]
    pub metal_level: String,

    /// Fail on the first malformed input row instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Print a run summary to stderr after the results.
    #[arg(long)]
    pub summary: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log filter directive implied by `-v`/`-q`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_slcsp_directory() {
        let cli = Cli::parse_from(["slcsp"]);
        assert_eq!(cli.plans, PathBuf::from("slcsp/plans.csv"));
        assert_eq!(cli.zips, PathBuf::from("slcsp/zips.csv"));
        assert_eq!(cli.slcsp, PathBuf::from("slcsp/slcsp.csv"));
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(cli.metal_level, "Silver");
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn verbosity_flags_map_to_levels() {
        assert_eq!(Cli::parse_from(["slcsp", "-v"]).log_level(), "info");
        assert_eq!(Cli::parse_from(["slcsp", "-vv"]).log_level(), "debug");
        assert_eq!(Cli::parse_from(["slcsp", "-vvvv"]).log_level(), "trace");
        assert_eq!(Cli::parse_from(["slcsp", "-q"]).log_level(), "error");
        assert!(Cli::try_parse_from(["slcsp", "-q", "-v"]).is_err());
    }

    #[test]
    fn format_and_output_parse() {
        let cli = Cli::parse_from(["slcsp", "--format", "json", "-o", "out.json", "--strict"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert!(cli.strict);
    }
}
