//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - runs the pipeline
//! - writes results and the optional summary

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::domain::{OutputFields, SlcspConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `slcsp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config = config_from_args(&cli);
    let run = pipeline::run_slcsp(&config)?;

    crate::io::export::write_results_to(&config, &run.rows)?;

    if config.summary {
        eprint!(
            "{}",
            crate::report::format_run_summary(&run.stats, &run.summary, &run.row_errors)
        );
    }

    Ok(())
}

pub fn config_from_args(cli: &Cli) -> SlcspConfig {
    SlcspConfig {
        plans_path: cli.plans.clone(),
        zips_path: cli.zips.clone(),
        requests_path: cli.slcsp.clone(),
        output_path: cli.output.clone(),
        format: cli.format,
        output_fields: OutputFields::default(),
        metal_level: cli.metal_level.clone(),
        strict: cli.strict,
        summary: cli.summary,
    }
}

/// Log to stderr so stdout carries only results. `RUST_LOG` wins over `-v`/`-q`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_carries_cli_paths_and_default_fields() {
        let cli = Cli::parse_from(["slcsp", "--plans", "p.csv", "--zips", "z.csv", "--slcsp", "r.csv"]);
        let config = config_from_args(&cli);

        assert_eq!(config.plans_path.to_str(), Some("p.csv"));
        assert_eq!(config.zips_path.to_str(), Some("z.csv"));
        assert_eq!(config.requests_path.to_str(), Some("r.csv"));
        assert_eq!(config.output_path, None);
        assert_eq!(config.output_fields, OutputFields::default());
        assert!(!config.strict);
    }
}
