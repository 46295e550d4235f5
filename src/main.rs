//! # `ecsconf`
//!
//! `ecsconf` resolves the configuration of a load-balanced container service
//! from a values file and `--context` overrides, applying defaults and
//! checking required fields before anything is provisioned.
//!
//! ## Usage
//!
//! ```sh
//! ecsconf --values values.yaml --context cpu=512 --context env:MODE=prod
//! ecsconf --values values.yaml --to-legacy --output-format json
//! ecsconf --values values.yaml --to-context-args
//! ```
//!
//! Exit codes: `1` invalid invocation, `2` unreadable values file,
//! `3` missing required fields.

use anyhow::Result;
use clap::Parser as _;
use ecsconf::cli::Args;
use ecsconf::error::ConfigError;
use ecsconf::system::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    // Conversion modes keep stderr quiet so their output can be piped
    let log_level = if args.to_legacy || args.to_context_args {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    let outcome = if args.to_legacy {
        ecsconf::run_to_legacy(&args, &system)
    } else if args.to_context_args {
        ecsconf::run_to_context_args(&args, &system)
    } else {
        ecsconf::run(&args, &system)
    };

    match outcome {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{}", err);
            std::process::exit(
                err.downcast_ref::<ConfigError>()
                    .map_or(1, ConfigError::exit_code),
            );
        }
    }
}
