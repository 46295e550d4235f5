//! `ecsconf` - Resolve container service configuration
//!
//! This library turns a values file (legacy flat layout or structured
//! domains) plus invocation-time overrides into a single, fully defaulted and
//! validated configuration for a load-balanced container service.

pub mod cli;
pub mod config;
pub mod error;
pub mod operations;
pub mod system;

use anyhow::Result;
use cli::Args;
use operations::render::{OutputFormat, render};
use operations::resolve::ResolveOperation;
use operations::to_context_args::{ArgsFormat, generate_context_args};
use system::System;

/// Main entry point: print the resolved configuration
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved or rendered
#[inline]
pub fn run(args: &Args, system: &dyn System) -> Result<()> {
    let format = args.output_format.parse::<OutputFormat>()?;
    let resolved = ResolveOperation::new(args, system)?.execute()?;

    // Output to stdout (not using logging)
    print!("{}", with_newline(render(&resolved, format)?));
    Ok(())
}

/// Run the to-legacy command
///
/// # Errors
///
/// Returns an error if the values file or overrides cannot be merged
#[inline]
pub fn run_to_legacy(args: &Args, system: &dyn System) -> Result<()> {
    let format = args.output_format.parse::<OutputFormat>()?;
    let legacy = ResolveOperation::new(args, system)?.legacy_view()?;

    print!("{}", with_newline(render(&legacy, format)?));
    Ok(())
}

/// Run the to-context-args command
///
/// # Errors
///
/// Returns an error if the values file or overrides cannot be merged
#[inline]
pub fn run_to_context_args(args: &Args, system: &dyn System) -> Result<()> {
    let format = args.args_format.parse::<ArgsFormat>()?;
    let legacy = ResolveOperation::new(args, system)?.legacy_view()?;

    println!("{}", generate_context_args(&legacy, format)?);
    Ok(())
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
