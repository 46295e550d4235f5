//! Command-line interface module
//!
//! Handles argument parsing and context overrides

pub mod args;

pub use args::*;
