//! derivar CLI - Drift and Data-Quality Scoring
//!
//! Command-line interface for derivar operations.

#![forbid(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    derivar::cli::run()
}
