//! Success counts over an explicit row interval
//!
//! Usage: `success-interval <start_episode> <interval> <model>...`

use episode_outcomes::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::main_interval()
}
