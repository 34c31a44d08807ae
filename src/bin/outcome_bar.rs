//! Outcome comparison over a 500-episode window with ±2σ error bars
//!
//! Usage: `outcome-bar <start_episode> <model>...`

use episode_outcomes::cli;
use episode_outcomes::config::Preset;
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::main_fixed(Preset::OutcomeBar)
}
