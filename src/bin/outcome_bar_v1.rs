//! Outcome comparison over a 100-episode window
//!
//! Usage: `outcome-bar-v1 <start_episode> <model>...`

use episode_outcomes::cli;
use episode_outcomes::config::Preset;
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::main_fixed(Preset::OutcomeBarV1)
}
