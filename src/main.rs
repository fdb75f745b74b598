// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # ToolHub CLI
//!
//! Entry point for the `toolhub` binary. Parses arguments, initialises the
//! logger at the requested verbosity and runs the selected subcommand.

use anyhow::Context;
use log::{info, LevelFilter};
use toolhub::{cli, ToolHubError};

/// Maps the `-v` count onto a log level. `RUST_LOG` still wins.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run() -> anyhow::Result<()> {
    let matches = cli::build().get_matches();
    init_logger(matches.get_count("verbose"));
    info!("Starting ToolHub {}", cli::VERSION);

    cli::execute(&matches).context("toolhub command failed")?;

    info!("ToolHub completed successfully");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        if let Some(error) = err.downcast_ref::<ToolHubError>() {
            for issue in error.issues() {
                eprintln!("  - {}", issue);
            }
        }
        std::process::exit(1);
    }
}
