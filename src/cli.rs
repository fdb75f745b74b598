// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for ToolHub
//!
//! Argument parsing and command execution for the `toolhub` binary.
//!
//! # Examples
//!
//! ```
//! use toolhub::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "toolhub",
//!     "resolve",
//!     "/tools/tag/CRM%20Tools",
//! ]);
//!
//! let resolve = matches.subcommand_matches("resolve").unwrap();
//! assert_eq!(
//!     resolve.get_one::<String>("path").unwrap(),
//!     "/tools/tag/CRM%20Tools"
//! );
//! ```

use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};

use crate::core::config::{Config, ConfigBuilder};
use crate::core::error::{Result, ToolHubError};
use crate::ToolHub;

/// The current version of ToolHub, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file read when `--config` is not given and it exists.
pub const DEFAULT_CONFIG_FILE: &str = "toolhub.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TOOLHUB_";

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .help("Configuration file (defaults to ./toolhub.toml if present)")
        .value_parser(value_parser!(PathBuf))
}

fn content_arg() -> Arg {
    Arg::new("content")
        .short('c')
        .long("content")
        .help("Content directory")
        .value_parser(value_parser!(PathBuf))
}

/// Builds and configures the ToolHub command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    Command::new("toolhub")
        .author("ToolHub Contributors")
        .about("Static site generator for software tool reviews.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("build")
                .about("Render the catalog into a static site")
                .arg(content_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output directory")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("template")
                        .short('t')
                        .long("template")
                        .help("Directory of templates overriding the built-in ones")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("minify")
                        .short('m')
                        .long("minify")
                        .help("Minify output")
                        .action(ArgAction::SetTrue),
                )
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Load and validate the catalog without writing anything")
                .arg(content_arg())
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Show what a request path resolves to")
                .arg(
                    Arg::new("path")
                        .help("Request path, e.g. /tools/pipedrive")
                        .required(true)
                        .value_parser(value_parser!(String)),
                )
                .arg(content_arg())
                .arg(config_arg()),
        )
        .after_help(
            "\x1b[1;4mLicense:\x1b[0m\n  The project is licensed under the terms of \
             both the MIT license and the Apache License (Version 2.0).",
        )
}

/// Executes the subcommand selected in `matches`.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("build", sub_matches)) => build_site(sub_matches),
        Some(("check", sub_matches)) => check_catalog(sub_matches),
        Some(("resolve", sub_matches)) => resolve_path(sub_matches),
        _ => Err(ToolHubError::internal("Unknown command")),
    }
}

/// Assembles the configuration: file, then environment, then flags.
pub fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut builder = ConfigBuilder::new();
    match matches.get_one::<PathBuf>("config") {
        Some(file) => builder = builder.with_file(file),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            builder = builder.with_file(DEFAULT_CONFIG_FILE)
        }
        None => {}
    }
    builder = builder.with_env_prefix(ENV_PREFIX);

    for (arg, key) in [
        ("content", "content_dir"),
        ("output", "output_dir"),
        ("template", "template_dir"),
    ] {
        if let Some(dir) = optional_path(matches, arg) {
            builder = builder.with_override(key, dir.display().to_string());
        }
    }
    if flag(matches, "minify") {
        builder = builder.with_override("output.minify", true);
    }

    builder.build()
}

/// Looks up a path argument that only some subcommands define.
fn optional_path<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a PathBuf> {
    matches.try_get_one::<PathBuf>(id).ok().flatten()
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

fn build_site(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    info!(
        "Building site from '{}' into '{}'",
        config.content_dir.display(),
        config.output_dir.display()
    );

    let hub = ToolHub::new(config)?;
    let report = hub.build()?;
    println!(
        "Built {} page(s) and {} redirect(s) in {}",
        report.pages,
        report.redirects,
        hub.config().output_dir.display()
    );
    Ok(())
}

fn check_catalog(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    config.content.validate = true;

    let hub = ToolHub::new(config)?;
    let catalog = hub.catalog();
    println!(
        "Catalog OK: {} tool(s) ({} dedicated), {} comparison(s), {} tag(s)",
        catalog.tools().count(),
        catalog.dedicated_slugs().len(),
        catalog.comparisons().count(),
        catalog.tags().len()
    );
    Ok(())
}

fn resolve_path(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .ok_or_else(|| ToolHubError::internal("missing path argument"))?;
    let hub = ToolHub::new(load_config(matches)?)?;
    println!("{}", hub.dispatch(path));
    Ok(())
}
