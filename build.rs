// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that refuses toolchains older than the declared `rust-version`.

/// Minimum toolchain accepted by the build.
const MIN_VERSION: &str = "1.75.0";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=templates");

    match version_check::is_min_version(MIN_VERSION) {
        Some(true) => {}
        Some(false) => {
            eprintln!(
                "toolhub requires rustc {} or newer; please update your toolchain",
                MIN_VERSION
            );
            std::process::exit(1);
        }
        None => {
            println!(
                "cargo:warning=unable to determine the rustc version, assuming >= {}",
                MIN_VERSION
            );
        }
    }
}
