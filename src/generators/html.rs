// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # HTML Output Generation
//!
//! Writes rendered pages to disk, creating parent directories as needed and
//! optionally minifying the markup with `minify-html`.
//!
//! Per-call options are a JSON object; the only recognised key is
//! `"minify"` (boolean), which overrides the generator-wide setting for
//! that one file.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use toolhub::core::traits::Generator;
//! use toolhub::generators::html::HtmlGenerator;
//!
//! let generator = HtmlGenerator::new().with_minification(true);
//! generator
//!     .generate("<p>Hello</p>", Path::new("public/index.html"), None)
//!     .unwrap();
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use minify_html::{minify, Cfg};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use crate::core::error::{Result, ToolHubError};
use crate::core::traits::Generator;

/// Generator-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Minify every file unless a call says otherwise.
    pub minify: bool,
}

/// Writes HTML files.
#[derive(Debug, Clone, Default)]
pub struct HtmlGenerator {
    options: Arc<RwLock<HtmlOptions>>,
}

impl HtmlGenerator {
    /// Creates a generator that writes markup unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables minification.
    pub fn with_minification(self, enable: bool) -> Self {
        self.options.write().minify = enable;
        self
    }

    /// Current settings.
    pub fn options(&self) -> HtmlOptions {
        *self.options.read()
    }

    /// Applies the configured transformations to `content`.
    pub fn process_html(&self, content: &str, enable: bool) -> Result<String> {
        if !enable {
            return Ok(content.to_string());
        }
        let cfg = Cfg {
            minify_css: true,
            minify_js: true,
            ..Cfg::default()
        };
        String::from_utf8(minify(content.as_bytes(), &cfg))
            .map_err(|e| {
                ToolHubError::output_generation(
                    "HTML minification produced invalid UTF-8",
                    PathBuf::new(),
                    Some(Box::new(e)),
                )
            })
    }

    fn minify_requested(&self, options: Option<&JsonValue>) -> bool {
        options
            .and_then(|opts| opts.get("minify"))
            .and_then(JsonValue::as_bool)
            .unwrap_or_else(|| self.options().minify)
    }
}

impl Generator for HtmlGenerator {
    fn generate(
        &self,
        content: &str,
        path: &Path,
        options: Option<&JsonValue>,
    ) -> Result<()> {
        self.validate(path, options)?;
        let processed =
            self.process_html(content, self.minify_requested(options))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ToolHubError::io_error(parent.to_path_buf(), e))?;
        }
        let file = File::create(path)
            .map_err(|e| ToolHubError::io_error(path.to_path_buf(), e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(processed.as_bytes())
            .map_err(|e| ToolHubError::io_error(path.to_path_buf(), e))?;
        writer
            .flush()
            .map_err(|e| ToolHubError::io_error(path.to_path_buf(), e))?;

        debug!("wrote {} ({} bytes)", path.display(), processed.len());
        Ok(())
    }

    fn validate(&self, path: &Path, options: Option<&JsonValue>) -> Result<()> {
        if path.extension().and_then(|s| s.to_str()) != Some("html") {
            return Err(ToolHubError::output_generation(
                "invalid file extension, expected .html",
                path.to_path_buf(),
                None,
            ));
        }
        let Some(opts) = options else {
            return Ok(());
        };
        let Some(obj) = opts.as_object() else {
            return Err(ToolHubError::output_generation(
                "invalid options format, expected a JSON object",
                path.to_path_buf(),
                None,
            ));
        };
        for (key, value) in obj {
            match key.as_str() {
                "minify" if !value.is_boolean() => {
                    return Err(ToolHubError::output_generation(
                        "minify option must be a boolean",
                        path.to_path_buf(),
                        None,
                    ));
                }
                "minify" => {}
                _ => warn!("unknown output option: {}", key),
            }
        }
        Ok(())
    }
}
