// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for ToolHub
//!
//! This module defines the error type shared by every component of the
//! ToolHub site generator. The `thiserror` crate is used to derive the
//! `Display` and `Error` implementations so that failures carry consistent,
//! human-readable context.
//!
//! Routing itself never fails: an unresolvable path is answered with a
//! redirect to the hub. The variants below cover everything around it, from
//! reading configuration to writing the generated pages.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source error attached to several variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// A unified result type for the ToolHub library.
pub type Result<T> = std::result::Result<T, ToolHubError>;

/// The main error type for ToolHub.
#[derive(Error, Debug)]
pub enum ToolHubError {
    /// Invalid configuration file, value or directory.
    #[error("Configuration error: {details}.")]
    Configuration {
        /// Description of the configuration problem.
        details: String,
        /// Path of the file or directory involved, if any.
        path: Option<PathBuf>,
        /// Underlying error, if any.
        #[source]
        source: Option<BoxedSource>,
    },

    /// A catalog record could not be read or parsed, or its slug is taken.
    #[error("Catalog error: {details}.")]
    Catalog {
        /// Description of the catalog problem.
        details: String,
        /// Record file involved, if any.
        path: Option<PathBuf>,
        /// Underlying error, if any.
        #[source]
        source: Option<BoxedSource>,
    },

    /// The catalog failed build-time integrity checks.
    ///
    /// Every problem found is listed in `issues` so that a single `check`
    /// run reports all of them.
    #[error("Validation error: {details} ({} issue(s)).", .issues.len())]
    Validation {
        /// Summary of the failure.
        details: String,
        /// One entry per integrity problem.
        issues: Vec<String>,
    },

    /// Rendering a Handlebars template failed.
    #[error("Template rendering error: {details} in template `{template}`.")]
    TemplateRendering {
        /// Description of the rendering problem.
        details: String,
        /// Template or partial name.
        template: String,
        /// Underlying error, if any.
        #[source]
        source: Option<BoxedSource>,
    },

    /// Writing a generated page failed.
    #[error("Output generation error: {details} at {path:?}.")]
    OutputGeneration {
        /// Description of the output problem.
        details: String,
        /// Target path.
        path: PathBuf,
        /// Underlying error, if any.
        #[source]
        source: Option<BoxedSource>,
    },

    /// IO error encountered during file operations.
    #[error("File IO error at `{path:?}`: {source}")]
    Io {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Invariant violations inside the library.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ToolHubError {
    fn from(source: std::io::Error) -> Self {
        ToolHubError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl ToolHubError {
    /// Creates a `Configuration` error.
    pub fn configuration<S: Into<String>>(
        details: S,
        path: Option<PathBuf>,
        source: Option<BoxedSource>,
    ) -> Self {
        ToolHubError::Configuration {
            details: details.into(),
            path,
            source,
        }
    }

    /// Creates a `Catalog` error.
    pub fn catalog<S: Into<String>>(
        details: S,
        path: Option<PathBuf>,
        source: Option<BoxedSource>,
    ) -> Self {
        ToolHubError::Catalog {
            details: details.into(),
            path,
            source,
        }
    }

    /// Creates a `Validation` error from the collected issues.
    pub fn validation<S: Into<String>>(
        details: S,
        issues: Vec<String>,
    ) -> Self {
        ToolHubError::Validation {
            details: details.into(),
            issues,
        }
    }

    /// Creates a `TemplateRendering` error.
    pub fn template_rendering<S: Into<String>, T: Into<String>>(
        details: S,
        template: T,
        source: Option<BoxedSource>,
    ) -> Self {
        ToolHubError::TemplateRendering {
            details: details.into(),
            template: template.into(),
            source,
        }
    }

    /// Creates an `OutputGeneration` error.
    pub fn output_generation<S: Into<String>>(
        details: S,
        path: PathBuf,
        source: Option<BoxedSource>,
    ) -> Self {
        ToolHubError::OutputGeneration {
            details: details.into(),
            path,
            source,
        }
    }

    /// Wraps an IO error together with the path it occurred on.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        ToolHubError::Io { path, source }
    }

    /// Creates an `Internal` error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        ToolHubError::Internal(message.into())
    }

    /// Returns the validation issues carried by this error, if any.
    pub fn issues(&self) -> &[String] {
        match self {
            ToolHubError::Validation { issues, .. } => issues,
            _ => &[],
        }
    }
}
