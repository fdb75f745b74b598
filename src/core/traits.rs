// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Core Traits Module
//!
//! The seams of the ToolHub pipeline. Each stage is a trait so that the
//! site builder can be assembled from the stock implementations or from
//! test doubles:
//!
//! - [`Validator`]: build-time checks over loaded content
//! - [`TemplateRenderer`]: turns a JSON context into markup
//! - [`Generator`]: writes rendered markup to disk
//! - [`IntoContext`]: converts a value into a template context

use std::fmt::Debug;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::core::error::Result;

/// Content validation.
pub trait Validator: Send + Sync + Debug {
    /// The type being validated.
    type Input;

    /// Checks `input`, reporting every problem found in a single error.
    fn validate(&self, input: &Self::Input) -> Result<()>;
}

/// Template rendering.
pub trait TemplateRenderer: Send + Sync + Debug {
    /// Renders the named template against `context`.
    fn render(&self, template: &str, context: &JsonValue) -> Result<String>;

    /// Checks that the named template is registered.
    fn validate(&self, template: &str) -> Result<()>;
}

/// Output generation.
pub trait Generator: Send + Sync + Debug {
    /// Writes `content` to `path`.
    ///
    /// `options` may carry per-call settings as a JSON object.
    fn generate(
        &self,
        content: &str,
        path: &Path,
        options: Option<&JsonValue>,
    ) -> Result<()>;

    /// Validates the path and options without writing anything.
    fn validate(&self, path: &Path, options: Option<&JsonValue>) -> Result<()>;
}

/// Conversion into a template context.
pub trait IntoContext {
    /// Produces the JSON value handed to a template.
    fn into_context(self) -> Result<JsonValue>;
}

impl IntoContext for JsonValue {
    fn into_context(self) -> Result<JsonValue> {
        Ok(self)
    }
}
