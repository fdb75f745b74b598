// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build-time integrity checks.
//!
//! Nothing here runs while resolving a path: a broken slug or a dangling
//! cross reference would otherwise only show up as a link that lands on the
//! hub. The validator collects every problem it finds and reports them
//! together in one [`ToolHubError::Validation`].

use std::collections::HashSet;

use log::debug;

use crate::catalog::{Catalog, ComparisonRecord, ToolRecord};
use crate::core::error::{Result, ToolHubError};
use crate::core::traits::Validator;
use crate::structured_data::{BEST_RATING, WORST_RATING};

/// Path segments that cannot be used as slugs.
pub const RESERVED_SLUGS: &[&str] = &["tag", "compare"];

/// Inclusive rating bounds, matching the scale emitted in structured data.
pub const RATING_RANGE: (f64, f64) = (WORST_RATING as f64, BEST_RATING as f64);

/// Catalog-wide integrity checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogValidator;

impl Validator for CatalogValidator {
    type Input = Catalog;

    fn validate(&self, catalog: &Catalog) -> Result<()> {
        let mut issues = Vec::new();
        let tool_slugs: HashSet<&str> =
            catalog.tools().map(|tool| tool.slug.as_str()).collect();
        let comparison_slugs: HashSet<&str> = catalog
            .comparisons()
            .map(|comparison| comparison.slug.as_str())
            .collect();

        for tool in catalog.tools() {
            check_tool(tool, &tool_slugs, &comparison_slugs, &mut issues);
        }
        for comparison in catalog.comparisons() {
            check_comparison(comparison, &tool_slugs, &mut issues);
        }
        for tag in catalog.tags() {
            check_tag(&tag, &tool_slugs, &comparison_slugs, &mut issues);
        }

        if issues.is_empty() {
            debug!("catalog passed validation ({} records)", catalog.len());
            Ok(())
        } else {
            Err(ToolHubError::validation(
                "catalog integrity check failed",
                issues,
            ))
        }
    }
}

/// Describes why `slug` is unusable, if it is.
pub fn slug_problem(slug: &str) -> Option<String> {
    if slug.is_empty() {
        return Some("slug is empty".to_string());
    }
    if slug == "." || slug == ".." {
        return Some(format!("slug '{}' is a relative path", slug));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Some(format!(
            "slug '{}' contains the character {:?}; use [A-Za-z0-9._-]",
            slug, bad
        ));
    }
    if RESERVED_SLUGS.contains(&slug) {
        return Some(format!("slug '{}' is a reserved path segment", slug));
    }
    None
}

fn check_tool(
    tool: &ToolRecord,
    tool_slugs: &HashSet<&str>,
    comparison_slugs: &HashSet<&str>,
    issues: &mut Vec<String>,
) {
    let label = format!("tool '{}'", tool.slug);

    if let Some(problem) = slug_problem(&tool.slug) {
        issues.push(format!("{}: {}", label, problem));
    }
    if tool.name.trim().is_empty() {
        issues.push(format!("{}: name is empty", label));
    }

    let (min, max) = RATING_RANGE;
    if !(tool.rating_value.is_finite()
        && tool.rating_value >= min
        && tool.rating_value <= max)
    {
        issues.push(format!(
            "{}: rating_value {} is outside [{}, {}]",
            label, tool.rating_value, min, max
        ));
    }

    for alternative in &tool.alternatives {
        if !tool_slugs.contains(alternative.slug.as_str()) {
            issues.push(format!(
                "{}: alternative '{}' is not a known tool",
                label, alternative.slug
            ));
        } else if alternative.slug == tool.slug {
            issues.push(format!("{}: lists itself as an alternative", label));
        }
    }

    for comparison in &tool.comparisons {
        if !comparison_slugs.contains(comparison.slug.as_str()) {
            issues.push(format!(
                "{}: comparison '{}' is not a known comparison",
                label, comparison.slug
            ));
        }
    }
}

/// Tags become listing paths next to tool pages, so they share the slug
/// namespace.
fn check_tag(
    tag: &str,
    tool_slugs: &HashSet<&str>,
    comparison_slugs: &HashSet<&str>,
    issues: &mut Vec<String>,
) {
    let label = format!("tag '{}'", tag);

    if tag.contains('/') {
        issues.push(format!("{}: contains '/'", label));
    }
    if tag == "." || tag == ".." {
        issues.push(format!("{}: is a relative path", label));
    }
    if RESERVED_SLUGS.iter().any(|reserved| reserved.eq_ignore_ascii_case(tag))
    {
        issues.push(format!("{}: is a reserved path segment", label));
    }
    if let Some(slug) = tool_slugs
        .iter()
        .chain(comparison_slugs)
        .find(|slug| slug.eq_ignore_ascii_case(tag))
    {
        issues.push(format!(
            "{}: collides with the page for '{}'",
            label, slug
        ));
    }
}

fn check_comparison(
    comparison: &ComparisonRecord,
    tool_slugs: &HashSet<&str>,
    issues: &mut Vec<String>,
) {
    let label = format!("comparison '{}'", comparison.slug);

    if let Some(problem) = slug_problem(&comparison.slug) {
        issues.push(format!("{}: {}", label, problem));
    }
    if comparison.title.trim().is_empty() {
        issues.push(format!("{}: title is empty", label));
    }
    for (side, slug) in [("left", &comparison.left), ("right", &comparison.right)]
    {
        if !tool_slugs.contains(slug.as_str()) {
            issues.push(format!(
                "{}: {} tool '{}' is not a known tool",
                label, side, slug
            ));
        }
    }
    if comparison.left == comparison.right {
        issues.push(format!("{}: compares a tool with itself", label));
    }
}
