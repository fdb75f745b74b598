// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Catalog Module
//!
//! The catalog is the single, read-only source of page content: a map from
//! slug to [`ToolRecord`] and a map from slug to [`ComparisonRecord`]. It is
//! built once at start-up, either from records in memory or from a content
//! directory laid out as
//!
//! ```text
//! content/
//!   tools/         one record per file (.toml, .yaml, .yml or .json)
//!   comparisons/   one record per file
//! ```
//!
//! and is never mutated afterwards. Slugs share one namespace across tools
//! and comparisons; loading fails on the first duplicate.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::core::error::{Result, ToolHubError};
use crate::core::traits::Validator;

/// Record types.
pub mod record;

/// Build-time integrity checks.
pub mod validation;

pub use record::{
    AlternativeRef, ComparisonRecord, ComparisonRef, Faq, Feature,
    MatchupRow, PricingRow, ToolRecord,
};
pub use validation::CatalogValidator;

/// Name of the tool record folder inside the content directory.
pub const TOOLS_DIR: &str = "tools";

/// Name of the comparison record folder inside the content directory.
pub const COMPARISONS_DIR: &str = "comparisons";

/// Read-only collection of every record the site renders.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: BTreeMap<String, ToolRecord>,
    comparisons: BTreeMap<String, ComparisonRecord>,
}

impl Catalog {
    /// Builds a catalog from records already in memory.
    ///
    /// Fails if two records share a slug.
    pub fn from_records<T, C>(tools: T, comparisons: C) -> Result<Self>
    where
        T: IntoIterator<Item = ToolRecord>,
        C: IntoIterator<Item = ComparisonRecord>,
    {
        let mut catalog = Self::default();
        for tool in tools {
            catalog.insert_tool(tool, None)?;
        }
        for comparison in comparisons {
            catalog.insert_comparison(comparison, None)?;
        }
        Ok(catalog)
    }

    /// Loads every record under `dir`.
    ///
    /// Only files whose extension appears in `extensions` are read; a
    /// missing `tools/` or `comparisons/` folder counts as empty.
    pub fn load(dir: &Path, extensions: &[String]) -> Result<Self> {
        let mut catalog = Self::default();

        for (path, tool) in
            load_records::<ToolRecord>(&dir.join(TOOLS_DIR), extensions)?
        {
            catalog.insert_tool(tool, Some(path))?;
        }
        for (path, comparison) in load_records::<ComparisonRecord>(
            &dir.join(COMPARISONS_DIR),
            extensions,
        )? {
            catalog.insert_comparison(comparison, Some(path))?;
        }

        info!(
            "loaded {} tool(s) and {} comparison(s) from {}",
            catalog.tools.len(),
            catalog.comparisons.len(),
            dir.display()
        );
        Ok(catalog)
    }

    /// Runs the [`CatalogValidator`] over this catalog.
    pub fn validate(&self) -> Result<()> {
        CatalogValidator.validate(self)
    }

    /// Looks up a tool by slug.
    pub fn tool(&self, slug: &str) -> Option<&ToolRecord> {
        self.tools.get(slug)
    }

    /// Looks up a comparison by slug.
    pub fn comparison(&self, slug: &str) -> Option<&ComparisonRecord> {
        self.comparisons.get(slug)
    }

    /// All tools, ordered by slug.
    pub fn tools(&self) -> impl Iterator<Item = &ToolRecord> {
        self.tools.values()
    }

    /// All comparisons, ordered by slug.
    pub fn comparisons(&self) -> impl Iterator<Item = &ComparisonRecord> {
        self.comparisons.values()
    }

    /// Slugs of tools served from static routes, ordered by slug.
    pub fn dedicated_slugs(&self) -> Vec<String> {
        self.tools
            .values()
            .filter(|tool| tool.dedicated)
            .map(|tool| tool.slug.clone())
            .collect()
    }

    /// Slugs of every comparison, ordered by slug.
    pub fn comparison_slugs(&self) -> Vec<String> {
        self.comparisons.keys().cloned().collect()
    }

    /// Every listing tag in the catalog, ordered case-insensitively.
    ///
    /// Tags differing only in ASCII case are merged; the spelling of the
    /// first tool (by slug) carrying the tag wins.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: BTreeMap<String, String> = BTreeMap::new();
        for tool in self.tools.values() {
            for tag in tool.tag_list() {
                _ = tags
                    .entry(tag.to_ascii_lowercase())
                    .or_insert_with(|| tag.to_string());
            }
        }
        tags.into_values().collect()
    }

    /// Tools carrying `tag`, ordered by name.
    pub fn tools_tagged(&self, tag: &str) -> Vec<&ToolRecord> {
        let mut tools: Vec<&ToolRecord> =
            self.tools.values().filter(|tool| tool.has_tag(tag)).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Tools grouped by category; tools without one land under "Other".
    pub fn by_category(&self) -> BTreeMap<String, Vec<&ToolRecord>> {
        let mut groups: BTreeMap<String, Vec<&ToolRecord>> = BTreeMap::new();
        for tool in self.tools.values() {
            let category = match tool.category.trim() {
                "" => "Other",
                other => other,
            };
            groups.entry(category.to_string()).or_default().push(tool);
        }
        for tools in groups.values_mut() {
            tools.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }

    /// Number of tools plus comparisons.
    pub fn len(&self) -> usize {
        self.tools.len() + self.comparisons.len()
    }

    /// Whether the catalog holds no record at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_tool(
        &mut self,
        tool: ToolRecord,
        path: Option<PathBuf>,
    ) -> Result<()> {
        if self.comparisons.contains_key(&tool.slug) {
            return Err(duplicate_slug(&tool.slug, path));
        }
        match self.tools.entry(tool.slug.clone()) {
            Entry::Occupied(_) => Err(duplicate_slug(&tool.slug, path)),
            Entry::Vacant(slot) => {
                debug!("registered tool '{}'", tool.slug);
                _ = slot.insert(tool);
                Ok(())
            }
        }
    }

    fn insert_comparison(
        &mut self,
        comparison: ComparisonRecord,
        path: Option<PathBuf>,
    ) -> Result<()> {
        if self.tools.contains_key(&comparison.slug) {
            return Err(duplicate_slug(&comparison.slug, path));
        }
        match self.comparisons.entry(comparison.slug.clone()) {
            Entry::Occupied(_) => {
                Err(duplicate_slug(&comparison.slug, path))
            }
            Entry::Vacant(slot) => {
                debug!("registered comparison '{}'", comparison.slug);
                _ = slot.insert(comparison);
                Ok(())
            }
        }
    }
}

fn duplicate_slug(slug: &str, path: Option<PathBuf>) -> ToolHubError {
    ToolHubError::catalog(format!("duplicate slug '{}'", slug), path, None)
}

/// Reads every matching record file in `dir`, sorted by file name.
fn load_records<T: DeserializeOwned>(
    dir: &Path,
    extensions: &[String],
) -> Result<Vec<(PathBuf, T)>> {
    if !dir.is_dir() {
        debug!("no record folder at {}", dir.display());
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| ToolHubError::io_error(dir.to_path_buf(), e))?
    {
        let path = entry
            .map_err(|e| ToolHubError::io_error(dir.to_path_buf(), e))?
            .path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(true, |name| name.starts_with('.'));
        if !path.is_file() || hidden {
            continue;
        }
        if !has_extension(&path, extensions) {
            warn!("skipping {}: unsupported extension", path.display());
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let raw = fs::read_to_string(&path)
                .map_err(|e| ToolHubError::io_error(path.clone(), e))?;
            let record = parse_record(&path, &raw)?;
            Ok((path, record))
        })
        .collect()
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = extension_of(path);
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}

/// Parses one record, picking the format from the file extension.
fn parse_record<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T> {
    match extension_of(path).as_str() {
        "toml" => toml::from_str(raw).map_err(|e| parse_error(path, "TOML", e)),
        "yaml" | "yml" => {
            serde_yml::from_str(raw).map_err(|e| parse_error(path, "YAML", e))
        }
        "json" => {
            serde_json::from_str(raw).map_err(|e| parse_error(path, "JSON", e))
        }
        other => Err(ToolHubError::catalog(
            format!("unsupported record format '{}'", other),
            Some(path.to_path_buf()),
            None,
        )),
    }
}

fn parse_error<E>(path: &Path, format: &str, e: E) -> ToolHubError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ToolHubError::catalog(
        format!("invalid {} record: {}", format, e),
        Some(path.to_path_buf()),
        Some(Box::new(e)),
    )
}
