// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Route Resolution
//!
//! Maps a requested path onto exactly one [`Resolution`]. The candidates are
//! tried in a fixed order and the first match wins:
//!
//! 1. the hub, at the tools root itself;
//! 2. the legacy `tag/<tag>` form, redirected to `<tag>`;
//! 3. comparison pages, at `compare/<slug>` or directly at `<slug>`;
//! 4. dedicated tool pages at `<slug>`;
//! 5. any other single segment, handed to a [`FallbackResolver`];
//! 6. everything else, redirected to the hub.
//!
//! Resolution never fails. Redirects always replace the current history
//! entry so that going back does not bounce through them again.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::catalog::Catalog;

/// Segment introducing the legacy tag form.
pub const TAG_SEGMENT: &str = "tag";

/// Segment introducing the explicit comparison form.
pub const COMPARE_SEGMENT: &str = "compare";

/// How a redirect interacts with the browser history. Every redirect the
/// router issues replaces the current entry, so going back never lands on
/// the forwarding page again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Overwrite the current history entry.
    Replace,
}

impl HistoryMode {
    /// Lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
        }
    }
}

/// Why a redirect was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// A `tag/<tag>` path forwarded to its current form.
    LegacyTag,
    /// Nothing matched; forwarded to the hub.
    NotFound,
}

impl RedirectReason {
    /// Lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LegacyTag => "legacy_tag",
            Self::NotFound => "not_found",
        }
    }
}

/// A redirect to another path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Absolute target path, already percent-encoded.
    pub location: String,
    /// History handling.
    pub mode: HistoryMode,
    /// Reason for the redirect.
    pub reason: RedirectReason,
}

/// Outcome of resolving one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The hub page.
    Hub,
    /// Go somewhere else.
    Redirect(Redirect),
    /// A comparison page, by slug.
    Comparison(String),
    /// A dedicated tool page, by slug.
    Tool(String),
    /// Unknown single segment (percent-decoded), left to the fallback.
    Param(String),
}

impl Resolution {
    /// Whether this resolution sends the visitor elsewhere.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// A page found by a [`FallbackResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackHit {
    /// A tool rendered through the generic route.
    Tool(String),
    /// A listing of every tool carrying this tag.
    Tag(String),
}

/// Decides whether a generic path parameter names a page.
///
/// Returning `None` is a miss, which the caller turns into the hub redirect.
pub trait FallbackResolver: Send + Sync + Debug {
    /// Looks up `param`, already percent-decoded.
    fn resolve_param(&self, param: &str) -> Option<FallbackHit>;
}

/// Fallback backed by the catalog: tool slugs first, then listing tags.
#[derive(Debug, Clone)]
pub struct CatalogFallback {
    catalog: Arc<Catalog>,
}

impl CatalogFallback {
    /// Creates a fallback over `catalog`.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

impl FallbackResolver for CatalogFallback {
    fn resolve_param(&self, param: &str) -> Option<FallbackHit> {
        if let Some(tool) = self.catalog.tool(param) {
            return Some(FallbackHit::Tool(tool.slug.clone()));
        }
        self.catalog
            .tags()
            .into_iter()
            .find(|tag| tag.eq_ignore_ascii_case(param.trim()))
            .map(FallbackHit::Tag)
    }
}

/// Path resolver for the tools section.
#[derive(Debug, Clone)]
pub struct Router {
    root: String,
    comparisons: BTreeSet<String>,
    dedicated: BTreeSet<String>,
}

impl Router {
    /// Creates a router mounted at `root` (e.g. `tools`).
    ///
    /// `comparisons` and `dedicated` are the slugs served by static routes.
    pub fn new<C, D>(root: &str, comparisons: C, dedicated: D) -> Self
    where
        C: IntoIterator<Item = String>,
        D: IntoIterator<Item = String>,
    {
        Self {
            root: root.trim_matches('/').to_string(),
            comparisons: comparisons.into_iter().collect(),
            dedicated: dedicated.into_iter().collect(),
        }
    }

    /// Creates a router whose static routes come from `catalog`.
    pub fn from_catalog(root: &str, catalog: &Catalog) -> Self {
        Self::new(
            root,
            catalog.comparison_slugs(),
            catalog.dedicated_slugs(),
        )
    }

    /// The root segment.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Absolute path of the hub, e.g. `/tools`.
    pub fn hub_path(&self) -> String {
        format!("/{}", self.root)
    }

    /// Absolute path of a page one segment below the root.
    ///
    /// The segment is percent-encoded.
    pub fn page_path(&self, segment: &str) -> String {
        format!("/{}/{}", self.root, urlencoding::encode(segment))
    }

    /// Absolute path of the explicit comparison route for `slug`.
    pub fn comparison_path(&self, slug: &str) -> String {
        format!(
            "/{}/{}/{}",
            self.root,
            COMPARE_SEGMENT,
            urlencoding::encode(slug)
        )
    }

    /// Absolute path of the legacy tag route for `tag`.
    pub fn legacy_tag_path(&self, tag: &str) -> String {
        format!(
            "/{}/{}/{}",
            self.root,
            TAG_SEGMENT,
            urlencoding::encode(tag)
        )
    }

    /// The terminal redirect to the hub.
    pub fn not_found(&self) -> Resolution {
        Resolution::Redirect(Redirect {
            location: self.hub_path(),
            mode: HistoryMode::Replace,
            reason: RedirectReason::NotFound,
        })
    }

    /// Resolves `path`.
    ///
    /// Query strings and fragments are ignored, as are empty segments, so
    /// `/tools//acme/?ref=x` resolves like `/tools/acme`.
    pub fn resolve(&self, path: &str) -> Resolution {
        let path = path
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> =
            path.split('/').filter(|s| !s.is_empty()).collect();

        let resolution = match segments.as_slice() {
            [root] if *root == self.root => Resolution::Hub,
            [root, TAG_SEGMENT, tag] if *root == self.root => {
                self.legacy_tag(tag)
            }
            [root, COMPARE_SEGMENT, slug] if *root == self.root => {
                let slug = decode_segment(slug);
                if self.comparisons.contains(&slug) {
                    Resolution::Comparison(slug)
                } else {
                    self.not_found()
                }
            }
            [root, param] if *root == self.root => {
                let param = decode_segment(param);
                if self.comparisons.contains(&param) {
                    Resolution::Comparison(param)
                } else if self.dedicated.contains(&param) {
                    Resolution::Tool(param)
                } else {
                    Resolution::Param(param)
                }
            }
            _ => self.not_found(),
        };

        debug!("resolved '{}' to {:?}", path, resolution);
        resolution
    }

    fn legacy_tag(&self, raw: &str) -> Resolution {
        let tag = decode_segment(raw);
        Resolution::Redirect(Redirect {
            location: self.page_path(&tag),
            mode: HistoryMode::Replace,
            reason: RedirectReason::LegacyTag,
        })
    }
}

/// Percent-decodes a path segment, keeping it as is if it is not valid
/// UTF-8 once decoded.
pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
