// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # ToolHub Library
//!
//! ToolHub turns a catalog of software tool reviews into a static site. The
//! pipeline is:
//!
//! 1. load and validate the [`Catalog`](catalog::Catalog);
//! 2. resolve a request path with the [`Router`](routing::Router), asking a
//!    [`FallbackResolver`](routing::FallbackResolver) about unknown slugs;
//! 3. render the matching record into a [`Document`](document::Document);
//! 4. turn the document into HTML with a
//!    [`TemplateRenderer`](crate::core::traits::TemplateRenderer);
//! 5. write the file with a [`Generator`](crate::core::traits::Generator).
//!
//! [`ToolHub`] wires these together and can build the whole site at once.

#![doc = include_str!("../README.md")]
#![doc(html_root_url = "https://docs.rs/toolhub")]

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde_json::{json, Value as JsonValue};

use crate::catalog::{Catalog, ComparisonRecord, ToolRecord};
use crate::core::config::Config;
use crate::core::traits::{Generator, IntoContext, TemplateRenderer};
use crate::document::SiteContext;
use crate::generators::html::HtmlGenerator;
use crate::routing::{
    decode_segment, CatalogFallback, FallbackHit, FallbackResolver, Redirect,
    Resolution, Router,
};
use crate::template::{HandlebarsRenderer, PAGE_TEMPLATE, REDIRECT_TEMPLATE};

pub use crate::core::error::{Result, ToolHubError};

/// FAQ accordion state.
pub mod accordion;

/// Tool and comparison records.
pub mod catalog;

/// Command-line interface.
pub mod cli;

/// Configuration, errors and pipeline traits.
pub mod core;

/// Page documents built from records.
pub mod document;

/// Output generators.
pub mod generators;

/// Path resolution and redirects.
pub mod routing;

/// schema.org structured data.
pub mod structured_data;

/// Handlebars rendering.
pub mod template;

/// File written for every page path.
pub const INDEX_FILE: &str = "index.html";

/// Site-root page that sends unknown URLs to the hub.
pub const NOT_FOUND_FILE: &str = "404.html";

/// Which route served a tool page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRoute {
    /// A static route for a dedicated tool.
    Dedicated,
    /// The generic parameter route, through the fallback resolver.
    Generic,
}

/// What a path ends up showing.
#[derive(Debug, Clone, PartialEq)]
pub enum Page<'a> {
    /// The hub.
    Hub,
    /// A tool review.
    Tool {
        /// The record.
        record: &'a ToolRecord,
        /// How it was reached.
        route: ToolRoute,
    },
    /// A comparison page.
    Comparison(&'a ComparisonRecord),
    /// Tools carrying a tag.
    Listing {
        /// The tag, as spelled in the catalog.
        tag: String,
        /// Matching tools, ordered by name.
        tools: Vec<&'a ToolRecord>,
    },
    /// A redirect.
    Redirect(Redirect),
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Hub => write!(f, "hub"),
            Page::Tool { record, route } => {
                let route = match route {
                    ToolRoute::Dedicated => "dedicated",
                    ToolRoute::Generic => "generic",
                };
                write!(f, "tool '{}' ({} route)", record.slug, route)
            }
            Page::Comparison(record) => {
                write!(f, "comparison '{}'", record.slug)
            }
            Page::Listing { tag, tools } => {
                write!(f, "listing '{}' ({} tool(s))", tag, tools.len())
            }
            Page::Redirect(redirect) => write!(
                f,
                "redirect to {} ({}, {} history)",
                redirect.location,
                redirect.reason.as_str(),
                redirect.mode.as_str()
            ),
        }
    }
}

/// Summary of a site build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Content pages written.
    pub pages: usize,
    /// Redirect stubs written.
    pub redirects: usize,
    /// Every file written, in write order.
    pub files: Vec<PathBuf>,
}

/// The site pipeline.
#[derive(Debug)]
pub struct ToolHub {
    config: Config,
    catalog: Arc<Catalog>,
    router: Router,
    site: SiteContext,
    fallback: Box<dyn FallbackResolver>,
    renderer: Box<dyn TemplateRenderer>,
    generator: Box<dyn Generator>,
}

impl ToolHub {
    /// Loads the catalog named by `config` and sets up the pipeline.
    ///
    /// The catalog is validated first when `content.validate` is set.
    pub fn new(config: Config) -> Result<Self> {
        let catalog =
            Catalog::load(&config.content_dir, &config.content.extensions)?;
        Self::from_catalog(config, catalog)
    }

    /// Sets up the pipeline over an already loaded catalog.
    pub fn from_catalog(config: Config, catalog: Catalog) -> Result<Self> {
        if config.content.validate {
            catalog.validate()?;
        }

        let renderer = HandlebarsRenderer::new(config.template_dir.as_deref())?
            .with_strict_mode(config.template.strict_mode);
        let generator =
            HtmlGenerator::new().with_minification(config.output.minify);

        let catalog = Arc::new(catalog);
        let router = Router::from_catalog(&config.site.tools_root, &catalog);
        let site = SiteContext::from_config(&config);
        info!(
            "site ready: {} record(s) under {}",
            catalog.len(),
            router.hub_path()
        );

        Ok(Self {
            fallback: Box::new(CatalogFallback::new(Arc::clone(&catalog))),
            renderer: Box::new(renderer),
            generator: Box::new(generator),
            config,
            catalog,
            router,
            site,
        })
    }

    /// Replaces the resolver consulted for unknown slugs.
    pub fn with_fallback(mut self, fallback: Box<dyn FallbackResolver>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replaces the template renderer.
    pub fn with_renderer(mut self, renderer: Box<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Resolves `path` without consulting the fallback.
    pub fn resolve(&self, path: &str) -> Resolution {
        self.router.resolve(path)
    }

    /// Resolves `path` all the way to a page.
    ///
    /// A fallback miss, or a static route whose record is gone, ends at the
    /// hub redirect.
    pub fn dispatch(&self, path: &str) -> Page<'_> {
        let resolution = match self.router.resolve(path) {
            Resolution::Hub => return Page::Hub,
            Resolution::Redirect(redirect) => return Page::Redirect(redirect),
            Resolution::Comparison(slug) => {
                if let Some(record) = self.catalog.comparison(&slug) {
                    return Page::Comparison(record);
                }
                None
            }
            Resolution::Tool(slug) => {
                if let Some(record) = self.catalog.tool(&slug) {
                    return Page::Tool {
                        record,
                        route: ToolRoute::Dedicated,
                    };
                }
                None
            }
            Resolution::Param(param) => self.fallback.resolve_param(&param),
        };

        match resolution {
            Some(FallbackHit::Tool(slug)) => match self.catalog.tool(&slug) {
                Some(record) => Page::Tool {
                    record,
                    route: ToolRoute::Generic,
                },
                None => self.not_found(),
            },
            Some(FallbackHit::Tag(tag)) => {
                let tools = self.catalog.tools_tagged(&tag);
                Page::Listing { tag, tools }
            }
            None => self.not_found(),
        }
    }

    /// Renders `page` to HTML.
    pub fn render_page(&self, page: &Page<'_>) -> Result<String> {
        let document = match page {
            Page::Hub => document::render_hub(&self.catalog, &self.site),
            Page::Tool { record, .. } => {
                document::render_tool(record, &self.site)
            }
            Page::Comparison(record) => {
                document::render_comparison(record, &self.catalog, &self.site)
            }
            Page::Listing { tag, tools } => {
                document::render_listing(tag, tools, &self.site)
            }
            Page::Redirect(redirect) => {
                let context = redirect_context(redirect, &self.site)?;
                return self.renderer.render(REDIRECT_TEMPLATE, &context);
            }
        };
        let context = (&document).into_context()?;
        self.renderer.render(PAGE_TEMPLATE, &context)
    }

    /// Resolves and renders `path`.
    pub fn render_path(&self, path: &str) -> Result<String> {
        self.render_page(&self.dispatch(path))
    }

    /// Every path the static site serves, sorted.
    ///
    /// Tag listings and legacy tag stubs are included; the stubs only when
    /// `output.redirect_stubs` is set.
    pub fn site_paths(&self) -> Vec<String> {
        let router = &self.router;
        let mut paths = BTreeSet::new();
        _ = paths.insert(router.hub_path());
        for tool in self.catalog.tools() {
            _ = paths.insert(router.page_path(&tool.slug));
        }
        for comparison in self.catalog.comparisons() {
            _ = paths.insert(router.comparison_path(&comparison.slug));
            _ = paths.insert(router.page_path(&comparison.slug));
        }
        for tag in self.catalog.tags() {
            _ = paths.insert(router.page_path(&tag));
            if self.config.output.redirect_stubs {
                _ = paths.insert(router.legacy_tag_path(&tag));
            }
        }
        paths.into_iter().collect()
    }

    /// Renders every site path into `output_dir`.
    pub fn build(&self) -> Result<BuildReport> {
        let output_dir = &self.config.output_dir;
        info!("building site into {}", output_dir.display());
        let mut report = BuildReport::default();

        for path in self.site_paths() {
            let page = self.dispatch(&path);
            let html = self.render_page(&page)?;
            let file = output_file(output_dir, &path)?;
            self.generator.generate(&html, &file, None)?;
            debug!("{} -> {}", path, page);

            if matches!(page, Page::Redirect(_)) {
                report.redirects += 1;
            } else {
                report.pages += 1;
            }
            report.files.push(file);
        }

        if self.config.output.redirect_stubs {
            let html = self.render_page(&self.not_found())?;
            let file = output_dir.join(NOT_FOUND_FILE);
            self.generator.generate(&html, &file, None)?;
            report.redirects += 1;
            report.files.push(file);
        }

        info!(
            "wrote {} page(s) and {} redirect(s)",
            report.pages, report.redirects
        );
        Ok(report)
    }

    fn not_found(&self) -> Page<'_> {
        match self.router.not_found() {
            Resolution::Redirect(redirect) => Page::Redirect(redirect),
            _ => Page::Hub,
        }
    }
}

fn redirect_context(redirect: &Redirect, site: &SiteContext) -> Result<JsonValue> {
    Ok(json!({
        "location": redirect.location,
        "location_js": structured_data::to_json_ld(&redirect.location)?,
        "reason": redirect.reason.as_str(),
        "mode": redirect.mode.as_str(),
        "site_name": site.name,
    }))
}

/// Maps a site path onto `<output_dir>/<segments…>/index.html`.
///
/// Segments are percent-decoded; anything that would leave `output_dir` is
/// rejected.
pub fn output_file(output_dir: &Path, path: &str) -> Result<PathBuf> {
    let mut file = output_dir.to_path_buf();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let segment = decode_segment(segment);
        let mut components = Path::new(&segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => file.push(part),
            _ => {
                return Err(ToolHubError::output_generation(
                    format!("unsafe path segment '{}' in {}", segment, path),
                    file,
                    None,
                ))
            }
        }
    }
    file.push(INDEX_FILE);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ComparisonRef, Faq};
    use crate::routing::{HistoryMode, RedirectReason};
    use std::fs;
    use tempfile::TempDir;

    fn tool(slug: &str, name: &str, category: &str, dedicated: bool) -> ToolRecord {
        ToolRecord {
            slug: slug.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            short_pitch: format!("{} in one line.", name),
            rating_value: 4.5,
            dedicated,
            ..Default::default()
        }
    }

    fn hub(temp_dir: &TempDir) -> ToolHub {
        let mut pipedrive = tool("pipedrive", "Pipedrive", "CRM Tools", true);
        pipedrive.pros = vec!["Visual pipeline".to_string()];
        pipedrive.faqs = vec![
            Faq {
                question: "Is there a free trial?".to_string(),
                answer: "Yes, 14 days.".to_string(),
            },
            Faq {
                question: "Does it have an API?".to_string(),
                answer: "Yes.".to_string(),
            },
        ];
        pipedrive.comparisons = vec![ComparisonRef {
            slug: "pipedrive-vs-hubspot".to_string(),
            label: "Pipedrive vs HubSpot".to_string(),
        }];
        let comparison = ComparisonRecord {
            slug: "pipedrive-vs-hubspot".to_string(),
            title: "Pipedrive vs HubSpot".to_string(),
            left: "pipedrive".to_string(),
            right: "hubspot".to_string(),
            ..Default::default()
        };
        let catalog = Catalog::from_records(
            vec![pipedrive, tool("hubspot", "HubSpot", "CRM Tools", false)],
            vec![comparison],
        )
        .unwrap();

        let config = Config {
            content_dir: temp_dir.path().to_path_buf(),
            output_dir: temp_dir.path().join("public"),
            ..Config::default()
        };
        ToolHub::from_catalog(config, catalog).unwrap()
    }

    #[test]
    fn test_dispatch() {
        let temp_dir = TempDir::new().unwrap();
        let hub = hub(&temp_dir);

        assert_eq!(hub.dispatch("/tools"), Page::Hub);
        assert!(matches!(
            hub.dispatch("/tools/pipedrive"),
            Page::Tool { route: ToolRoute::Dedicated, .. }
        ));
        assert!(matches!(
            hub.dispatch("/tools/hubspot"),
            Page::Tool { route: ToolRoute::Generic, .. }
        ));
        assert!(matches!(
            hub.dispatch("/tools/pipedrive-vs-hubspot"),
            Page::Comparison(_)
        ));
        match hub.dispatch("/tools/crm%20tools") {
            Page::Listing { tag, tools } => {
                assert_eq!(tag, "CRM Tools");
                assert_eq!(tools.len(), 2);
            }
            other => panic!("unexpected page: {}", other),
        }
        assert_eq!(
            hub.dispatch("/tools/unknown"),
            Page::Redirect(Redirect {
                location: "/tools".to_string(),
                mode: HistoryMode::Replace,
                reason: RedirectReason::NotFound,
            })
        );
    }

    #[test]
    fn test_custom_fallback_miss_redirects() {
        #[derive(Debug)]
        struct NeverFound;

        impl FallbackResolver for NeverFound {
            fn resolve_param(&self, _param: &str) -> Option<FallbackHit> {
                None
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let hub = hub(&temp_dir).with_fallback(Box::new(NeverFound));
        assert!(matches!(hub.dispatch("/tools/hubspot"), Page::Redirect(_)));
        assert!(matches!(hub.dispatch("/tools/pipedrive"), Page::Tool { .. }));
    }

    #[test]
    fn test_custom_renderer_receives_context() {
        #[derive(Debug)]
        struct TitleOnly;

        impl TemplateRenderer for TitleOnly {
            fn render(&self, template: &str, context: &JsonValue) -> Result<String> {
                Ok(format!("{}:{}", template, context["meta"]["title"]))
            }

            fn validate(&self, _template: &str) -> Result<()> {
                Ok(())
            }
        }

        let temp_dir = TempDir::new().unwrap();
        let hub = hub(&temp_dir).with_renderer(Box::new(TitleOnly));
        assert_eq!(
            hub.render_path("/tools/pipedrive").unwrap(),
            "page:\"Pipedrive Review: Pricing, Features, Pros & Cons\""
        );
    }

    #[test]
    fn test_render_tool_page() {
        let temp_dir = TempDir::new().unwrap();
        let html = hub(&temp_dir).render_path("/tools/pipedrive").unwrap();

        assert!(html.contains(
            "<title>Pipedrive Review: Pricing, Features, Pros &amp; Cons</title>"
        ));
        assert!(html.contains("<h2>Pros</h2>"));
        assert!(!html.contains("<h2>Cons</h2>"));
        assert!(html.contains("\"ratingValue\":4.5"));
        assert!(html.contains("\"@type\":\"FAQPage\""));
        assert!(html.contains("id=\"faq-0\" open"));
        assert!(html.contains("id=\"faq-1\">"));
        assert!(html.contains("href=\"/tools/compare/pipedrive-vs-hubspot\""));
    }

    #[test]
    fn test_render_redirect_page() {
        let temp_dir = TempDir::new().unwrap();
        let html = hub(&temp_dir)
            .render_path("/tools/tag/CRM%20Tools")
            .unwrap();
        assert!(html.contains("location.replace(\"/tools/CRM%20Tools\")"));
        assert!(html.contains("url=/tools/CRM%20Tools"));
        assert!(html.contains("data-reason=\"legacy_tag\""));
    }

    #[test]
    fn test_build_writes_site() {
        let temp_dir = TempDir::new().unwrap();
        let hub = hub(&temp_dir);
        let report = hub.build().unwrap();
        let public = temp_dir.path().join("public");

        // hub, 2 tools, comparison at two paths, 1 listing
        assert_eq!(report.pages, 6);
        // legacy tag stub and 404.html
        assert_eq!(report.redirects, 2);
        for file in [
            "tools/index.html",
            "tools/pipedrive/index.html",
            "tools/hubspot/index.html",
            "tools/compare/pipedrive-vs-hubspot/index.html",
            "tools/pipedrive-vs-hubspot/index.html",
            "tools/CRM Tools/index.html",
            "tools/tag/CRM Tools/index.html",
            "404.html",
        ] {
            assert!(public.join(file).is_file(), "missing {}", file);
        }
        let hub_html =
            fs::read_to_string(public.join("tools/index.html")).unwrap();
        assert!(hub_html.contains("href=\"/tools/hubspot\""));
    }

    #[test]
    fn test_build_without_stubs() {
        let temp_dir = TempDir::new().unwrap();
        let mut hub = hub(&temp_dir);
        hub.config.output.redirect_stubs = false;
        let report = hub.build().unwrap();
        assert_eq!(report.redirects, 0);
        assert!(!temp_dir.path().join("public/404.html").exists());
    }

    #[test]
    fn test_invalid_catalog_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut broken = tool("broken", "Broken", "CRM", false);
        broken.rating_value = 7.0;
        let catalog = Catalog::from_records(vec![broken], Vec::new()).unwrap();
        let config = Config {
            content_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        let err = ToolHub::from_catalog(config, catalog).unwrap_err();
        assert_eq!(err.issues().len(), 1);
    }

    #[test]
    fn test_output_file() {
        let root = Path::new("/srv/site");
        assert_eq!(
            output_file(root, "/tools/CRM%20Tools").unwrap(),
            PathBuf::from("/srv/site/tools/CRM Tools/index.html")
        );
        assert_eq!(
            output_file(root, "/tools").unwrap(),
            PathBuf::from("/srv/site/tools/index.html")
        );
        assert!(output_file(root, "/tools/..").is_err());
        assert!(output_file(root, "/tools/%2E%2E").is_err());
        assert!(output_file(root, "/tools/a%2Fb").is_err());
    }
}
