// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Page Documents
//!
//! Pure functions from catalog records to a [`Document`], the
//! template-agnostic description of one page. Every tool goes through the
//! same [`render_tool`]; whether a tool is served from a dedicated route
//! only matters to the router.
//!
//! A section is present only when the record has data for it, so an empty
//! `pros` list produces no "Pros" heading at all.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::accordion::FaqAccordion;
use crate::catalog::{
    Catalog, ComparisonRecord, Faq, Feature, MatchupRow, PricingRow,
    ToolRecord,
};
use crate::core::config::Config;
use crate::core::error::{Result, ToolHubError};
use crate::core::traits::IntoContext;
use crate::routing::COMPARE_SEGMENT;
use crate::structured_data::{self, FaqPage, Product};
use crate::template::helpers::is_safe_url;

/// Kind of page a [`Document`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// The tools hub.
    Hub,
    /// A tool review.
    Tool,
    /// A head-to-head comparison.
    Comparison,
    /// Every tool carrying one tag.
    Listing,
}

/// Site-wide values needed to build URLs and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteContext {
    /// Absolute base URL without a trailing slash.
    pub base_url: String,
    /// Path segment of the tools section.
    pub tools_root: String,
    /// Site name.
    pub name: String,
}

impl SiteContext {
    /// Creates a context, normalising slashes.
    pub fn new(base_url: &str, tools_root: &str, name: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tools_root: tools_root.trim_matches('/').to_string(),
            name: name.to_string(),
        }
    }

    /// Context for the site described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.site.base_url,
            &config.site.tools_root,
            &config.site.name,
        )
    }

    /// `/<root>`
    pub fn hub_path(&self) -> String {
        format!("/{}", self.tools_root)
    }

    /// `/<root>/<segment>`, with the segment percent-encoded.
    pub fn page_path(&self, segment: &str) -> String {
        format!("/{}/{}", self.tools_root, urlencoding::encode(segment))
    }

    /// `/<root>/compare/<slug>`
    pub fn comparison_path(&self, slug: &str) -> String {
        format!(
            "/{}/{}/{}",
            self.tools_root,
            COMPARE_SEGMENT,
            urlencoding::encode(slug)
        )
    }

    /// Absolute URL of a site path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Head metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// `<title>` text.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Canonical URL.
    pub canonical_url: String,
}

/// Top-of-page summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hero {
    /// Small label above the title.
    pub eyebrow: String,
    /// Main heading.
    pub title: String,
    /// Lead sentence.
    pub pitch: String,
    /// Pricing headline.
    pub pricing_summary: Option<String>,
    /// Rating as displayed, e.g. `4.5/5`.
    pub rating: Option<String>,
    /// Vendor link.
    pub official_url: Option<String>,
}

/// A link with an optional note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Target path.
    pub href: String,
    /// Link text.
    pub label: String,
    /// Text shown next to the link.
    pub note: Option<String>,
}

/// A tool summary card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Target path.
    pub href: String,
    /// Tool name.
    pub title: String,
    /// Short pitch.
    pub pitch: String,
    /// Rating as displayed.
    pub rating: String,
    /// Pricing headline.
    pub pricing_summary: Option<String>,
}

/// One FAQ entry with its initial accordion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqView {
    /// Position in the list.
    pub index: usize,
    /// The question.
    pub question: String,
    /// The answer (Markdown).
    pub answer: String,
    /// Whether the item starts expanded.
    pub open: bool,
}

/// Section content, tagged with the layout the template uses for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SectionBody {
    /// Markdown paragraphs.
    Paragraphs {
        /// Paragraph sources.
        paragraphs: Vec<String>,
    },
    /// A plain bullet list.
    Bullets {
        /// Bullet texts.
        items: Vec<String>,
    },
    /// Feature highlights.
    Features {
        /// Features in record order.
        items: Vec<Feature>,
    },
    /// Pricing table.
    Pricing {
        /// Table rows.
        rows: Vec<PricingRow>,
    },
    /// A list of links.
    Links {
        /// The links.
        links: Vec<Link>,
    },
    /// FAQ accordion.
    Faqs {
        /// The entries.
        items: Vec<FaqView>,
    },
    /// A single Markdown block.
    Text {
        /// Markdown source.
        text: String,
    },
    /// Side-by-side comparison table.
    Matchup {
        /// Column headings after the aspect column.
        columns: Vec<String>,
        /// Table rows.
        rows: Vec<MatchupRow>,
    },
    /// Tool cards.
    Cards {
        /// The cards.
        cards: Vec<Card>,
    },
}

/// A titled block of page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Anchor id.
    pub id: String,
    /// Heading text.
    pub heading: String,
    /// Content.
    #[serde(flatten)]
    pub body: SectionBody,
}

impl Section {
    fn new(id: &str, heading: impl Into<String>, body: SectionBody) -> Self {
        Self {
            id: id.to_string(),
            heading: heading.into(),
            body,
        }
    }
}

/// Everything a template needs to render one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Page kind.
    pub kind: PageKind,
    /// Site name.
    pub site_name: String,
    /// Path of the hub, for navigation.
    pub hub_path: String,
    /// Head metadata.
    pub meta: PageMeta,
    /// Page header.
    pub hero: Hero,
    /// Body sections, in display order.
    pub sections: Vec<Section>,
    /// Product data, on tool pages.
    #[serde(skip)]
    pub product: Option<Product>,
    /// FAQ data, on pages with questions.
    #[serde(skip)]
    pub faq_page: Option<FaqPage>,
}

impl Document {
    /// Looks up a section by anchor id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Whether a section with `heading` is present.
    pub fn has_heading(&self, heading: &str) -> bool {
        self.sections.iter().any(|section| section.heading == heading)
    }

    /// JSON-LD blocks for the page, `Product` first.
    pub fn json_ld(&self) -> Result<Vec<String>> {
        let mut blocks = Vec::new();
        if let Some(product) = &self.product {
            blocks.push(structured_data::to_json_ld(product)?);
        }
        if let Some(faq_page) = &self.faq_page {
            blocks.push(structured_data::to_json_ld(faq_page)?);
        }
        Ok(blocks)
    }
}

impl IntoContext for &Document {
    fn into_context(self) -> Result<JsonValue> {
        let mut context = serde_json::to_value(self).map_err(|e| {
            ToolHubError::internal(format!(
                "failed to build page context: {}",
                e
            ))
        })?;
        if let JsonValue::Object(map) = &mut context {
            _ = map.insert(
                "structured_data".to_string(),
                self.json_ld()?.into(),
            );
        }
        Ok(context)
    }
}

/// `<title>` of a tool review.
pub fn tool_title(record: &ToolRecord) -> String {
    format!("{} Review: Pricing, Features, Pros & Cons", record.name)
}

/// Rating as displayed, e.g. `4.5/5`.
pub fn display_rating(rating: f64) -> String {
    format!("{}/{}", rating, structured_data::BEST_RATING)
}

/// Renders a tool review.
pub fn render_tool(record: &ToolRecord, site: &SiteContext) -> Document {
    let canonical_url = site.url(&site.page_path(&record.slug));
    let mut sections = Vec::new();

    if !record.overview.is_empty() {
        sections.push(Section::new(
            "overview",
            format!("What is {}?", record.name),
            SectionBody::Paragraphs {
                paragraphs: record.overview.clone(),
            },
        ));
    }
    if !record.who_items.is_empty() {
        sections.push(Section::new(
            "who-its-for",
            format!("Who {} is for", record.name),
            SectionBody::Bullets {
                items: record.who_items.clone(),
            },
        ));
    }
    if !record.features.is_empty() {
        sections.push(Section::new(
            "features",
            "Key features",
            SectionBody::Features {
                items: record.features.clone(),
            },
        ));
    }
    if !record.pricing_rows.is_empty() {
        sections.push(Section::new(
            "pricing",
            "Pricing",
            SectionBody::Pricing {
                rows: record.pricing_rows.clone(),
            },
        ));
    }
    if !record.pros.is_empty() {
        sections.push(Section::new(
            "pros",
            "Pros",
            SectionBody::Bullets {
                items: record.pros.clone(),
            },
        ));
    }
    if !record.cons.is_empty() {
        sections.push(Section::new(
            "cons",
            "Cons",
            SectionBody::Bullets {
                items: record.cons.clone(),
            },
        ));
    }
    if !record.alternatives.is_empty() {
        let links = record
            .alternatives
            .iter()
            .map(|alternative| Link {
                href: site.page_path(&alternative.slug),
                label: alternative.name.clone(),
                note: alternative.reason.clone(),
            })
            .collect();
        sections.push(Section::new(
            "alternatives",
            format!("{} alternatives", record.name),
            SectionBody::Links { links },
        ));
    }
    if !record.comparisons.is_empty() {
        let links = record
            .comparisons
            .iter()
            .map(|comparison| Link {
                href: site.comparison_path(&comparison.slug),
                label: comparison.label.clone(),
                note: None,
            })
            .collect();
        sections.push(Section::new(
            "comparisons",
            "Comparisons",
            SectionBody::Links { links },
        ));
    }
    push_closing_sections(
        &mut sections,
        &record.faqs,
        record.final_verdict.as_deref(),
        &record.final_points,
    );

    Document {
        kind: PageKind::Tool,
        site_name: site.name.clone(),
        hub_path: site.hub_path(),
        meta: PageMeta {
            title: tool_title(record),
            description: record.short_pitch.clone(),
            canonical_url: canonical_url.clone(),
        },
        hero: Hero {
            eyebrow: record.category.clone(),
            title: record.name.clone(),
            pitch: record.short_pitch.clone(),
            pricing_summary: record.pricing_summary.clone(),
            rating: Some(display_rating(record.rating_value)),
            official_url: record
                .official_url
                .clone()
                .filter(|url| is_safe_url(url)),
        },
        sections,
        product: Some(structured_data::product(
            record,
            &canonical_url,
            &site.name,
        )),
        faq_page: structured_data::faq_page(&record.faqs),
    }
}

/// Renders a comparison page.
///
/// Tool names are taken from `catalog`; a side missing from it is shown
/// by slug.
pub fn render_comparison(
    record: &ComparisonRecord,
    catalog: &Catalog,
    site: &SiteContext,
) -> Document {
    let name_of = |slug: &str| {
        catalog
            .tool(slug)
            .map_or_else(|| slug.to_string(), |tool| tool.name.clone())
    };
    let left = name_of(&record.left);
    let right = name_of(&record.right);
    let mut sections = Vec::new();

    if !record.overview.is_empty() {
        sections.push(Section::new(
            "overview",
            "Overview",
            SectionBody::Paragraphs {
                paragraphs: record.overview.clone(),
            },
        ));
    }
    if !record.rows.is_empty() {
        sections.push(Section::new(
            "matchup",
            format!("{} vs {} at a glance", left, right),
            SectionBody::Matchup {
                columns: vec![left.clone(), right.clone()],
                rows: record.rows.clone(),
            },
        ));
    }
    sections.push(Section::new(
        "reviews",
        "Full reviews",
        SectionBody::Links {
            links: vec![
                Link {
                    href: site.page_path(&record.left),
                    label: format!("{} review", left),
                    note: None,
                },
                Link {
                    href: site.page_path(&record.right),
                    label: format!("{} review", right),
                    note: None,
                },
            ],
        },
    ));
    push_closing_sections(
        &mut sections,
        &record.faqs,
        record.final_verdict.as_deref(),
        &record.final_points,
    );

    Document {
        kind: PageKind::Comparison,
        site_name: site.name.clone(),
        hub_path: site.hub_path(),
        meta: PageMeta {
            title: format!("{}: Which Is Better?", record.title),
            description: record.short_pitch.clone(),
            canonical_url: site.url(&site.comparison_path(&record.slug)),
        },
        hero: Hero {
            eyebrow: "Comparison".to_string(),
            title: record.title.clone(),
            pitch: record.short_pitch.clone(),
            ..Hero::default()
        },
        sections,
        product: None,
        faq_page: structured_data::faq_page(&record.faqs),
    }
}

/// Renders the hub: tools grouped by category, then comparisons and tags.
pub fn render_hub(catalog: &Catalog, site: &SiteContext) -> Document {
    let mut sections: Vec<Section> = catalog
        .by_category()
        .into_iter()
        .map(|(category, tools)| {
            Section::new(
                &format!("category-{}", anchor(&category)),
                category,
                SectionBody::Cards {
                    cards: tools.into_iter().map(|t| card(t, site)).collect(),
                },
            )
        })
        .collect();

    let comparisons: Vec<Link> = catalog
        .comparisons()
        .map(|comparison| Link {
            href: site.comparison_path(&comparison.slug),
            label: comparison.title.clone(),
            note: None,
        })
        .collect();
    if !comparisons.is_empty() {
        sections.push(Section::new(
            "comparisons",
            "Comparisons",
            SectionBody::Links { links: comparisons },
        ));
    }

    let tags: Vec<Link> = catalog
        .tags()
        .into_iter()
        .map(|tag| Link {
            href: site.page_path(&tag),
            label: tag,
            note: None,
        })
        .collect();
    if !tags.is_empty() {
        sections.push(Section::new(
            "tags",
            "Browse by tag",
            SectionBody::Links { links: tags },
        ));
    }

    let description = format!(
        "Independent reviews of {} software tools: pricing, features, \
         pros and cons.",
        catalog.tools().count()
    );
    Document {
        kind: PageKind::Hub,
        site_name: site.name.clone(),
        hub_path: site.hub_path(),
        meta: PageMeta {
            title: format!("Software Tool Reviews | {}", site.name),
            description: description.clone(),
            canonical_url: site.url(&site.hub_path()),
        },
        hero: Hero {
            eyebrow: site.name.clone(),
            title: "Software tool reviews".to_string(),
            pitch: description,
            ..Hero::default()
        },
        sections,
        product: None,
        faq_page: None,
    }
}

/// Renders the listing of every tool carrying `tag`.
pub fn render_listing(
    tag: &str,
    tools: &[&ToolRecord],
    site: &SiteContext,
) -> Document {
    let description =
        format!("{} {} tools reviewed and compared.", tools.len(), tag);
    let mut sections = Vec::new();
    if !tools.is_empty() {
        sections.push(Section::new(
            "tools",
            format!("{} tools", tag),
            SectionBody::Cards {
                cards: tools.iter().map(|tool| card(tool, site)).collect(),
            },
        ));
    }

    Document {
        kind: PageKind::Listing,
        site_name: site.name.clone(),
        hub_path: site.hub_path(),
        meta: PageMeta {
            title: format!("Best {} Tools | {}", tag, site.name),
            description: description.clone(),
            canonical_url: site.url(&site.page_path(tag)),
        },
        hero: Hero {
            eyebrow: "Tag".to_string(),
            title: tag.to_string(),
            pitch: description,
            ..Hero::default()
        },
        sections,
        product: None,
        faq_page: None,
    }
}

fn push_closing_sections(
    sections: &mut Vec<Section>,
    faqs: &[Faq],
    verdict: Option<&str>,
    final_points: &[String],
) {
    if !faqs.is_empty() {
        let accordion = FaqAccordion::new(faqs.len());
        let items = faqs
            .iter()
            .enumerate()
            .map(|(index, faq)| FaqView {
                index,
                question: faq.question.clone(),
                answer: faq.answer.clone(),
                open: accordion.is_open(index),
            })
            .collect();
        sections.push(Section::new(
            "faqs",
            "Frequently asked questions",
            SectionBody::Faqs { items },
        ));
    }
    if let Some(verdict) = verdict.filter(|v| !v.trim().is_empty()) {
        sections.push(Section::new(
            "verdict",
            "Final verdict",
            SectionBody::Text {
                text: verdict.to_string(),
            },
        ));
    }
    if !final_points.is_empty() {
        sections.push(Section::new(
            "takeaways",
            "Key takeaways",
            SectionBody::Bullets {
                items: final_points.to_vec(),
            },
        ));
    }
}

fn card(tool: &ToolRecord, site: &SiteContext) -> Card {
    Card {
        href: site.page_path(&tool.slug),
        title: tool.name.clone(),
        pitch: tool.short_pitch.clone(),
        rating: display_rating(tool.rating_value),
        pricing_summary: tool.pricing_summary.clone(),
    }
}

/// Lowercase anchor id: ASCII alphanumerics kept, runs of anything else
/// collapsed to one `-`.
fn anchor(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
        } else if !id.is_empty() && !id.ends_with('-') {
            id.push('-');
        }
    }
    let id = id.trim_end_matches('-');
    if id.is_empty() {
        "section".to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlternativeRef, ComparisonRef};
    use crate::core::traits::TemplateRenderer;
    use crate::template::{HandlebarsRenderer, PAGE_TEMPLATE};

    fn site() -> SiteContext {
        SiteContext::new("https://example.com/", "tools", "ToolHub")
    }

    fn record() -> ToolRecord {
        ToolRecord {
            slug: "pipedrive".to_string(),
            name: "Pipedrive".to_string(),
            category: "CRM".to_string(),
            short_pitch: "Sales-first CRM.".to_string(),
            rating_value: 4.5,
            ..Default::default()
        }
    }

    fn faqs(n: usize) -> Vec<Faq> {
        (1..=n)
            .map(|i| Faq {
                question: format!("Question {}?", i),
                answer: format!("Answer {}.", i),
            })
            .collect()
    }

    #[test]
    fn test_empty_record_has_no_sections() {
        let document = render_tool(&record(), &site());
        assert!(document.sections.is_empty());
        assert!(document.faq_page.is_none());
        assert!(document.product.is_some());
    }

    #[test]
    fn test_pros_heading_follows_data() {
        let mut record = record();
        assert!(!render_tool(&record, &site()).has_heading("Pros"));
        record.pros = vec!["a".to_string()];
        assert!(render_tool(&record, &site()).has_heading("Pros"));
    }

    #[test]
    fn test_section_order() {
        let mut record = record();
        record.final_points = vec!["Solid pick".to_string()];
        record.cons = vec!["Pricey".to_string()];
        record.overview = vec!["A CRM.".to_string()];
        record.final_verdict = Some("Recommended.".to_string());
        record.faqs = faqs(1);
        record.pros = vec!["Fast".to_string()];
        record.alternatives = vec![AlternativeRef {
            slug: "hubspot".to_string(),
            name: "HubSpot".to_string(),
            reason: Some("Free tier".to_string()),
        }];
        record.comparisons = vec![ComparisonRef {
            slug: "pipedrive-vs-hubspot".to_string(),
            label: "Pipedrive vs HubSpot".to_string(),
        }];
        record.pricing_rows = vec![PricingRow {
            plan: "Essential".to_string(),
            price: "$14 / seat / month".to_string(),
            billing: Some("billed annually".to_string()),
            highlights: vec!["Pipeline management".to_string()],
        }];
        record.features = vec![Feature {
            title: "Visual pipeline".to_string(),
            description: "Drag deals between stages.".to_string(),
        }];
        record.who_items = vec!["Small sales teams".to_string()];

        let document = render_tool(&record, &site());
        let ids: Vec<&str> =
            document.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "overview",
                "who-its-for",
                "features",
                "pricing",
                "pros",
                "cons",
                "alternatives",
                "comparisons",
                "faqs",
                "verdict",
                "takeaways"
            ]
        );

        match &document.section("comparisons").unwrap().body {
            SectionBody::Links { links } => {
                assert_eq!(links[0].href, "/tools/compare/pipedrive-vs-hubspot");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_each_section_follows_its_data() {
        let mut record = record();
        record.who_items = vec!["Founders".to_string()];
        let document = render_tool(&record, &site());
        assert!(document.section("who-its-for").is_some());
        assert!(document.section("features").is_none());
        assert!(document.section("pricing").is_none());

        record.who_items.clear();
        record.features = vec![Feature {
            title: "Automation".to_string(),
            description: String::new(),
        }];
        let document = render_tool(&record, &site());
        assert!(document.section("who-its-for").is_none());
        assert!(document.section("features").is_some());
        assert!(document.section("pricing").is_none());

        record.features.clear();
        record.pricing_rows = vec![PricingRow {
            plan: "Free".to_string(),
            price: "$0".to_string(),
            ..Default::default()
        }];
        let document = render_tool(&record, &site());
        assert!(document.section("features").is_none());
        assert!(document.section("pricing").is_some());
    }

    #[test]
    fn test_table_layouts_render() {
        let renderer = HandlebarsRenderer::new(None).unwrap();
        let mut record = record();
        record.features = vec![Feature {
            title: "Visual pipeline".to_string(),
            description: "Drag deals between stages.".to_string(),
        }];
        record.pricing_rows = vec![PricingRow {
            plan: "Advanced".to_string(),
            price: "$29 / seat / month".to_string(),
            billing: Some("billed annually".to_string()),
            highlights: vec!["Email sync".to_string()],
        }];
        let context = (&render_tool(&record, &site())).into_context().unwrap();
        let html = renderer.render(PAGE_TEMPLATE, &context).unwrap();

        assert!(html.contains("<dl class=\"features\">"));
        assert!(html.contains(
            "<dt>Visual pipeline</dt><dd>Drag deals between stages.</dd>"
        ));
        assert!(html.contains("<table class=\"pricing\">"));
        assert!(html.contains("<td>Advanced</td>"));
        assert!(html
            .contains("<td>$29 / seat / month <small>billed annually</small></td>"));
        assert!(html.contains("<li>Email sync</li>"));

        let catalog = Catalog::from_records(
            vec![
                record,
                ToolRecord {
                    slug: "hubspot".to_string(),
                    name: "HubSpot".to_string(),
                    ..Default::default()
                },
            ],
            Vec::new(),
        )
        .unwrap();
        let comparison = ComparisonRecord {
            slug: "pipedrive-vs-hubspot".to_string(),
            title: "Pipedrive vs HubSpot".to_string(),
            left: "pipedrive".to_string(),
            right: "hubspot".to_string(),
            rows: vec![MatchupRow {
                aspect: "Free plan".to_string(),
                left: "No".to_string(),
                right: "Yes".to_string(),
            }],
            ..Default::default()
        };
        let document = render_comparison(&comparison, &catalog, &site());
        let html = renderer
            .render(PAGE_TEMPLATE, &(&document).into_context().unwrap())
            .unwrap();

        assert!(html.contains("<table class=\"matchup\">"));
        assert!(html.contains("<th></th><th>Pipedrive</th><th>HubSpot</th>"));
        assert!(html.contains(
            "<tr><th scope=\"row\">Free plan</th><td>No</td><td>Yes</td></tr>"
        ));
    }

    #[test]
    fn test_blank_verdict_is_omitted() {
        let mut record = record();
        record.final_verdict = Some("  ".to_string());
        assert!(render_tool(&record, &site()).section("verdict").is_none());
    }

    #[test]
    fn test_metadata() {
        let document = render_tool(&record(), &site());
        assert_eq!(
            document.meta,
            PageMeta {
                title: "Pipedrive Review: Pricing, Features, Pros & Cons"
                    .to_string(),
                description: "Sales-first CRM.".to_string(),
                canonical_url: "https://example.com/tools/pipedrive"
                    .to_string(),
            }
        );
        assert_eq!(document.hero.rating.as_deref(), Some("4.5/5"));
        assert_eq!(
            document.product.as_ref().unwrap().url,
            document.meta.canonical_url
        );
    }

    #[test]
    fn test_faq_items_start_with_first_open() {
        let mut record = record();
        record.faqs = faqs(2);
        let document = render_tool(&record, &site());

        match &document.section("faqs").unwrap().body {
            SectionBody::Faqs { items } => {
                assert!(items[0].open);
                assert!(!items[1].open);
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert_eq!(document.faq_page.unwrap().main_entity.len(), 2);
    }

    #[test]
    fn test_context_carries_layout_and_json_ld() {
        let mut record = record();
        record.pros = vec!["Fast".to_string()];
        record.faqs = faqs(1);
        let document = render_tool(&record, &site());
        let context = (&document).into_context().unwrap();

        assert_eq!(context["kind"], "tool");
        assert_eq!(context["sections"][0]["layout"], "bullets");
        assert_eq!(context["sections"][0]["items"][0], "Fast");
        let blocks = context["structured_data"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].as_str().unwrap().contains("\"Product\""));
        assert!(context.get("product").is_none());
    }

    #[test]
    fn test_comparison_document() {
        let catalog = Catalog::from_records(
            vec![
                record(),
                ToolRecord {
                    slug: "hubspot".to_string(),
                    name: "HubSpot".to_string(),
                    ..Default::default()
                },
            ],
            Vec::new(),
        )
        .unwrap();
        let comparison = ComparisonRecord {
            slug: "pipedrive-vs-hubspot".to_string(),
            title: "Pipedrive vs HubSpot".to_string(),
            left: "pipedrive".to_string(),
            right: "hubspot".to_string(),
            rows: vec![MatchupRow {
                aspect: "Free plan".to_string(),
                left: "No".to_string(),
                right: "Yes".to_string(),
            }],
            ..Default::default()
        };

        let document = render_comparison(&comparison, &catalog, &site());
        assert_eq!(document.kind, PageKind::Comparison);
        assert_eq!(
            document.meta.canonical_url,
            "https://example.com/tools/compare/pipedrive-vs-hubspot"
        );
        assert!(document.has_heading("Pipedrive vs HubSpot at a glance"));
        assert!(document.product.is_none());
        assert!(document.faq_page.is_none());
    }

    #[test]
    fn test_hub_and_listing() {
        let mut beta = record();
        beta.slug = "beta".to_string();
        beta.name = "Beta".to_string();
        beta.category = "Project Management".to_string();
        let catalog =
            Catalog::from_records(vec![record(), beta], Vec::new()).unwrap();

        let hub = render_hub(&catalog, &site());
        assert_eq!(hub.kind, PageKind::Hub);
        assert!(hub.section("category-crm").is_some());
        assert!(hub.section("category-project-management").is_some());
        assert!(hub.section("comparisons").is_none());
        assert_eq!(hub.meta.canonical_url, "https://example.com/tools");

        let tools = catalog.tools_tagged("Project Management");
        let listing = render_listing("Project Management", &tools, &site());
        assert_eq!(
            listing.meta.canonical_url,
            "https://example.com/tools/Project%20Management"
        );
        match &listing.sections[0].body {
            SectionBody::Cards { cards } => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].href, "/tools/beta");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_category_anchors_do_not_clash() {
        let mut comparisons = record();
        comparisons.category = "Comparisons".to_string();
        let mut tags = record();
        tags.slug = "beta".to_string();
        tags.category = "Tags".to_string();
        let comparison = ComparisonRecord {
            slug: "pipedrive-vs-beta".to_string(),
            title: "Pipedrive vs Beta".to_string(),
            left: "pipedrive".to_string(),
            right: "beta".to_string(),
            ..Default::default()
        };
        let catalog =
            Catalog::from_records(vec![comparisons, tags], vec![comparison])
                .unwrap();

        let hub = render_hub(&catalog, &site());
        let ids: Vec<&str> = hub.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["category-comparisons", "category-tags", "comparisons", "tags"]
        );
    }

    #[test]
    fn test_unsafe_official_url_is_dropped() {
        let mut record = record();
        record.official_url = Some(" JavaScript:alert(1)".to_string());
        assert!(render_tool(&record, &site()).hero.official_url.is_none());

        record.official_url = Some("https://www.pipedrive.com".to_string());
        assert_eq!(
            render_tool(&record, &site()).hero.official_url.as_deref(),
            Some("https://www.pipedrive.com")
        );
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("CRM Tools"), "crm-tools");
        assert_eq!(anchor("  AI / ML "), "ai-ml");
        assert_eq!(anchor("***"), "section");
    }
}
