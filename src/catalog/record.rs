// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Record types making up the content schema.
//!
//! A [`ToolRecord`] describes one reviewed product and a
//! [`ComparisonRecord`] a head-to-head page between two of them. Every
//! collection is optional in the source files and defaults to empty; the
//! page renderer omits the matching section when it is.

use serde::{Deserialize, Serialize};

/// One reviewed product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolRecord {
    /// Unique, URL-safe identifier used for routing and cross references.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Category, also used as a listing tag.
    #[serde(default)]
    pub category: String,
    /// One-sentence summary, reused as the page description.
    #[serde(default)]
    pub short_pitch: String,
    /// Free-text pricing headline such as "Free plan, paid from $10/mo".
    #[serde(default)]
    pub pricing_summary: Option<String>,
    /// Vendor website.
    #[serde(default)]
    pub official_url: Option<String>,
    /// Review score in `[0, 5]`.
    #[serde(default)]
    pub rating_value: f64,
    /// Served from a static route rather than the generic parameter route.
    #[serde(default)]
    pub dedicated: bool,
    /// Extra listing tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Overview paragraphs (Markdown).
    #[serde(default)]
    pub overview: Vec<String>,
    /// "Who is it for" bullet points.
    #[serde(default)]
    pub who_items: Vec<String>,
    /// Feature highlights.
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Pricing table rows.
    #[serde(default)]
    pub pricing_rows: Vec<PricingRow>,
    /// Strengths.
    #[serde(default)]
    pub pros: Vec<String>,
    /// Weaknesses.
    #[serde(default)]
    pub cons: Vec<String>,
    /// Links to other tools in the catalog.
    #[serde(default)]
    pub alternatives: Vec<AlternativeRef>,
    /// Links to comparison pages in the catalog.
    #[serde(default)]
    pub comparisons: Vec<ComparisonRef>,
    /// Question and answer pairs.
    #[serde(default)]
    pub faqs: Vec<Faq>,
    /// Closing verdict (Markdown).
    #[serde(default)]
    pub final_verdict: Option<String>,
    /// Closing bullet points.
    #[serde(default)]
    pub final_points: Vec<String>,
}

impl ToolRecord {
    /// Category followed by the extra tags, without blanks or
    /// case-insensitive duplicates.
    pub fn tag_list(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for tag in std::iter::once(&self.category).chain(&self.tags) {
            let tag = tag.trim();
            if !tag.is_empty()
                && !seen.iter().any(|known| known.eq_ignore_ascii_case(tag))
            {
                seen.push(tag);
            }
        }
        seen
    }

    /// Whether the record carries `tag`, ignoring ASCII case.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tag_list()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(tag))
    }
}

/// A feature highlight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feature {
    /// Short feature name.
    pub title: String,
    /// What it does.
    #[serde(default)]
    pub description: String,
}

/// A row of the pricing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PricingRow {
    /// Plan name.
    pub plan: String,
    /// Price as displayed, e.g. "$12 / user / month".
    pub price: String,
    /// Billing note such as "billed annually".
    #[serde(default)]
    pub billing: Option<String>,
    /// What the plan includes.
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Reference to another tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlternativeRef {
    /// Slug of the referenced [`ToolRecord`].
    pub slug: String,
    /// Link text.
    pub name: String,
    /// Why it is an alternative.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reference to a comparison page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonRef {
    /// Slug of the referenced [`ComparisonRecord`].
    pub slug: String,
    /// Link text, e.g. "ClickUp vs Notion".
    pub label: String,
}

/// A question and its answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Faq {
    /// The question.
    pub question: String,
    /// The answer (Markdown).
    pub answer: String,
}

/// A head-to-head page between two tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonRecord {
    /// Unique, URL-safe identifier, shared namespace with tool slugs.
    pub slug: String,
    /// Page title, e.g. "ClickUp vs Notion".
    pub title: String,
    /// One-sentence summary.
    #[serde(default)]
    pub short_pitch: String,
    /// Slug of the tool shown in the left column.
    pub left: String,
    /// Slug of the tool shown in the right column.
    pub right: String,
    /// Overview paragraphs (Markdown).
    #[serde(default)]
    pub overview: Vec<String>,
    /// Side-by-side rows.
    #[serde(default)]
    pub rows: Vec<MatchupRow>,
    /// Question and answer pairs.
    #[serde(default)]
    pub faqs: Vec<Faq>,
    /// Closing verdict (Markdown).
    #[serde(default)]
    pub final_verdict: Option<String>,
    /// Closing bullet points.
    #[serde(default)]
    pub final_points: Vec<String>,
}

/// One row of a comparison table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchupRow {
    /// What is being compared.
    pub aspect: String,
    /// Value for the left tool.
    pub left: String,
    /// Value for the right tool.
    pub right: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_list_dedupes_category() {
        let record = ToolRecord {
            slug: "pipedrive".to_string(),
            name: "Pipedrive".to_string(),
            category: "CRM Tools".to_string(),
            tags: vec![
                "crm tools".to_string(),
                " ".to_string(),
                "Sales".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(record.tag_list(), vec!["CRM Tools", "Sales"]);
        assert!(record.has_tag("crm TOOLS"));
        assert!(!record.has_tag("Marketing"));
    }

    #[test]
    fn test_minimal_toml_record() {
        let record: ToolRecord = toml::from_str(
            "slug = 'acme'\nname = 'Acme'\nrating_value = 4.5\n",
        )
        .unwrap();
        assert_eq!(record.rating_value, 4.5);
        assert!(record.pros.is_empty());
        assert!(!record.dedicated);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let parsed: Result<ToolRecord, _> = toml::from_str(
            "slug = 'acme'\nname = 'Acme'\nprosz = ['typo']\n",
        );
        assert!(parsed.is_err());
    }
}
