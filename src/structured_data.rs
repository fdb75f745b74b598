// Copyright © 2024 ToolHub. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Structured Data
//!
//! schema.org objects embedded in review pages as JSON-LD:
//!
//! - a [`Product`] carrying the editorial review and its rating, emitted for
//!   every tool page;
//! - a [`FaqPage`], emitted only when the page has questions.
//!
//! The rating is copied as is. Range checks belong to the catalog
//! validator, not to the serializer.

use serde::Serialize;

use crate::catalog::{Faq, ToolRecord};
use crate::core::error::{Result, ToolHubError};

/// JSON-LD vocabulary.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Highest score on the review scale.
pub const BEST_RATING: u8 = 5;

/// Lowest score on the review scale. The catalog validator accepts the
/// same range, so `ratingValue` never falls outside it.
pub const WORST_RATING: u8 = 0;

/// schema.org `Product` with an editorial `Review`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    /// Always [`SCHEMA_CONTEXT`].
    #[serde(rename = "@context")]
    pub context: &'static str,
    /// Always `Product`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// Tool name.
    pub name: String,
    /// Short pitch.
    pub description: String,
    /// The tool's brand, named after the tool.
    pub brand: Brand,
    /// Canonical review URL.
    pub url: String,
    /// Tool category.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// The review this page is.
    pub review: Review,
}

/// schema.org `Brand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brand {
    /// Always `Brand`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// Brand name.
    pub name: String,
}

/// schema.org `Review`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Always `Review`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// The publishing site.
    pub author: Organization,
    /// The score.
    pub review_rating: Rating,
}

/// schema.org `Organization`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    /// Always `Organization`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// Organization name.
    pub name: String,
}

/// schema.org `Rating`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Always `Rating`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// The record's rating, unmodified.
    pub rating_value: f64,
    /// [`BEST_RATING`].
    pub best_rating: u8,
    /// [`WORST_RATING`].
    pub worst_rating: u8,
}

/// schema.org `FAQPage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqPage {
    /// Always [`SCHEMA_CONTEXT`].
    #[serde(rename = "@context")]
    pub context: &'static str,
    /// Always `FAQPage`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// The questions, in page order.
    pub main_entity: Vec<Question>,
}

/// schema.org `Question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Always `Question`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// The question text.
    pub name: String,
    /// The answer.
    pub accepted_answer: Answer,
}

/// schema.org `Answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Always `Answer`.
    #[serde(rename = "@type")]
    pub kind: &'static str,
    /// The answer text.
    pub text: String,
}

/// Builds the `Product` object for `record`.
///
/// `url` is the canonical page URL and `publisher` the site name credited
/// as the review author.
pub fn product(record: &ToolRecord, url: &str, publisher: &str) -> Product {
    Product {
        context: SCHEMA_CONTEXT,
        kind: "Product",
        name: record.name.clone(),
        description: record.short_pitch.clone(),
        brand: Brand {
            kind: "Brand",
            name: record.name.clone(),
        },
        url: url.to_string(),
        category: record.category.clone(),
        review: Review {
            kind: "Review",
            author: Organization {
                kind: "Organization",
                name: publisher.to_string(),
            },
            review_rating: Rating {
                kind: "Rating",
                rating_value: record.rating_value,
                best_rating: BEST_RATING,
                worst_rating: WORST_RATING,
            },
        },
    }
}

/// Builds the `FAQPage` object, or `None` when there are no questions.
pub fn faq_page(faqs: &[Faq]) -> Option<FaqPage> {
    if faqs.is_empty() {
        return None;
    }
    Some(FaqPage {
        context: SCHEMA_CONTEXT,
        kind: "FAQPage",
        main_entity: faqs
            .iter()
            .map(|faq| Question {
                kind: "Question",
                name: faq.question.clone(),
                accepted_answer: Answer {
                    kind: "Answer",
                    text: faq.answer.clone(),
                },
            })
            .collect(),
    })
}

/// Serializes `value` for a `<script type="application/ld+json">` block.
///
/// `</` is escaped so that no string in the data can close the script
/// element early.
pub fn to_json_ld<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).map_err(|e| {
        ToolHubError::internal(format!(
            "failed to serialize structured data: {}",
            e
        ))
    })?;
    Ok(json.replace("</", "<\\/"))
}
