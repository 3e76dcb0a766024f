// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge descriptor construction.
//!
//! The builders here are pure and total: given well-typed input they always
//! produce a [`BadgeSpec`], falling back to neutral placeholder text when a
//! fact is absent. Two equal specs render identically, which makes the
//! artifacts reproducible across runs.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    license::LicenseClassifier,
    metadata::{LanguageDistribution, LicenseFacts}
};

/// Label color shared by every badge kind.
pub const LABEL_COLOR: &str = "#555";

/// Message color used when a fact is absent or unclassified.
pub const NEUTRAL_COLOR: &str = "lightgrey";

/// Visual style presets supported by the badge service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeStyle {
    /// Flat appearance with rounded corners (default).
    Flat,
    /// Flat appearance with square corners.
    FlatSquare,
    /// Glossy preset popularized by shields.io.
    Plastic,
    /// Large preset with uppercase text.
    ForTheBadge,
    /// Social-style preset.
    Social
}

impl BadgeStyle {
    /// Token used in badge-service URLs and configuration values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::FlatSquare => "flat-square",
            Self::Plastic => "plastic",
            Self::ForTheBadge => "for-the-badge",
            Self::Social => "social"
        }
    }
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self::Flat
    }
}

impl fmt::Display for BadgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeStyle {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "flat" => Ok(Self::Flat),
            "flat-square" => Ok(Self::FlatSquare),
            "plastic" => Ok(Self::Plastic),
            "for-the-badge" => Ok(Self::ForTheBadge),
            "social" => Ok(Self::Social),
            other => Err(Error::validation(format!(
                "unknown badge style '{other}' (expected flat, flat-square, plastic, for-the-badge, or social)"
            )))
        }
    }
}

/// Badge kinds the pipeline can publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    /// Declared license badge.
    License,
    /// Dominant language badge.
    Language
}

impl BadgeKind {
    /// Artifact filename for this badge kind.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::License => "license.svg",
            Self::Language => "language.svg"
        }
    }

    /// Badge label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::License => "license",
            Self::Language => "language"
        }
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Declarative badge descriptor. Fully determines the rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeSpec {
    /// Left-hand label text.
    pub label:         String,
    /// Right-hand message text.
    pub message:       String,
    /// Color token behind the label.
    pub label_color:   String,
    /// Color token behind the message.
    pub message_color: String,
    /// Visual style preset.
    pub style:         BadgeStyle,
    /// Optional logo name understood by the badge service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo:          Option<String>,
    /// Optional logo color token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_color:    Option<String>
}

/// Builds the license badge descriptor.
///
/// A known license shows its SPDX identifier over the classified category
/// color; absent license information falls back to "not specified" over the
/// neutral color. Never fails.
pub fn license_badge(
    license: Option<&LicenseFacts>,
    classifier: &LicenseClassifier,
    style: BadgeStyle
) -> BadgeSpec {
    let spdx_id = license.and_then(|facts| facts.spdx_id.as_deref()).filter(|id| !id.is_empty());

    let (message, message_color) = match spdx_id {
        Some(id) => {
            let category = classifier.classify(Some(id));
            (id.to_owned(), category.color.to_owned())
        }
        None => ("not specified".to_owned(), NEUTRAL_COLOR.to_owned())
    };

    BadgeSpec {
        label: BadgeKind::License.label().to_owned(),
        message,
        label_color: LABEL_COLOR.to_owned(),
        message_color,
        style,
        logo: None,
        logo_color: None
    }
}

/// Builds the dominant-language badge descriptor.
///
/// Takes the single highest-size edge of the distribution and reports its
/// share of the total as `"{name}({percent}%)"` with exactly two decimal
/// places. An absent distribution, an empty edge list, or a zero total size
/// all fall back to "not found" over the neutral color, so no division by
/// zero can occur. Never fails.
pub fn language_badge(languages: Option<&LanguageDistribution>, style: BadgeStyle) -> BadgeSpec {
    let mut message = "not found".to_owned();
    let mut message_color = NEUTRAL_COLOR.to_owned();

    if let Some(distribution) = languages
        && let Some(edge) = distribution.edges.first()
        && distribution.total_size > 0
    {
        let percent = percent_of(edge.size, distribution.total_size);
        message = format!("{}({percent}%)", edge.node.name);
        message_color = edge
            .node
            .color
            .clone()
            .unwrap_or_else(|| NEUTRAL_COLOR.to_owned());
    }

    BadgeSpec {
        label: BadgeKind::Language.label().to_owned(),
        message,
        label_color: LABEL_COLOR.to_owned(),
        message_color,
        style,
        logo: None,
        logo_color: None
    }
}

/// Formats `100 * size / total` with half-up rounding to two decimals.
///
/// The rounding policy is externally visible in the badge text and is part
/// of the output contract. `f64::round` rounds half away from zero, which
/// equals half-up for the non-negative ratios produced here.
fn percent_of(size: u64, total: u64) -> String {
    let ratio = size as f64 * 100.0 / total as f64;
    let rounded = (ratio * 100.0).round() / 100.0;
    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{LanguageEdge, LanguageNode};

    fn distribution(edges: Vec<LanguageEdge>, total_size: u64) -> LanguageDistribution {
        LanguageDistribution {
            edges,
            total_size
        }
    }

    fn edge(name: &str, color: Option<&str>, size: u64) -> LanguageEdge {
        LanguageEdge {
            node: LanguageNode {
                name:  name.to_owned(),
                color: color.map(str::to_owned)
            },
            size
        }
    }

    #[test]
    fn license_badge_shows_spdx_id_and_category_color() {
        let classifier = LicenseClassifier::new();
        let facts = LicenseFacts {
            spdx_id: Some("MIT".to_owned())
        };

        let spec = license_badge(Some(&facts), &classifier, BadgeStyle::Flat);

        assert_eq!(spec.label, "license");
        assert_eq!(spec.message, "MIT");
        assert_eq!(spec.message_color, "green");
        assert_eq!(spec.label_color, LABEL_COLOR);
    }

    #[test]
    fn license_badge_keeps_unknown_identifier_with_neutral_color() {
        let classifier = LicenseClassifier::new();
        let facts = LicenseFacts {
            spdx_id: Some("Custom-1.0".to_owned())
        };

        let spec = license_badge(Some(&facts), &classifier, BadgeStyle::Flat);

        assert_eq!(spec.message, "Custom-1.0");
        assert_eq!(spec.message_color, NEUTRAL_COLOR);
    }

    #[test]
    fn license_badge_falls_back_when_absent() {
        let classifier = LicenseClassifier::new();

        let spec = license_badge(None, &classifier, BadgeStyle::Flat);

        assert_eq!(spec.message, "not specified");
        assert_eq!(spec.message_color, NEUTRAL_COLOR);
    }

    #[test]
    fn license_badge_treats_empty_spdx_id_as_absent() {
        let classifier = LicenseClassifier::new();
        let facts = LicenseFacts {
            spdx_id: Some(String::new())
        };

        let spec = license_badge(Some(&facts), &classifier, BadgeStyle::Flat);

        assert_eq!(spec.message, "not specified");
    }

    #[test]
    fn language_badge_reports_dominant_language_share() {
        let languages = distribution(vec![edge("Go", Some("#00ADD8"), 750)], 1000);

        let spec = language_badge(Some(&languages), BadgeStyle::Flat);

        assert_eq!(spec.label, "language");
        assert_eq!(spec.message, "Go(75.00%)");
        assert_eq!(spec.message_color, "#00ADD8");
    }

    #[test]
    fn language_badge_uses_first_edge_only() {
        let languages = distribution(
            vec![
                edge("Rust", Some("#dea584"), 600),
                edge("Shell", Some("#89e051"), 400),
            ],
            1000
        );

        let spec = language_badge(Some(&languages), BadgeStyle::Flat);

        assert_eq!(spec.message, "Rust(60.00%)");
    }

    #[test]
    fn language_badge_guards_zero_total_size() {
        let languages = distribution(vec![edge("Go", Some("#00ADD8"), 0)], 0);

        let spec = language_badge(Some(&languages), BadgeStyle::Flat);

        assert_eq!(spec.message, "not found");
        assert_eq!(spec.message_color, NEUTRAL_COLOR);
    }

    #[test]
    fn language_badge_handles_absent_and_empty_distributions() {
        for languages in [None, Some(distribution(Vec::new(), 1000))] {
            let spec = language_badge(languages.as_ref(), BadgeStyle::Flat);
            assert_eq!(spec.message, "not found");
            assert_eq!(spec.message_color, NEUTRAL_COLOR);
        }
    }

    #[test]
    fn language_badge_defaults_missing_edge_color_to_neutral() {
        let languages = distribution(vec![edge("Brainfuck", None, 10)], 10);

        let spec = language_badge(Some(&languages), BadgeStyle::Flat);

        assert_eq!(spec.message, "Brainfuck(100.00%)");
        assert_eq!(spec.message_color, NEUTRAL_COLOR);
    }

    #[test]
    fn percent_rounding_is_half_up_to_two_decimals() {
        assert_eq!(percent_of(125, 100_000), "0.13");
        assert_eq!(percent_of(2, 3), "66.67");
        assert_eq!(percent_of(1, 1), "100.00");
        assert_eq!(percent_of(1, 8), "12.50");
    }

    #[test]
    fn badge_style_tokens_round_trip() {
        for style in [
            BadgeStyle::Flat,
            BadgeStyle::FlatSquare,
            BadgeStyle::Plastic,
            BadgeStyle::ForTheBadge,
            BadgeStyle::Social,
        ] {
            let parsed: BadgeStyle = style.as_str().parse().expect("token should parse");
            assert_eq!(parsed, style);
        }
    }

    #[test]
    fn badge_style_rejects_unknown_token() {
        let error = "shiny".parse::<BadgeStyle>().expect_err("expected parse failure");
        assert!(error.to_string().contains("shiny"));
    }

    #[test]
    fn badge_kind_file_names() {
        assert_eq!(BadgeKind::License.file_name(), "license.svg");
        assert_eq!(BadgeKind::Language.file_name(), "language.svg");
    }

    #[test]
    fn equal_specs_compare_equal() {
        let classifier = LicenseClassifier::new();
        let facts = LicenseFacts {
            spdx_id: Some("MIT".to_owned())
        };

        let first = license_badge(Some(&facts), &classifier, BadgeStyle::Flat);
        let second = license_badge(Some(&facts), &classifier, BadgeStyle::Flat);
        assert_eq!(first, second);
    }
}
