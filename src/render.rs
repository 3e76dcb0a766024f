// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge rendering backends.
//!
//! Two modes are supported: `url` serializes a [`BadgeSpec`] into a
//! badge-service URL and downloads the rendered image, `svg` materializes a
//! deterministic flat SVG locally without any network call. Renderer
//! failures are recoverable per badge: the pipeline skips the affected badge
//! and continues.

use std::{borrow::Cow, fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    badge::{BadgeSpec, BadgeStyle},
    error::Error
};

const BADGE_SERVICE_BASE: &str = "https://img.shields.io/badge";

const BADGE_HEIGHT: u32 = 20;
const TEXT_PADDING: u32 = 10;
const CHAR_WIDTH: u32 = 7;

/// Rendering backend selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Download the rendered image from the badge service.
    Url,
    /// Render a deterministic SVG locally.
    Svg
}

impl RenderMode {
    /// Token used in configuration values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Svg => "svg"
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "url" => Ok(Self::Url),
            "svg" => Ok(Self::Svg),
            other => Err(Error::validation(format!(
                "unknown render mode '{other}' (expected url or svg)"
            )))
        }
    }
}

/// Turns a [`BadgeSpec`] into a renderable artifact.
#[async_trait]
pub trait BadgeRenderer: Send + Sync {
    /// Renders the spec into image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](Error::Render) when the backend is
    /// unreachable, times out, or rejects the spec.
    async fn render(&self, spec: &BadgeSpec) -> Result<Vec<u8>, Error>;
}

/// Returns the renderer for the configured mode.
///
/// # Errors
///
/// Returns [`Error::Render`](Error::Render) when the URL-mode HTTP client
/// cannot be constructed.
pub fn renderer_for(mode: RenderMode, timeout: Duration) -> Result<Box<dyn BadgeRenderer>, Error> {
    match mode {
        RenderMode::Url => Ok(Box::new(ShieldsRenderer::new(timeout)?)),
        RenderMode::Svg => Ok(Box::new(SvgRenderer))
    }
}

/// Serializes the spec into a query-parameterized badge-service URL.
///
/// Every present field contributes exactly one segment or query parameter:
/// free text is percent-encoded, color tokens lose any leading `#` before
/// encoding, and absent optional fields are omitted entirely. The parameter
/// order is fixed (`style`, `logo`, `logoColor`, `labelColor`) so the output
/// is stable for reproducible testing.
pub fn badge_url(spec: &BadgeSpec) -> String {
    use std::fmt::Write as _;

    let mut url = format!(
        "{BADGE_SERVICE_BASE}/{}-{}-{}?style={}",
        urlencoding::encode(&spec.label),
        urlencoding::encode(&spec.message),
        urlencoding::encode(color_token(&spec.message_color)),
        spec.style.as_str()
    );

    if let Some(logo) = spec.logo.as_deref().filter(|value| !value.is_empty()) {
        let _ = write!(url, "&logo={}", urlencoding::encode(logo));
    }
    if let Some(color) = spec.logo_color.as_deref().filter(|value| !value.is_empty()) {
        let _ = write!(url, "&logoColor={}", urlencoding::encode(color_token(color)));
    }
    if !spec.label_color.is_empty() {
        let _ = write!(
            url,
            "&labelColor={}",
            urlencoding::encode(color_token(&spec.label_color))
        );
    }

    url
}

fn color_token(color: &str) -> &str {
    color.strip_prefix('#').unwrap_or(color)
}

/// Renders the spec as flat SVG markup locally.
///
/// The geometry is derived only from the spec, so equal specs produce
/// byte-identical markup. Dynamic text is XML-escaped.
pub fn render_svg(spec: &BadgeSpec) -> String {
    use std::fmt::Write as _;

    let label = display_text(&spec.label, spec.style);
    let message = display_text(&spec.message, spec.style);
    let label_width = text_width(&label);
    let message_width = text_width(&message);
    let total_width = label_width + message_width;
    let radius = corner_radius(spec.style);

    let escaped_label = escape_xml(&label);
    let escaped_message = escape_xml(&message);

    let mut buffer = String::with_capacity(768);
    let _ = writeln!(
        buffer,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{total_width}\" height=\"{BADGE_HEIGHT}\" role=\"img\" aria-label=\"{escaped_label}: {escaped_message}\">",
    );
    let _ = writeln!(
        buffer,
        "  <clipPath id=\"rounded\"><rect width=\"{total_width}\" height=\"{BADGE_HEIGHT}\" rx=\"{radius}\" fill=\"#fff\"/></clipPath>",
    );
    buffer.push_str("  <g clip-path=\"url(#rounded)\">\n");
    let _ = writeln!(
        buffer,
        "    <rect width=\"{label_width}\" height=\"{BADGE_HEIGHT}\" fill=\"{}\"/>",
        spec.label_color
    );
    let _ = writeln!(
        buffer,
        "    <rect x=\"{label_width}\" width=\"{message_width}\" height=\"{BADGE_HEIGHT}\" fill=\"{}\"/>",
        spec.message_color
    );
    buffer.push_str("  </g>\n");
    buffer.push_str(
        "  <g fill=\"#fff\" text-anchor=\"middle\" font-family=\"Verdana,Geneva,DejaVu Sans,sans-serif\" font-size=\"11\">\n",
    );
    let _ = writeln!(
        buffer,
        "    <text x=\"{}\" y=\"14\">{escaped_label}</text>",
        label_width / 2
    );
    let _ = writeln!(
        buffer,
        "    <text x=\"{}\" y=\"14\">{escaped_message}</text>",
        label_width + message_width / 2
    );
    buffer.push_str("  </g>\n</svg>\n");

    buffer
}

fn display_text(text: &str, style: BadgeStyle) -> Cow<'_, str> {
    if style == BadgeStyle::ForTheBadge {
        Cow::Owned(text.to_uppercase())
    } else {
        Cow::Borrowed(text)
    }
}

fn corner_radius(style: BadgeStyle) -> u32 {
    match style {
        BadgeStyle::FlatSquare => 0,
        _ => 3
    }
}

fn text_width(text: &str) -> u32 {
    TEXT_PADDING + CHAR_WIDTH * text.chars().count() as u32
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}

/// Local renderer producing flat SVG markup without any network call.
pub struct SvgRenderer;

#[async_trait]
impl BadgeRenderer for SvgRenderer {
    async fn render(&self, spec: &BadgeSpec) -> Result<Vec<u8>, Error> {
        Ok(render_svg(spec).into_bytes())
    }
}

/// Badge-service renderer downloading the rendered image over HTTP.
pub struct ShieldsRenderer {
    client: Client
}

impl ShieldsRenderer {
    /// Creates a renderer whose requests abort after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](Error::Render) when the HTTP client cannot
    /// be constructed.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rebadge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::render(format!("failed to build badge service client: {e}")))?;

        Ok(Self {
            client
        })
    }
}

#[async_trait]
impl BadgeRenderer for ShieldsRenderer {
    async fn render(&self, spec: &BadgeSpec) -> Result<Vec<u8>, Error> {
        let url = badge_url(spec);
        debug!("requesting badge from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::render(format!("badge service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::render(format!(
                "badge service returned {status} for the {} badge",
                spec.label
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::render(format!("failed to read badge service response: {e}")))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::badge::{LABEL_COLOR, NEUTRAL_COLOR};

    fn sample_spec() -> BadgeSpec {
        BadgeSpec {
            label:         "license".to_owned(),
            message:       "MIT".to_owned(),
            label_color:   LABEL_COLOR.to_owned(),
            message_color: "green".to_owned(),
            style:         BadgeStyle::Flat,
            logo:          None,
            logo_color:    None
        }
    }

    #[test]
    fn badge_url_serializes_minimal_spec() {
        let url = badge_url(&sample_spec());
        assert_eq!(
            url,
            "https://img.shields.io/badge/license-MIT-green?style=flat&labelColor=555"
        );
    }

    #[test]
    fn badge_url_percent_encodes_free_text() {
        let mut spec = sample_spec();
        spec.message = "not specified".to_owned();
        spec.message_color = NEUTRAL_COLOR.to_owned();

        let url = badge_url(&spec);
        assert!(url.contains("/license-not%20specified-lightgrey?"));
    }

    #[test]
    fn badge_url_strips_hash_from_color_tokens() {
        let mut spec = sample_spec();
        spec.message_color = "#7cd958".to_owned();

        let url = badge_url(&spec);
        assert!(url.contains("-7cd958?"));
        assert!(url.ends_with("labelColor=555"));
    }

    #[test]
    fn badge_url_omits_absent_optional_fields() {
        let url = badge_url(&sample_spec());
        assert!(!url.contains("&logo="));
        assert!(!url.contains("&logoColor="));
    }

    #[test]
    fn badge_url_appends_optional_fields_in_stable_order() {
        let mut spec = sample_spec();
        spec.logo = Some("github".to_owned());
        spec.logo_color = Some("#ffffff".to_owned());

        let url = badge_url(&spec);
        let style_at = url.find("style=").expect("style expected");
        let logo_at = url.find("&logo=").expect("logo expected");
        let logo_color_at = url.find("&logoColor=").expect("logoColor expected");
        let label_color_at = url.find("&labelColor=").expect("labelColor expected");
        assert!(style_at < logo_at);
        assert!(logo_at < logo_color_at);
        assert!(logo_color_at < label_color_at);
        assert!(url.contains("&logoColor=ffffff"));
    }

    #[test]
    fn badge_url_round_trips_every_present_field() {
        let mut spec = sample_spec();
        spec.logo = Some("rust".to_owned());

        let url = badge_url(&spec);
        let (path, query) = url
            .rsplit_once('?')
            .expect("url should carry a query string");

        let segments: Vec<&str> = path
            .strip_prefix("https://img.shields.io/badge/")
            .expect("service prefix expected")
            .splitn(3, '-')
            .collect();
        assert_eq!(
            urlencoding::decode(segments[0]).expect("label decodes"),
            spec.label
        );
        assert_eq!(
            urlencoding::decode(segments[1]).expect("message decodes"),
            spec.message
        );
        assert_eq!(
            urlencoding::decode(segments[2]).expect("color decodes"),
            spec.message_color
        );

        let parameters: HashMap<&str, &str> = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .collect();
        assert_eq!(parameters.get("style"), Some(&"flat"));
        assert_eq!(parameters.get("logo"), Some(&"rust"));
        assert_eq!(parameters.get("labelColor"), Some(&"555"));
        assert_eq!(parameters.get("logoColor"), None);
    }

    #[test]
    fn render_svg_is_deterministic() {
        let first = render_svg(&sample_spec());
        let second = render_svg(&sample_spec());
        assert_eq!(first, second);
    }

    #[test]
    fn render_svg_contains_texts_and_colors() {
        let svg = render_svg(&sample_spec());
        assert!(svg.contains(">license<"));
        assert!(svg.contains(">MIT<"));
        assert!(svg.contains("fill=\"green\""));
        assert!(svg.contains("fill=\"#555\""));
    }

    #[test]
    fn render_svg_escapes_dynamic_content() {
        let mut spec = sample_spec();
        spec.message = "C&C<2>".to_owned();

        let svg = render_svg(&spec);
        assert!(svg.contains("C&amp;C&lt;2&gt;"));
        assert!(!svg.contains(">C&C<"));
    }

    #[test]
    fn render_svg_square_style_drops_corner_radius() {
        let mut spec = sample_spec();
        spec.style = BadgeStyle::FlatSquare;

        let svg = render_svg(&spec);
        assert!(svg.contains("rx=\"0\""));

        let rounded = render_svg(&sample_spec());
        assert!(rounded.contains("rx=\"3\""));
    }

    #[test]
    fn render_svg_uppercases_for_the_badge() {
        let mut spec = sample_spec();
        spec.style = BadgeStyle::ForTheBadge;

        let svg = render_svg(&spec);
        assert!(svg.contains(">LICENSE<"));
        assert!(svg.contains(">MIT<"));
    }

    #[test]
    fn render_mode_tokens_round_trip() {
        for mode in [RenderMode::Url, RenderMode::Svg] {
            let parsed: RenderMode = mode.as_str().parse().expect("token should parse");
            assert_eq!(parsed, mode);
        }
        assert!("png".parse::<RenderMode>().is_err());
    }

    #[tokio::test]
    async fn svg_renderer_matches_render_svg() {
        let spec = sample_spec();
        let bytes = SvgRenderer
            .render(&spec)
            .await
            .expect("local rendering should succeed");
        assert_eq!(bytes, render_svg(&spec).into_bytes());
    }
}
