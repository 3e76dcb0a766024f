// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Utilities for classifying repository metadata and publishing status
//! badges.
//!
//! The library maps a repository's declared license and dominant language to
//! declarative badge descriptors, renders them through a badge service or a
//! local SVG backend, and commits the artifacts back to the repository with
//! idempotent-retry semantics. Public APIs are documented with invariants,
//! error semantics, and minimal examples to facilitate integration in
//! automation tooling.

mod badge;
mod config;
mod error;
mod git;
mod license;
mod metadata;
mod pipeline;
mod render;
mod retry;

pub use badge::{
    BadgeKind, BadgeSpec, BadgeStyle, LABEL_COLOR, NEUTRAL_COLOR, language_badge, license_badge
};
pub use config::{AccessToken, CommitIdentity, PublishArgs, PublishConfig, PublishTarget};
pub use error::{Error, artifact_io_error};
pub use license::{
    LicenseCategory, LicenseCategoryKind, LicenseClassifier, LicenseGroup, UNSPECIFIED
};
pub use metadata::{
    GithubMetadataSource, LanguageDistribution, LanguageEdge, LanguageNode, LicenseFacts,
    MetadataSource, RepositoryFacts, parse_repository
};
pub use pipeline::{PublishPipeline, PublishReport, SkippedBadge, Stage};
pub use render::{
    BadgeRenderer, RenderMode, ShieldsRenderer, SvgRenderer, badge_url, render_svg, renderer_for
};
pub use retry::{RetryConfig, retry_with_backoff};
