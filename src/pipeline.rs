// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Publish pipeline.
//!
//! Orchestrates fetch → classify → build → render → write → commit → push as
//! an explicit state machine. A run operates on its own freshly cloned
//! working copy, so there is no shared mutable state across runs, and the
//! single commit+push at the end is the only remote mutation: re-running
//! against an unchanged repository performs zero commits.

use std::{
    fmt, fs,
    path::{Path, PathBuf}
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    badge::{BadgeKind, BadgeSpec, language_badge, license_badge},
    config::{PublishConfig, PublishTarget},
    error::{self, Error},
    git,
    license::LicenseClassifier,
    metadata::{MetadataSource, RepositoryFacts},
    render::BadgeRenderer,
    retry::{RetryConfig, retry_with_backoff}
};

/// States of the publish pipeline.
///
/// A run advances strictly left to right; any failure surfaces an
/// [`Error::Pipeline`](Error::Pipeline) naming the stage it failed to
/// reach. When the staged diff is empty the machine skips from
/// [`Stage::Written`] straight to [`Stage::Done`] without committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No work performed yet.
    Idle,
    /// Working copy obtained.
    Cloned,
    /// Metadata fetched and license classified.
    Classified,
    /// Badge artifacts rendered.
    Rendered,
    /// Artifacts written into the working copy.
    Written,
    /// Commit created.
    Committed,
    /// Commit pushed to the origin remote.
    Pushed,
    /// Run finished.
    Done
}

impl Stage {
    /// Stable textual form matching the serialized representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Cloned => "cloned",
            Self::Classified => "classified",
            Self::Rendered => "rendered",
            Self::Written => "written",
            Self::Committed => "committed",
            Self::Pushed => "pushed",
            Self::Done => "done"
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A badge that could not be produced, with the reason it was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedBadge {
    /// Badge kind that was skipped.
    pub kind:   BadgeKind,
    /// Why the badge was skipped.
    pub reason: String
}

/// Outcome of one publish run.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Badge kinds written into the working copy.
    pub produced:  Vec<BadgeKind>,
    /// Badges skipped with their reasons.
    pub skipped:   Vec<SkippedBadge>,
    /// Whether a commit was created. `false` means the artifacts were
    /// byte-identical to the committed state.
    pub committed: bool,
    /// Whether the commit was pushed.
    pub pushed:    bool
}

/// Orchestrates one badge publish run.
pub struct PublishPipeline {
    config:     PublishConfig,
    classifier: LicenseClassifier,
    metadata:   Box<dyn MetadataSource>,
    renderer:   Box<dyn BadgeRenderer>,
    stage:      Stage
}

impl PublishPipeline {
    /// Creates a pipeline over the given collaborators.
    pub fn new(
        config: PublishConfig,
        metadata: Box<dyn MetadataSource>,
        renderer: Box<dyn BadgeRenderer>
    ) -> Self {
        Self {
            config,
            classifier: LicenseClassifier::new(),
            metadata,
            renderer,
            stage: Stage::Idle
        }
    }

    /// Current state of the machine.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Executes the full run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Metadata`](Error::Metadata) when the metadata
    /// source fails (no badge can be built without it) and
    /// [`Error::Pipeline`](Error::Pipeline) naming the failing stage for
    /// clone, render, write, commit, and push failures. A render or write
    /// failure for one badge kind is not fatal while another kind can still
    /// be produced; the affected badge is reported as skipped instead.
    pub async fn run(&mut self) -> Result<PublishReport, Error> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.yellow} [{elapsed_precise}] {msg}")
                .expect("valid template")
        );

        let work_dir = self.config.work_dir.clone();

        pb.set_message(format!(
            "Cloning {}/{} into a fresh working copy...",
            self.config.owner, self.config.repository
        ));
        git::clone_fresh(&self.config.clone_url(), &work_dir)
            .map_err(|e| self.fail(Stage::Cloned, e))?;
        self.advance(Stage::Cloned);

        pb.set_message("Fetching repository metadata...");
        let metadata = self.metadata.as_ref();
        let facts = retry_with_backoff(
            &RetryConfig::default(),
            "fetch repository metadata",
            || metadata.fetch()
        )
        .await?;

        let spdx_id = facts
            .license_info
            .as_ref()
            .and_then(|license| license.spdx_id.as_deref());
        let category = self.classifier.classify(spdx_id);
        info!(
            "license {} classified as {}",
            spdx_id.unwrap_or("(none)"),
            category.kind.as_str()
        );
        self.advance(Stage::Classified);

        let mut skipped: Vec<SkippedBadge> = Vec::new();
        let mut rendered: Vec<(PublishTarget, Vec<u8>)> = Vec::new();
        for target in self.config.targets() {
            pb.set_message(format!("Rendering {} badge...", target.kind));
            let spec = self.spec_for(target.kind, &facts);
            match self.renderer.render(&spec).await {
                Ok(bytes) => rendered.push((target, bytes)),
                Err(render_error) => {
                    warn!("{} badge skipped: {render_error}", target.kind);
                    skipped.push(SkippedBadge {
                        kind:   target.kind,
                        reason: render_error.to_display_string()
                    });
                }
            }
        }
        if rendered.is_empty() {
            return Err(Error::pipeline(
                Stage::Rendered.as_str(),
                "every configured badge failed to render"
            ));
        }
        self.advance(Stage::Rendered);

        let mut written: Vec<(BadgeKind, PathBuf)> = Vec::new();
        for (target, bytes) in rendered {
            pb.set_message(format!("Writing {} artifact...", target.kind));
            let destination = work_dir.join(&target.relative_path);
            match write_artifact(&destination, &bytes) {
                Ok(()) => written.push((target.kind, target.relative_path)),
                Err(write_error) => {
                    warn!("{} badge skipped: {write_error}", target.kind);
                    skipped.push(SkippedBadge {
                        kind:   target.kind,
                        reason: write_error.to_display_string()
                    });
                }
            }
        }
        if written.is_empty() {
            return Err(Error::pipeline(
                Stage::Written.as_str(),
                "no badge artifact could be written"
            ));
        }
        self.advance(Stage::Written);

        pb.set_message("Staging badge artifacts...");
        git::configure_identity(
            &work_dir,
            &self.config.commit.username,
            &self.config.commit.email
        )
        .map_err(|e| self.fail(Stage::Committed, e))?;

        let paths: Vec<PathBuf> = written.iter().map(|(_, path)| path.clone()).collect();
        git::stage(&work_dir, &paths).map_err(|e| self.fail(Stage::Committed, e))?;

        let changed =
            git::has_staged_changes(&work_dir).map_err(|e| self.fail(Stage::Committed, e))?;
        let (committed, pushed) = if changed {
            pb.set_message("Committing badge artifacts...");
            git::commit(&work_dir, &self.config.commit_message)
                .map_err(|e| self.fail(Stage::Committed, e))?;
            self.advance(Stage::Committed);

            pb.set_message("Pushing to origin...");
            git::push(&work_dir).map_err(|e| self.fail(Stage::Pushed, e))?;
            self.advance(Stage::Pushed);

            (true, true)
        } else {
            info!("badge artifacts are unchanged; skipping commit and push");
            (false, false)
        };
        self.advance(Stage::Done);

        let produced: Vec<BadgeKind> = written.into_iter().map(|(kind, _)| kind).collect();
        pb.finish_with_message(format!(
            "Publish complete: {} badge(s) produced, {} skipped, commit {}",
            produced.len(),
            skipped.len(),
            if pushed { "pushed" } else { "not needed" }
        ));

        Ok(PublishReport {
            produced,
            skipped,
            committed,
            pushed
        })
    }

    fn spec_for(&self, kind: BadgeKind, facts: &RepositoryFacts) -> BadgeSpec {
        match kind {
            BadgeKind::License => license_badge(
                facts.license_info.as_ref(),
                &self.classifier,
                self.config.badge_style
            ),
            BadgeKind::Language => {
                language_badge(facts.languages.as_ref(), self.config.badge_style)
            }
        }
    }

    fn fail(&self, stage: Stage, cause: impl fmt::Display) -> Error {
        let message = self.config.token.scrub(&cause.to_string());
        debug!("pipeline failed entering stage {stage}: {message}");
        Error::pipeline(stage.as_str(), message)
    }

    fn advance(&mut self, stage: Stage) {
        debug!("pipeline stage: {stage}");
        self.stage = stage;
    }
}

/// Writes one artifact, creating parent directories as needed.
///
/// Each artifact is written independently: a failure here only affects the
/// badge it belongs to.
fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| error::artifact_io_error(parent, source))?;
    }

    fs::write(path, bytes).map_err(|source| error::artifact_io_error(path, source))
}
