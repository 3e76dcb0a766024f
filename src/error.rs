#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::path::{Path, PathBuf};

/// Unified error type returned by the classifier, renderers, and the publish
/// pipeline.
///
/// Each variant captures sufficient context for diagnostics while avoiding
/// accidental exposure of sensitive data: access tokens never appear in any
/// message, and pipeline failures name the stage that produced them.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Returned when the configuration violates invariants before any
    /// network or filesystem action takes place.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Returned when the repository metadata source is unreachable, times
    /// out, or returns a malformed payload. Fatal for the run.
    #[error("metadata fetch failed: {message}")]
    Metadata {
        /// Human readable message describing the fetch failure.
        message: String
    },
    /// Returned when the badge renderer is unreachable or rejects a spec.
    /// Recoverable per badge: the affected badge is skipped.
    #[error("badge render failed: {message}")]
    Render {
        /// Human readable message describing the render failure.
        message: String
    },
    /// Wraps I/O errors that occur while writing badge artifacts.
    #[error("failed to write badge artifact at {path:?}: {source}")]
    ArtifactIo {
        /// Location of the artifact being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Returned when a publish stage fails. The remote repository is never
    /// left half-updated: the single commit+push is the only remote
    /// mutation.
    #[error("publish failed at stage {stage}: {message}")]
    Pipeline {
        /// Name of the pipeline stage that failed.
        stage:   String,
        /// Human readable message describing the stage failure.
        message: String
    },
    /// Wraps serialization errors when writing reports.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a metadata fetch error from the provided displayable value.
    pub fn metadata<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Metadata {
            message: message.into()
        }
    }

    /// Constructs a render error from the provided displayable value.
    pub fn render<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Render {
            message: message.into()
        }
    }

    /// Constructs a pipeline error naming the failing stage.
    pub fn pipeline<S, M>(stage: S, message: M) -> Self
    where
        S: Into<String>,
        M: Into<String>
    {
        Self::Pipeline {
            stage:   stage.into(),
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::ArtifactIo`] variant capturing the failing path and
/// source.
pub fn artifact_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::ArtifactIo {
        path: path.to_path_buf(),
        source
    }
}
