//! Failures surfaced by a single bundle build.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a call to [`BundleEngine::build`](crate::engine::BundleEngine::build) failed.
///
/// Every variant is local to one build call; nothing is retried. Callers (an HTTP route, the
/// CLI) decide how to present each kind.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The requested package is not declared in the package document.
    #[error("package `{name}` was not found in the package document")]
    ConfigurationMissing { name: String },

    /// Resolution produced nothing to combine.
    #[error("there is no data to combine: {context}")]
    EmptyInput { context: String },

    /// A declared source file could not be read. Aborts the whole build.
    #[error("failed to read file {path:?}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Minification was requested but no file was ever read to infer a type from.
    #[error("no bundle type could be inferred for this package (\"js\", \"css\", etc.)")]
    UndeterminedType,

    /// Minification was requested for a type without a registered compactor.
    #[error("no compactor for type `{bundle_type}`")]
    UnsupportedType { bundle_type: String },

    /// The compactor rejected the combined text.
    #[error("the `{bundle_type}` compactor could not process the combined output")]
    CompactionFailed { bundle_type: String },

    /// A later file disagrees with the inferred bundle type (only with `strict-types`).
    #[error("file {path:?} has type `{found}` but the package was inferred as `{expected}`")]
    MixedTypes {
        expected: String,
        found: String,
        path: PathBuf,
    },

    /// The package name argument is missing or unusable.
    #[error("invalid package name: {reason}")]
    InvalidArgument { reason: String },
}

impl BuildError {
    pub(crate) fn empty(context: impl Into<String>) -> Self {
        Self::EmptyInput {
            context: context.into(),
        }
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing { .. } => "configuration-missing",
            Self::EmptyInput { .. } => "empty-input",
            Self::UnreadableFile { .. } => "unreadable-file",
            Self::UndeterminedType => "undetermined-type",
            Self::UnsupportedType { .. } => "unsupported-type",
            Self::CompactionFailed { .. } => "compaction-failed",
            Self::MixedTypes { .. } => "mixed-types",
            Self::InvalidArgument { .. } => "invalid-argument",
        }
    }
}
