//! Error types emitted by the InterestConnect CLI.
//!
//! Keep this error type reasonably small, as every command returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use connect_data::StoreError;
use connect_matching::RecommendError;
use thiserror::Error;

/// Errors emitted by the InterestConnect CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Reading the seed dataset failed.
    #[error("failed to read dataset at {path:?}: {source}")]
    ReadDataset {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// The seed dataset is not valid JSON of the expected shape.
    #[error("failed to parse dataset JSON at {path:?}: {source}")]
    ParseDataset {
        /// Dataset path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A dataset entry refers to an e-mail address with no seeded account.
    #[error("dataset refers to unknown user {email}")]
    UnknownSeedUser {
        /// Address as written in the dataset.
        email: String,
    },
    /// A store operation failed.
    #[error("failed to {operation}: {source}")]
    Store {
        /// What the command was doing.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// Computing recommendations failed.
    #[error(transparent)]
    Recommend(#[from] RecommendError<StoreError>),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<StoreError> for CliError {
    fn from(source: StoreError) -> Self {
        Self::Store {
            operation: "write the dataset",
            source,
        }
    }
}

impl CliError {
    /// Wrap a store failure with the step that raised it.
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { operation, source }
    }
}
