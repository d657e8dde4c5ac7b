//! Error types for the search engine and the unlock step.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected search settings. Raised before any document is touched.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    #[error("alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(char),

    #[error("minimum password length must be at least 1")]
    ZeroMinLength,

    #[error("minimum length ({min}) must be less than or equal to maximum length ({max})")]
    InvertedRange { min: usize, max: usize },

    #[error("search space too large (overflow when computing {0}-length candidates)")]
    SearchSpaceTooLarge(usize),

    #[error("at least one worker thread is required")]
    NoWorkers,
}

/// Failures that end a search before it reaches a terminal outcome.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load {}: {source}", .path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("failed to initialize thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failures while writing the decrypted copy.
#[derive(Debug, Error)]
pub enum UnlockError {
    #[error("{} is not encrypted", .0.display())]
    NotEncrypted(PathBuf),

    #[error("failed to load {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("failed to decrypt with the recovered password: {0}")]
    Decrypt(#[source] lopdf::Error),

    #[error("decrypted copy of {} has no catalog or pages, not writing it", .0.display())]
    Incomplete(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
