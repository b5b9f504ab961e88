//! CLI error types.

use mrk_config::ConfigError;
use mrk_directory::DirectoryError;
use mrk_transform::DateFormatError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Directory(#[from] DirectoryError),

    #[error("{0}")]
    Dates(#[from] DateFormatError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
}
