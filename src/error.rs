//! Error types for derivar.

use std::path::PathBuf;

/// Result type alias for derivar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, comparing or reporting datasets.
///
/// Only [`Error::Schema`] and [`Error::Aggregation`] are raised by the
/// comparison itself; the rest come from I/O and configuration plumbing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        /// The path where the error occurred, if known.
        path: Option<PathBuf>,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Arrow error while decoding a source.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while reading or writing a file.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Inputs lack the structure needed for a comparison.
    #[error("Schema error: {message}")]
    Schema {
        /// Description of the structural problem.
        message: String,
    },

    /// No feature could be scored even though the schemas overlap.
    #[error("Aggregation error: {message}")]
    Aggregation {
        /// Description of why aggregation failed.
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Unsupported file format.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// The unsupported format name or extension.
        format: String,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an I/O error with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Create an I/O error without path context.
    pub fn io_no_path(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an aggregation error.
    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Returns true for the two conditions that abort a comparison.
    #[must_use]
    pub fn is_fatal_comparison_error(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Aggregation { .. })
    }
}
