//! Error types for the code generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used by every pipeline stage.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Terminal failures of a generation run.
///
/// Resolution degradations (an unresolvable `$ref`, a response without JSON
/// content, ...) are not represented here: they fall back to an unknown type
/// and generation continues.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Configuration could not be assembled.
    #[error("{0}")]
    Config(String),

    /// The configured source document does not exist.
    #[error("Source does not exist {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A JSON text could not be parsed.
    #[error("Error parsing {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document failed grammar validation; details were written to `log_file`.
    #[error("Source validation failed. See errors in {log_file}")]
    Validation { log_file: String },

    /// The Swagger 2.0 upgrade failed.
    #[error("Failed to convert Swagger 2.0 to OpenApi 3.0.2: {0}")]
    Conversion(String),

    /// A filesystem operation failed.
    #[error("Error {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The formatter rejected generated text.
    #[error("Failed while formatting {}: {reason}", path.display())]
    Format { path: PathBuf, reason: String },
}

impl CodegenError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
