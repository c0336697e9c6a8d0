//! Error types for loading, validation, charting and narration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that make `load` fail. A partial table is never returned.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No candidate encoding decoded the whole file.
    #[error("could not decode {path} with any supported encoding (tried {tried})")]
    UndecodableText { path: PathBuf, tried: String },

    /// No header resolved to an item-name column.
    #[error("no item name column found in {path}")]
    NoNameColumn { path: PathBuf },

    /// File parsed but produced zero usable rows.
    #[error("no parseable rows in {path}")]
    NoRows { path: PathBuf },

    /// Structural problem in a JSON or Parquet source.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl IngestError {
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// Bad user input at the CLI / viewer boundary. Never raised by the engines.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("unrecognized column '{0}'")]
    UnknownColumn(String),

    #[error("invalid threshold '{value}' for {column}")]
    InvalidThreshold { column: String, value: String },

    #[error("cannot parse predicate '{0}' (expected e.g. calories<=200, protein_g>=5, caffeine>0, name~latte)")]
    MalformedPredicate(String),
}

/// Chart rendering failures.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot: {0}")]
    Empty(String),

    #[error("chart font unavailable: {0}")]
    Font(String),

    #[error("failed to draw chart: {0}")]
    Draw(String),

    #[error("failed to create {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Narration (LLM) failures.
#[derive(Debug, Error)]
pub enum NarrateError {
    #[error("{0} missing")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("summary cache {path}: {message}")]
    Cache { path: PathBuf, message: String },
}

impl NarrateError {
    /// Whether a retry may succeed: transport errors, rate limits and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            NarrateError::Transport(_) => true,
            NarrateError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Configuration file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::NoRows {
            path: PathBuf::from("/data/drinks.csv"),
        };
        assert_eq!(err.to_string(), "no parseable rows in /data/drinks.csv");
    }

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = IngestError::from_io(std::path::Path::new("x.csv"), io);
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn test_retryable_statuses() {
        let limited = NarrateError::Status {
            status: 429,
            body: String::new(),
        };
        let bad_request = NarrateError::Status {
            status: 400,
            body: String::new(),
        };
        assert!(limited.is_retryable());
        assert!(!bad_request.is_retryable());
        assert!(!NarrateError::MissingApiKey("GROQ_API_KEY".into()).is_retryable());
    }
}
