//! Error types for StudyTree.
//!
//! Library crates use [`StudyTreeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all StudyTree operations.
#[derive(Debug, thiserror::Error)]
pub enum StudyTreeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed input that a reader or parser could not make sense of.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The file extension does not map to a supported source format.
    #[error("unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A single low-level reader failed on a whole document.
    #[error("{reader} reader failed: {message}")]
    Reader { reader: String, message: String },

    /// Every reader available for a format failed outright.
    #[error("all readers failed for {}: primary: {primary}; secondary: {secondary}", path.display())]
    ReadersExhausted {
        path: PathBuf,
        primary: String,
        secondary: String,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid argument or state (bad node index, schema mismatch, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Knowledge tree export error.
    #[error("export error: {0}")]
    Export(String),

    /// Summarization pass error.
    #[error("summarize error: {0}")]
    Summarize(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StudyTreeError>;

impl StudyTreeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a reader error tagged with the reader's name.
    pub fn reader(reader: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Reader {
            reader: reader.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = StudyTreeError::config("missing keyword list");
        assert_eq!(err.to_string(), "config error: missing keyword list");

        let err = StudyTreeError::validation("node index 7 out of range");
        assert!(err.to_string().contains("index 7"));
    }

    #[test]
    fn reader_errors_name_the_reader() {
        let err = StudyTreeError::reader("lopdf", "trailer missing");
        assert_eq!(err.to_string(), "lopdf reader failed: trailer missing");

        let err = StudyTreeError::ReadersExhausted {
            path: PathBuf::from("notes.pdf"),
            primary: "bad xref".into(),
            secondary: "bad header".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("notes.pdf"));
        assert!(msg.contains("bad xref"));
        assert!(msg.contains("bad header"));
    }

    #[test]
    fn unsupported_format_shows_path() {
        let err = StudyTreeError::UnsupportedFormat {
            path: PathBuf::from("slides.key"),
        };
        assert_eq!(err.to_string(), "unsupported file format: slides.key");
    }
}
