//! Error types for ensemble-lint.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Pattern catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid rule configuration for pattern '{pattern}': {message}")]
    RuleConfig { pattern: String, message: String },

    #[error("Catalog store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Audit trail is finalized; no further decisions may be recorded")]
    TrailFinalized,

    #[error("Failed to write audit export: {path}")]
    AuditExport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External analyzer '{name}' failed: {message}")]
    External { name: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for ensemble-lint operations.
pub type Result<T> = std::result::Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_not_found() {
        let err = LintError::FileNotFound(PathBuf::from("/path/to/file"));
        assert_eq!(err.to_string(), "File not found: /path/to/file");
    }

    #[test]
    fn test_error_display_read_error() {
        let err = LintError::Read {
            path: PathBuf::from("/path/to/file"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to read file: /path/to/file");
    }

    #[test]
    fn test_error_display_rule_config() {
        let err = LintError::RuleConfig {
            pattern: "no-eval".to_string(),
            message: "unknown rule kind".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid rule configuration for pattern 'no-eval': unknown rule kind"
        );
    }

    #[test]
    fn test_error_display_trail_finalized() {
        let err = LintError::TrailFinalized;
        assert!(err.to_string().contains("finalized"));
    }

    #[test]
    fn test_error_display_catalog_unavailable() {
        let err = LintError::CatalogUnavailable("no such table: patterns".to_string());
        assert!(err.to_string().contains("Pattern catalog unavailable"));
    }
}
