//! Configuration file support (`.ensemble-lint.yaml`) and CLI merge.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = ".ensemble-lint.yaml";

/// Directory names excluded by default, before file content is read:
/// VCS metadata, build artifacts, dependency caches, virtualenvs, backups.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "__pycache__",
    ".venv",
    "venv",
    ".cache",
    ".tox",
    ".idea",
    "vendor",
    "backup",
    "backups",
];

/// File extensions treated as binary and never scanned.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "a", "o", "class", "pyc", "bin", "png", "jpg", "jpeg", "gif",
    "ico", "pdf", "zip", "gz", "tar", "woff", "woff2", "ttf", "wasm", "db", "sqlite",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Extra directory names to exclude on top of the defaults.
    pub exclude: Vec<String>,
    /// File extensions to include; empty means all non-binary files.
    pub extensions: Vec<String>,
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    /// Violations below this confidence are filtered (and recorded as such).
    pub min_confidence: f64,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            extensions: Vec::new(),
            max_depth: None,
            follow_symlinks: false,
            min_confidence: 0.0,
        }
    }
}

/// One external analyzer invocation: a command expected to print a JSON
/// array of findings on stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalToolSection {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSection,
    /// Path to a SQLite catalog; builtin patterns are used when absent.
    pub catalog: Option<PathBuf>,
    pub external: Vec<ExternalToolSection>,
}

impl Config {
    /// Load from `.ensemble-lint.yaml` under the given root, falling back
    /// to defaults. A malformed file warns and falls back rather than
    /// aborting the scan.
    pub fn load(root: Option<&Path>) -> Self {
        let Some(root) = root else {
            return Self::default();
        };
        let path = root.join(CONFIG_FILE_NAME);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_yaml::from_str(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "Config loaded");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed config file; using defaults");
                eprintln!("Warning: malformed {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Snapshot stored in the audit trail, so an export states exactly
    /// which configuration produced it.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.scan.exclude.is_empty());
        assert!(config.catalog.is_none());
        assert_eq!(config.scan.min_confidence, 0.0);
        assert!(!config.scan.follow_symlinks);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(dir.path()));
        assert!(config.external.is_empty());
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
scan:
  exclude: ["generated"]
  extensions: ["py", "js"]
  min_confidence: 0.3
catalog: patterns.db
external:
  - name: flake
    command: flake8-json
    args: ["--quiet"]
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path()));
        assert_eq!(config.scan.exclude, vec!["generated"]);
        assert_eq!(config.scan.extensions, vec!["py", "js"]);
        assert_eq!(config.scan.min_confidence, 0.3);
        assert_eq!(config.catalog.as_deref(), Some(Path::new("patterns.db")));
        assert_eq!(config.external.len(), 1);
        assert_eq!(config.external[0].args, vec!["--quiet"]);
    }

    #[test]
    fn test_load_malformed_yaml_falls_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "scan: [not a map").unwrap();
        let config = Config::load(Some(dir.path()));
        assert!(config.scan.exclude.is_empty());
    }

    #[test]
    fn test_snapshot_is_json() {
        let config = Config::default();
        let snapshot = config.snapshot();
        assert!(snapshot.get("scan").is_some());
    }
}
