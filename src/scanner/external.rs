//! External analyzer integration.
//!
//! External tools run against the scan root as a whole and report findings
//! that are folded into the scan result as synthetic violations. A tool that
//! fails to launch or returns malformed output degrades to a scan error
//! decision, never a panic.

use crate::catalog::{Priority, Violation};
use crate::error::{LintError, Result};
use serde::Deserialize;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// An analyzer external to the ensemble engine.
pub trait ExternalAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    fn analyze<'a>(
        &'a self,
        root: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Violation>>> + Send + 'a>>;
}

/// One finding in an external tool's JSON output (an array of these on
/// stdout).
#[derive(Debug, Deserialize)]
struct ExternalFinding {
    message: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<usize>,
    #[serde(default)]
    severity: Option<String>,
}

/// External analyzer backed by a subprocess. The scan root is appended as the
/// final argument; findings are read from stdout as a JSON array.
pub struct CommandAnalyzer {
    name: String,
    command: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
        }
    }

    fn priority_of(severity: Option<&str>) -> Priority {
        severity
            .and_then(Priority::parse)
            .unwrap_or(Priority::Medium)
    }
}

impl ExternalAnalyzer for CommandAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn analyze<'a>(
        &'a self,
        root: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Violation>>> + Send + 'a>> {
        Box::pin(async move {
            debug!(analyzer = %self.name, command = %self.command, "running external analyzer");

            let output = tokio::process::Command::new(&self.command)
                .args(&self.args)
                .arg(root)
                .output()
                .await
                .map_err(|e| LintError::External {
                    name: self.name.clone(),
                    message: format!("failed to launch '{}': {e}", self.command),
                })?;

            if !output.status.success() && output.stdout.is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(LintError::External {
                    name: self.name.clone(),
                    message: format!(
                        "exited with {}: {}",
                        output.status,
                        stderr.trim()
                    ),
                });
            }

            let findings: Vec<ExternalFinding> = serde_json::from_slice(&output.stdout)
                .map_err(|e| LintError::External {
                    name: self.name.clone(),
                    message: format!("unparseable output: {e}"),
                })?;

            let root_str = root.display().to_string();
            Ok(findings
                .into_iter()
                .map(|f| Violation {
                    pattern: format!("external:{}", self.name),
                    category: "external".to_string(),
                    priority: Self::priority_of(f.severity.as_deref()),
                    file: f.file.unwrap_or_else(|| root_str.clone()),
                    line: f.line.unwrap_or(1),
                    column: None,
                    matched: f.message,
                    confidence: 1.0,
                    suggested_fix: None,
                    auto_fixable: false,
                })
                .collect())
        })
    }
}

/// Runs all analyzers concurrently against `root`. Failures are returned per
/// analyzer so the caller can record them without aborting the scan.
pub async fn gather(
    analyzers: &[Arc<dyn ExternalAnalyzer>],
    root: &Path,
) -> Vec<(String, Result<Vec<Violation>>)> {
    let mut set = JoinSet::new();
    for analyzer in analyzers {
        let analyzer = Arc::clone(analyzer);
        let root = root.to_path_buf();
        set.spawn(async move {
            let name = analyzer.name().to_string();
            let result = analyzer.analyze(&root).await;
            (name, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(pair) => results.push(pair),
            Err(e) => warn!(error = %e, "external analyzer task panicked"),
        }
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
