use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "ensemble-lint",
    version,
    about = "Code-quality linter with ensemble pattern detection and a decision audit trail",
    long_about = "ensemble-lint scans source trees for catalogued code-quality patterns. Each pattern combines several weak detection rules through weighted voting, and every include/exclude/match/skip decision made during a scan is recorded on an exportable audit trail."
)]
pub struct Cli {
    /// Paths to scan (files or directories)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Load the pattern catalog from this SQLite database instead of the builtins
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Write the full decision audit trail to this file as JSON
    #[arg(long, value_name = "FILE")]
    pub export_audit: Option<PathBuf>,

    /// Directory names to exclude, in addition to the defaults (repeatable)
    #[arg(long, value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Drop violations below this confidence (recorded as filtered, not silently)
    #[arg(long, value_name = "0.0..1.0")]
    pub min_confidence: Option<f64>,

    /// Maximum directory depth to descend
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// List the loaded patterns and exit
    #[arg(long)]
    pub list_patterns: bool,

    /// Strict mode: any violation fails the scan, regardless of priority
    #[arg(short, long)]
    pub strict: bool,

    /// CI mode: non-interactive output, no colors
    #[arg(long)]
    pub ci: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
