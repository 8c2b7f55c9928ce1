//! Scan entry points behind the CLI: wiring from parsed arguments to the
//! orchestrator, reporters, and exit codes.
//!
//! Exit codes: 0 = pass, 1 = violations failed the scan, 2 = the scan itself
//! could not run (bad path, unavailable catalog).

use crate::audit::ScanContext;
use crate::catalog::{Catalog, CatalogStore, Pattern};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::reporter::{JsonReporter, Reporter, ScanReport, TerminalReporter};
use crate::scanner::{
    AnalysisResult, CommandAnalyzer, ExcludePolicy, ExternalAnalyzer, Orchestrator, Walker,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// List loaded patterns and exit. Serves `--list-patterns`.
pub fn handle_list_patterns(cli: &Cli) -> ExitCode {
    let config = load_config(cli);
    let catalog = match load_catalog(cli, &config) {
        Ok(c) => c,
        Err(code) => return code,
    };

    println!("{} pattern(s) loaded:\n", catalog.patterns.len());
    for pattern in &catalog.patterns {
        println!(
            "  {:30} {:10} {:12} quorum {}, threshold {:.2}, {} rule(s)",
            pattern.name,
            pattern.priority.as_str(),
            pattern.category,
            pattern.policy.min_votes,
            pattern.policy.confidence_threshold,
            pattern.enabled_rules().len()
        );
        if !pattern.description.is_empty() {
            println!("      {}", pattern.description);
        }
    }
    for (name, reason) in &catalog.disabled {
        println!("  {name} DISABLED at load: {reason}");
    }
    ExitCode::SUCCESS
}

/// Run a full scan over the CLI paths. Serves the default invocation.
pub fn run_scan(cli: &Cli) -> ExitCode {
    info!(paths = ?cli.paths, "Starting scan");
    if cli.ci {
        colored::control::set_override(false);
    }

    let config = load_config(cli);
    let catalog = match load_catalog(cli, &config) {
        Ok(c) => c,
        Err(code) => return code,
    };
    for (name, reason) in &catalog.disabled {
        eprintln!("Warning: pattern '{name}' disabled: {reason}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return ExitCode::from(2);
        }
    };

    let root = scan_root(cli);
    let mut ctx = ScanContext::new(root, config.snapshot());
    let min_confidence = cli.min_confidence.unwrap_or(config.scan.min_confidence);

    let scan = {
        let mut scan = config.scan.clone();
        if cli.max_depth.is_some() {
            scan.max_depth = cli.max_depth;
        }
        scan
    };

    let externals: Vec<Arc<dyn ExternalAnalyzer>> = config
        .external
        .iter()
        .map(|tool| {
            Arc::new(CommandAnalyzer::new(
                tool.name.clone(),
                tool.command.clone(),
                tool.args.clone(),
            )) as Arc<dyn ExternalAnalyzer>
        })
        .collect();

    let mut results: Vec<AnalysisResult> = Vec::new();
    for path in &cli.paths {
        let policy = ExcludePolicy::new(path, &scan, &cli.exclude);
        let orchestrator = Orchestrator::new(catalog.patterns.clone(), Walker::new(policy, &scan))
            .with_externals(externals.clone())
            .with_min_confidence(min_confidence);

        let outcome = if path.is_file() {
            runtime
                .block_on(orchestrator.scan_file(path, &mut ctx))
                .map(|r| vec![r])
        } else {
            runtime.block_on(orchestrator.scan_directory(path, &mut ctx))
        };
        match outcome {
            Ok(mut r) => results.append(&mut r),
            Err(e) => {
                eprintln!("Error scanning {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        }
    }
    ctx.finalize();

    if let Some(ref audit_path) = cli.export_audit {
        match ctx.export(audit_path) {
            Ok(()) => info!(path = %audit_path.display(), "Audit trail exported"),
            Err(e) => {
                eprintln!("Failed to export audit trail: {e}");
                return ExitCode::from(2);
            }
        }
    }

    if let Some(catalog_path) = cli.catalog.as_ref().or(config.catalog.as_ref()) {
        persist_usage(catalog_path, &catalog.patterns, &results);
    }

    let report = ScanReport::new(
        cli.paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        &results,
        ctx.counters().files_processed,
        ctx.counters().files_failed,
        cli.strict,
    );

    let output = match cli.format {
        OutputFormat::Terminal => TerminalReporter::new(cli.verbose).report(&report),
        OutputFormat::Json => JsonReporter::new().report(&report),
    };
    println!("{output}");

    debug!(
        violations = report.violations.len(),
        files = ctx.counters().files_processed,
        decisions = ctx.decisions().len(),
        "Scan completed"
    );

    if report.summary.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn load_config(cli: &Cli) -> Config {
    let root = cli.paths.first().map(|p| {
        if p.is_dir() {
            p.as_path()
        } else {
            p.parent().unwrap_or(Path::new("."))
        }
    });
    Config::load(root)
}

fn load_catalog(cli: &Cli, config: &Config) -> Result<Catalog, ExitCode> {
    let path = cli.catalog.as_ref().or(config.catalog.as_ref());
    match path {
        Some(path) => Catalog::from_store(path).map_err(|e| {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }),
        None => Ok(Catalog::builtin()),
    }
}

fn scan_root(cli: &Cli) -> std::path::PathBuf {
    cli.paths
        .first()
        .cloned()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}

/// Best effort: usage statistics never fail a scan.
fn persist_usage(catalog_path: &Path, patterns: &[Pattern], results: &[AnalysisResult]) {
    let store = match CatalogStore::open(catalog_path) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Could not reopen catalog for usage stats");
            return;
        }
    };
    let checked = results.iter().filter(|r| !r.failed).count() as u64;
    for pattern in patterns {
        let matched = results
            .iter()
            .flat_map(|r| r.violations.iter())
            .filter(|v| v.pattern == pattern.name)
            .count() as u64;
        if let Err(e) = store.record_usage(&pattern.name, checked, matched) {
            warn!(pattern = %pattern.name, error = %e, "Could not record usage");
        }
    }
}
