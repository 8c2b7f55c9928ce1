use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for ensemble-lint")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new builtin pattern
    NewPattern {
        /// Pattern name in kebab-case (e.g. no-raw-sql)
        #[arg(short, long)]
        name: String,

        /// Category (e.g. security, style, testing)
        #[arg(short, long)]
        category: String,

        /// Priority: optional, low, medium, high, critical, mandatory
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },
    /// Set up git hooks for development
    SetupHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::NewPattern {
            name,
            category,
            priority,
        } => new_pattern(&name, &category, &priority),
        Commands::SetupHooks => setup_hooks(),
    }
}

fn setup_hooks() -> Result<()> {
    let project_root = find_project_root()?;
    let hooks_path = project_root.join(".githooks");

    if !hooks_path.exists() {
        bail!(".githooks directory not found at {:?}", hooks_path);
    }

    let status = std::process::Command::new("git")
        .args(["config", "core.hooksPath", ".githooks"])
        .current_dir(&project_root)
        .status()?;

    if !status.success() {
        bail!("Failed to set git config core.hooksPath");
    }

    println!("Git hooks configured successfully!");
    Ok(())
}

fn new_pattern(name: &str, category: &str, priority: &str) -> Result<()> {
    const PRIORITIES: &[&str] = &["optional", "low", "medium", "high", "critical", "mandatory"];
    if !PRIORITIES.contains(&priority) {
        bail!("Unknown priority: {}. Valid: {}", priority, PRIORITIES.join(", "));
    }
    if name.contains(|c: char| c.is_whitespace() || c == '_') {
        bail!("Pattern name must be kebab-case (e.g. no-raw-sql)");
    }

    let variant = {
        let mut chars = priority.chars();
        let first = chars.next().expect("priority is non-empty");
        format!("{}{}", first.to_uppercase(), chars.as_str())
    };
    let fn_name = name.replace('-', "_");

    let project_root = find_project_root()?;
    let file_path = project_root.join("src/catalog/builtin.rs");
    let content = fs::read_to_string(&file_path)?;

    if content.contains(&format!("fn {fn_name}()")) {
        bail!("Pattern {} already exists in builtin.rs", name);
    }

    let template = format!(
        r#"
fn {fn_name}() -> Pattern {{
    Pattern::new("{name}", "{category}", Priority::{variant})
        .with_description("TODO: what this pattern detects")
        .with_rationale("TODO: why it matters")
        .with_policy(1, 0.5)
        .with_rule(rule(
            "{name}/literal",
            RuleConfig::Literal {{
                pattern: "TODO".to_string(),
                regex: false,
                confidence: Some(0.6),
            }},
            3,
        ))
}}
"#
    );

    fs::write(&file_path, format!("{content}{template}"))?;

    println!("Appended pattern {} to src/catalog/builtin.rs", name);
    println!();
    println!("Next steps:");
    println!("  1. Fill in the rule configs in fn {fn_name}()");
    println!("  2. Register it in default_patterns()");
    println!("  3. Add a test exercising a matching and a non-matching file");
    Ok(())
}

fn find_project_root() -> Result<PathBuf> {
    let mut path = std::env::current_dir()?;
    loop {
        if path.join("Cargo.toml").exists() && path.join("src/catalog").exists() {
            return Ok(path);
        }
        if !path.pop() {
            bail!("Could not find project root (no Cargo.toml with src/catalog found)");
        }
    }
}
