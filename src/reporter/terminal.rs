use crate::catalog::{Priority, Violation};
use crate::reporter::{Reporter, ScanReport};
use colored::Colorize;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn priority_label(&self, priority: &Priority) -> colored::ColoredString {
        let label = format!("[{}]", priority);
        match priority {
            Priority::Mandatory | Priority::Critical => label.red().bold(),
            Priority::High => label.yellow().bold(),
            Priority::Medium => label.cyan(),
            Priority::Low | Priority::Optional => label.white(),
        }
    }

    fn format_violation(&self, v: &Violation) -> String {
        let mut output = String::new();
        let col = v.column.unwrap_or(1);

        output.push_str(&format!(
            "{}:{}:{}: {} {}\n",
            v.file,
            v.line,
            col,
            self.priority_label(&v.priority),
            v.pattern
        ));
        output.push_str(&format!("  Code: {}\n", v.matched.dimmed()));

        if self.verbose {
            output.push_str(&format!("  Confidence: {:.2}\n", v.confidence));
            output.push_str(&format!("  Category: {}\n", v.category));
        }
        if let Some(ref fix) = v.suggested_fix {
            output.push_str(&format!("  Fix: {}\n", fix.green()));
        }

        output
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("ensemble-lint v{}", report.version).bold()
        ));
        output.push_str(&format!("Scanning: {}\n\n", report.target));

        if report.violations.is_empty() {
            output.push_str(&"No violations found.\n".green().to_string());
        } else {
            for violation in &report.violations {
                output.push_str(&self.format_violation(violation));
                output.push('\n');
            }
        }

        output.push_str(&format!("{}\n", "━".repeat(50)));

        let s = &report.summary;
        output.push_str(&format!(
            "Summary: {} mandatory, {} critical, {} high, {} medium, {} low, {} optional\n",
            s.mandatory.to_string().red().bold(),
            s.critical.to_string().red().bold(),
            s.high.to_string().yellow().bold(),
            s.medium.to_string().cyan(),
            s.low,
            s.optional
        ));
        output.push_str(&format!(
            "Files: {} processed, {} failed\n",
            s.files_processed, s.files_failed
        ));
        if s.files_failed > 0 {
            output.push_str(
                &format!(
                    "Warning: {} file(s) could not be read; results are incomplete\n",
                    s.files_failed
                )
                .yellow()
                .to_string(),
            );
        }

        let result_text = if s.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        output.push_str(&format!("Result: {}\n", result_text));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{create_report, create_violation};

    #[test]
    fn test_report_no_violations() {
        let reporter = TerminalReporter::new(false);
        let report = create_report(vec![]);
        let output = reporter.report(&report);
        assert!(output.contains("No violations found"));
        assert!(output.contains("PASS"));
    }

    #[test]
    fn test_report_with_violation() {
        let reporter = TerminalReporter::new(false);
        let report = create_report(vec![create_violation(
            "no-eval",
            Priority::Critical,
            "app.py",
            10,
        )]);
        let output = reporter.report(&report);
        assert!(output.contains("app.py:10:1"));
        assert!(output.contains("no-eval"));
        assert!(output.contains("FAIL"));
    }

    #[test]
    fn test_verbose_shows_confidence() {
        let reporter = TerminalReporter::new(true);
        let report = create_report(vec![create_violation(
            "no-eval",
            Priority::Critical,
            "app.py",
            10,
        )]);
        let output = reporter.report(&report);
        assert!(output.contains("Confidence:"));
    }

    #[test]
    fn test_failed_files_warning() {
        let reporter = TerminalReporter::new(false);
        let mut report = create_report(vec![]);
        report.summary.files_failed = 2;
        let output = reporter.report(&report);
        assert!(output.contains("could not be read"));
    }
}
