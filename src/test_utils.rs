#[cfg(test)]
pub mod fixtures {
    use crate::catalog::{Priority, Violation};
    use crate::reporter::{ScanReport, Summary};

    pub fn create_violation(
        pattern: &str,
        priority: Priority,
        file: &str,
        line: usize,
    ) -> Violation {
        Violation {
            pattern: pattern.to_string(),
            category: "test".to_string(),
            priority,
            file: file.to_string(),
            line,
            column: None,
            matched: "test code".to_string(),
            confidence: 0.9,
            suggested_fix: None,
            auto_fixable: false,
        }
    }

    pub fn create_report(violations: Vec<Violation>) -> ScanReport {
        let summary = Summary::from_violations(&violations, 1, 0, false);
        ScanReport {
            version: "0.3.1".to_string(),
            scanned_at: "2026-08-30T12:00:00Z".to_string(),
            target: "./test-project/".to_string(),
            summary,
            violations,
        }
    }
}
