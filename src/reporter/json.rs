use crate::reporter::{Reporter, ScanReport};

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &ScanReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize report: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Priority;
    use crate::test_utils::fixtures::{create_report, create_violation};

    #[test]
    fn test_json_output_structure() {
        let reporter = JsonReporter::new();
        let report = create_report(vec![]);
        let output = reporter.report(&report);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["target"], "./test-project/");
        assert!(parsed["summary"]["passed"].as_bool().unwrap());
        assert!(parsed["violations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_output_with_violations() {
        let reporter = JsonReporter::new();
        let report = create_report(vec![create_violation(
            "no-eval",
            Priority::Critical,
            "app.py",
            10,
        )]);
        let output = reporter.report(&report);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["violations"][0]["pattern"], "no-eval");
        assert_eq!(parsed["violations"][0]["priority"], "critical");
        assert_eq!(parsed["summary"]["critical"], 1);
        assert!(!parsed["summary"]["passed"].as_bool().unwrap());
    }

    #[test]
    fn test_json_round_trips() {
        let reporter = JsonReporter::new();
        let report = create_report(vec![create_violation(
            "no-eval",
            Priority::Critical,
            "app.py",
            10,
        )]);
        let output = reporter.report(&report);
        let parsed: ScanReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.violations.len(), 1);
    }
}
