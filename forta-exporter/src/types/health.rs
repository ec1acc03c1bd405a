use serde::{Deserialize, Serialize};

/// A single named entry of the node health report.
///
/// Example:
///
/// ```json
/// { "name": "forta.container.forta-inspector", "status": "ok", "details": "running" }
/// ```
///
/// `status` and `details` default to the empty string when the node omits
/// them, so one sparse record never invalidates the rest of the report.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: String,
}

impl HealthRecord {
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            details: details.into(),
        }
    }
}

/// The full health report for one poll tick.
///
/// Records are unordered and names carry no uniqueness guarantee; lookups
/// resolve to the first record whose name matches exactly.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthReport(pub Vec<HealthRecord>);

impl HealthReport {
    pub fn new(records: Vec<HealthRecord>) -> Self {
        Self(records)
    }

    /// Returns the first record named exactly `name`, if any.
    pub fn find(&self, name: &str) -> Option<&HealthRecord> {
        self.0.iter().find(|record| record.name == name)
    }

    /// Returns the `details` of the first record named `name`.
    pub fn find_detail(&self, name: &str) -> Option<&str> {
        self.find(name).map(|record| record.details.as_str())
    }

    /// Returns the `status` of the first record named `name`.
    pub fn find_status(&self, name: &str) -> Option<&str> {
        self.find(name).map(|record| record.status.as_str())
    }

    pub fn records(&self) -> &[HealthRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> HealthReport {
        HealthReport::new(vec![
            HealthRecord::new("forta.version", "info", "v0.5.6"),
            HealthRecord::new("forta.container.forta-inspector", "ok", "running"),
            HealthRecord::new("forta.container.forta-inspector", "down", "second"),
        ])
    }

    #[test]
    fn find_returns_first_exact_match() {
        let report = report();
        assert_eq!(
            report.find_detail("forta.container.forta-inspector"),
            Some("running")
        );
        assert_eq!(
            report.find_status("forta.container.forta-inspector"),
            Some("ok")
        );
    }

    #[test]
    fn find_is_exact_and_case_sensitive() {
        let report = report();
        assert_eq!(report.find_detail("forta.container"), None);
        assert_eq!(report.find_detail("FORTA.VERSION"), None);
        assert_eq!(report.find_detail("forta.version"), Some("v0.5.6"));
    }

    #[test]
    fn find_on_empty_report_is_absent() {
        let report = HealthReport::default();
        assert!(report.is_empty());
        assert_eq!(report.find_status("forta.version"), None);
    }

    #[test]
    fn health_report_deserializes_from_json_list() {
        let json = r#"
        [
          { "name": "forta.version", "status": "info", "details": "v0.5.6" },
          { "name": "forta.container.forta-scanner.service.block-feed.last-block", "status": "info", "details": "15514261" },
          { "name": "forta.container.forta-updater" }
        ]
        "#;

        let report: HealthReport = serde_json::from_str(json).expect("HealthReport should parse");
        assert_eq!(report.len(), 3);
        assert_eq!(report.records()[0].status, "info");
        assert_eq!(
            report.find_detail("forta.container.forta-scanner.service.block-feed.last-block"),
            Some("15514261")
        );
        assert_eq!(report.find_status("forta.container.forta-updater"), Some(""));
    }

    #[test]
    fn health_report_rejects_non_list_payload() {
        let json = r#"{ "name": "forta.version" }"#;
        assert!(serde_json::from_str::<HealthReport>(json).is_err());
    }
}
