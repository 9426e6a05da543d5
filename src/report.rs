//! Machine-readable accounting for one run.

use crate::directory::Outcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// How one detected change ended up.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Applied,
    Skipped,
    Failed,
}

/// One detected change and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRecord {
    pub dn: String,
    pub attribute: String,
    pub disposition: Disposition,
    /// Directory result code, when a write was attempted and answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChangeRecord {
    pub fn applied(dn: &str, attribute: &str, outcome: &Outcome) -> Self {
        Self {
            dn: dn.to_string(),
            attribute: attribute.to_string(),
            disposition: Disposition::Applied,
            code: Some(outcome.code),
            description: Some(outcome.description.clone()),
        }
    }

    pub fn skipped(dn: &str, attribute: &str) -> Self {
        Self {
            dn: dn.to_string(),
            attribute: attribute.to_string(),
            disposition: Disposition::Skipped,
            code: None,
            description: None,
        }
    }

    /// Write answered with a non-zero result code.
    pub fn rejected(dn: &str, attribute: &str, outcome: &Outcome) -> Self {
        Self {
            dn: dn.to_string(),
            attribute: attribute.to_string(),
            disposition: Disposition::Failed,
            code: Some(outcome.code),
            description: Some(outcome.description.clone()),
        }
    }

    /// Write request could not be sent at all.
    pub fn transport_failed(dn: &str, attribute: &str, error: &anyhow::Error) -> Self {
        Self {
            dn: dn.to_string(),
            attribute: attribute.to_string(),
            disposition: Disposition::Failed,
            code: None,
            description: Some(format!("{error:#}")),
        }
    }
}

/// Full run accounting, also the source of the stdout summary.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub records_total: usize,
    pub records_in_scope: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
    pub aborted: bool,
    pub changes: Vec<ChangeRecord>,
}

impl RunReport {
    pub fn new(records_total: usize) -> Self {
        Self {
            records_total,
            records_in_scope: 0,
            applied: 0,
            skipped: 0,
            failed: 0,
            aborted: false,
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: ChangeRecord) {
        match change.disposition {
            Disposition::Applied => self.applied += 1,
            Disposition::Skipped => self.skipped += 1,
            Disposition::Failed => self.failed += 1,
        }
        self.changes.push(change);
    }
}

/// Write the report as pretty-printed JSON.
pub fn write_json(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("write run report {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_tallies_by_disposition() {
        let mut report = RunReport::new(3);
        report.push(ChangeRecord::applied(
            "uid=a,dc=example,dc=com",
            "mail",
            &Outcome {
                code: 0,
                description: "success".to_string(),
            },
        ));
        report.push(ChangeRecord::skipped("uid=b,dc=example,dc=com", "mail"));
        report.push(ChangeRecord::rejected(
            "uid=c,dc=example,dc=com",
            "mail",
            &Outcome {
                code: 32,
                description: "no such object".to_string(),
            },
        ));

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.changes.len(), 3);
    }

    #[test]
    fn serialization_omits_absent_outcome_fields() {
        let value = serde_json::to_value(ChangeRecord::skipped(
            "uid=a,dc=example,dc=com",
            "mail",
        ))
        .expect("serialize");

        assert_eq!(value["disposition"], "skipped");
        assert!(value.get("code").is_none());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn serialization_keeps_directory_result_details() {
        let value = serde_json::to_value(ChangeRecord::rejected(
            "uid=a,dc=example,dc=com",
            "mail",
            &Outcome {
                code: 32,
                description: "no such object".to_string(),
            },
        ))
        .expect("serialize");

        assert_eq!(value["disposition"], "failed");
        assert_eq!(value["code"], 32);
        assert_eq!(value["description"], "no such object");
    }
}
