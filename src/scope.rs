//! Record scope filtering based on an attribute's current values.

use crate::record::Record;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Limits mutation to records whose values for `attr` all appear in
/// `allowed`.
#[derive(Debug, Clone)]
pub struct ScopeConstraint {
    attr: String,
    allowed: BTreeSet<String>,
}

impl ScopeConstraint {
    pub fn new(attr: impl Into<String>, allowed: BTreeSet<String>) -> Self {
        Self {
            attr: attr.into(),
            allowed,
        }
    }

    /// Load the allowed-value set from a file, one value per line.
    /// Surrounding whitespace is trimmed and blank lines are skipped.
    pub fn from_file(attr: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read scope file {}", path.display()))?;
        let allowed: BTreeSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if allowed.is_empty() {
            tracing::debug!(attr, "scope file is empty; constraint filters nothing");
        }
        Ok(Self::new(attr, allowed))
    }

    /// Whether `record` may be mutated.
    ///
    /// An empty allowed set disables the restriction entirely, even when the
    /// attribute is absent. Otherwise the record is in scope only when the
    /// attribute is present with at least one value and every current value
    /// appears in the allowed set.
    pub fn in_scope(&self, record: &Record) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        match record.typed.get(&self.attr) {
            Some(values) if !values.is_empty() => {
                values.iter().all(|value| self.allowed.contains(value))
            }
            _ => false,
        }
    }
}

/// No constraint configured means every record is in scope.
pub fn in_scope(constraint: Option<&ScopeConstraint>, record: &Record) -> bool {
    constraint.is_none_or(|constraint| constraint.in_scope(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn record_with(attr: &str, values: &[&str]) -> Record {
        let mut typed = BTreeMap::new();
        typed.insert(
            attr.to_string(),
            values.iter().map(|value| (*value).to_string()).collect(),
        );
        Record::new("uid=jdoe,dc=example,dc=com".to_string(), typed, BTreeMap::new())
    }

    fn constraint(attr: &str, allowed: &[&str]) -> ScopeConstraint {
        ScopeConstraint::new(attr, allowed.iter().map(|value| (*value).to_string()).collect())
    }

    #[test]
    fn absent_constraint_includes_every_record() {
        let record = record_with("department", &["ops"]);
        assert!(in_scope(None, &record));
    }

    #[test]
    fn subset_of_allowed_values_is_in_scope() {
        let record = record_with("department", &["eng"]);
        assert!(constraint("department", &["eng", "qa"]).in_scope(&record));
    }

    #[test]
    fn any_value_outside_allowed_set_excludes() {
        let record = record_with("department", &["eng", "ops"]);
        assert!(!constraint("department", &["eng"]).in_scope(&record));
    }

    #[test]
    fn absent_attribute_excludes() {
        let record = record_with("mail", &["jdoe@example.com"]);
        assert!(!constraint("department", &["eng"]).in_scope(&record));
    }

    #[test]
    fn empty_value_list_excludes() {
        let record = record_with("department", &[]);
        assert!(!constraint("department", &["eng"]).in_scope(&record));
    }

    #[test]
    fn empty_allowed_set_disables_the_restriction() {
        let with_values = record_with("department", &["ops"]);
        let without_attr = record_with("mail", &["jdoe@example.com"]);
        let unrestricted = constraint("department", &[]);
        assert!(unrestricted.in_scope(&with_values));
        assert!(unrestricted.in_scope(&without_attr));
    }

    #[test]
    fn from_file_trims_lines_and_skips_blanks() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "eng  ").expect("write");
        writeln!(file).expect("write");
        writeln!(file, "  qa").expect("write");
        let loaded = ScopeConstraint::from_file("department", file.path()).expect("load");

        assert!(loaded.in_scope(&record_with("department", &["eng", "qa"])));
        assert!(!loaded.in_scope(&record_with("department", &["eng  "])));
    }
}
