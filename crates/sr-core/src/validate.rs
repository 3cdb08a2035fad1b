//! Structured validation results for settings edits.
//!
//! A report collects per-row field messages (dice table rows), per-field
//! messages (pity config), and an optional message that applies to the edit
//! as a whole. An edit is committed only when its report is empty.

use std::collections::BTreeMap;

/// Validation outcome for a settings edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Row index → field name → message.
    pub rows: BTreeMap<usize, BTreeMap<&'static str, String>>,
    /// Field name → message, for edits without rows.
    pub fields: BTreeMap<&'static str, String>,
    /// A message about the edit as a whole.
    pub global: Option<String>,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no problems were recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.fields.is_empty() && self.global.is_none()
    }

    /// Record a problem with one field of one row. The first message per
    /// field is kept.
    pub fn row_error(&mut self, row: usize, field: &'static str, message: impl Into<String>) {
        self.rows
            .entry(row)
            .or_default()
            .entry(field)
            .or_insert_with(|| message.into());
    }

    /// Record a problem with a standalone field.
    pub fn field_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Set the message for the edit as a whole.
    pub fn global_error(&mut self, message: impl Into<String>) {
        self.global = Some(message.into());
    }

    /// Message recorded for a row's field, if any.
    pub fn row_message(&self, row: usize, field: &str) -> Option<&str> {
        self.rows
            .get(&row)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
    }

    /// Message recorded for a standalone field, if any.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Turn the report into a result: `Ok(value)` when empty.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationReport> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::new();
        if let Some(global) = &self.global {
            lines.push(global.clone());
        }
        for (field, message) in &self.fields {
            lines.push(format!("{field}: {message}"));
        }
        for (row, fields) in &self.rows {
            for (field, message) in fields {
                lines.push(format!("row {}: {field}: {message}", row + 1));
            }
        }
        if lines.is_empty() {
            write!(f, "no problems")
        } else {
            write!(f, "{}", lines.join("; "))
        }
    }
}

impl std::error::Error for ValidationReport {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report() {
        let report = ValidationReport::new();
        assert!(report.is_empty());
        assert_eq!(report.into_result(7), Ok(7));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut report = ValidationReport::new();
        report.row_error(0, "face", "first");
        report.row_error(0, "face", "second");
        assert_eq!(report.row_message(0, "face"), Some("first"));
    }

    #[test]
    fn display_lists_everything() {
        let mut report = ValidationReport::new();
        report.global_error("at least 2 faces are required");
        report.field_error("hard_threshold", "must be at least 1");
        report.row_error(1, "duration", "must be between 1 and 60 seconds");
        let text = report.to_string();
        assert!(text.contains("at least 2 faces"));
        assert!(text.contains("hard_threshold: must be at least 1"));
        assert!(text.contains("row 2: duration"));
        assert!(report.into_result(()).is_err());
    }
}
