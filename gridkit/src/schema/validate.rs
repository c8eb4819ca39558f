//! Schema validation.

use std::collections::HashSet;

use super::TableSchema;

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Makes the schema invalid. Rendering still proceeds.
    Error,
    /// Worth fixing, does not affect validity.
    Warning,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path of the offending field, e.g. `columns[1].key`.
    pub field: String,
    /// What is wrong.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }
}

/// Result of validating a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// `false` when any issue has [`Severity::Error`].
    pub valid: bool,
    /// All findings, errors and warnings.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        let valid = !errors.iter().any(|e| e.severity == Severity::Error);
        Self { valid, errors }
    }

    /// Error-severity findings.
    pub fn errors_only(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(|e| e.severity == Severity::Error)
    }

    /// Warning-severity findings.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(|e| e.severity == Severity::Warning)
    }

    /// The first finding for `field`.
    pub fn issue_for(&self, field: &str) -> Option<&ValidationIssue> {
        self.errors.iter().find(|e| e.field == field)
    }
}

/// Check a schema for configuration mistakes.
///
/// Errors: a column without a key, a key used twice (reported once, at the
/// second use), no data source at all. Warnings: no columns, a column without
/// a title or data index, an action without a handler.
pub fn validate_schema(schema: &TableSchema) -> ValidationResult {
    let mut issues = Vec::new();

    if schema.columns.is_empty() {
        issues.push(ValidationIssue::warning("columns", "no columns defined"));
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for (i, column) in schema.columns.iter().enumerate() {
        if column.key.trim().is_empty() {
            issues.push(ValidationIssue::error(
                format!("columns[{i}].key"),
                "column key is required",
            ));
        } else if !seen.insert(column.key.as_str()) && reported.insert(column.key.as_str()) {
            issues.push(ValidationIssue::error(
                format!("columns[{i}].key"),
                format!("duplicate column key '{}'", column.key),
            ));
        }

        if column.title.trim().is_empty() {
            issues.push(ValidationIssue::warning(
                format!("columns[{i}].title"),
                "column has no title",
            ));
        }
        if column.data_index.trim().is_empty() {
            issues.push(ValidationIssue::warning(
                format!("columns[{i}].dataIndex"),
                "column has no dataIndex, falling back to its key",
            ));
        }
    }

    for (i, action) in schema.actions.iter().enumerate() {
        if action.handler.is_none() {
            issues.push(ValidationIssue::warning(
                format!("actions[{i}].handler"),
                format!("action '{}' has no handler", action.key),
            ));
        }
    }

    if !schema.has_source() {
        issues.push(ValidationIssue::error(
            "dataSource",
            "either dataSource, remote or request must be configured",
        ));
    }

    ValidationResult::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use crate::schema::Action;

    fn schema(columns: Vec<Column>) -> TableSchema {
        TableSchema {
            columns,
            data_source: Some(Vec::new()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_schema() {
        let result = validate_schema(&schema(vec![Column::new("name", "Name")]));
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_duplicate_reported_once() {
        let result = validate_schema(&schema(vec![
            Column::new("id", "Id"),
            Column::new("id", "Id again"),
            Column::new("id", "Third"),
        ]));
        assert!(!result.valid);
        assert_eq!(result.errors_only().count(), 1);
        assert_eq!(result.errors[0].field, "columns[1].key");
    }

    #[test]
    fn test_warnings_keep_schema_valid() {
        let mut untitled = Column::new("name", "");
        untitled.data_index.clear();
        let mut schema = schema(vec![untitled]);
        schema.actions.push(Action::new("delete", "Delete"));

        let result = validate_schema(&schema);
        assert!(result.valid);
        assert_eq!(result.warnings().count(), 3);
        assert!(result.issue_for("actions[0].handler").is_some());
    }

    #[test]
    fn test_missing_source_and_key() {
        let result = validate_schema(&TableSchema {
            columns: vec![Column::new("", "Nameless")],
            ..Default::default()
        });
        assert!(!result.valid);
        assert!(result.issue_for("columns[0].key").is_some());
        assert!(result.issue_for("dataSource").is_some());
    }
}
