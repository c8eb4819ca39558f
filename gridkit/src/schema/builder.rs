//! Fluent schema builder.

use std::future::Future;
use std::sync::Arc;

use log::debug;
use serde_json::{Value, json};

use super::{
    Action, PaginationFeature, Preset, SearchFeature, Severity, TableSchema, ToolbarFeature,
    ValidationResult, apply_preset, validate_schema,
};
use crate::data::{RemoteSource, RequestFn, RequestParams, RequestResponse};
use crate::diagnostics::{Diagnostic, SharedSink, default_sink, report_quietly};
use crate::error::RequestError;
use crate::model::{Column, Record, RowSelection, SelectionMode};
use crate::props::TablePropsSource;
use crate::row_key::RowKey;

const COMPONENT: &str = "TableSchemaBuilder";

/// Builder for [`TableSchema`].
///
/// [`build`](Self::build) validates the schema and reports every finding,
/// but always returns it: a malformed schema still renders something that
/// can be inspected.
pub struct TableSchemaBuilder {
    schema: TableSchema,
    preset: Option<Preset>,
    sink: SharedSink,
}

impl std::fmt::Debug for TableSchemaBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSchemaBuilder")
            .field("schema", &self.schema)
            .field("preset", &self.preset.as_ref().map(|p| p.name.as_str()))
            .finish()
    }
}

impl Default for TableSchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSchemaBuilder {
    /// Empty schema.
    pub fn new() -> Self {
        Self {
            schema: TableSchema::default(),
            preset: None,
            sink: default_sink(),
        }
    }

    /// Continue from an existing schema.
    pub fn from_schema(schema: TableSchema) -> Self {
        Self {
            schema,
            ..Self::new()
        }
    }

    /// Report validation findings to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Fill unspecified values from `preset` at build time.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Set the table title.
    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.schema.title = Some(title.into());
        self
    }

    /// Append a column.
    pub fn add_column(mut self, column: Column) -> Self {
        self.schema.columns.push(column);
        self
    }

    /// Append several columns in order.
    pub fn add_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.schema.columns.extend(columns);
        self
    }

    /// Turn on pagination with the given settings.
    pub fn enable_pagination(mut self, pagination: PaginationFeature) -> Self {
        self.schema.features.pagination = Some(pagination);
        self
    }

    /// Turn on keyword search.
    pub fn enable_search(mut self, search: SearchFeature) -> Self {
        self.schema.features.search = Some(search);
        self
    }

    /// Turn on the toolbar.
    pub fn enable_toolbar(mut self, toolbar: ToolbarFeature) -> Self {
        self.schema.features.toolbar = Some(toolbar);
        self
    }

    /// Turn on row selection in `mode`.
    pub fn enable_row_selection(mut self, mode: SelectionMode) -> Self {
        self.schema.features.row_selection = Some(RowSelection::new(mode));
        self
    }

    /// Switch the sorting plugin on or off.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.schema.features.sortable = Some(sortable);
        self
    }

    /// Persist column widths across page changes.
    pub fn enable_column_settings(mut self) -> Self {
        self.schema.features.column_settings = Some(true);
        self
    }

    /// Append a toolbar or row action.
    pub fn add_action(mut self, action: Action) -> Self {
        self.schema.actions.push(action);
        self
    }

    /// Static rows.
    pub fn set_data_source(mut self, records: Vec<Record>) -> Self {
        self.schema.data_source = Some(records);
        self
    }

    /// Async request function.
    pub fn set_request<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestResponse, RequestError>> + Send + 'static,
    {
        self.schema.request = Some(RequestFn::new(f));
        self
    }

    /// Declarative remote source.
    pub fn set_remote(mut self, remote: RemoteSource) -> Self {
        self.schema.remote = Some(remote);
        self
    }

    /// Set how row keys are derived.
    pub fn set_row_key(mut self, row_key: impl Into<RowKey>) -> Self {
        self.schema.row_key = Some(row_key.into());
        self
    }

    /// Set one style prop.
    pub fn set_style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.schema.style.insert(key.into(), value.into());
        self
    }

    /// Extra user props, literal or computed from the loading state.
    pub fn set_table_props(mut self, props: impl Into<TablePropsSource>) -> Self {
        self.schema.table_props = Some(props.into());
        self
    }

    /// Called on every hard data-load failure.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestError) + Send + Sync + 'static,
    {
        self.schema.events.on_error = Some(Arc::new(f));
        self
    }

    /// Called after every successful data load.
    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Record], usize) + Send + Sync + 'static,
    {
        self.schema.events.on_load = Some(Arc::new(f));
        self
    }

    /// Validate, report, and return the schema regardless of the outcome.
    pub fn build(self) -> TableSchema {
        self.build_with_report().0
    }

    /// Like [`build`](Self::build), also returning the validation result.
    pub fn build_with_report(self) -> (TableSchema, ValidationResult) {
        let schema = match &self.preset {
            Some(preset) => apply_preset(self.schema, preset),
            None => self.schema,
        };

        let result = validate_schema(&schema);
        for issue in &result.errors {
            let diagnostic = match issue.severity {
                Severity::Error => Diagnostic::error(COMPONENT, "build", issue.message.clone()),
                Severity::Warning => Diagnostic::warn(COMPONENT, "build", issue.message.clone()),
            };
            report_quietly(
                self.sink.as_ref(),
                diagnostic.with_data(json!({ "field": issue.field })),
            );
        }
        debug!(
            "Built schema with {} columns ({} findings, valid: {})",
            schema.columns.len(),
            result.errors.len(),
            result.valid
        );

        (schema, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;

    #[test]
    fn test_build_reports_but_returns() {
        let sink = Arc::new(MemorySink::new());
        let (schema, result) = TableSchemaBuilder::new()
            .with_sink(sink.clone())
            .add_column(Column::new("id", "Id"))
            .add_column(Column::new("id", "Id"))
            .set_data_source(Vec::new())
            .build_with_report();

        assert_eq!(schema.columns.len(), 2);
        assert!(!result.valid);
        assert!(sink.contains("duplicate column key 'id'"));
    }

    #[test]
    fn test_preset_applied_before_validation() {
        let schema = TableSchemaBuilder::new()
            .with_preset(Preset::basic())
            .add_column(Column::new("name", "Name"))
            .set_style("size", "large")
            .set_data_source(Vec::new())
            .build();

        assert!(schema.features.pagination().is_some());
        assert_eq!(schema.style["size"], json!("large"));
    }

    #[test]
    fn test_request_source() {
        let schema = TableSchemaBuilder::new()
            .set_request(|_params| async { Ok(RequestResponse::default()) })
            .build();
        assert!(schema.request.is_some());
        assert!(schema.has_source());
    }
}
