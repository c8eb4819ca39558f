//! Schema-driven tables.
//!
//! A [`TableSchema`] is a declarative description of a table: columns, where
//! rows come from, and which features are switched on. Schemas come from the
//! fluent [`TableSchemaBuilder`] or from a literal JSON object, can be merged
//! with a named [`Preset`], and are mounted with [`SchemaTable`].
//!
//! # Example
//!
//! ```
//! use gridkit::model::Column;
//! use gridkit::schema::{PaginationFeature, TableSchemaBuilder};
//! use serde_json::json;
//!
//! let schema = TableSchemaBuilder::new()
//!     .set_title("Bots")
//!     .add_column(Column::new("name", "Name").sortable())
//!     .enable_pagination(PaginationFeature::with_page_size(20))
//!     .set_data_source(vec![json!({ "name": "alpha" }).as_object().cloned().unwrap_or_default()])
//!     .build();
//!
//! assert_eq!(schema.columns.len(), 1);
//! ```

mod builder;
mod infer;
mod preset;
mod search;
mod table;
mod validate;

pub use builder::*;
pub use infer::*;
pub use preset::*;
pub use search::*;
pub use table::*;
pub use validate::*;

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::data::{DataSource, ErrorCallback, Fetch, LoadCallback, RemoteSource, RequestFn};
use crate::model::{Column, PropMap, Record, RowSelection};
use crate::props::TablePropsSource;
use crate::row_key::RowKey;

fn default_true() -> bool {
    true
}

/// Pagination feature settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationFeature {
    /// `false` switches pagination off even when a preset enables it.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Initial page size; the table config's default when `None`.
    #[serde(default)]
    pub page_size: Option<usize>,
    /// Sizes offered by the size changer.
    #[serde(default)]
    pub page_size_options: Option<Vec<usize>>,
    /// Show the size changer.
    #[serde(default = "default_true")]
    pub show_size_changer: bool,
    /// Show the quick jumper.
    #[serde(default)]
    pub show_quick_jumper: bool,
    /// Show the total row count.
    #[serde(default = "default_true")]
    pub show_total: bool,
}

impl Default for PaginationFeature {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: None,
            page_size_options: None,
            show_size_changer: true,
            show_quick_jumper: false,
            show_total: true,
        }
    }
}

impl PaginationFeature {
    /// Enabled pagination with the given page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    /// Explicitly disabled pagination.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Keyword search settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFeature {
    /// `false` switches search off.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Placeholder of the keyword input.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Quiet period in milliseconds; the table config's when `None`.
    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

impl Default for SearchFeature {
    fn default() -> Self {
        Self {
            enabled: true,
            placeholder: None,
            debounce_ms: None,
        }
    }
}

/// Toolbar settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarFeature {
    /// `false` hides the toolbar.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Show the reload button.
    #[serde(default = "default_true")]
    pub show_refresh: bool,
}

impl Default for ToolbarFeature {
    fn default() -> Self {
        Self {
            enabled: true,
            show_refresh: true,
        }
    }
}

/// Feature switches of a schema. `None` means "not specified", which lets a
/// preset fill the value in.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    /// Pagination.
    pub pagination: Option<PaginationFeature>,
    /// Keyword search.
    pub search: Option<SearchFeature>,
    /// Toolbar.
    pub toolbar: Option<ToolbarFeature>,
    /// Row selection.
    pub row_selection: Option<RowSelection>,
    /// Register the sorting plugin.
    pub sortable: Option<bool>,
    /// Allow column resizing with persisted widths.
    pub column_settings: Option<bool>,
}

impl Features {
    /// Fill every unspecified feature from `defaults`.
    pub fn or(self, defaults: Features) -> Features {
        Features {
            pagination: self.pagination.or(defaults.pagination),
            search: self.search.or(defaults.search),
            toolbar: self.toolbar.or(defaults.toolbar),
            row_selection: self.row_selection.or(defaults.row_selection),
            sortable: self.sortable.or(defaults.sortable),
            column_settings: self.column_settings.or(defaults.column_settings),
        }
    }

    /// Effective pagination settings, `None` when switched off.
    pub fn pagination(&self) -> Option<&PaginationFeature> {
        self.pagination.as_ref().filter(|p| p.enabled)
    }

    /// Effective search settings, `None` when switched off.
    pub fn search(&self) -> Option<&SearchFeature> {
        self.search.as_ref().filter(|s| s.enabled)
    }

    /// Effective toolbar settings, `None` when switched off.
    pub fn toolbar(&self) -> Option<&ToolbarFeature> {
        self.toolbar.as_ref().filter(|t| t.enabled)
    }

    /// Whether sorting is switched on. Defaults to on.
    pub fn sorting(&self) -> bool {
        self.sortable.unwrap_or(true)
    }
}

/// Visual weight of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Highlighted.
    Primary,
    /// Plain.
    #[default]
    Default,
    /// Destructive.
    Danger,
}

/// Where an action is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionPlacement {
    /// In the toolbar; the handler receives no record.
    #[default]
    Toolbar,
    /// On every row; the handler receives the row.
    Row,
}

type ActionFn = dyn Fn(Option<&Record>) + Send + Sync;

/// Handler of an [`Action`].
#[derive(Clone)]
pub struct ActionHandler(Arc<ActionFn>);

impl ActionHandler {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Record>) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionHandler(..)")
    }
}

/// A toolbar or row action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Unique action key.
    #[serde(default)]
    pub key: String,
    /// Button label.
    #[serde(default)]
    pub label: String,
    /// Visual weight.
    #[serde(default, rename = "type")]
    pub kind: ActionKind,
    /// Where the action appears.
    #[serde(default)]
    pub placement: ActionPlacement,
    /// Confirmation prompt shown before running.
    #[serde(default)]
    pub confirm: Option<String>,
    /// What the action does.
    #[serde(skip)]
    pub handler: Option<ActionHandler>,
}

impl Action {
    /// Toolbar action with no handler.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the visual weight.
    pub fn kind(mut self, kind: ActionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Offer the action on every row.
    pub fn per_row(mut self) -> Self {
        self.placement = ActionPlacement::Row;
        self
    }

    /// Ask for confirmation first.
    pub fn confirm(mut self, prompt: impl Into<String>) -> Self {
        self.confirm = Some(prompt.into());
        self
    }

    /// Set the handler.
    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Record>) + Send + Sync + 'static,
    {
        self.handler = Some(ActionHandler::new(f));
        self
    }

    /// Run the handler. Returns `false` when there is none.
    pub fn trigger(&self, record: Option<&Record>) -> bool {
        match &self.handler {
            Some(handler) => {
                (handler.0)(record);
                true
            }
            None => false,
        }
    }
}

/// Lifecycle callbacks of a schema table.
#[derive(Clone, Default)]
pub struct SchemaEvents {
    /// Hard data-load failure.
    pub on_error: Option<ErrorCallback>,
    /// Successful data load.
    pub on_load: Option<LoadCallback>,
}

impl fmt::Debug for SchemaEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEvents")
            .field("on_error", &self.on_error.is_some())
            .field("on_load", &self.on_load.is_some())
            .finish()
    }
}

/// Declarative table description.
///
/// Rows come from the first of `request`, `remote` and `data_source` that is
/// set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableSchema {
    /// Title shown above the table.
    pub title: Option<String>,
    /// Columns in display order.
    pub columns: Vec<Column>,
    /// Static rows.
    pub data_source: Option<Vec<Record>>,
    /// Declarative remote source.
    pub remote: Option<RemoteSource>,
    /// Host request function.
    #[serde(skip)]
    pub request: Option<RequestFn>,
    /// How rows are keyed.
    pub row_key: Option<RowKey>,
    /// Feature switches.
    pub features: Features,
    /// Toolbar and row actions.
    pub actions: Vec<Action>,
    /// Lifecycle callbacks.
    #[serde(skip)]
    pub events: SchemaEvents,
    /// Style props handed to the rendering primitive.
    pub style: PropMap,
    /// Extra user props, layered over `style`.
    #[serde(skip)]
    pub table_props: Option<TablePropsSource>,
}

impl TableSchema {
    /// Whether any data source is configured.
    pub fn has_source(&self) -> bool {
        self.request.is_some() || self.remote.is_some() || self.data_source.is_some()
    }

    /// Resolve the data source. A remote source needs `fetch`; without it the
    /// static rows (if any) are used.
    pub fn source(&self, fetch: Option<&Arc<dyn Fetch>>) -> Option<DataSource> {
        if let Some(request) = &self.request {
            return Some(DataSource::Request(request.clone()));
        }
        if let (Some(remote), Some(fetch)) = (&self.remote, fetch) {
            return Some(DataSource::Remote {
                source: remote.clone(),
                fetch: Arc::clone(fetch),
            });
        }
        self.data_source.clone().map(DataSource::Static)
    }

    /// The column with `key`.
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::SelectionMode;

    #[test]
    fn test_schema_from_literal() {
        let schema: TableSchema = serde_json::from_value(json!({
            "title": "Accounts",
            "columns": [
                { "key": "name", "title": "Name", "dataIndex": "name" },
                { "key": "balance", "title": "Balance", "valueType": "number", "sortable": true }
            ],
            "dataSource": [{ "name": "a", "balance": 3 }],
            "rowKey": "name",
            "features": {
                "pagination": { "pageSize": 25 },
                "rowSelection": { "mode": "single" }
            },
            "actions": [{ "key": "add", "label": "Add", "type": "primary" }],
            "style": { "size": "small" }
        }))
        .unwrap();

        assert_eq!(schema.columns.len(), 2);
        assert!(schema.columns[1].sortable);
        assert_eq!(schema.features.pagination().and_then(|p| p.page_size), Some(25));
        assert_eq!(
            schema.features.row_selection.as_ref().map(|s| s.mode),
            Some(SelectionMode::Single)
        );
        assert_eq!(schema.actions[0].kind, ActionKind::Primary);
        assert!(matches!(schema.source(None), Some(DataSource::Static(rows)) if rows.len() == 1));
    }

    #[test]
    fn test_features_or_keeps_explicit_values() {
        let explicit = Features {
            pagination: Some(PaginationFeature::disabled()),
            ..Default::default()
        };
        let defaults = Features {
            pagination: Some(PaginationFeature::with_page_size(50)),
            sortable: Some(false),
            ..Default::default()
        };

        let merged = explicit.or(defaults);
        assert!(merged.pagination().is_none());
        assert_eq!(merged.sortable, Some(false));
    }

    #[test]
    fn test_action_trigger() {
        let action = Action::new("noop", "Noop");
        assert!(!action.trigger(None));
        assert!(Action::new("ok", "Ok").on_click(|_| {}).trigger(None));
    }
}
