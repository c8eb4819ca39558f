//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::{Record, SortOrder, display_value};
use crate::error::RenderError;

/// How a column's values are interpreted and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// Plain text.
    #[default]
    Text,
    /// Numeric value.
    Number,
    /// Yes/no value.
    Boolean,
    /// Date or date-time string.
    Date,
    /// Link.
    Url,
    /// Image path or URL.
    Image,
    /// One of a fixed set of options.
    Select,
}

/// Column pinned to one side of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Fixed {
    /// Pinned left.
    Left,
    /// Pinned right.
    Right,
}

/// Kind of search/filter widget a column asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// Free-text input.
    #[default]
    Input,
    /// Choice from `options`.
    Select,
    /// Start/end date pair.
    DateRange,
    /// Min/max number pair.
    NumberRange,
}

/// One selectable filter option.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterOption {
    /// Display label.
    pub label: String,
    /// Value sent in the filter payload.
    pub value: Value,
}

impl FilterOption {
    /// Create an option.
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Filter widget configuration for a column.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Widget kind.
    #[serde(rename = "type", default)]
    pub kind: FilterKind,
    /// Options for `Select` filters.
    #[serde(default)]
    pub options: Vec<FilterOption>,
    /// Placeholder text.
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FilterConfig {
    /// Filter config of the given kind.
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Select filter with the given options.
    pub fn select(options: Vec<FilterOption>) -> Self {
        Self {
            kind: FilterKind::Select,
            options,
            placeholder: None,
        }
    }

    /// Set the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

type CellRenderFn = dyn Fn(&Value, &Record, usize) -> Result<String, RenderError> + Send + Sync;

/// Custom cell renderer: `(value, record, row_index) -> text`.
#[derive(Clone)]
pub struct CellRender(Arc<CellRenderFn>);

impl CellRender {
    /// Wrap a render closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Record, usize) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the renderer.
    pub fn call(&self, value: &Value, record: &Record, index: usize) -> Result<String, RenderError> {
        (self.0)(value, record, index)
    }
}

impl fmt::Debug for CellRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellRender(..)")
    }
}

/// A table column.
///
/// Built once (by hand, by [`TableSchemaBuilder`](crate::schema::TableSchemaBuilder),
/// or by [`generate_columns_from_data`](crate::schema::generate_columns_from_data))
/// and then treated as immutable. Plugins that decorate columns return new
/// copies.
///
/// # Example
///
/// ```
/// use gridkit::model::{Column, ValueType};
///
/// let columns = vec![
///     Column::new("name", "Name").sortable(),
///     Column::new("age", "Age").value_type(ValueType::Number).width(8),
/// ];
/// assert_eq!(columns[1].data_index, "age");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique column key.
    #[serde(default)]
    pub key: String,
    /// Header text.
    #[serde(default)]
    pub title: String,
    /// Record field the column reads. Empty means "same as key".
    #[serde(default)]
    pub data_index: String,
    /// Value interpretation.
    #[serde(default)]
    pub value_type: ValueType,
    /// Whether the column can be sorted.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column can be filtered.
    #[serde(default)]
    pub filterable: bool,
    /// Filter widget configuration.
    #[serde(default)]
    pub filter_config: Option<FilterConfig>,
    /// Custom cell renderer.
    #[serde(skip)]
    pub render: Option<CellRender>,
    /// Width in characters.
    #[serde(default)]
    pub width: Option<u32>,
    /// Pinned side.
    #[serde(default)]
    pub fixed: Option<Fixed>,
    /// Current sort direction (set by the sorting plugin).
    #[serde(skip)]
    pub sort_order: Option<SortOrder>,
    /// Currently applied filter values (set by the filter plugin).
    #[serde(skip)]
    pub filtered_value: Option<Vec<Value>>,
}

impl Column {
    /// Create a text column whose data index equals its key.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            data_index: key.clone(),
            key,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Read a different record field than the key.
    pub fn data_index(mut self, data_index: impl Into<String>) -> Self {
        self.data_index = data_index.into();
        self
    }

    /// Set the value type.
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Make the column filterable with the given widget config.
    pub fn filter(mut self, config: FilterConfig) -> Self {
        self.filterable = true;
        self.filter_config = Some(config);
        self
    }

    /// Set a fixed width in characters.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Pin the column to one side.
    pub fn fixed(mut self, side: Fixed) -> Self {
        self.fixed = Some(side);
        self
    }

    /// Set a custom cell renderer.
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Record, usize) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.render = Some(CellRender::new(f));
        self
    }

    /// The record field this column reads.
    pub fn field(&self) -> &str {
        if self.data_index.is_empty() {
            &self.key
        } else {
            &self.data_index
        }
    }

    /// The raw value of this column in `record` (`Null` if absent).
    pub fn value_of<'a>(&self, record: &'a Record) -> &'a Value {
        record.get(self.field()).unwrap_or(&Value::Null)
    }

    /// Cell text for `record`, using the custom renderer when set.
    pub fn cell_text(&self, record: &Record, index: usize) -> Result<String, RenderError> {
        let value = self.value_of(record);
        match &self.render {
            Some(render) => render.call(value, record, index),
            None => Ok(display_value(value)),
        }
    }

    /// Header text including sort and filter indicators.
    pub fn header_text(&self) -> String {
        let mut header = self.title.clone();
        if let Some(order) = self.sort_order {
            header.push(' ');
            header.push_str(order.indicator());
        }
        if self.filtered_value.as_ref().is_some_and(|v| !v.is_empty()) {
            header.push_str(" *");
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults_to_key() {
        let mut column = Column::new("name", "Name");
        column.data_index.clear();
        assert_eq!(column.field(), "name");
    }

    #[test]
    fn test_cell_text_uses_renderer() {
        let column = Column::new("age", "Age")
            .render(|value, _, _| Ok(format!("{} yrs", display_value(value))));
        let mut record = Record::new();
        record.insert("age".into(), Value::from(7));
        assert_eq!(column.cell_text(&record, 0).unwrap(), "7 yrs");
    }

    #[test]
    fn test_header_indicators() {
        let mut column = Column::new("name", "Name").sortable();
        column.sort_order = Some(SortOrder::Descend);
        column.filtered_value = Some(vec![Value::from("x")]);
        assert_eq!(column.header_text(), "Name ▼ *");
    }

    #[test]
    fn test_deserialize_literal_column() {
        let column: Column = serde_json::from_value(serde_json::json!({
            "key": "status",
            "title": "Status",
            "dataIndex": "state",
            "valueType": "select",
            "filterable": true,
            "filterConfig": { "type": "select", "options": [{ "label": "On", "value": 1 }] }
        }))
        .unwrap();
        assert_eq!(column.field(), "state");
        assert_eq!(column.value_type, ValueType::Select);
        assert_eq!(column.filter_config.unwrap().options.len(), 1);
    }
}
