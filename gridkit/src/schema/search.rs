//! Search form fields derived from filterable columns.

use serde_json::Value;

use crate::model::{Column, FilterInput, FilterKind, FilterOption};

/// Input widget of a search field.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchWidget {
    /// Free-text input.
    Input,
    /// Choice from a fixed option list.
    Select(Vec<FilterOption>),
    /// Start and end date.
    DateRange,
    /// Minimum and maximum number.
    NumberRange,
}

/// One field of a search form.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchField {
    /// Column key the field filters.
    pub key: String,
    /// Record field the filter applies to.
    pub field: String,
    /// Field label.
    pub label: String,
    /// Widget kind.
    pub widget: SearchWidget,
    /// Placeholder text.
    pub placeholder: String,
}

impl SearchField {
    /// Turn a form value into filter values for the change router.
    ///
    /// Inputs and selects produce a one-element list; ranges expect a
    /// two-element array and keep it as is. Empty values produce `Null`,
    /// which the router drops.
    pub fn to_filter(&self, value: &Value) -> Value {
        match (&self.widget, value) {
            (_, Value::Null) => Value::Null,
            (SearchWidget::Input, Value::String(s)) if s.trim().is_empty() => Value::Null,
            (SearchWidget::DateRange | SearchWidget::NumberRange, Value::Array(items))
                if items.len() == 2 =>
            {
                value.clone()
            }
            (SearchWidget::DateRange | SearchWidget::NumberRange, _) => Value::Null,
            (_, Value::Array(_)) => value.clone(),
            (_, other) => Value::Array(vec![other.clone()]),
        }
    }
}

/// One search field per filterable column, widget chosen by the column's
/// filter kind. Columns without a filter config get a text input.
pub fn generate_search_fields(columns: &[Column]) -> Vec<SearchField> {
    columns
        .iter()
        .filter(|column| column.filterable)
        .map(|column| {
            let config = column.filter_config.clone().unwrap_or_default();
            let widget = match config.kind {
                FilterKind::Input => SearchWidget::Input,
                FilterKind::Select => SearchWidget::Select(config.options),
                FilterKind::DateRange => SearchWidget::DateRange,
                FilterKind::NumberRange => SearchWidget::NumberRange,
            };
            let placeholder = config.placeholder.unwrap_or_else(|| match widget {
                SearchWidget::Input => format!("Search {}", column.title),
                SearchWidget::Select(_) => format!("Select {}", column.title),
                SearchWidget::DateRange | SearchWidget::NumberRange => {
                    format!("{} range", column.title)
                }
            });
            SearchField {
                key: column.key.clone(),
                field: column.field().to_string(),
                label: column.title.clone(),
                widget,
                placeholder,
            }
        })
        .collect()
}

/// Build router filter input from form values keyed by column key.
pub fn search_values_to_filters(fields: &[SearchField], values: &FilterInput) -> FilterInput {
    fields
        .iter()
        .filter_map(|field| {
            values
                .get(&field.key)
                .map(|value| (field.field.clone(), field.to_filter(value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::FilterConfig;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").filter(FilterConfig::default()),
            Column::new("status", "Status").filter(FilterConfig::select(vec![
                FilterOption::new("On", "on"),
                FilterOption::new("Off", "off"),
            ])),
            Column::new("created", "Created")
                .filter(FilterConfig::new(FilterKind::DateRange).placeholder("When")),
            Column::new("notes", "Notes"),
        ]
    }

    #[test]
    fn test_fields_follow_filter_kind() {
        let fields = generate_search_fields(&columns());
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].widget, SearchWidget::Input);
        assert_eq!(fields[0].placeholder, "Search Name");
        assert!(matches!(&fields[1].widget, SearchWidget::Select(options) if options.len() == 2));
        assert_eq!(fields[2].widget, SearchWidget::DateRange);
        assert_eq!(fields[2].placeholder, "When");
    }

    #[test]
    fn test_values_to_filters() {
        let fields = generate_search_fields(&columns());
        let mut values = FilterInput::new();
        values.insert("name".into(), json!("ann"));
        values.insert("status".into(), json!(["on"]));
        values.insert("created".into(), json!("2024-01-01"));

        let filters = search_values_to_filters(&fields, &values);
        assert_eq!(filters["name"], json!(["ann"]));
        assert_eq!(filters["status"], json!(["on"]));
        assert_eq!(filters["created"], Value::Null);
    }
}
