//! Named schema presets.

use serde_json::{Value, json};

use super::{Features, PaginationFeature, SearchFeature, TableSchema, ToolbarFeature};
use crate::model::{PropMap, RowSelection, SelectionMode};
use crate::row_key::RowKey;

/// A named partial schema whose values serve as defaults.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    /// Preset name.
    pub name: String,
    /// Default title.
    pub title: Option<String>,
    /// Default row key.
    pub row_key: Option<RowKey>,
    /// Default features.
    pub features: Features,
    /// Default style props.
    pub style: PropMap,
}

fn style(value: Value) -> PropMap {
    value.as_object().cloned().unwrap_or_default()
}

impl Preset {
    /// Paged, searchable table with a toolbar.
    pub fn basic() -> Self {
        Self {
            name: "basic".into(),
            features: Features {
                pagination: Some(PaginationFeature::with_page_size(10)),
                search: Some(SearchFeature::default()),
                toolbar: Some(ToolbarFeature::default()),
                sortable: Some(true),
                ..Default::default()
            },
            style: style(json!({ "size": "middle" })),
            ..Default::default()
        }
    }

    /// Everything on: size changer, quick jumper, multi-select, resizable
    /// columns.
    pub fn advanced() -> Self {
        Self {
            name: "advanced".into(),
            features: Features {
                pagination: Some(PaginationFeature {
                    page_size: Some(20),
                    show_quick_jumper: true,
                    ..Default::default()
                }),
                search: Some(SearchFeature::default()),
                toolbar: Some(ToolbarFeature::default()),
                row_selection: Some(RowSelection::new(SelectionMode::Multiple)),
                sortable: Some(true),
                column_settings: Some(true),
            },
            style: style(json!({ "size": "middle", "bordered": true })),
            ..Default::default()
        }
    }

    /// Display-only table: paging, nothing interactive beyond it.
    pub fn readonly() -> Self {
        Self {
            name: "readonly".into(),
            features: Features {
                pagination: Some(PaginationFeature {
                    page_size: Some(20),
                    show_size_changer: false,
                    ..Default::default()
                }),
                search: Some(SearchFeature {
                    enabled: false,
                    ..Default::default()
                }),
                toolbar: Some(ToolbarFeature {
                    enabled: false,
                    show_refresh: false,
                }),
                sortable: Some(false),
                column_settings: Some(false),
                ..Default::default()
            },
            style: style(json!({ "size": "small" })),
            ..Default::default()
        }
    }

    /// Built-in preset by name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(Self::basic()),
            "advanced" => Some(Self::advanced()),
            "readonly" => Some(Self::readonly()),
            _ => None,
        }
    }
}

/// Merge `preset` under `schema`.
///
/// Top-level fields are merged shallowly; `features` and `style` are merged
/// one level deeper. Values set on the schema always win.
pub fn apply_preset(schema: TableSchema, preset: &Preset) -> TableSchema {
    let mut style = preset.style.clone();
    style.extend(schema.style);

    TableSchema {
        title: schema.title.or_else(|| preset.title.clone()),
        row_key: schema.row_key.or_else(|| preset.row_key.clone()),
        features: schema.features.or(preset.features.clone()),
        style,
        ..schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;

    #[test]
    fn test_explicit_values_win() {
        let mut schema = TableSchema {
            columns: vec![Column::new("name", "Name")],
            ..Default::default()
        };
        schema.style.insert("size".into(), json!("large"));
        schema.features.sortable = Some(false);

        let merged = apply_preset(schema, &Preset::advanced());

        assert_eq!(merged.style["size"], json!("large"));
        assert_eq!(merged.style["bordered"], json!(true));
        assert_eq!(merged.features.sortable, Some(false));
        assert_eq!(merged.features.column_settings, Some(true));
        assert_eq!(merged.columns.len(), 1);
    }

    #[test]
    fn test_readonly_switches_search_off() {
        let merged = apply_preset(TableSchema::default(), &Preset::readonly());
        assert!(merged.features.search().is_none());
        assert!(merged.features.pagination().is_some());
        assert!(!merged.features.sorting());
    }

    #[test]
    fn test_named() {
        assert_eq!(Preset::named("basic").map(|p| p.name), Some("basic".to_string()));
        assert!(Preset::named("fancy").is_none());
    }
}
