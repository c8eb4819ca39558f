//! Tests for table property building.

use std::sync::Arc;

use gridkit::TableConfig;
use gridkit::diagnostics::MemorySink;
use gridkit::model::{Column, PaginationFallback, PropMap};
use gridkit::plugin::{PluginContext, PluginManager};
use gridkit::plugins::{ColumnWidthPlugin, PaginationPlugin};
use gridkit::props::{BuildInput, PropsBuilder, TablePropsSource, merge_props};
use serde_json::{Value, json};

fn map(value: Value) -> PropMap {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_merge_precedence() {
    let merged = merge_props(
        &map(json!({ "a": 1, "scroll": { "x": 1 } })),
        &map(json!({ "a": 2, "scroll": { "y": 2 } })),
        &map(json!({ "scroll": { "x": 3 } })),
    );
    assert_eq!(Value::Object(merged), json!({ "a": 2, "scroll": { "x": 3, "y": 2 } }));
}

#[test]
fn test_column_width_plugin_supplies_scroll() {
    let mut plugins = PluginManager::new();
    let widths = Arc::new(ColumnWidthPlugin::in_memory());
    plugins.register_arc(widths.clone());
    let cx = PluginContext::new("accounts", 10);
    widths.resize(&cx, "name", 12);
    widths.resize(&cx, "email", 20);

    let config = TableConfig::default();
    let sink = MemorySink::new();
    let builder = PropsBuilder::new(&plugins, &cx, &config, &sink);
    let user = TablePropsSource::from(map(json!({ "size": "small", "scroll": { "y": 300 } })));

    let props = builder.build(BuildInput {
        user_props: &user,
        is_loading: false,
        use_custom_loader: true,
    });

    assert_eq!(props["size"], json!("small"));
    assert_eq!(props["tableLayout"], json!("fixed"));
    assert_eq!(props["scroll"], json!({ "x": 32, "y": 300 }));
    assert_eq!(props["customLoading"], json!(false));

    let columns = builder.process_columns(&[Column::new("name", "Name"), Column::new("id", "Id")]);
    assert_eq!(columns[0].width, Some(12));
    assert_eq!(columns[1].width, None);
}

#[test]
fn test_pagination_prefers_context_and_plugin() {
    let mut plugins = PluginManager::new();
    plugins.register(PaginationPlugin::new(vec![10, 50]).quick_jumper(true));
    let cx = PluginContext::new("t", 25);
    cx.set_current(3);

    let config = TableConfig::default();
    let sink = MemorySink::new();
    let builder = PropsBuilder::new(&plugins, &cx, &config, &sink);

    let pagination = builder.build_pagination(PaginationFallback::new(1, 10, 90));
    assert_eq!(pagination.current, 3);
    assert_eq!(pagination.page_size, 25);
    assert_eq!(pagination.total, 90);
    assert!(pagination.show_quick_jumper);
    assert_eq!(pagination.page_size_options, vec![10, 25, 50]);
}
