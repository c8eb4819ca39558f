use std::fs::File;
use std::time::Duration;

use gridkit::data::{RequestParams, RequestResponse, local_query};
use gridkit::model::{
    ChangeEvent, Column, FilterConfig, FilterOption, PaginationChange, Record, SelectionMode,
    Sorter, SorterInfo, ValueType,
};
use gridkit::renderer::TextPrimitive;
use gridkit::schema::{Action, PaginationFeature, Preset, SearchFeature};
use gridkit::{GridError, Rendered, SchemaTable, TableSchemaBuilder};
use log::info;
use serde_json::json;
use simplelog::{Config, LevelFilter, WriteLogger};

fn fleet() -> Vec<Record> {
    let names = ["atlas", "borealis", "cinder", "dune", "ember", "fjord", "gale"];
    names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            json!({
                "bot_id": 100 + i,
                "name": name,
                "status": if i % 3 == 0 { "paused" } else { "running" },
                "uptime": (i * 37) % 100,
                "updated": format!("2024-06-{:02}", i + 1),
            })
            .as_object()
            .cloned()
        })
        .collect()
}

async fn fetch_fleet(params: RequestParams) -> Result<RequestResponse, gridkit::error::RequestError> {
    tokio::time::sleep(Duration::from_millis(25)).await;
    Ok(local_query(&fleet(), &params))
}

fn print<V: std::fmt::Display>(heading: &str, rendered: &Rendered<V>) {
    println!("== {heading}");
    match rendered {
        Rendered::Table(view) => println!("{view}"),
        Rendered::Error(panel) => println!("{panel}"),
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), GridError> {
    let log_file = File::create("gridkit-demo.log").expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let schema = TableSchemaBuilder::new()
        .with_preset(Preset::basic())
        .set_title("Fleet")
        .add_column(Column::new("name", "Name").sortable())
        .add_column(Column::new("status", "Status").filter(FilterConfig::select(vec![
            FilterOption::new("Running", "running"),
            FilterOption::new("Paused", "paused"),
        ])))
        .add_column(
            Column::new("uptime", "Uptime")
                .value_type(ValueType::Number)
                .sortable()
                .render(|value, _, _| Ok(format!("{}%", value))),
        )
        .add_column(Column::new("updated", "Updated").value_type(ValueType::Date))
        .enable_pagination(PaginationFeature::with_page_size(3))
        .enable_search(SearchFeature {
            debounce_ms: Some(100),
            ..Default::default()
        })
        .enable_row_selection(SelectionMode::Multiple)
        .add_action(Action::new("restart", "Restart").per_row().on_click(|record| {
            if let Some(record) = record {
                info!("Restart requested for {}", record["name"]);
            }
        }))
        .set_request(fetch_fleet)
        .on_error(|err| eprintln!("load failed: {err}"))
        .build();

    let table = SchemaTable::new("fleet", schema, TextPrimitive::new());

    table.reload().await?;
    print("first page", &table.view());

    table
        .handle_change(ChangeEvent::sort(
            PaginationChange::new(1, 3),
            SorterInfo::Single(Sorter::desc("uptime")),
        ))
        .await?;
    table.toggle_selection(json!(104));
    print("sorted by uptime", &table.view());

    table.handle_change(ChangeEvent::paginate(2, 3)).await?;
    print("page 2", &table.view());

    let mut form = gridkit::model::FilterInput::new();
    form.insert("status".into(), json!("paused"));
    table.submit_search_form(&form).await?;
    print("paused only", &table.view());

    if let Some(result) = table.search("dune").await {
        result?;
    }
    print("search 'dune'", &table.view());

    if let Some(first) = table.loader().records().first() {
        table.trigger_action("restart", Some(first));
    }

    Ok(())
}
