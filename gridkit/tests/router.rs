//! Tests for change-event routing.

use std::sync::{Arc, Mutex};

use gridkit::model::{
    ChangeAction, ChangeEvent, ChangeExtra, FilterInput, PaginationChange, Sorter, SorterInfo,
};
use gridkit::plugin::{PluginContext, PluginManager};
use gridkit::plugins::{FilterPlugin, PaginationPlugin, SortingPlugin};
use gridkit::router::ChangeRouter;
use serde_json::json;

struct Harness {
    router: Arc<ChangeRouter>,
    sorting: Arc<SortingPlugin>,
    seen: Arc<Mutex<Vec<&'static str>>>,
}

fn harness() -> Harness {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut plugins = PluginManager::new();

    let log = seen.clone();
    let sorting = Arc::new(SortingPlugin::new().on_change(move |_| {
        log.lock().unwrap().push("sort");
    }));
    plugins.register_arc(sorting.clone());

    let log = seen.clone();
    plugins.register(PaginationPlugin::new(vec![10, 20]).on_change(move |_| {
        log.lock().unwrap().push("page");
    }));

    let log = seen.clone();
    plugins.register(FilterPlugin::new().on_change(move |_| {
        log.lock().unwrap().push("filter");
    }));

    let context = PluginContext::new("router-test", 10);
    Harness {
        router: Arc::new(ChangeRouter::new(Arc::new(plugins), context)),
        sorting,
        seen,
    }
}

fn filters(value: serde_json::Value) -> FilterInput {
    value
        .as_object()
        .map(|m| m.clone().into_iter().collect())
        .unwrap_or_default()
}

#[test]
fn test_paginate_updates_page_and_keeps_filters() {
    let h = harness();
    let cx = h.router.context();
    h.router
        .dispatch(ChangeEvent::filter(PaginationChange::new(1, 10), filters(json!({ "status": ["on"] }))));

    h.router.handle(
        PaginationChange::new(4, 20),
        SorterInfo::None,
        filters(json!({ "status": ["off"] })),
        ChangeExtra {
            action: ChangeAction::Paginate,
        },
    );

    assert_eq!(cx.current(), 4);
    assert_eq!(cx.page_size(), 20);
    assert_eq!(cx.filters()["status"], vec![json!("on")]);
    assert_eq!(*h.seen.lock().unwrap(), vec!["filter", "page"]);
}

#[test]
fn test_filter_resets_page_and_keeps_page_size() {
    let h = harness();
    let cx = h.router.context();
    h.router.dispatch(ChangeEvent::paginate(5, 20));

    h.router.dispatch(ChangeEvent::filter(
        PaginationChange::new(5, 50),
        filters(json!({ "status": ["on"], "name": "ignored" })),
    ));

    assert_eq!(cx.current(), 1);
    assert_eq!(cx.page_size(), 20);
    assert_eq!(cx.filters().len(), 1);
    assert_eq!(*h.seen.lock().unwrap(), vec!["page", "filter"]);
}

#[test]
fn test_sort_only_reaches_sorting_plugin() {
    let h = harness();
    let cx = h.router.context();

    h.router.dispatch(ChangeEvent::sort(
        PaginationChange::new(9, 99),
        SorterInfo::Single(Sorter::desc("age")),
    ));

    assert_eq!(cx.current(), 1);
    assert_eq!(cx.page_size(), 10);
    assert_eq!(h.sorting.active_sorters(), vec![Sorter::desc("age")]);
    assert_eq!(*h.seen.lock().unwrap(), vec!["sort"]);
}

#[test]
fn test_handler_wraps_dispatch() {
    let h = harness();
    let handler = h.router.handler();
    handler(ChangeEvent::paginate(2, 10));
    assert_eq!(h.router.context().current(), 2);
    assert_eq!(*h.seen.lock().unwrap(), vec!["page"]);
}
