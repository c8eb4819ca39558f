//! Data sources.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::RequestError;
use crate::model::{FilterKind, Filters, Record, SortOrder, Sorter, display_value};

/// Type alias for boxed futures returned by request functions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Parameters of one data request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestParams {
    /// Page, 1-based.
    pub current: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Active filters.
    pub filters: Filters,
    /// Active sorters in priority order.
    pub sorter: Vec<Sorter>,
    /// Search keyword.
    pub keyword: Option<String>,
    /// Widget kind of each filtered field. Fields without an entry are
    /// matched like `Select`.
    pub filter_kinds: BTreeMap<String, FilterKind>,
}

/// Response of a data request: `{data, total?, success?}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RequestResponse {
    /// Rows of the requested page.
    #[serde(default)]
    pub data: Vec<Record>,
    /// Total rows across pages; defaults to `data.len()`.
    #[serde(default)]
    pub total: Option<usize>,
    /// `Some(false)` marks a soft failure.
    #[serde(default)]
    pub success: Option<bool>,
    /// Message accompanying a soft failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl RequestResponse {
    /// Successful response with the given rows and total.
    pub fn ok(data: Vec<Record>, total: usize) -> Self {
        Self {
            data,
            total: Some(total),
            success: Some(true),
            message: None,
        }
    }

    /// Soft failure with a message.
    pub fn soft_failure(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            total: None,
            success: Some(false),
            message: Some(message.into()),
        }
    }
}

type RequestFnInner =
    dyn Fn(RequestParams) -> BoxFuture<'static, Result<RequestResponse, RequestError>> + Send + Sync;

/// Async request function supplied by the host.
#[derive(Clone)]
pub struct RequestFn(Arc<RequestFnInner>);

impl RequestFn {
    /// Wrap an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RequestResponse, RequestError>> + Send + 'static,
    {
        Self(Arc::new(move |params| Box::pin(f(params))))
    }

    /// Issue a request.
    pub fn call(&self, params: RequestParams) -> BoxFuture<'static, Result<RequestResponse, RequestError>> {
        (self.0)(params)
    }
}

impl fmt::Debug for RequestFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestFn(..)")
    }
}

/// HTTP method of a remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    #[default]
    Get,
    /// POST.
    Post,
}

type TransformFn = dyn Fn(Value) -> Result<RequestResponse, RequestError> + Send + Sync;

/// Declarative remote source: `{url, method, transform}`.
#[derive(Clone, Deserialize)]
pub struct RemoteSource {
    /// Endpoint URL.
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Maps the raw body to `{data, total}`. Without it the body must already
    /// have that shape.
    #[serde(skip)]
    pub transform: Option<Arc<TransformFn>>,
}

impl RemoteSource {
    /// GET source for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            transform: None,
        }
    }

    /// Set the response transform.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<RequestResponse, RequestError> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    fn decode(&self, body: Value) -> Result<RequestResponse, RequestError> {
        match &self.transform {
            Some(transform) => transform(body),
            None => serde_json::from_value(body).map_err(|e| RequestError::Transform(e.to_string())),
        }
    }
}

impl fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Generic fetch collaborator used to resolve [`RemoteSource`]s.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch `url` with `params` and return the raw JSON body.
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &RequestParams,
    ) -> Result<Value, RequestError>;
}

/// Where a table's rows come from.
#[derive(Clone)]
pub enum DataSource {
    /// In-memory rows, queried locally.
    Static(Vec<Record>),
    /// Host request function.
    Request(RequestFn),
    /// Declarative remote source resolved through `fetch`.
    Remote {
        /// The source description.
        source: RemoteSource,
        /// The fetch collaborator.
        fetch: Arc<dyn Fetch>,
    },
}

impl DataSource {
    /// Load one page.
    pub async fn fetch(&self, params: &RequestParams) -> Result<RequestResponse, RequestError> {
        match self {
            DataSource::Static(records) => Ok(local_query(records, params)),
            DataSource::Request(request) => request.call(params.clone()).await,
            DataSource::Remote { source, fetch } => {
                let body = fetch.fetch(source.method, &source.url, params).await?;
                source.decode(body)
            }
        }
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Static(records) => f.debug_tuple("Static").field(&records.len()).finish(),
            DataSource::Request(_) => f.write_str("Request(..)"),
            DataSource::Remote { source, .. } => f.debug_tuple("Remote").field(source).finish(),
        }
    }
}

/// Filter, search, sort and page `records` in memory.
///
/// Filters are matched by the field's [`FilterKind`]:
///
/// - `Select`: display text equals one of the accepted values.
/// - `Input`: display text contains one of the accepted values, ignoring case.
/// - `NumberRange`: `[min, max]`, inclusive, compared numerically.
/// - `DateRange`: `[start, end]`, inclusive, compared as ISO date text.
///
/// A `null` range bound is open. An empty accepted list matches everything.
/// The keyword matches any field case-insensitively.
pub fn local_query(records: &[Record], params: &RequestParams) -> RequestResponse {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<&Record> = records
        .iter()
        .filter(|record| matches_filters(record, &params.filters, &params.filter_kinds))
        .filter(|record| {
            keyword.as_deref().is_none_or(|k| {
                record
                    .values()
                    .any(|v| display_value(v).to_lowercase().contains(k))
            })
        })
        .collect();

    if !params.sorter.is_empty() {
        matched.sort_by(|a, b| compare_records(a, b, &params.sorter));
    }

    let total = matched.len();
    let page_size = params.page_size.max(1);
    let offset = (params.current.max(1) - 1).saturating_mul(page_size);
    let data = if params.page_size == 0 {
        matched.into_iter().cloned().collect()
    } else {
        matched.into_iter().skip(offset).take(page_size).cloned().collect()
    };

    RequestResponse::ok(data, total)
}

fn matches_filters(
    record: &Record,
    filters: &Filters,
    kinds: &BTreeMap<String, FilterKind>,
) -> bool {
    filters.iter().all(|(field, accepted)| {
        if accepted.is_empty() {
            return true;
        }
        let actual = record.get(field).unwrap_or(&Value::Null);
        match (kinds.get(field).copied().unwrap_or(FilterKind::Select), accepted.as_slice()) {
            (FilterKind::NumberRange, [min, max]) => in_number_range(actual, min, max),
            (FilterKind::DateRange, [start, end]) => in_date_range(actual, start, end),
            (FilterKind::Input, _) => {
                let text = display_value(actual).to_lowercase();
                accepted
                    .iter()
                    .any(|v| text.contains(&display_value(v).to_lowercase()))
            }
            _ => {
                let text = display_value(actual);
                accepted.iter().any(|v| display_value(v) == text)
            }
        }
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn in_number_range(actual: &Value, min: &Value, max: &Value) -> bool {
    let Some(x) = as_number(actual) else {
        return false;
    };
    as_number(min).is_none_or(|min| x >= min) && as_number(max).is_none_or(|max| x <= max)
}

/// ISO dates order lexically. An end bound without a time covers that whole day.
fn in_date_range(actual: &Value, start: &Value, end: &Value) -> bool {
    let Value::String(date) = actual else {
        return false;
    };
    let after_start = match start {
        Value::String(start) => date.as_str() >= start.as_str(),
        _ => true,
    };
    let before_end = match end {
        Value::String(end) => date.as_str() <= end.as_str() || date.starts_with(end.as_str()),
        _ => true,
    };
    after_start && before_end
}

fn compare_records(a: &Record, b: &Record, sorters: &[Sorter]) -> Ordering {
    for sorter in sorters {
        let Some(order) = sorter.order else { continue };
        let left = a.get(&sorter.field).unwrap_or(&Value::Null);
        let right = b.get(&sorter.field).unwrap_or(&Value::Null);
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match order {
                SortOrder::Ascend => compare_values(left, right),
                SortOrder::Descend => compare_values(left, right).reverse(),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Numbers numerically, booleans false-first, everything else by display text.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => display_value(a).cmp(&display_value(b)),
    }
}
