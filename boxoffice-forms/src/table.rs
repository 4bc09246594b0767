//! Paginated table query state.
//!
//! [`TableState`] holds the search, filter, sort and page selection for a
//! listing, shapes them into query parameters and keeps the last page of rows
//! fetched from a [`TableSource`].

use std::fmt;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FormsError, Result};
use crate::value::{Record, Value};

const FETCH_FAILED: &str = "Failed to fetch data";

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// `Asc` only for exactly `"asc"`; anything else sorts descending.
    pub fn parse(raw: &str) -> Self {
        if raw == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination metadata of a listing response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub pages: u32,
    pub count: u64,
}

impl PageMeta {
    /// Metadata for `page` of `total` rows split into pages of `limit`.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            page,
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
            count: total,
        }
    }
}

/// A listing response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResponse<T> {
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> TableResponse<T> {
    pub fn ok(data: Vec<T>, meta: PageMeta) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
            error: None,
        }
    }

    pub fn failure(error: Option<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            meta: None,
            error,
        }
    }
}

/// Where a table gets its rows from.
#[async_trait]
pub trait TableSource: Send + Sync {
    type Row: Send;

    async fn fetch(&self, query: &Record) -> anyhow::Result<TableResponse<Self::Row>>;
}

/// Initial query state for a [`TableState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub default_sort_by: String,
    pub default_sort_order: SortOrder,
    pub default_per_page: u32,
    pub max_per_page: u32,
    /// Fetch after every setter
    pub auto_fetch: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            default_sort_by: "createdAt".to_string(),
            default_sort_order: SortOrder::Desc,
            default_per_page: 10,
            max_per_page: 100,
            auto_fetch: true,
        }
    }
}

/// Query and result state of one paginated table.
pub struct TableState<S: TableSource> {
    source: S,
    options: TableOptions,
    search: String,
    filters: IndexMap<String, Value>,
    sort_by: String,
    sort_order: SortOrder,
    page: u32,
    per_page: u32,
    data: Vec<S::Row>,
    loading: bool,
    error: Option<String>,
    pagination: Option<PageMeta>,
}

impl<S: TableSource> TableState<S> {
    pub fn new(source: S, options: TableOptions) -> Self {
        Self {
            source,
            search: String::new(),
            filters: IndexMap::new(),
            sort_by: options.default_sort_by.clone(),
            sort_order: options.default_sort_order,
            page: 1,
            per_page: options.default_per_page.clamp(1, options.max_per_page.max(1)),
            data: Vec::new(),
            loading: false,
            error: None,
            pagination: None,
            options,
        }
    }

    /// Initial fetch when `auto_fetch` is on.
    pub async fn init(&mut self) -> Result<()> {
        self.fetch_if_auto().await
    }

    // --- query state ---

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &IndexMap<String, Value> {
        &self.filters
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    // --- result state ---

    pub fn data(&self) -> &[S::Row] {
        &self.data
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pagination(&self) -> Option<&PageMeta> {
        self.pagination.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // --- derived ---

    /// Page, limit and sort, plus the search term and every non-empty filter.
    pub fn query_params(&self) -> Record {
        let mut params = Record::new();
        params.insert("page".into(), Value::from(self.page));
        params.insert("limit".into(), Value::from(self.per_page));
        params.insert("sortBy".into(), Value::from(self.sort_by.as_str()));
        params.insert("sortOrder".into(), Value::from(self.sort_order.as_str()));
        if !self.search.is_empty() {
            params.insert("search".into(), Value::from(self.search.as_str()));
        }
        for (key, value) in &self.filters {
            if is_set(value) {
                params.insert(key.clone(), value.clone());
            }
        }
        params
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        self.filters.values().any(is_set)
    }

    /// Page count of the last successful fetch, 0 before one.
    pub fn total_pages(&self) -> u32 {
        self.pagination.map_or(0, |meta| meta.pages)
    }

    // --- operations ---

    /// Fetch the current page.
    ///
    /// A failure empties the rows and pagination, records the message and
    /// is returned as [`FormsError::Fetch`].
    pub async fn fetch(&mut self) -> Result<()> {
        self.loading = true;
        self.error = None;

        let query = self.query_params();
        let outcome = match self.source.fetch(&query).await {
            Ok(response) if response.success => {
                debug!(
                    rows = response.data.len(),
                    page = self.page,
                    "table page fetched"
                );
                self.data = response.data;
                self.pagination = response.meta;
                Ok(())
            }
            Ok(response) => Err(response.error.unwrap_or_else(|| FETCH_FAILED.to_string())),
            Err(err) => {
                let message = err.to_string();
                Err(if message.is_empty() {
                    FETCH_FAILED.to_string()
                } else {
                    message
                })
            }
        };
        self.loading = false;

        outcome.map_err(|message| {
            warn!(error = %message, "table fetch failed");
            self.data.clear();
            self.pagination = None;
            self.error = Some(message.clone());
            FormsError::Fetch { message }
        })
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.fetch().await
    }

    pub async fn set_search(&mut self, query: impl Into<String>) -> Result<()> {
        self.search = query.into();
        self.page = 1;
        self.fetch_if_auto().await
    }

    /// Replace all filters.
    pub async fn set_filters<I, K, V>(&mut self, filters: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.filters = filters
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self.page = 1;
        self.fetch_if_auto().await
    }

    pub async fn clear_filters(&mut self) -> Result<()> {
        self.filters.clear();
        self.page = 1;
        self.fetch_if_auto().await
    }

    /// Sort by `field`. Without an explicit order, sorting by the current
    /// field again flips the direction and a new field sorts ascending.
    pub async fn set_sort(&mut self, field: &str, order: Option<SortOrder>) -> Result<()> {
        match order {
            None if self.sort_by == field => self.sort_order = self.sort_order.toggled(),
            _ => {
                self.sort_by = field.to_string();
                self.sort_order = order.unwrap_or(SortOrder::Asc);
            }
        }
        self.page = 1;
        self.fetch_if_auto().await
    }

    /// Go to `page`. Pages outside `1..=total_pages()` are ignored.
    pub async fn set_page(&mut self, page: u32) -> Result<()> {
        if page < 1 || page > self.total_pages() {
            debug!(page, total = self.total_pages(), "ignoring out-of-range page");
            return Ok(());
        }
        self.page = page;
        self.fetch_if_auto().await
    }

    pub async fn set_per_page(&mut self, limit: u32) -> Result<()> {
        self.per_page = limit.clamp(1, self.options.max_per_page.max(1));
        self.page = 1;
        self.fetch_if_auto().await
    }

    async fn fetch_if_auto(&mut self) -> Result<()> {
        if self.options.auto_fetch {
            self.fetch().await
        } else {
            Ok(())
        }
    }
}

fn is_set(value: &Value) -> bool {
    !matches!(value, Value::Null) && value.as_str() != Some("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSource {
        queries: Arc<Mutex<Vec<Record>>>,
        pages: u32,
    }

    #[async_trait]
    impl TableSource for RecordingSource {
        type Row = String;

        async fn fetch(&self, query: &Record) -> anyhow::Result<TableResponse<String>> {
            self.queries.lock().unwrap().push(query.clone());
            let page = query.get("page").and_then(Value::as_f64).unwrap_or(1.0) as u32;
            Ok(TableResponse::ok(
                vec![format!("row-{page}")],
                PageMeta {
                    page,
                    pages: self.pages,
                    count: u64::from(self.pages) * 10,
                },
            ))
        }
    }

    fn manual() -> TableOptions {
        TableOptions {
            auto_fetch: false,
            ..TableOptions::default()
        }
    }

    #[test]
    fn sort_order_parse_is_strict() {
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse(""), SortOrder::Desc);
    }

    #[test]
    fn page_meta_rounds_up() {
        assert_eq!(PageMeta::new(1, 10, 21).pages, 3);
        assert_eq!(PageMeta::new(1, 10, 20).pages, 2);
        assert_eq!(PageMeta::new(1, 10, 0).pages, 0);
    }

    #[test]
    fn query_params_skip_empty_filters() {
        let mut table = TableState::new(RecordingSource::default(), manual());
        table.filters.insert("role".into(), Value::from("ADMIN"));
        table.filters.insert("membership".into(), Value::from(""));
        table.filters.insert("active".into(), Value::Null);

        let params = table.query_params();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            ["page", "limit", "sortBy", "sortOrder", "role"]
        );
        assert_eq!(params["sortOrder"], Value::from("desc"));
        assert!(table.has_filters());
    }

    #[tokio::test]
    async fn set_sort_toggles_same_field() {
        let mut table = TableState::new(RecordingSource::default(), manual());
        table.set_sort("createdAt", None).await.unwrap();
        assert_eq!(table.sort_order(), SortOrder::Asc);
        table.set_sort("createdAt", None).await.unwrap();
        assert_eq!(table.sort_order(), SortOrder::Desc);

        table.set_sort("name", None).await.unwrap();
        assert_eq!(table.sort_by(), "name");
        assert_eq!(table.sort_order(), SortOrder::Asc);

        table.set_sort("name", Some(SortOrder::Desc)).await.unwrap();
        assert_eq!(table.sort_order(), SortOrder::Desc);
    }

    #[tokio::test]
    async fn set_page_respects_bounds() {
        let source = RecordingSource {
            pages: 3,
            ..RecordingSource::default()
        };
        let mut table = TableState::new(source, TableOptions::default());
        table.set_page(2).await.unwrap();
        assert_eq!(table.page(), 1, "no pages known before the first fetch");

        table.init().await.unwrap();
        table.set_page(3).await.unwrap();
        assert_eq!(table.page(), 3);
        assert_eq!(table.data(), ["row-3"]);

        table.set_page(4).await.unwrap();
        table.set_page(0).await.unwrap();
        assert_eq!(table.page(), 3);
    }

    #[tokio::test]
    async fn setters_reset_page_and_fetch() {
        let source = RecordingSource {
            pages: 5,
            ..RecordingSource::default()
        };
        let queries = source.queries.clone();
        let mut table = TableState::new(source, TableOptions::default());
        table.init().await.unwrap();
        table.set_page(4).await.unwrap();
        table.set_search("hamlet").await.unwrap();

        assert_eq!(table.page(), 1);
        let last = queries.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last["search"], Value::from("hamlet"));
        assert_eq!(last["page"], Value::from(1));
        assert_eq!(queries.lock().unwrap().len(), 3);
    }

    struct FailingSource {
        message: Option<String>,
    }

    #[async_trait]
    impl TableSource for FailingSource {
        type Row = String;

        async fn fetch(&self, _query: &Record) -> anyhow::Result<TableResponse<String>> {
            Ok(TableResponse::failure(self.message.clone()))
        }
    }

    #[tokio::test]
    async fn failed_fetch_clears_rows() {
        let mut table = TableState::new(FailingSource { message: None }, manual());
        table.data.push("stale".into());
        table.pagination = Some(PageMeta::new(1, 10, 1));

        let err = table.fetch().await.unwrap_err();
        assert!(matches!(err, FormsError::Fetch { ref message } if message == FETCH_FAILED));
        assert!(!table.has_data());
        assert!(table.pagination().is_none());
        assert!(!table.is_loading());
        assert_eq!(table.error(), Some(FETCH_FAILED));

        let mut table = TableState::new(
            FailingSource {
                message: Some("Not authorised".into()),
            },
            manual(),
        );
        assert!(table.refresh().await.is_err());
        assert_eq!(table.error(), Some("Not authorised"));
    }

    #[tokio::test]
    async fn per_page_is_clamped() {
        let mut table = TableState::new(RecordingSource::default(), manual());
        table.set_per_page(500).await.unwrap();
        assert_eq!(table.per_page(), 100);
        table.set_per_page(0).await.unwrap();
        assert_eq!(table.per_page(), 1);
    }
}
