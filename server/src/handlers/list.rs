//! List handlers - refresh, search, filter and page through a session's lists.

use console_engine::{Error as EngineError, ListQueryEngine, ListStats, QueryState, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::ResourceSpec;
use crate::error::Result;
use crate::format::display_fields;
use crate::notify::{NoticeKind, Notifier};
use crate::session::Session;
use crate::upstream::{FetchHints, RecordSource};

/// One row of a list page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    /// The record as received from upstream
    pub record: Record,
    /// Formatted renderings of display columns
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub display: Map<String, Value>,
}

/// The current page of a list, with the query that produced it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub resource: String,
    pub rows: Vec<ListRow>,
    pub query: QueryState,
    pub stats: ListStats,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Request body for setting the search text.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub text: String,
}

/// Request body for selecting a filter value.
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub value: String,
}

/// Response for a filter change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    /// False when the filter key is not offered by the list
    pub applied: bool,
    #[serde(flatten)]
    pub page: ListPage,
}

/// Request body for page navigation.
#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: i64,
}

/// Request body for changing the page size.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSizeRequest {
    pub items_per_page: i64,
}

/// Render the current page of `engine`.
pub fn list_page(resource: &ResourceSpec, engine: &ListQueryEngine<Record>) -> ListPage {
    let view = engine.view();
    let rows = view
        .page_records
        .iter()
        .map(|&record| ListRow {
            record: record.clone(),
            display: display_fields(record, resource.display),
        })
        .collect();

    ListPage {
        resource: resource.name.to_string(),
        rows,
        query: engine.query_state(),
        stats: engine.stats(),
        total_pages: view.total_pages,
        has_previous: view.has_previous(),
        has_next: view.has_next(),
    }
}

fn with_engine<T, F>(session: &Session, resource: &ResourceSpec, f: F) -> Result<T>
where
    F: FnOnce(&mut ListQueryEngine<Record>) -> Result<T>,
{
    let list = session.list(resource)?;
    let mut engine = list.lock()?;
    f(&mut engine)
}

/// Current page without changing anything.
pub fn handle_view(session: &Session, resource: &ResourceSpec) -> Result<ListPage> {
    with_engine(session, resource, |engine| Ok(list_page(resource, engine)))
}

/// Replace the list's snapshot with a fresh fetch from upstream.
///
/// On failure the previous snapshot stays in place and the user is notified.
/// When refreshes overlap, a fetch that started earlier never replaces the
/// snapshot of one that started later; its caller gets the current page.
pub async fn handle_refresh<S: RecordSource>(
    source: &S,
    session: &Session,
    resource: &ResourceSpec,
    hints: &FetchHints,
    fallback_token: Option<&str>,
    notifier: &dyn Notifier,
) -> Result<ListPage> {
    let token = session
        .credentials()
        .get()
        .or_else(|| fallback_token.map(str::to_string));
    let list = session.list(resource)?;
    let ticket = list.begin_refresh();

    match source.fetch_records(resource, token.as_deref(), hints).await {
        Ok(records) => {
            let count = records.len();
            let (engine, loaded) = list.finish_refresh(ticket, records)?;
            if loaded {
                tracing::info!(resource = resource.name, count, "Snapshot replaced");
            } else {
                tracing::debug!(resource = resource.name, ticket, "Discarding superseded snapshot");
            }
            Ok(list_page(resource, &engine))
        }
        Err(e) => {
            tracing::warn!(resource = resource.name, error = %e, "Refresh failed, keeping previous snapshot");
            notifier.notify(
                NoticeKind::Error,
                &format!("Could not refresh {}: {}", resource.name, e),
            );
            Err(e.into())
        }
    }
}

/// Set the search text; returns to page 1.
pub fn handle_search(
    session: &Session,
    resource: &ResourceSpec,
    request: SearchRequest,
) -> Result<ListPage> {
    with_engine(session, resource, |engine| {
        engine.set_search_text(request.text);
        Ok(list_page(resource, engine))
    })
}

/// Select a filter value; returns to page 1 when the filter exists.
pub fn handle_filter(
    session: &Session,
    resource: &ResourceSpec,
    key: &str,
    request: FilterRequest,
) -> Result<FilterResponse> {
    with_engine(session, resource, |engine| {
        let applied = engine.set_filter_value(key, request.value);
        if !applied {
            tracing::debug!(resource = resource.name, key, "Ignoring unknown filter");
        }
        Ok(FilterResponse {
            applied,
            page: list_page(resource, engine),
        })
    })
}

/// Clear search and filters.
pub fn handle_reset(session: &Session, resource: &ResourceSpec) -> Result<ListPage> {
    with_engine(session, resource, |engine| {
        engine.reset_query();
        Ok(list_page(resource, engine))
    })
}

/// Navigate to a page, clamped into range.
pub fn handle_go_to_page(
    session: &Session,
    resource: &ResourceSpec,
    request: PageRequest,
) -> Result<ListPage> {
    with_engine(session, resource, |engine| {
        engine.go_to_page(request.page);
        Ok(list_page(resource, engine))
    })
}

/// Change the page size; non-positive sizes are rejected.
pub fn handle_page_size(
    session: &Session,
    resource: &ResourceSpec,
    request: PageSizeRequest,
) -> Result<ListPage> {
    let n = usize::try_from(request.items_per_page).map_err(|_| {
        EngineError::InvalidArgument(format!(
            "items per page must be positive, got {}",
            request.items_per_page
        ))
    })?;

    with_engine(session, resource, |engine| {
        engine.set_items_per_page(n)?;
        Ok(list_page(resource, engine))
    })
}

/// Counters of the list.
pub fn handle_stats(session: &Session, resource: &ResourceSpec) -> Result<ListStats> {
    with_engine(session, resource, |engine| Ok(engine.stats()))
}
