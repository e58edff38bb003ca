//! ListQueryEngine - the search, filter and pagination state container.
//!
//! The engine owns a snapshot of records and the query parameters of one list
//! screen. Every mutating call recomputes the derived view before returning,
//! so reads are always consistent with the latest inputs.

use crate::config::{ListConfig, ALL};
use crate::{error::Result, Error, RecordKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pagination position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// 1-based page number, always within `[1, total_pages]`
    pub current_page: usize,
    /// Records per page, always positive
    pub items_per_page: usize,
}

/// The query parameters currently applied, for echoing back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub search_text: String,
    /// Selected value per registered filter; `"all"` when inactive
    pub filters: BTreeMap<String, String>,
    pub page: PageState,
}

/// Counters for "Showing X-Y of Z" style labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStats {
    /// Size of the snapshot
    pub total_records: usize,
    /// Records passing search and filters
    pub total_filtered: usize,
    /// Records on the current page
    pub current_page_size: usize,
    /// 1-based position of the first record on the page, 0 when empty
    pub range_start: usize,
    /// 1-based position of the last record on the page, 0 when empty
    pub range_end: usize,
}

/// The search + filter + paginate projection of the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView<'a, R> {
    /// Matching records in snapshot order
    pub filtered_records: Vec<&'a R>,
    /// The slice of `filtered_records` on the current page
    pub page_records: Vec<&'a R>,
    pub current_page: usize,
    /// At least 1, even when nothing matches
    pub total_pages: usize,
    pub items_per_page: usize,
}

impl<R> DerivedView<'_, R> {
    /// Whether a previous page exists.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Client-side list query engine.
///
/// Single-threaded and synchronous. Callers sharing an engine across threads
/// must serialize access, since operations update several fields at once.
pub struct ListQueryEngine<R> {
    config: ListConfig<R>,
    records: Vec<R>,
    search_text: String,
    filter_values: BTreeMap<String, String>,
    page: PageState,
    /// Indices into `records` of the matching rows, ascending
    matched: Vec<usize>,
}

impl<R> ListQueryEngine<R> {
    /// Create an engine with an empty snapshot.
    pub fn new(config: ListConfig<R>) -> Result<Self> {
        let config = config.build()?;
        let filter_values = config
            .filter_keys()
            .map(|key| (key.to_string(), ALL.to_string()))
            .collect();
        let items_per_page = config.default_items_per_page();

        Ok(Self {
            config,
            records: Vec::new(),
            search_text: String::new(),
            filter_values,
            page: PageState {
                current_page: 1,
                items_per_page,
            },
            matched: Vec::new(),
        })
    }

    /// Replace the snapshot. Keeps the current page if it is still valid.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.recompute();
    }

    /// Set the free-text search and return to page 1.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.page.current_page = 1;
        self.recompute();
    }

    /// Select a value for a registered filter and return to page 1.
    ///
    /// Unknown keys are ignored; the return value tells whether the filter
    /// was applied.
    pub fn set_filter_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        if !self.config.has_filter(key) {
            return false;
        }
        self.filter_values.insert(key.to_string(), value.into());
        self.page.current_page = 1;
        self.recompute();
        true
    }

    /// Change the page size and return to page 1.
    ///
    /// Fails with [`Error::InvalidArgument`] for zero, leaving state untouched.
    pub fn set_items_per_page(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "items per page must be positive, got 0".into(),
            ));
        }
        self.page.items_per_page = n;
        self.page.current_page = 1;
        self.recompute();
        Ok(())
    }

    /// Navigate to page `n`, clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, n: i64) {
        let total = self.total_pages() as i64;
        self.page.current_page = n.clamp(1, total) as usize;
    }

    /// Clear the search text and every filter, and return to page 1.
    pub fn reset_query(&mut self) {
        self.search_text.clear();
        for value in self.filter_values.values_mut() {
            *value = ALL.to_string();
        }
        self.page.current_page = 1;
        self.recompute();
    }

    /// Replace the record with the same key in place, or append it.
    ///
    /// Used after a successful remote mutation when the caller does not want
    /// a full refetch.
    pub fn upsert_record(&mut self, record: R) -> Result<()> {
        let key = self.key_extractor()?(&record);
        match self.position_of(&key)? {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
        self.recompute();
        Ok(())
    }

    /// Remove the record with `key`. Returns whether one was removed.
    pub fn remove_record(&mut self, key: &str) -> Result<bool> {
        let removed = match self.position_of(key)? {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        };
        if removed {
            self.recompute();
        }
        Ok(removed)
    }

    /// The derived view for the current inputs.
    pub fn view(&self) -> DerivedView<'_, R> {
        let filtered_records = self.matched.iter().map(|&i| &self.records[i]).collect();
        let page_records = self.page_indices().iter().map(|&i| &self.records[i]).collect();

        DerivedView {
            filtered_records,
            page_records,
            current_page: self.page.current_page,
            total_pages: self.total_pages(),
            items_per_page: self.page.items_per_page,
        }
    }

    /// Counters for the current inputs.
    pub fn stats(&self) -> ListStats {
        let current_page_size = self.page_indices().len();
        let (range_start, range_end) = if current_page_size == 0 {
            (0, 0)
        } else {
            let start = self.page_offset() + 1;
            (start, start + current_page_size - 1)
        };

        ListStats {
            total_records: self.records.len(),
            total_filtered: self.matched.len(),
            current_page_size,
            range_start,
            range_end,
        }
    }

    /// The query parameters currently applied.
    pub fn query_state(&self) -> QueryState {
        QueryState {
            search_text: self.search_text.clone(),
            filters: self.filter_values.clone(),
            page: self.page,
        }
    }

    /// The full snapshot, in source order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// The current search text.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// The selected value of a registered filter.
    pub fn filter_value(&self, key: &str) -> Option<&str> {
        self.filter_values.get(key).map(String::as_str)
    }

    /// The current pagination position.
    pub fn page_state(&self) -> PageState {
        self.page
    }

    /// `max(1, ceil(filtered / items_per_page))`.
    pub fn total_pages(&self) -> usize {
        self.matched.len().div_ceil(self.page.items_per_page).max(1)
    }

    /// The engine configuration.
    pub fn config(&self) -> &ListConfig<R> {
        &self.config
    }

    fn recompute(&mut self) {
        // Whitespace-only text is no search; anything else matches as typed.
        let needle = if self.search_text.trim().is_empty() {
            String::new()
        } else {
            self.search_text.to_lowercase()
        };
        let config = &self.config;
        let filter_values = &self.filter_values;

        self.matched = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                passes_filters(config, filter_values, *record)
                    && passes_search(config, &needle, *record)
            })
            .map(|(i, _)| i)
            .collect();

        let total = self.total_pages();
        self.page.current_page = self.page.current_page.clamp(1, total);
    }

    fn page_offset(&self) -> usize {
        (self.page.current_page - 1) * self.page.items_per_page
    }

    fn page_indices(&self) -> &[usize] {
        let start = self.page_offset().min(self.matched.len());
        let end = (start + self.page.items_per_page).min(self.matched.len());
        &self.matched[start..end]
    }

    fn key_extractor(&self) -> Result<&(dyn Fn(&R) -> RecordKey + Send + Sync)> {
        self.config
            .key
            .as_deref()
            .ok_or(Error::MissingKeyExtractor)
    }

    fn position_of(&self, key: &str) -> Result<Option<usize>> {
        let extract = self.key_extractor()?;
        Ok(self.records.iter().position(|r| extract(r) == key))
    }
}

fn passes_filters<R>(
    config: &ListConfig<R>,
    values: &BTreeMap<String, String>,
    record: &R,
) -> bool {
    config.filters.iter().all(|(key, predicate)| {
        match values.get(key).map(String::as_str) {
            None | Some(ALL) | Some("") => true,
            Some(selected) => predicate(record, selected),
        }
    })
}

fn passes_search<R>(config: &ListConfig<R>, needle: &str, record: &R) -> bool {
    if needle.is_empty() {
        return true;
    }
    config.search_fields.iter().any(|accessor| {
        accessor(record)
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

impl<R> fmt::Debug for ListQueryEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListQueryEngine")
            .field("config", &self.config)
            .field("records", &self.records.len())
            .field("search_text", &self.search_text)
            .field("filter_values", &self.filter_values)
            .field("page", &self.page)
            .field("matched", &self.matched.len())
            .finish()
    }
}
