//! List configuration: search accessors, filter predicates and page size.

use crate::{error::Result, Error, RecordKey};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved filter value that disables a filter predicate.
pub const ALL: &str = "all";

/// Default number of records per page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Reads one searchable text field from a record.
pub type SearchField<R> = Box<dyn Fn(&R) -> Option<String> + Send + Sync>;

/// Tests a record against the selected value of a filter.
pub type FilterPredicate<R> = Box<dyn Fn(&R, &str) -> bool + Send + Sync>;

/// Extracts the identity of a record.
pub type KeyExtractor<R> = Box<dyn Fn(&R) -> RecordKey + Send + Sync>;

/// Configuration for a [`ListQueryEngine`](crate::ListQueryEngine).
///
/// ```rust
/// use console_engine::ListConfig;
///
/// struct Trip { vehicle: String, site: String }
///
/// let config = ListConfig::<Trip>::new()
///     .search_field(|t| Some(t.vehicle.clone()))
///     .filter("siteId", |t, site| t.site == site)
///     .items_per_page(25)
///     .build()
///     .unwrap();
/// assert_eq!(config.default_items_per_page(), 25);
/// ```
pub struct ListConfig<R> {
    pub(crate) search_fields: Vec<SearchField<R>>,
    pub(crate) filters: BTreeMap<String, FilterPredicate<R>>,
    pub(crate) default_items_per_page: usize,
    pub(crate) key: Option<KeyExtractor<R>>,
}

impl<R> ListConfig<R> {
    /// Create an empty configuration with the default page size.
    pub fn new() -> Self {
        Self {
            search_fields: Vec::new(),
            filters: BTreeMap::new(),
            default_items_per_page: DEFAULT_ITEMS_PER_PAGE,
            key: None,
        }
    }

    /// Append a search accessor. Accessors are tried in registration order.
    pub fn search_field<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&R) -> Option<String> + Send + Sync + 'static,
    {
        self.search_fields.push(Box::new(accessor));
        self
    }

    /// Register a filter predicate under `key`.
    ///
    /// Registering the same key twice replaces the earlier predicate.
    pub fn filter<F>(mut self, key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&R, &str) -> bool + Send + Sync + 'static,
    {
        self.filters.insert(key.into(), Box::new(predicate));
        self
    }

    /// Set the page size used until the caller changes it.
    pub fn items_per_page(mut self, n: usize) -> Self {
        self.default_items_per_page = n;
        self
    }

    /// Set the identity extractor used by local splices.
    pub fn key<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&R) -> RecordKey + Send + Sync + 'static,
    {
        self.key = Some(Box::new(extractor));
        self
    }

    /// Validate the configuration.
    pub fn build(self) -> Result<Self> {
        if self.default_items_per_page == 0 {
            return Err(Error::InvalidArgument(
                "default items per page must be positive, got 0".into(),
            ));
        }
        Ok(self)
    }

    /// The configured default page size.
    pub fn default_items_per_page(&self) -> usize {
        self.default_items_per_page
    }

    /// Registered filter keys, in sorted order.
    pub fn filter_keys(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Number of search accessors.
    pub fn search_field_count(&self) -> usize {
        self.search_fields.len()
    }

    pub(crate) fn has_filter(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }
}

impl<R> Default for ListConfig<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for ListConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListConfig")
            .field("search_fields", &self.search_fields.len())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("default_items_per_page", &self.default_items_per_page)
            .field("key", &self.key.is_some())
            .finish()
    }
}
