//! # Console Engine
//!
//! Client-side list querying for the access console.
//!
//! The list screens of the console (trip reports, supervisors, audit logs,
//! vendors) all work the same way: fetch the full record set once, then let
//! the user search, filter and page through it locally. This crate is that
//! behavior as a reusable component.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never fetches; callers hand it snapshots
//! - **Deterministic**: the same snapshot and query always give the same view
//! - **Never breaks a render**: out-of-range pages clamp, unknown filters are
//!   ignored, empty snapshots give an empty view
//!
//! ## Core Concepts
//!
//! ### Snapshot
//!
//! The full set of records last fetched from the backend. It is replaced
//! wholesale by [`ListQueryEngine::set_records`], or patched locally with
//! [`ListQueryEngine::upsert_record`] / [`ListQueryEngine::remove_record`]
//! after a successful remote mutation.
//!
//! ### Query
//!
//! - Search text, matched case-insensitively as a substring against each
//!   configured search field
//! - Filters, one predicate per key, disabled by the [`ALL`] sentinel
//! - Page position and page size ([`PageState`])
//!
//! A record is shown when it passes every active filter and the search.
//! Changing the search, a filter or the page size returns to page 1.
//!
//! ### Derived View
//!
//! [`DerivedView`] holds the matching records in snapshot order plus the
//! current page window. [`ListStats`] holds the counters.
//!
//! ## Quick Start
//!
//! ```rust
//! use console_engine::{record, ListConfig, ListQueryEngine, Record};
//! use serde_json::json;
//!
//! // 1. Configure search fields and filters
//! let config = ListConfig::<Record>::new()
//!     .search_field(|r| record::field_text(r, "vehicleNumber"))
//!     .search_field(|r| record::field_text(r, "vendor.name"))
//!     .filter("siteId", |r, site| {
//!         record::field_text(r, "site._id").as_deref() == Some(site)
//!     })
//!     .items_per_page(10);
//!
//! let mut engine = ListQueryEngine::new(config).unwrap();
//!
//! // 2. Load a snapshot
//! let body = json!({"data": [
//!     {"_id": "t1", "vehicleNumber": "Vehicle ABC123", "site": {"_id": "S1"}},
//!     {"_id": "t2", "vehicleNumber": "XYZ-9", "site": {"_id": "S2"}},
//! ]});
//! engine.set_records(console_engine::unwrap_records(body).unwrap());
//!
//! // 3. Query
//! engine.set_search_text("abc");
//! let view = engine.view();
//! assert_eq!(view.filtered_records.len(), 1);
//! assert_eq!(view.total_pages, 1);
//! ```

pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod record;

// Re-export main types at crate root
pub use config::{
    FilterPredicate, KeyExtractor, ListConfig, SearchField, ALL, DEFAULT_ITEMS_PER_PAGE,
};
pub use engine::{DerivedView, ListQueryEngine, ListStats, PageState, QueryState};
pub use envelope::{unwrap_records, unwrap_with_envelope, Envelope};
pub use error::Error;
pub use record::Record;

/// Identity of a record, as produced by a key extractor.
pub type RecordKey = String;
