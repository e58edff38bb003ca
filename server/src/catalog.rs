//! The list resources served by the console.
//!
//! Each resource names its upstream endpoint and how its records are
//! searched, filtered, identified and displayed.

use console_engine::{record, ListConfig, Record};

/// How a filter value is matched against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMatch {
    /// Text of the field equals the selected value
    Equals(&'static str),
    /// Boolean field selected as `"active"` / `"inactive"`
    ActiveFlag(&'static str),
}

impl FilterMatch {
    /// Whether `record` matches `selected`.
    pub fn matches(&self, record: &Record, selected: &str) -> bool {
        match *self {
            FilterMatch::Equals(path) => {
                record::field_text(record, path).as_deref() == Some(selected)
            }
            FilterMatch::ActiveFlag(path) => {
                let active = record::field(record, path).and_then(|v| v.as_bool());
                match selected {
                    "active" => active == Some(true),
                    "inactive" => active == Some(false),
                    _ => false,
                }
            }
        }
    }
}

/// A filter offered by a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDef {
    pub key: &'static str,
    pub matcher: FilterMatch,
}

/// Display formatting applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    /// Epoch milliseconds or RFC 3339 string
    Timestamp,
    /// Whole seconds
    Duration,
    /// Status text mapped to a badge class
    Badge,
}

/// A column that gets a formatted rendering in list rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayColumn {
    pub path: &'static str,
    pub kind: DisplayKind,
}

/// A list resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Name used in routes (`/lists/{name}`)
    pub name: &'static str,
    /// Upstream path, appended to the base URL
    pub endpoint: &'static str,
    /// Path of the identity field
    pub key_path: &'static str,
    /// Searched fields, in order
    pub search_paths: &'static [&'static str],
    pub filters: &'static [FilterDef],
    pub display: &'static [DisplayColumn],
}

impl ResourceSpec {
    /// Build the engine configuration for this resource.
    pub fn list_config(&self, items_per_page: usize) -> ListConfig<Record> {
        let mut config = ListConfig::<Record>::new().items_per_page(items_per_page);

        for &path in self.search_paths {
            config = config.search_field(move |r| record::field_text(r, path));
        }
        for filter in self.filters {
            let matcher = filter.matcher;
            config = config.filter(filter.key, move |r, selected| matcher.matches(r, selected));
        }

        let key_path = self.key_path;
        config.key(move |r| record::key_of(r, key_path))
    }
}

/// The set of known resources.
#[derive(Debug, Clone)]
pub struct Catalog {
    resources: Vec<ResourceSpec>,
}

impl Catalog {
    /// Create a catalog from resource definitions.
    pub fn new(resources: Vec<ResourceSpec>) -> Self {
        Self { resources }
    }

    /// The lists of the Project Manager and Super Admin panels.
    pub fn builtin() -> Self {
        Self::new(vec![
            ResourceSpec {
                name: "reports",
                endpoint: "/api/reports/trips",
                key_path: "_id",
                search_paths: &["vehicleNumber", "vendor.name", "site.name"],
                filters: &[
                    FilterDef {
                        key: "siteId",
                        matcher: FilterMatch::Equals("site._id"),
                    },
                    FilterDef {
                        key: "status",
                        matcher: FilterMatch::Equals("status"),
                    },
                    FilterDef {
                        key: "vehicleType",
                        matcher: FilterMatch::Equals("vehicleType"),
                    },
                ],
                display: &[
                    DisplayColumn {
                        path: "entryTime",
                        kind: DisplayKind::Timestamp,
                    },
                    DisplayColumn {
                        path: "exitTime",
                        kind: DisplayKind::Timestamp,
                    },
                    DisplayColumn {
                        path: "durationSeconds",
                        kind: DisplayKind::Duration,
                    },
                    DisplayColumn {
                        path: "status",
                        kind: DisplayKind::Badge,
                    },
                ],
            },
            ResourceSpec {
                name: "supervisors",
                endpoint: "/api/supervisors",
                key_path: "_id",
                search_paths: &["name", "email", "phone"],
                filters: &[
                    FilterDef {
                        key: "siteId",
                        matcher: FilterMatch::Equals("site._id"),
                    },
                    FilterDef {
                        key: "status",
                        matcher: FilterMatch::ActiveFlag("isActive"),
                    },
                ],
                display: &[],
            },
            ResourceSpec {
                name: "audit-logs",
                endpoint: "/api/audit-logs",
                key_path: "_id",
                search_paths: &["action", "user.name", "description"],
                filters: &[
                    FilterDef {
                        key: "action",
                        matcher: FilterMatch::Equals("action"),
                    },
                    FilterDef {
                        key: "module",
                        matcher: FilterMatch::Equals("module"),
                    },
                ],
                display: &[DisplayColumn {
                    path: "createdAt",
                    kind: DisplayKind::Timestamp,
                }],
            },
            ResourceSpec {
                name: "vendors",
                endpoint: "/api/vendors",
                key_path: "_id",
                search_paths: &["name", "email", "contactPerson"],
                filters: &[FilterDef {
                    key: "status",
                    matcher: FilterMatch::ActiveFlag("isActive"),
                }],
                display: &[],
            },
        ])
    }

    /// Look up a resource by route name.
    pub fn get(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Route names of all resources.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.iter().map(|r| r.name)
    }
}
