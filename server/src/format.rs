//! Display formatting for list rows.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::catalog::{DisplayColumn, DisplayKind};
use console_engine::record;

/// Render whole seconds as `"2h 05m"`, `"4m 10s"` or `"45s"`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Parse epoch milliseconds or an RFC 3339 string.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

/// Render a timestamp as `"18 Oct 2026, 14:05"` (UTC).
pub fn format_timestamp(value: &Value) -> Option<String> {
    parse_timestamp(value).map(|dt| dt.format("%d %b %Y, %H:%M").to_string())
}

/// Badge class for a status value.
pub fn badge_class(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "active" | "exited" | "completed" | "approved" | "online" => "badge-success",
        "inside" | "pending" | "in_progress" => "badge-warning",
        "inactive" | "failed" | "rejected" | "offline" | "blocked" => "badge-danger",
        _ => "badge-secondary",
    }
}

/// Formatted renderings of the display columns present in `row`.
pub fn display_fields(row: &Value, columns: &[DisplayColumn]) -> Map<String, Value> {
    let mut display = Map::new();

    for column in columns {
        let Some(value) = record::field(row, column.path) else {
            continue;
        };
        let rendered = match column.kind {
            DisplayKind::Timestamp => format_timestamp(value),
            DisplayKind::Duration => value.as_i64().map(format_duration),
            DisplayKind::Badge => value.as_str().map(|s| badge_class(s).to_string()),
        };
        if let Some(text) = rendered {
            display.insert(column.path.to_string(), Value::String(text));
        }
    }

    display
}
