//! User-facing notices.
//!
//! Handlers report outcomes through a [`Notifier`] instead of writing to a
//! global toast area. In production notices go to the session's WebSocket
//! connections; tests use [`TracingNotifier`] or a recording notifier.

use serde::{Deserialize, Serialize};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Delivers notices to a user.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Writes notices to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Error => tracing::error!(kind = ?kind, "{}", message),
            NoticeKind::Warning => tracing::warn!(kind = ?kind, "{}", message),
            NoticeKind::Success | NoticeKind::Info => tracing::info!(kind = ?kind, "{}", message),
        }
    }
}
