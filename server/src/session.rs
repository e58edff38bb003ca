//! Console sessions and their list state.
//!
//! Every session owns its credentials and one engine per list resource it has
//! opened. Engines sit behind a mutex: each request locks, mutates and
//! releases without awaiting in between. Sessions nobody has used for a while
//! are swept away.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use console_engine::{ListQueryEngine, Record};
use dashmap::DashMap;

use crate::auth::{CredentialStore, MemoryCredentialStore};
use crate::catalog::ResourceSpec;
use crate::error::{AppError, Result};

/// One open list: its engine and the ordering of its refreshes.
#[derive(Debug)]
pub struct ListSlot {
    engine: Mutex<ListQueryEngine<Record>>,
    /// Last refresh ticket handed out
    issued: AtomicU64,
    /// Ticket of the loaded snapshot; written only under the engine lock
    applied: AtomicU64,
}

/// List shared between the requests of one session.
pub type SharedList = Arc<ListSlot>;

impl ListSlot {
    fn new(engine: ListQueryEngine<Record>) -> Self {
        Self {
            engine: Mutex::new(engine),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Lock the engine for one request.
    pub fn lock(&self) -> Result<MutexGuard<'_, ListQueryEngine<Record>>> {
        self.engine
            .lock()
            .map_err(|_| AppError::Internal("list state lock poisoned".to_string()))
    }

    /// Take a ticket before fetching a snapshot.
    pub fn begin_refresh(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Load `records` fetched under `ticket`, unless a refresh that started
    /// later has already been loaded.
    ///
    /// Returns the locked engine and whether the records were loaded.
    pub fn finish_refresh(
        &self,
        ticket: u64,
        records: Vec<Record>,
    ) -> Result<(MutexGuard<'_, ListQueryEngine<Record>>, bool)> {
        let mut engine = self.lock()?;
        if ticket <= self.applied.load(Ordering::SeqCst) {
            return Ok((engine, false));
        }
        self.applied.store(ticket, Ordering::SeqCst);
        engine.set_records(records);
        Ok((engine, true))
    }
}

/// Identifies a console session.
///
/// Derived from the bearer token; `Display` never prints the full token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    const ANONYMOUS: &'static str = "anonymous";

    /// The session used when no bearer token is presented.
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }

    /// The session belonging to `token`.
    pub fn from_token(token: &str) -> Self {
        Self(format!("token:{}", token))
    }

    /// Whether this is the anonymous session.
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }

    /// A short, non-secret label for logs.
    pub fn fingerprint(&self) -> String {
        match self.0.strip_prefix("token:") {
            Some(token) => {
                let prefix: String = token.chars().take(6).collect();
                format!("{}...", prefix)
            }
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.fingerprint())
    }
}

/// One console session.
#[derive(Debug)]
pub struct Session {
    credentials: MemoryCredentialStore,
    lists: DashMap<&'static str, SharedList>,
    default_page_size: usize,
    last_seen: Mutex<Instant>,
}

impl Session {
    fn new(default_page_size: usize) -> Self {
        Self {
            credentials: MemoryCredentialStore::new(),
            lists: DashMap::new(),
            default_page_size,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    /// Time since the session was last used, as of `now`.
    pub fn idle_for(&self, now: Instant) -> Duration {
        let last_seen = *self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        now.saturating_duration_since(last_seen)
    }

    /// The session's bearer token store.
    pub fn credentials(&self) -> &dyn CredentialStore {
        &self.credentials
    }

    /// The engine for `resource`, created empty on first use.
    pub fn list(&self, resource: &ResourceSpec) -> Result<SharedList> {
        if let Some(list) = self.lists.get(resource.name) {
            return Ok(list.value().clone());
        }

        let engine = ListQueryEngine::new(resource.list_config(self.default_page_size))?;
        let entry = self
            .lists
            .entry(resource.name)
            .or_insert_with(|| Arc::new(ListSlot::new(engine)));
        Ok(entry.value().clone())
    }

    /// Number of lists opened in this session.
    pub fn open_lists(&self) -> usize {
        self.lists.len()
    }
}

/// All live sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    default_page_size: usize,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new(default_page_size: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            default_page_size,
        }
    }

    /// Create a registry wrapped in Arc for sharing.
    pub fn new_shared(default_page_size: usize) -> Arc<Self> {
        Arc::new(Self::new(default_page_size))
    }

    /// The session for `id`, created on first use. Marks it as used.
    pub fn session(&self, id: &SessionId) -> Arc<Session> {
        if let Some(session) = self.sessions.get(id) {
            session.touch();
            return session.value().clone();
        }

        let entry = self.sessions.entry(id.clone()).or_insert_with(|| {
            tracing::info!(session = %id, "Session opened");
            Arc::new(Session::new(self.default_page_size))
        });
        entry.touch();
        entry.value().clone()
    }

    /// End a session: forget its credentials and list state.
    ///
    /// Returns whether the session existed.
    pub fn end(&self, id: &SessionId) -> bool {
        match self.sessions.remove(id) {
            Some((id, session)) => {
                close(&id, &session, "Session ended");
                true
            }
            None => false,
        }
    }

    /// End every session unused for at least `idle`.
    ///
    /// Returns the number of sessions ended.
    pub fn end_idle(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let candidates: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().idle_for(now) >= idle)
            .map(|entry| entry.key().clone())
            .collect();

        candidates
            .iter()
            .filter(|id| {
                // Re-checked under the shard lock; the session may have been used since.
                let removed = self
                    .sessions
                    .remove_if(*id, |_, session| session.idle_for(Instant::now()) >= idle);
                match removed {
                    Some((id, session)) => {
                        close(&id, &session, "Idle session expired");
                        true
                    }
                    None => false,
                }
            })
            .count()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn close(id: &SessionId, session: &Session, reason: &str) {
    session.credentials().clear();
    tracing::info!(
        session = %id,
        anonymous = id.is_anonymous(),
        lists = session.open_lists(),
        "{}",
        reason
    );
}

/// Periodically end sessions unused for `idle`.
pub fn spawn_idle_sweep(
    registry: Arc<SessionRegistry>,
    idle: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = (idle / 4).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let ended = registry.end_idle(idle);
            if ended > 0 {
                tracing::debug!(
                    ended,
                    remaining = registry.session_count(),
                    "Swept idle sessions"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn session_ids() {
        let id = SessionId::from_token("eyJhbGciOiJIUzI1NiJ9.secret");
        assert_eq!(id.to_string(), "eyJhbG...");
        assert!(!format!("{:?}", id).contains("secret"));
        assert!(!id.is_anonymous());

        let anon = SessionId::anonymous();
        assert!(anon.is_anonymous());
        assert_eq!(anon.to_string(), "anonymous");
        assert_ne!(SessionId::from_token("anonymous"), anon);
    }

    #[test]
    fn sessions_are_reused() {
        let registry = SessionRegistry::new(10);
        let id = SessionId::from_token("abc");

        let first = registry.session(&id);
        first.credentials().set("abc".to_string());
        let second = registry.session(&id);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.session_count(), 1);
    }

    #[test]
    fn lists_are_per_resource() {
        let registry = SessionRegistry::new(25);
        let session = registry.session(&SessionId::anonymous());
        let catalog = Catalog::builtin();

        let reports = session.list(catalog.get("reports").unwrap()).unwrap();
        let again = session.list(catalog.get("reports").unwrap()).unwrap();
        let vendors = session.list(catalog.get("vendors").unwrap()).unwrap();

        assert!(Arc::ptr_eq(&reports, &again));
        assert!(!Arc::ptr_eq(&reports, &vendors));
        assert_eq!(session.open_lists(), 2);
        assert_eq!(reports.lock().unwrap().page_state().items_per_page, 25);
    }

    #[test]
    fn end_clears_credentials() {
        let registry = SessionRegistry::new(10);
        let id = SessionId::from_token("abc");
        let session = registry.session(&id);
        session.credentials().set("abc".to_string());

        assert!(registry.end(&id));
        assert_eq!(session.credentials().get(), None);
        assert!(!registry.end(&id));
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn idle_sessions_end_and_used_ones_stay() {
        let registry = SessionRegistry::new(10);
        let idle = SessionId::from_token("gone-home");
        let busy = SessionId::from_token("still-here");
        let stale = registry.session(&idle);
        stale.credentials().set("gone-home".to_string());
        registry.session(&busy);

        std::thread::sleep(Duration::from_millis(60));
        registry.session(&busy);

        assert_eq!(registry.end_idle(Duration::from_millis(40)), 1);
        assert_eq!(registry.session_count(), 1);
        assert_eq!(stale.credentials().get(), None);

        let again = registry.session(&idle);
        assert!(!Arc::ptr_eq(&stale, &again));
    }

    #[test]
    fn many_abandoned_tokens_are_reclaimed() {
        let registry = SessionRegistry::new(10);
        let reports = Catalog::builtin().get("reports").unwrap().clone();
        for i in 0..500 {
            let session = registry.session(&SessionId::from_token(&format!("tok-{}", i)));
            session.list(&reports).unwrap();
        }
        assert_eq!(registry.session_count(), 500);

        assert_eq!(registry.end_idle(Duration::ZERO), 500);
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn stale_refresh_is_not_loaded() {
        let registry = SessionRegistry::new(10);
        let session = registry.session(&SessionId::anonymous());
        let list = session.list(Catalog::builtin().get("vendors").unwrap()).unwrap();

        let older = list.begin_refresh();
        let newer = list.begin_refresh();

        let (engine, loaded) = list
            .finish_refresh(newer, vec![serde_json::json!({"_id": "a"}); 2])
            .unwrap();
        assert!(loaded);
        drop(engine);

        let (engine, loaded) = list
            .finish_refresh(older, vec![serde_json::json!({"_id": "b"})])
            .unwrap();
        assert!(!loaded);
        assert_eq!(engine.records().len(), 2);
    }
}
