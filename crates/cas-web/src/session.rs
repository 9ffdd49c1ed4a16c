//! Per-caller report sessions
//!
//! A session holds the last report a caller ran and the diagnostic text of
//! their failed runs. Sessions are keyed by an opaque cookie.

use axum::http::{header, HeaderMap};
use cas_core::Report;
use cas_report::DiagnosticLog;
use chrono::{DateTime, Utc};
use cookie::{Cookie, SameSite};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "cas_session";

/// One caller's report state
#[derive(Debug, Clone)]
pub struct ReportSession {
    pub id: String,
    pub report: Option<Report>,
    pub diagnostics: DiagnosticLog,
    pub updated_at: DateTime<Utc>,
}

impl ReportSession {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            report: None,
            diagnostics: DiagnosticLog::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Bounded in-memory session store
pub struct ReportSessions {
    sessions: Arc<RwLock<HashMap<String, ReportSession>>>,
    max_sessions: usize,
}

impl ReportSessions {
    pub fn new() -> Self {
        Self::with_max_sessions(100)
    }

    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
        }
    }

    pub async fn get(&self, id: &str) -> Option<ReportSession> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Existing session, or a fresh empty one that is not stored until modified
    pub async fn get_or_new(&self, id: &str) -> ReportSession {
        self.get(id).await.unwrap_or_else(|| ReportSession::with_id(id))
    }

    /// Change a session in place under the store lock, creating it if needed.
    ///
    /// A new session evicts the least recently updated one at capacity.
    pub async fn modify<F>(&self, id: &str, change: F)
    where
        F: FnOnce(&mut ReportSession),
    {
        let mut sessions = self.sessions.write().await;

        if !sessions.contains_key(id) && sessions.len() >= self.max_sessions {
            if let Some(oldest_id) = sessions
                .values()
                .min_by_key(|s| s.updated_at)
                .map(|s| s.id.clone())
            {
                sessions.remove(&oldest_id);
            }
        }

        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| ReportSession::with_id(id));
        change(session);
        session.updated_at = Utc::now();
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for ReportSessions {
    fn default() -> Self {
        Self::new()
    }
}

/// Session id carried by the request, if any
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE && Uuid::parse_str(cookie.value()).is_ok())
        .map(|cookie| cookie.value().to_string())
}

/// Session id for this request and whether it must be handed out as a cookie
pub fn resolve_session(headers: &HeaderMap) -> (String, bool) {
    match session_id(headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    }
}

pub fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
