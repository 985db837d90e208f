//! Browsing-context session registry.
//!
//! One [`AuthSession`] per browsing context, keyed by the backend session
//! cookie. The registry lives in app state and is dependency-injected via
//! the [`SessionHandle`](crate::extractors::SessionHandle) extractor; nothing
//! in the app reaches for session state ambiently. Visitors without a
//! backend session get a throwaway session that is never registered, so the
//! map only grows with logged-in contexts.

pub mod auth;

pub use auth::{AuthSession, Identity, LoginError, SessionRefresh, SignupError};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Name of the backend's session cookie; its value scopes a browsing context.
pub const BACKEND_SESSION_COOKIE: &str = "sessionid";

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Mutex<AuthSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the session for a browsing context. A `None` key
    /// (no backend session cookie) yields an ephemeral session.
    pub async fn obtain(&self, key: Option<&str>) -> Arc<Mutex<AuthSession>> {
        match key {
            Some(key) => {
                let mut sessions = self.sessions.lock().await;
                sessions
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(AuthSession::new())))
                    .clone()
            }
            None => Arc::new(Mutex::new(AuthSession::new())),
        }
    }

    /// Forget a browsing context entirely (used after logout, when the
    /// backend session id it was keyed on stops existing).
    pub async fn discard(&self, key: &str) {
        self.sessions.lock().await.remove(key);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_returns_same_session() {
        let registry = SessionRegistry::new();
        let a = registry.obtain(Some("sess-1")).await;
        {
            let mut session = a.lock().await;
            session.store_comment_thread(1, crate::comments::CommentThread::default());
        }

        let b = registry.obtain(Some("sess-1")).await;
        assert!(b.lock().await.comment_thread(1).is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn different_keys_are_isolated() {
        let registry = SessionRegistry::new();
        let a = registry.obtain(Some("sess-1")).await;
        a.lock()
            .await
            .store_comment_thread(1, crate::comments::CommentThread::default());

        let b = registry.obtain(Some("sess-2")).await;
        assert!(b.lock().await.comment_thread(1).is_none());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn anonymous_sessions_are_not_registered() {
        let registry = SessionRegistry::new();
        let _ = registry.obtain(None).await;
        let _ = registry.obtain(None).await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn discard_forgets_the_context() {
        let registry = SessionRegistry::new();
        let a = registry.obtain(Some("sess-1")).await;
        a.lock()
            .await
            .store_comment_thread(1, crate::comments::CommentThread::default());
        registry.discard("sess-1").await;

        let b = registry.obtain(Some("sess-1")).await;
        assert!(b.lock().await.comment_thread(1).is_none());
    }
}
