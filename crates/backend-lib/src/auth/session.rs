// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! Active sessions are process-local state behind the [`SessionStore`]
//! trait, so the map can be swapped without touching account logic. All
//! mutation goes through the store, which removes entries by key under a
//! write lock; nothing ever iterates and mutates by position.
use crate::auth::token::generate_session_token;
use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_EXPIRED, SESSION_REMOVED};
use async_trait::async_trait;
use metrics::{counter, gauge};
use std::{collections::HashMap, sync::Arc, time::{Duration, SystemTime}};
use tokio::sync::RwLock;

/// Default session TTL (time to live)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7); // 7 days

/// Interval between expired-session sweeps
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Session information. The username is the one that passed credential
/// verification when the session was issued; sessions are never created
/// any other way.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

impl Session {
    /// Whether the session is still live at `now`
    pub fn is_live(&self, now: SystemTime) -> bool {
        now < self.expires_at
    }
}

/// Storage backend for active sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Register a session under its token
    async fn insert(&self, token: String, session: Session);

    /// Look up a session by token
    async fn get(&self, token: &str) -> Option<Session>;

    /// Remove a session by token. Returns whether a session was present,
    /// and is a no-op otherwise.
    async fn remove(&self, token: &str) -> bool;

    /// Whether any session belongs to the given username
    async fn username_has_session(&self, username: &str) -> bool;

    /// Drop every session that expired before `now`, returning the count
    async fn remove_expired(&self, now: SystemTime) -> usize;

    /// Number of stored sessions, expired ones included
    async fn len(&self) -> usize;
}

/// In-memory session store. A single `RwLock` serializes all mutation, so
/// racing logins and logouts cannot corrupt the map and a logout that loses
/// the race simply finds the entry already gone.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: String, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(token, session);
    }

    async fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    async fn remove(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token).is_some()
    }

    async fn username_has_session(&self, username: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions.values().any(|session| session.username == username)
    }

    async fn remove_expired(&self, now: SystemTime) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_live(now));
        before - sessions.len()
    }

    async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a session manager over the in-memory store and spawn the
    /// periodic cleanup task. Must be called from within a Tokio runtime.
    pub fn new(ttl: Duration) -> Self {
        Self::with_store(Arc::new(InMemorySessionStore::new()), ttl)
    }

    /// Create a session manager over an injected store
    pub fn with_store(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        let manager = SessionManager { store, ttl };

        let manager_clone = manager.clone();
        tokio::spawn(async move {
            manager_clone.cleanup_task().await;
        });

        manager
    }

    /// Issue a session for a username that already passed credential
    /// verification, returning the fresh token
    pub async fn create_session(&self, username: String) -> String {
        let token = generate_session_token();
        let now = SystemTime::now();
        let session = Session {
            username,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.store.insert(token.clone(), session).await;

        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(self.store.len().await as f64);

        token
    }

    /// Get a live session by token; expired sessions resolve to `None`
    /// even before the cleanup sweep removes them
    pub async fn get_session(&self, token: &str) -> Option<Session> {
        let session = self.store.get(token).await?;
        session.is_live(SystemTime::now()).then_some(session)
    }

    /// The username owning a live session, if any
    pub async fn username_for(&self, token: &str) -> Option<String> {
        self.get_session(token).await.map(|session| session.username)
    }

    /// Whether a token refers to a live session
    pub async fn is_active(&self, token: &str) -> bool {
        self.get_session(token).await.is_some()
    }

    /// Whether the username owns at least one session
    pub async fn is_username_logged_in(&self, username: &str) -> bool {
        self.store.username_has_session(username).await
    }

    /// Remove a session. Idempotent: removing a token twice, or a token
    /// that never existed, is a no-op. Other sessions of the same
    /// username are unaffected.
    pub async fn remove_session(&self, token: &str) {
        if self.store.remove(token).await {
            counter!(SESSION_REMOVED).increment(1);
            gauge!(SESSION_ACTIVE).set(self.store.len().await as f64);
        }
    }

    /// Number of stored sessions
    pub async fn active_count(&self) -> usize {
        self.store.len().await
    }

    /// Cleanup task that runs periodically to remove expired sessions
    async fn cleanup_task(&self) {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;

            let removed = self.store.remove_expired(SystemTime::now()).await;
            if removed > 0 {
                counter!(SESSION_EXPIRED).increment(removed as u64);
                gauge!(SESSION_ACTIVE).set(self.store.len().await as f64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_look_up_session() {
        let manager = SessionManager::new(SESSION_TTL);

        let token = manager.create_session("alice".to_string()).await;
        assert!(manager.is_active(&token).await);
        assert_eq!(manager.username_for(&token).await.as_deref(), Some("alice"));
        assert!(manager.is_username_logged_in("alice").await);
        assert!(!manager.is_username_logged_in("bob").await);
    }

    #[tokio::test]
    async fn test_remove_session_is_idempotent() {
        let manager = SessionManager::new(SESSION_TTL);
        let token = manager.create_session("alice".to_string()).await;

        manager.remove_session(&token).await;
        assert!(!manager.is_active(&token).await);
        assert_eq!(manager.username_for(&token).await, None);

        // Second removal is a no-op, not an error
        manager.remove_session(&token).await;
        manager.remove_session("never-issued").await;
    }

    #[tokio::test]
    async fn test_concurrent_sessions_are_independent() {
        let manager = SessionManager::new(SESSION_TTL);

        let first = manager.create_session("alice".to_string()).await;
        let second = manager.create_session("alice".to_string()).await;
        assert_ne!(first, second);

        manager.remove_session(&first).await;
        assert!(!manager.is_active(&first).await);
        assert!(manager.is_active(&second).await);
        assert!(manager.is_username_logged_in("alice").await);
    }

    #[tokio::test]
    async fn test_expired_session_is_not_live() {
        let manager = SessionManager::new(Duration::ZERO);
        let token = manager.create_session("alice".to_string()).await;

        assert!(!manager.is_active(&token).await);
        assert_eq!(manager.username_for(&token).await, None);

        // The entry is still stored until a sweep runs
        assert_eq!(manager.active_count().await, 1);
        let removed = manager.store.remove_expired(SystemTime::now()).await;
        assert_eq!(removed, 1);
        assert_eq!(manager.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_logins_and_logouts() {
        let manager = SessionManager::new(SESSION_TTL);

        let mut handles = Vec::new();
        for i in 0..32 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                let token = manager.create_session(format!("user_{i}")).await;
                manager.remove_session(&token).await;
                manager.remove_session(&token).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(manager.active_count().await, 0);
    }
}
