// ============================
// crates/backend-lib/src/auth/accounts.rs
// ============================
//! Account sign-up, login and session resolution.
//!
//! This is the only place sessions are issued: a session always refers to
//! a username that passed credential verification the moment it was
//! created. Downstream data access takes its scoping username from here,
//! never from client input.
use crate::auth::password;
use crate::auth::session::{Session, SessionManager};
use crate::error::AppError;
use crate::metrics::{ACCOUNT_CREATED, LOGIN_FAILURE, LOGIN_SUCCESS};
use crate::storage::CredentialStore;
use crate::validation;
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use stocktake_common::AccountRecord;

/// Account manager: credential verification and session lifecycle
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn CredentialStore>,
    sessions: SessionManager,
}

impl AccountManager {
    pub fn new(store: Arc<dyn CredentialStore>, sessions: SessionManager) -> Self {
        Self { store, sessions }
    }

    /// Create a new account. Both fields are shape-checked before the
    /// store is touched; a taken username surfaces as
    /// [`AppError::DuplicateAccount`]. No session is issued here.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<(), AppError> {
        tracing::debug!(username, "attempting sign-up");

        validation::validate_username(username)?;
        validation::validate_password(password)?;

        let password_hash = hash_blocking(password).await?;
        let record = AccountRecord {
            username: username.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        self.store.insert(record).await?;

        counter!(ACCOUNT_CREATED).increment(1);
        tracing::info!(username, "account created");
        Ok(())
    }

    /// Verify credentials and issue a fresh session token
    pub async fn log_in(&self, username: &str, password: &str) -> Result<String, AppError> {
        tracing::debug!(username, "attempting login");

        validation::validate_username(username)?;
        self.verify_credentials(username, password).await?;

        let token = self.sessions.create_session(username.to_string()).await;

        counter!(LOGIN_SUCCESS).increment(1);
        tracing::info!(username, "login succeeded");
        Ok(token)
    }

    /// Check a username/password pair against the store. Unknown account
    /// and wrong password are logged distinctly server-side but both
    /// surface as the single [`AppError::LoginFailed`], so a caller probing
    /// the API cannot tell which usernames are registered.
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<(), AppError> {
        let Some(account) = self.store.fetch(username).await? else {
            tracing::debug!(username, "login rejected: unknown account");
            counter!(LOGIN_FAILURE).increment(1);
            return Err(AppError::LoginFailed);
        };

        if !verify_blocking(account.password_hash, password).await? {
            tracing::debug!(username, "login rejected: password mismatch");
            counter!(LOGIN_FAILURE).increment(1);
            return Err(AppError::LoginFailed);
        }

        Ok(())
    }

    /// Look up the session registered under a token, if it is live
    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        self.sessions.get_session(session_id).await
    }

    /// The username a live session belongs to; `None` for unknown or
    /// expired tokens
    pub async fn get_username(&self, session_id: &str) -> Option<String> {
        self.sessions.username_for(session_id).await
    }

    /// Drop a session. Idempotent: unknown tokens are a no-op, and other
    /// sessions of the same username stay live.
    pub async fn log_out(&self, session_id: &str) {
        self.sessions.remove_session(session_id).await;
    }

    pub async fn is_session_active(&self, session_id: &str) -> bool {
        self.sessions.is_active(session_id).await
    }

    pub async fn is_username_logged_in(&self, username: &str) -> bool {
        self.sessions.is_username_logged_in(username).await
    }
}

/// Run the scrypt hash off the async runtime; hashing is deliberately slow
async fn hash_blocking(password: &str) -> Result<String, AppError> {
    let plain = password.to_string();
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|err| AppError::Internal(format!("hashing task failed: {err}")))?
        .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))
}

async fn verify_blocking(hash: String, password: &str) -> Result<bool, AppError> {
    let plain = password.to_string();
    tokio::task::spawn_blocking(move || password::verify_password(&hash, &plain))
        .await
        .map_err(|err| AppError::Internal(format!("verification task failed: {err}")))
}
