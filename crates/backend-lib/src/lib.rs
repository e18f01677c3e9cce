// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `Stocktake` inventory server.

pub mod auth;
pub mod config;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod router;
pub mod storage;
pub mod validation;

use crate::auth::{AccountManager, AccountService, AuthRateLimiter, SessionManager};
use crate::config::Settings;
use crate::inventory::{FlatFileInventory, InventoryGateway, InventoryManager};
use crate::storage::{CredentialStore, FlatFileCredentialStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Account and session operations
    pub accounts: Arc<dyn AccountService>,
    /// Session manager
    pub sessions: SessionManager,
    /// Username-scoped inventory access
    pub inventory: InventoryManager,
    /// Settings
    pub settings: Arc<Settings>,
    /// Login lockout tracking
    pub auth_limiter: AuthRateLimiter,
}

impl AppState {
    /// Create application state over injected stores. Must be called from
    /// within a Tokio runtime (the session manager spawns its cleanup task).
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        gateway: Arc<dyn InventoryGateway>,
        settings: Settings,
    ) -> Self {
        let sessions = SessionManager::new(settings.session_ttl());
        let accounts: Arc<dyn AccountService> =
            Arc::new(AccountManager::new(credentials, sessions.clone()));
        let auth_limiter = AuthRateLimiter::new(
            settings.auth_lockout.max_attempts,
            settings.lockout_duration(),
        );

        Self {
            accounts,
            sessions,
            inventory: InventoryManager::new(gateway),
            settings: Arc::new(settings),
            auth_limiter,
        }
    }

    /// Create application state over the flat-file stores under the
    /// configured data directory
    pub fn flat_file(settings: Settings) -> anyhow::Result<Self> {
        let credentials = Arc::new(FlatFileCredentialStore::new(&settings.data_dir)?);
        let gateway = Arc::new(FlatFileInventory::new(&settings.data_dir)?);
        Ok(Self::new(credentials, gateway, settings))
    }
}
