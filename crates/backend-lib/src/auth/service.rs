use async_trait::async_trait;
use super::Session;
use crate::error::AppError;

/// Seam between the HTTP surface and the account manager. Handlers only
/// see this trait, so tests can substitute a stub and the manager can be
/// swapped without touching the router.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn sign_up(&self, username: &str, password: &str) -> Result<(), AppError>;
    async fn log_in(&self, username: &str, password: &str) -> Result<String, AppError>;
    async fn log_out(&self, session_id: &str);
    async fn get_session(&self, session_id: &str) -> Option<Session>;
    async fn session_username(&self, session_id: &str) -> Option<String>;
    async fn is_session_active(&self, session_id: &str) -> bool;
    async fn is_username_logged_in(&self, username: &str) -> bool;
}
