use crate::auth::accounts::AccountManager;
use crate::auth::service::AccountService;
use crate::auth::session::Session;
use crate::error::AppError;
use async_trait::async_trait;

#[async_trait]
impl AccountService for AccountManager {
    async fn sign_up(&self, username: &str, password: &str) -> Result<(), AppError> {
        AccountManager::sign_up(self, username, password).await
    }

    async fn log_in(&self, username: &str, password: &str) -> Result<String, AppError> {
        AccountManager::log_in(self, username, password).await
    }

    async fn log_out(&self, session_id: &str) {
        AccountManager::log_out(self, session_id).await;
    }

    async fn get_session(&self, session_id: &str) -> Option<Session> {
        AccountManager::get_session(self, session_id).await
    }

    async fn session_username(&self, session_id: &str) -> Option<String> {
        AccountManager::get_username(self, session_id).await
    }

    async fn is_session_active(&self, session_id: &str) -> bool {
        AccountManager::is_session_active(self, session_id).await
    }

    async fn is_username_logged_in(&self, username: &str) -> bool {
        AccountManager::is_username_logged_in(self, username).await
    }
}
