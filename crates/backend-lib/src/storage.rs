// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Credential store abstraction with flat-file implementation.
//!
//! The account manager never issues raw queries; everything goes through
//! the narrow [`CredentialStore`] interface, so the backing store can be
//! swapped for a relational database without touching account logic.
use std::{fs, io::ErrorKind, path::{Path, PathBuf}};
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::RwLock};
use async_trait::async_trait;
use std::collections::HashMap;
use crate::error::AppError;
use stocktake_common::AccountRecord;

/// Trait for credential storage backends
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the account registered under `username`, if any
    async fn fetch(&self, username: &str) -> Result<Option<AccountRecord>, AppError>;

    /// Insert a new account. Fails with [`AppError::DuplicateAccount`] if
    /// the username is already taken; that failure must propagate to the
    /// caller, never be swallowed.
    async fn insert(&self, record: AccountRecord) -> Result<(), AppError>;
}

/// Flat-file implementation of the credential store: one JSON document per
/// account under `<root>/accounts/`. Usernames are shape-validated before
/// they reach the store (letters, digits, underscores), so they are safe
/// to use as file names, and file creation doubles as the uniqueness
/// constraint.
#[derive(Clone)]
pub struct FlatFileCredentialStore {
    root: PathBuf,
}

impl FlatFileCredentialStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("accounts"))?;
        Ok(Self { root })
    }

    fn account_path(&self, username: &str) -> PathBuf {
        self.root.join("accounts").join(format!("{username}.json"))
    }
}

#[async_trait]
impl CredentialStore for FlatFileCredentialStore {
    async fn fetch(&self, username: &str) -> Result<Option<AccountRecord>, AppError> {
        let path = self.account_path(username);

        let content = match tokio_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let record: AccountRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    async fn insert(&self, record: AccountRecord) -> Result<(), AppError> {
        let path = self.account_path(&record.username);
        let json = serde_json::to_string_pretty(&record)?;

        // create_new is the uniqueness check: a second insert for the same
        // username fails with AlreadyExists
        let mut file = match tokio_fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::DuplicateAccount);
            },
            Err(err) => return Err(err.into()),
        };

        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory credential store used by tests and ephemeral deployments
#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn fetch(&self, username: &str) -> Result<Option<AccountRecord>, AppError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(username).cloned())
    }

    async fn insert(&self, record: AccountRecord) -> Result<(), AppError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&record.username) {
            return Err(AppError::DuplicateAccount);
        }
        accounts.insert(record.username.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(username: &str) -> AccountRecord {
        AccountRecord {
            username: username.to_string(),
            password_hash: "$scrypt$ln=15,r=8,p=1$c2FsdA$aGFzaA".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_flat_file_insert_and_fetch() {
        let dir = tempdir().unwrap();
        let store = FlatFileCredentialStore::new(dir.path()).unwrap();

        assert!(store.fetch("alice").await.unwrap().is_none());

        store.insert(record("alice")).await.unwrap();
        let fetched = store.fetch("alice").await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.password_hash, record("alice").password_hash);
    }

    #[tokio::test]
    async fn test_flat_file_duplicate_insert_is_rejected() {
        let dir = tempdir().unwrap();
        let store = FlatFileCredentialStore::new(dir.path()).unwrap();

        store.insert(record("alice")).await.unwrap();
        let err = store.insert(record("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateAccount));

        // The original record is untouched
        assert!(store.fetch("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_store_duplicate_insert_is_rejected() {
        let store = MemoryCredentialStore::new();

        store.insert(record("alice")).await.unwrap();
        let err = store.insert(record("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateAccount));
        assert_eq!(store.len().await, 1);
    }
}
