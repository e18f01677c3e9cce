// ============================
// crates/backend-lib/src/inventory.rs
// ============================
//! Username-scoped inventory access.
//!
//! Every gateway method takes the owning username and filters or stamps it
//! server-side. The username always comes from a resolved session, never
//! from a client-supplied field, so one account can never read or write
//! another account's records.
use crate::auth::token::generate_record_id;
use crate::error::AppError;
use crate::metrics::ASSET_ADDED;
use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::{Path, PathBuf}, sync::Arc};
use stocktake_common::{AssetRecord, CategoryRecord, NewAsset, SiteRecord};
use tokio::{fs as tokio_fs, sync::Mutex};

/// Key for a single-asset lookup
#[derive(Debug, Clone)]
pub enum AssetKey {
    Id(String),
    Name(String),
}

impl AssetKey {
    /// Build a key from optional id/name fields; the id wins when both
    /// are present
    pub fn from_parts(id: Option<String>, name: Option<String>) -> Result<Self, AppError> {
        match (id, name) {
            (Some(id), _) => Ok(AssetKey::Id(id)),
            (None, Some(name)) => Ok(AssetKey::Name(name)),
            (None, None) => Err(AppError::InvalidInput(
                "an asset id or an asset name is required".to_string(),
            )),
        }
    }

    fn matches(&self, asset: &AssetRecord) -> bool {
        match self {
            AssetKey::Id(id) => asset.asset_id == *id,
            AssetKey::Name(name) => asset.asset_name == *name,
        }
    }
}

/// Trait for inventory storage backends. Implementations must apply the
/// `username` filter themselves; callers never post-filter.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn add_assets(&self, username: &str, assets: Vec<AssetRecord>) -> Result<(), AppError>;

    async fn get_asset(
        &self,
        username: &str,
        key: &AssetKey,
    ) -> Result<Option<AssetRecord>, AppError>;

    async fn full_assets(&self, username: &str) -> Result<Vec<AssetRecord>, AppError>;

    async fn add_categories(
        &self,
        username: &str,
        categories: Vec<CategoryRecord>,
    ) -> Result<(), AppError>;

    async fn get_category(
        &self,
        username: &str,
        category_id: &str,
    ) -> Result<Option<CategoryRecord>, AppError>;

    async fn all_categories(&self, username: &str) -> Result<Vec<CategoryRecord>, AppError>;

    async fn add_sites(&self, username: &str, sites: Vec<SiteRecord>) -> Result<(), AppError>;

    async fn get_site(&self, username: &str, site_id: &str)
        -> Result<Option<SiteRecord>, AppError>;

    async fn all_sites(&self, username: &str) -> Result<Vec<SiteRecord>, AppError>;

    /// Attach a location to an existing site, returning the updated site
    /// or `None` if the site does not belong to the username
    async fn add_location(
        &self,
        username: &str,
        site_id: &str,
        location_name: &str,
    ) -> Result<Option<SiteRecord>, AppError>;
}

/// One account's inventory as stored on disk
#[derive(Debug, Default, Serialize, Deserialize)]
struct InventoryDoc {
    #[serde(default)]
    assets: Vec<AssetRecord>,
    #[serde(default)]
    categories: Vec<CategoryRecord>,
    #[serde(default)]
    sites: Vec<SiteRecord>,
}

/// Flat-file implementation of the inventory gateway: one JSON document
/// per account under `<root>/inventory/`. The per-account document makes
/// the tenant boundary physical; a query for one username never opens
/// another username's file.
pub struct FlatFileInventory {
    root: PathBuf,
    // All document access goes through this lock; documents are small and
    // rewritten whole
    doc_lock: Mutex<()>,
}

impl FlatFileInventory {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("inventory"))?;
        Ok(Self {
            root,
            doc_lock: Mutex::new(()),
        })
    }

    fn doc_path(&self, username: &str) -> PathBuf {
        self.root.join("inventory").join(format!("{username}.json"))
    }

    async fn load(&self, username: &str) -> Result<InventoryDoc, AppError> {
        let path = self.doc_path(username);
        let content = match tokio_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(InventoryDoc::default()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, username: &str, doc: &InventoryDoc) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(doc)?;
        tokio_fs::write(self.doc_path(username), json).await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryGateway for FlatFileInventory {
    async fn add_assets(&self, username: &str, assets: Vec<AssetRecord>) -> Result<(), AppError> {
        let _guard = self.doc_lock.lock().await;
        let mut doc = self.load(username).await?;
        doc.assets.extend(assets);
        self.save(username, &doc).await
    }

    async fn get_asset(
        &self,
        username: &str,
        key: &AssetKey,
    ) -> Result<Option<AssetRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        let doc = self.load(username).await?;
        Ok(doc.assets.into_iter().find(|asset| key.matches(asset)))
    }

    async fn full_assets(&self, username: &str) -> Result<Vec<AssetRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        Ok(self.load(username).await?.assets)
    }

    async fn add_categories(
        &self,
        username: &str,
        categories: Vec<CategoryRecord>,
    ) -> Result<(), AppError> {
        let _guard = self.doc_lock.lock().await;
        let mut doc = self.load(username).await?;
        doc.categories.extend(categories);
        self.save(username, &doc).await
    }

    async fn get_category(
        &self,
        username: &str,
        category_id: &str,
    ) -> Result<Option<CategoryRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        let doc = self.load(username).await?;
        Ok(doc
            .categories
            .into_iter()
            .find(|category| category.category_id == category_id))
    }

    async fn all_categories(&self, username: &str) -> Result<Vec<CategoryRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        Ok(self.load(username).await?.categories)
    }

    async fn add_sites(&self, username: &str, sites: Vec<SiteRecord>) -> Result<(), AppError> {
        let _guard = self.doc_lock.lock().await;
        let mut doc = self.load(username).await?;
        doc.sites.extend(sites);
        self.save(username, &doc).await
    }

    async fn get_site(
        &self,
        username: &str,
        site_id: &str,
    ) -> Result<Option<SiteRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        let doc = self.load(username).await?;
        Ok(doc.sites.into_iter().find(|site| site.site_id == site_id))
    }

    async fn all_sites(&self, username: &str) -> Result<Vec<SiteRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        Ok(self.load(username).await?.sites)
    }

    async fn add_location(
        &self,
        username: &str,
        site_id: &str,
        location_name: &str,
    ) -> Result<Option<SiteRecord>, AppError> {
        let _guard = self.doc_lock.lock().await;
        let mut doc = self.load(username).await?;

        let Some(site) = doc.sites.iter_mut().find(|site| site.site_id == site_id) else {
            return Ok(None);
        };
        site.locations.push(location_name.to_string());
        let updated = site.clone();

        self.save(username, &doc).await?;
        Ok(Some(updated))
    }
}

/// Inventory manager: stamps ids and owners onto new records, checks
/// batch shapes, and delegates storage to the gateway
#[derive(Clone)]
pub struct InventoryManager {
    gateway: Arc<dyn InventoryGateway>,
}

impl InventoryManager {
    pub fn new(gateway: Arc<dyn InventoryGateway>) -> Self {
        Self { gateway }
    }

    /// Add a single asset, returning the stored record with its
    /// generated id
    pub async fn add_asset(
        &self,
        username: &str,
        asset: NewAsset,
    ) -> Result<AssetRecord, AppError> {
        let mut records = self.add_assets(username, vec![asset]).await?;
        // add_assets returns exactly as many records as it was given
        Ok(records.remove(0))
    }

    /// Add a batch of assets in one gateway call, assigning each its own id
    pub async fn add_assets(
        &self,
        username: &str,
        assets: Vec<NewAsset>,
    ) -> Result<Vec<AssetRecord>, AppError> {
        if assets.is_empty() {
            return Err(AppError::InvalidInput(
                "Expected a non-empty array of assets".to_string(),
            ));
        }

        let records: Vec<AssetRecord> = assets
            .into_iter()
            .map(|asset| AssetRecord {
                asset_id: generate_record_id(),
                username: username.to_string(),
                asset_name: asset.asset_name,
                category_id: asset.category_id,
                site_id: asset.site_id,
                location_name: asset.location_name,
                purchase_price: asset.purchase_price,
                purchase_date: asset.purchase_date,
                maintenance_interval_days: asset.maintenance_interval_days,
                last_maintenance: asset.last_maintenance,
            })
            .collect();

        self.gateway.add_assets(username, records.clone()).await?;
        counter!(ASSET_ADDED).increment(records.len() as u64);
        Ok(records)
    }

    pub async fn get_asset(&self, username: &str, key: AssetKey) -> Result<AssetRecord, AppError> {
        self.gateway
            .get_asset(username, &key)
            .await?
            .ok_or_else(|| AppError::NotFound("asset".to_string()))
    }

    pub async fn full_assets(&self, username: &str) -> Result<Vec<AssetRecord>, AppError> {
        self.gateway.full_assets(username).await
    }

    pub async fn add_category(
        &self,
        username: &str,
        category_name: &str,
    ) -> Result<CategoryRecord, AppError> {
        if category_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Category name must not be empty".to_string(),
            ));
        }

        let record = CategoryRecord {
            category_id: generate_record_id(),
            username: username.to_string(),
            category_name: category_name.to_string(),
        };
        self.gateway
            .add_categories(username, vec![record.clone()])
            .await?;
        Ok(record)
    }

    pub async fn all_categories(&self, username: &str) -> Result<Vec<CategoryRecord>, AppError> {
        self.gateway.all_categories(username).await
    }

    pub async fn add_site(
        &self,
        username: &str,
        site_name: &str,
        locations: Vec<String>,
    ) -> Result<SiteRecord, AppError> {
        if site_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Site name must not be empty".to_string(),
            ));
        }

        let record = SiteRecord {
            site_id: generate_record_id(),
            username: username.to_string(),
            site_name: site_name.to_string(),
            locations,
        };
        self.gateway.add_sites(username, vec![record.clone()]).await?;
        Ok(record)
    }

    pub async fn all_sites(&self, username: &str) -> Result<Vec<SiteRecord>, AppError> {
        self.gateway.all_sites(username).await
    }

    /// Attach a location to one of the account's sites, returning the
    /// updated site
    pub async fn add_location(
        &self,
        username: &str,
        site_id: &str,
        location_name: &str,
    ) -> Result<SiteRecord, AppError> {
        if location_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Location name must not be empty".to_string(),
            ));
        }

        self.gateway
            .add_location(username, site_id, location_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("site {site_id}")))
    }
}
