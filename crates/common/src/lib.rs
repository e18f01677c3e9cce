// ================
// common/src/lib.rs
// ================
//! Shared types for the `Stocktake` asset-inventory server.
//! This crate defines the JSON API bodies and the record shapes that
//! the backend persists, so the server and any client agree on one schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored user account. The raw password never appears here; only the
/// PHC-format hash produced at sign-up is persisted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccountRecord {
    /// Unique account name, the tenant-scoping key for all inventory data
    pub username: String,
    /// Salted one-way hash of the account password
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// A single piece of tracked equipment.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AssetRecord {
    /// Server-generated opaque id
    pub asset_id: String,
    /// Owning account
    pub username: String,
    /// Display name of the asset
    pub asset_name: String,
    /// Category the asset belongs to, if any
    #[serde(default)]
    pub category_id: Option<String>,
    /// Site the asset is placed at, if any
    #[serde(default)]
    pub site_id: Option<String>,
    /// Location within the site
    #[serde(default)]
    pub location_name: Option<String>,
    /// Purchase price
    #[serde(default)]
    pub purchase_price: Option<f64>,
    /// Purchase date
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    /// Days between scheduled maintenance passes
    #[serde(default)]
    pub maintenance_interval_days: Option<u32>,
    /// Date of the last completed maintenance
    #[serde(default)]
    pub last_maintenance: Option<NaiveDate>,
}

/// Client-supplied asset fields; the server stamps the id and owner.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewAsset {
    pub asset_name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub maintenance_interval_days: Option<u32>,
    #[serde(default)]
    pub last_maintenance: Option<NaiveDate>,
}

/// An asset category defined by one account.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CategoryRecord {
    pub category_id: String,
    pub username: String,
    pub category_name: String,
}

/// A site (building, campus, warehouse) with its named locations.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SiteRecord {
    pub site_id: String,
    pub username: String,
    pub site_name: String,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Envelope for every JSON response the server sends.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            err: None,
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            err: None,
        }
    }

    pub fn fail(err: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            err: Some(err.into()),
        }
    }
}

/// Body of `POST /account/sign_up` and `POST /account/log_in`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Body of every request that only carries a session id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionRequest {
    pub session_id: String,
}

/// Successful login payload: the issued session id plus the account's
/// full inventory snapshot for the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginData {
    pub session_id: String,
    pub assets: Vec<AssetRecord>,
    pub categories: Vec<CategoryRecord>,
    pub sites: Vec<SiteRecord>,
}

/// Body of `POST /assets/get`: look up one asset by id or by name.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AssetQueryRequest {
    pub session_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /assets/add`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddAssetRequest {
    pub session_id: String,
    #[serde(flatten)]
    pub asset: NewAsset,
}

/// Body of `POST /categories/add`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddCategoryRequest {
    pub session_id: String,
    pub category_name: String,
}

/// Body of `POST /sites/add`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddSiteRequest {
    pub session_id: String,
    pub site_name: String,
    #[serde(default)]
    pub location_name: Option<String>,
}

/// Body of `POST /locations/add`: attach a location to an existing site.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AddLocationRequest {
    pub session_id: String,
    pub site_id: String,
    pub location_name: String,
}
