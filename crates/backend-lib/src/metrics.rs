// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const ACCOUNT_CREATED: &str = "account.created";
pub const LOGIN_SUCCESS: &str = "login.success";
pub const LOGIN_FAILURE: &str = "login.failure";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_REMOVED: &str = "session.removed";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_ACTIVE: &str = "session.active";
pub const ASSET_ADDED: &str = "asset.added";
