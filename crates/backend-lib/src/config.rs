// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Session TTL in seconds
    pub session_ttl_secs: u64,
    /// Login lockout policy
    pub auth_lockout: AuthLockoutSettings,
}

/// Lockout policy for repeated failed logins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthLockoutSettings {
    /// Failed attempts before a client address is locked out
    pub max_attempts: u32,
    /// Lockout duration in seconds
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8089".parse().expect("static address"),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            session_ttl_secs: 60 * 60 * 24 * 7, // 7 days
            auth_lockout: AuthLockoutSettings::default(),
        }
    }
}

impl Default for AuthLockoutSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
        }
    }
}

impl Settings {
    /// Load settings from the default config file location and the
    /// `STOCKTAKE_` environment, layered over built-in defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config/default.toml")
    }

    /// Load settings with an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("STOCKTAKE").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations that cannot work
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            bail!("invalid log level '{}'", self.log_level);
        }
        if self.session_ttl_secs == 0 {
            bail!("session_ttl_secs must be positive");
        }
        if self.auth_lockout.max_attempts == 0 {
            bail!("auth_lockout.max_attempts must be positive");
        }
        if self.auth_lockout.lockout_secs == 0 {
            bail!("auth_lockout.lockout_secs must be positive");
        }
        Ok(())
    }

    /// Session TTL as a `Duration`
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Lockout duration as a `Duration`
    pub fn lockout_duration(&self) -> Duration {
        Duration::from_secs(self.auth_lockout.lockout_secs)
    }
}
