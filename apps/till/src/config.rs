//! # Till Configuration
//!
//! Per-terminal settings: who is billing, where the database and printer
//! are, and how to reach the hotel's room-account server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RASOI_CLIENT_NAME="Room Service"                                   │
//! │     RASOI_PRINTER_ADDR=10.0.0.12:9100                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/till.toml (Linux)                                    │
//! │     ~/Library/Application Support/com.rasoi.pos/till.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     client "Restaurant", printer 10.0.0.1:9100, 48 columns             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # till.toml
//! [terminal]
//! client_name = "Restaurant"   # picks the bill-number prefix
//! store_name = "Rasoi Family Restaurant"
//! address = "MG Road, Bengaluru"
//! gstin = "29AAHFR9721Q1Z9"
//! hsn_code = "996332"
//!
//! [database]
//! path = "/var/lib/rasoi/rasoi.db"
//!
//! [printer]
//! address = "10.0.0.12:9100"
//! check_timeout_ms = 1000
//! paper_width = 48
//!
//! [room_account]
//! server_url = "https://hotel.example.in"
//! api_path = "/api/restaurant/processBill"
//! auth_enabled = true
//! access_key = "AKIA..."
//! secret_key = "..."
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use rasoi_core::bill_id::fiscal_suffix;
use rasoi_core::receipt::ReceiptHeader;

// =============================================================================
// Config Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ConfigSaveFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Terminal
// =============================================================================

/// Who this till bills as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Operational context ("Restaurant", "Room Service", "Rock Garden").
    /// Selects the bill-number prefix and is sent with room postings.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_store_name")]
    pub store_name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub gstin: String,

    #[serde(default = "default_hsn_code")]
    pub hsn_code: String,

    /// Fixed fiscal-year suffix ("26/27"). Derived from today's date when
    /// unset.
    #[serde(default)]
    pub fiscal_suffix: Option<String>,
}

fn default_client_name() -> String {
    "Restaurant".to_string()
}

fn default_store_name() -> String {
    "Rasoi".to_string()
}

fn default_hsn_code() -> String {
    // Restaurant service
    "996332".to_string()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            client_name: default_client_name(),
            store_name: default_store_name(),
            address: String::new(),
            gstin: String::new(),
            hsn_code: default_hsn_code(),
            fiscal_suffix: None,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `rasoi.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Printer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// `host:port` of the thermal printer. Port 9100 when omitted.
    #[serde(default = "default_printer_address")]
    pub address: String,

    /// Upper bound for the "is the printer there" check.
    #[serde(default = "default_check_timeout")]
    pub check_timeout_ms: u64,

    /// Characters per line (48 for 80mm, 32 for 58mm).
    #[serde(default = "default_paper_width")]
    pub paper_width: usize,
}

fn default_printer_address() -> String {
    "10.0.0.1:9100".to_string()
}

fn default_check_timeout() -> u64 {
    1000
}

fn default_paper_width() -> usize {
    48
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            address: default_printer_address(),
            check_timeout_ms: default_check_timeout(),
            paper_width: default_paper_width(),
        }
    }
}

impl PrinterConfig {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

// =============================================================================
// Room Account
// =============================================================================

/// The hotel front-office API that room-charged bills are posted to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAccountConfig {
    /// Scheme and host, no trailing slash.
    #[serde(default)]
    pub server_url: String,

    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Sign requests with AWS SigV4.
    #[serde(default)]
    pub auth_enabled: bool,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_service")]
    pub service: String,

    /// Host used in the signature. Taken from `server_url` when empty.
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_path() -> String {
    "/api/restaurant/processBill".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_service() -> String {
    "execute-api".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for RoomAccountConfig {
    fn default() -> Self {
        RoomAccountConfig {
            server_url: String::new(),
            api_path: default_api_path(),
            auth_enabled: false,
            access_key: String::new(),
            secret_key: String::new(),
            region: default_region(),
            service: default_service(),
            host: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl RoomAccountConfig {
    /// Full endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), self.api_path)
    }

    /// Host for the signature: explicit, or the authority of `server_url`.
    pub fn signing_host(&self) -> String {
        if !self.host.is_empty() {
            return self.host.clone();
        }
        let without_scheme = self
            .server_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.server_url);
        without_scheme
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

// =============================================================================
// Main Till Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TillConfig {
    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub printer: PrinterConfig,

    #[serde(default)]
    pub room_account: RoomAccountConfig,
}

impl TillConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (till.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading till config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load till config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Till config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.terminal.client_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "terminal.client_name must not be empty".into(),
            ));
        }

        if self.printer.paper_width < 24 {
            return Err(ConfigError::InvalidConfig(
                "printer.paper_width must be at least 24".into(),
            ));
        }

        let room = &self.room_account;
        if !room.server_url.is_empty()
            && !room.server_url.starts_with("http://")
            && !room.server_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidConfig(format!(
                "room_account.server_url must start with http:// or https://, got: {}",
                room.server_url
            )));
        }

        if room.auth_enabled && (room.access_key.is_empty() || room.secret_key.is_empty()) {
            return Err(ConfigError::InvalidConfig(
                "room_account.auth_enabled needs access_key and secret_key".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("RASOI_CLIENT_NAME") {
            debug!(client_name = %name, "Overriding client name from environment");
            self.terminal.client_name = name;
        }

        if let Ok(suffix) = std::env::var("RASOI_FISCAL_SUFFIX") {
            self.terminal.fiscal_suffix = Some(suffix);
        }

        if let Ok(path) = std::env::var("RASOI_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(addr) = std::env::var("RASOI_PRINTER_ADDR") {
            debug!(addr = %addr, "Overriding printer address from environment");
            self.printer.address = addr;
        }

        if let Ok(timeout) = std::env::var("RASOI_PRINTER_CHECK_MS") {
            if let Ok(ms) = timeout.parse::<u64>() {
                self.printer.check_timeout_ms = ms;
            }
        }

        if let Ok(url) = std::env::var("RASOI_ROOM_SERVER_URL") {
            debug!(url = %url, "Overriding room-account server from environment");
            self.room_account.server_url = url;
        }

        if let Ok(enabled) = std::env::var("RASOI_ROOM_AUTH_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.room_account.auth_enabled = true,
                "0" | "false" | "no" => self.room_account.auth_enabled = false,
                _ => warn!(value = %enabled, "Unknown RASOI_ROOM_AUTH_ENABLED value"),
            }
        }

        if let Ok(key) = std::env::var("RASOI_ROOM_ACCESS_KEY") {
            self.room_account.access_key = key;
        }

        if let Ok(key) = std::env::var("RASOI_ROOM_SECRET_KEY") {
            self.room_account.secret_key = key;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rasoi", "pos")
            .map(|dirs| dirs.config_dir().join("till.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Fiscal suffix for bills issued on `today`.
    pub fn fiscal_suffix(&self, today: NaiveDate) -> String {
        self.terminal
            .fiscal_suffix
            .clone()
            .unwrap_or_else(|| fiscal_suffix(today))
    }

    pub fn receipt_header(&self) -> ReceiptHeader {
        ReceiptHeader {
            store_name: self.terminal.store_name.clone(),
            address: self.terminal.address.clone(),
            gstin: self.terminal.gstin.clone(),
            hsn_code: self.terminal.hsn_code.clone(),
        }
    }

    /// Configured database file, or `rasoi.db` in the platform data dir.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.rasoi.pos/rasoi.db`
    /// - **Windows**: `%APPDATA%\rasoi\pos\data\rasoi.db`
    /// - **Linux**: `~/.local/share/pos/rasoi.db`
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = directories::ProjectDirs::from("com", "rasoi", "pos").ok_or_else(|| {
            ConfigError::InvalidConfig("Could not determine app data directory".into())
        })?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("rasoi.db"))
    }
}
