//! Configuration management for faqdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "faqdesk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "faq.db";

/// Default backup file name.
const BACKUP_FILE_NAME: &str = "backup.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FAQDESK_`, nested with `__`)
/// 2. The bare `PORT` environment variable
/// 3. TOML config file at `~/.config/faqdesk/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Backup configuration.
    pub backup: BackupConfig,
    /// Message catalog configuration.
    pub i18n: I18nConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/faqdesk/faq.db`
    pub database_path: Option<PathBuf>,
    /// Path the backup copy is written to.
    /// Defaults to `~/.local/share/faqdesk/backup.db`
    pub backup_path: Option<PathBuf>,
}

/// Backup-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackupConfig {
    /// Run backups at all.
    pub enabled: bool,
    /// Take a backup before the server starts accepting requests.
    pub on_startup: bool,
    /// Take a backup after a successful delete.
    pub after_delete: bool,
}

/// Message catalog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Directory holding `<locale>.json` files.
    pub locales_dir: PathBuf,
    /// Locale tags to load.
    pub locales: Vec<String>,
    /// Locale used when a request does not name one.
    pub default_locale: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_startup: true,
            after_delete: false,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales_dir: PathBuf::from("locales"),
            locales: vec!["en-US".to_string(), "tr-TR".to_string()],
            default_locale: "en-US".to_string(),
        }
    }
}

impl Config {
    /// Load configuration, reading `config_path` or the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
            .merge(Env::prefixed("FAQDESK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config_validation("port must be greater than 0"));
        }

        if self.i18n.locales.is_empty() {
            return Err(Error::config_validation(
                "at least one locale must be configured",
            ));
        }

        if !self
            .i18n
            .locales
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(&self.i18n.default_locale))
        {
            return Err(Error::config_validation(format!(
                "default_locale ({}) is not one of the configured locales",
                self.i18n.default_locale
            )));
        }

        if self.database_path() == self.backup_path() {
            return Err(Error::config_validation(format!(
                "backup_path must differ from database_path ({})",
                self.database_path().display()
            )));
        }

        Ok(())
    }

    /// Get the socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the backup path, resolving defaults if not set.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.storage
            .backup_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(BACKUP_FILE_NAME))
    }
}
