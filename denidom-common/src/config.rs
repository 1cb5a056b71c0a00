//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: it is logged and the
//! remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "DENIDOM_ROOT_FOLDER";
/// Environment variable overriding the HTTP bind address
pub const ENV_BIND_ADDRESS: &str = "DENIDOM_BIND_ADDRESS";
/// Environment variable carrying the token signing secret
pub const ENV_JWT_SECRET: &str = "DENIDOM_JWT_SECRET";
/// Environment variable carrying the generative AI API key
pub const ENV_AI_API_KEY: &str = "DENIDOM_AI_API_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "denidom.db";

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Folder holding the database file
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address, e.g. "0.0.0.0:5730"
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Token signing secret; generated and stored in the database when absent
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in hours
    #[serde(default)]
    pub token_ttl_hours: Option<i64>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ai: AiConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Generative AI endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Base URL of the generateContent API
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// Model name appended to the endpoint
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// API key; AI flows run in fallback mode when missing
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key: None,
            timeout_secs: default_ai_timeout(),
        }
    }
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub logging: LoggingConfig,
    pub ai: AiConfig,
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, environment and TOML
    pub fn resolve(cli_root: Option<&str>, cli_bind: Option<&str>) -> Self {
        let toml_config = match default_config_file() {
            Some(path) => load_toml_config(&path).unwrap_or_else(|e| {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }),
            None => {
                info!("No config file found, using defaults");
                TomlConfig::default()
            }
        };
        Self::from_sources(cli_root, cli_bind, &toml_config)
    }

    /// Merge already-loaded sources (CLI > ENV > TOML > defaults)
    pub fn from_sources(
        cli_root: Option<&str>,
        cli_bind: Option<&str>,
        toml_config: &TomlConfig,
    ) -> Self {
        let root_folder = resolve_root_folder(cli_root, toml_config);

        let bind_address = cli_bind
            .map(str::to_string)
            .or_else(|| non_empty_env(ENV_BIND_ADDRESS))
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = non_empty_env(ENV_JWT_SECRET).or_else(|| {
            toml_config
                .jwt_secret
                .clone()
                .filter(|s| !s.trim().is_empty())
        });

        let mut ai = toml_config.ai.clone();
        if let Some(key) = non_empty_env(ENV_AI_API_KEY) {
            ai.api_key = Some(key);
        }

        Self {
            root_folder,
            bind_address,
            jwt_secret,
            token_ttl_hours: toml_config.token_ttl_hours.filter(|h| *h > 0).unwrap_or(24),
            logging: toml_config.logging.clone(),
            ai,
        }
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    /// Create the root folder if missing
    pub fn ensure_root_folder(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }
}

/// Resolve the root folder: CLI → ENV → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Some(path) = non_empty_env(ENV_ROOT_FOLDER) {
        return PathBuf::from(path);
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// First existing config file: user config dir, then system-wide
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("denidom").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/denidom/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("denidom"))
        .unwrap_or_else(|| PathBuf::from("./denidom_data"))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
