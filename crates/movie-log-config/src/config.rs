use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::PathManager;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rss: RssConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_details_url")]
    pub details_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Shared secret guarding every mutating or metadata endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_key: String,
}

/// Channel metadata for the `/rss` feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_port() -> u16 {
    3306
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_search_url() -> String {
    "https://private.omdbapi.com/".to_string()
}

fn default_details_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

// serde's field defaults only apply when reading a file; env-only setups start here
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_db_port(),
            user: String::new(),
            password: String::new(),
            name: String::new(),
        }
    }
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            search_url: default_search_url(),
            details_url: default_details_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (explicit path or the default location if it exists),
    /// then `MOVIETHING_*` environment variables.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = PathManager::default().config_file();
                if default_path.exists() {
                    Self::load_from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay environment settings; `lookup` is `std::env::var` outside of tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("MOVIETHING_SQL_HOST") {
            self.database.host = v;
        }
        if let Some(port) = get("MOVIETHING_SQL_PORT").and_then(|v| v.parse().ok()) {
            self.database.port = port;
        }
        if let Some(v) = get("MOVIETHING_SQL_USER") {
            self.database.user = v;
        }
        if let Some(v) = get("MOVIETHING_SQL_PASS") {
            self.database.password = v;
        }
        if let Some(v) = get("MOVIETHING_SQL_DB") {
            self.database.name = v;
        }
        if let Some(v) = get("MOVIETHING_OMDB_API_KEY") {
            self.omdb.api_key = v;
        }
        if let Some(v) = get("MOVIETHING_VALID_API_KEY") {
            self.auth.api_key = v;
        }
        if let Some(v) = get("MOVIETHING_RSS_TITLE") {
            self.rss.title = v;
        }
        if let Some(v) = get("MOVIETHING_RSS_DESCRIPTION") {
            self.rss.description = v;
        }
        if let Some(v) = get("MOVIETHING_BASE_URL") {
            self.rss.base_url = v;
        }
        if let Some(v) = get("MOVIETHING_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(port) = get("SERVER_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(v) = get("MOVIETHING_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(v));
        }
    }

    /// Fail fast on anything the server cannot run without.
    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("MOVIETHING_SQL_HOST", "database.host", &self.database.host),
            ("MOVIETHING_SQL_USER", "database.user", &self.database.user),
            ("MOVIETHING_SQL_PASS", "database.password", &self.database.password),
            ("MOVIETHING_SQL_DB", "database.name", &self.database.name),
            ("MOVIETHING_OMDB_API_KEY", "omdb.api_key", &self.omdb.api_key),
            ("MOVIETHING_VALID_API_KEY", "auth.api_key", &self.auth.api_key),
            ("MOVIETHING_RSS_TITLE", "rss.title", &self.rss.title),
            ("MOVIETHING_RSS_DESCRIPTION", "rss.description", &self.rss.description),
        ];
        for (env, key, value) in required {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "Missing configuration: set {} or `{}` in the config file",
                    env,
                    key
                ));
            }
        }

        if self.database.port == 0 {
            return Err(anyhow::anyhow!(
                "database.port must be greater than zero (MOVIETHING_SQL_PORT)"
            ));
        }

        if self.omdb.timeout_secs == 0 {
            return Err(anyhow::anyhow!("omdb.timeout_secs must be greater than zero"));
        }

        Ok(())
    }

    /// Copy with every secret replaced by a mask, for display.
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.database.password = mask(&copy.database.password);
        copy.omdb.api_key = mask(&copy.omdb.api_key);
        copy.auth.api_key = mask(&copy.auth.api_key);
        copy
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
