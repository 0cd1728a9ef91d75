pub mod config;
pub mod paths;

pub use config::{AuthConfig, Config, DatabaseConfig, LoggingConfig, OmdbConfig, RssConfig, ServerConfig};
pub use paths::PathManager;
