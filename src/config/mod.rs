//! Configuration module for the link directory.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Email address that is granted the admin role when it registers.
///
/// Overridable via `LINKDIR_ADMIN_EMAIL`; the default matches the
/// bootstrap account of the original deployment.
const DEFAULT_ADMIN_EMAIL: &str = "moinulbd.sk@gmail.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Email that is auto-promoted to admin on registration
    pub admin_email: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("LINKDIR_DB_PATH")
            .unwrap_or_else(|_| "./data/linkdir.sqlite".to_string())
            .into();

        let admin_email =
            env::var("LINKDIR_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());

        let log_level = env::var("LINKDIR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            admin_email,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("LINKDIR_DB_PATH");
        env::remove_var("LINKDIR_ADMIN_EMAIL");
        env::remove_var("LINKDIR_LOG_LEVEL");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/linkdir.sqlite"));
        assert_eq!(config.admin_email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(config.log_level, "info");
    }
}
