//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `IAM_*` environment variables or a
//! configuration file. Without a database URL the server keeps every
//! entity in memory.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Settings for the HTTP listener and the storage backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IAM")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// PostgreSQL connection URL; in-memory storage when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Parse the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_address
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDRESS)
            .parse()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "IAM_BIND_ADDRESS",
        "IAM_DATABASE_URL",
        "IAM_POOL_MAX_SIZE",
        "IAM_RUN_MIGRATIONS",
    ];

    fn load(args: &[&str]) -> AppSettings {
        let argv = std::iter::once(OsString::from("iam-backend"))
            .chain(args.iter().map(OsString::from));
        AppSettings::load_from_iter(argv).expect("config should load")
    }

    #[rstest]
    fn defaults_select_memory_storage() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load(&[]);

        assert_eq!(settings.database_url(), None);
        assert_eq!(
            settings.bind_addr().ok(),
            DEFAULT_BIND_ADDRESS.parse().ok()
        );
        assert!(settings.run_migrations);
        assert!(settings.pool_max_size.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("IAM_BIND_ADDRESS", Some("127.0.0.1:9000".to_owned())),
            (
                "IAM_DATABASE_URL",
                Some("postgres://iam@localhost/iam".to_owned()),
            ),
            ("IAM_POOL_MAX_SIZE", Some("4".to_owned())),
            ("IAM_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load(&[]);

        assert_eq!(settings.database_url(), Some("postgres://iam@localhost/iam"));
        assert_eq!(settings.bind_addr().map(|addr| addr.port()).ok(), Some(9000));
        assert_eq!(settings.pool_max_size, Some(4));
        assert!(!settings.run_migrations);
    }

    #[rstest]
    fn blank_database_url_means_memory() {
        let _guard = lock_env([("IAM_DATABASE_URL", Some("  ".to_owned()))]);

        assert_eq!(load(&[]).database_url(), None);
    }

    #[rstest]
    fn malformed_bind_address_is_an_error() {
        let _guard = lock_env([("IAM_BIND_ADDRESS", Some("localhost".to_owned()))]);

        assert!(load(&[]).bind_addr().is_err());
    }
}
