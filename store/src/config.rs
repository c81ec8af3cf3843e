//! Database connection settings.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_NAME: &str = "DB_NAME";
pub const ENV_SSLMODE: &str = "DB_SSLMODE";

/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;

/// TLS negotiation mode.
///
/// Connections are made without a TLS connector, so only the modes that can
/// fall back to plaintext are accepted. `require`, `verify-ca` and
/// `verify-full` are rejected when parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    #[default]
    Prefer,
}

impl FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "prefer" => Ok(Self::Prefer),
            mode @ ("require" | "verify-ca" | "verify-full") => Err(format!(
                "ssl mode {mode:?} needs a TLS connector, which is not available; \
                 use \"disable\" or \"prefer\""
            )),
            other => Err(format!("unsupported ssl mode {other:?}")),
        }
    }
}

impl From<SslMode> for tokio_postgres::config::SslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => Self::Disable,
            SslMode::Prefer => Self::Prefer,
        }
    }
}

/// Connection settings for the embeddings database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
    pub ssl_mode: SslMode,
}

impl DatabaseConfig {
    /// Create a config with the default port and SSL mode.
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            password: None,
            dbname: dbname.into(),
            ssl_mode: SslMode::default(),
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the SSL mode.
    pub fn with_ssl_mode(mut self, ssl_mode: SslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    /// Read the `DB_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// `DB_HOST`, `DB_USER` and `DB_NAME` are required; empty values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(StoreError::MissingVar(key));

        let port = match get(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| StoreError::InvalidVar {
                    name: ENV_PORT,
                    reason: format!("{raw:?}: {e}"),
                })?,
            None => DEFAULT_PORT,
        };

        let ssl_mode = match get(ENV_SSLMODE) {
            Some(raw) => raw.parse().map_err(|reason| StoreError::InvalidVar {
                name: ENV_SSLMODE,
                reason,
            })?,
            None => SslMode::default(),
        };

        Ok(Self {
            host: required(ENV_HOST)?,
            port,
            user: required(ENV_USER)?,
            password: get(ENV_PASSWORD),
            dbname: required(ENV_NAME)?,
            ssl_mode,
        })
    }

    /// Convert to a `tokio-postgres` connection config.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.dbname)
            .ssl_mode(self.ssl_mode.into());
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("dbname", &self.dbname)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_full() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "reader"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_NAME", "vectors"),
            ("DB_SSLMODE", "disable"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            DatabaseConfig::new("db.internal", "reader", "vectors")
                .with_port(6543)
                .with_password("hunter2")
                .with_ssl_mode(SslMode::Disable)
        );
    }

    #[test]
    fn test_defaults_for_optional_vars() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DB_HOST", "localhost"),
            ("DB_USER", "postgres"),
            ("DB_NAME", "postgres"),
            ("DB_PASSWORD", ""),
        ]))
        .unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.password, None);
        assert_eq!(config.ssl_mode, SslMode::Prefer);
    }

    #[test]
    fn test_missing_required_var() {
        let err = DatabaseConfig::from_lookup(lookup(&[("DB_HOST", "h"), ("DB_USER", "u")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingVar("DB_NAME")));
    }

    #[test]
    fn test_invalid_port() {
        let err = DatabaseConfig::from_lookup(lookup(&[
            ("DB_HOST", "h"),
            ("DB_USER", "u"),
            ("DB_NAME", "n"),
            ("DB_PORT", "99999"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidVar { name: "DB_PORT", .. }));
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let err = DatabaseConfig::from_lookup(lookup(&[
            ("DB_HOST", "h"),
            ("DB_USER", "u"),
            ("DB_NAME", "n"),
            ("DB_SSLMODE", "verify-full"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidVar { name: "DB_SSLMODE", .. }));
    }

    #[test]
    fn test_tls_only_ssl_modes_are_rejected() {
        for mode in ["require", "REQUIRE", "verify-ca", "verify-full"] {
            let err = DatabaseConfig::from_lookup(lookup(&[
                ("DB_HOST", "h"),
                ("DB_USER", "u"),
                ("DB_NAME", "n"),
                ("DB_SSLMODE", mode),
            ]))
            .unwrap_err();
            match err {
                StoreError::InvalidVar { name, reason } => {
                    assert_eq!(name, "DB_SSLMODE");
                    assert!(reason.contains("TLS connector"), "{reason}");
                }
                other => panic!("unexpected error for {mode}: {other}"),
            }
        }
    }

    #[test]
    fn test_plaintext_ssl_modes_parse() {
        assert_eq!("disable".parse::<SslMode>(), Ok(SslMode::Disable));
        assert_eq!(" Prefer ".parse::<SslMode>(), Ok(SslMode::Prefer));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig::new("h", "u", "n").with_password("s3cret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_pg_config_carries_settings() {
        let config = DatabaseConfig::new("h", "u", "n").with_port(7000);
        let pg = config.to_pg_config();
        assert_eq!(pg.get_user(), Some("u"));
        assert_eq!(pg.get_dbname(), Some("n"));
        assert_eq!(pg.get_ports(), &[7000]);
    }
}
