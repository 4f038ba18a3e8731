//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{FetchError, Result};

/// Default ODBC driver name for Oracle data sources.
pub const DEFAULT_ODBC_DRIVER: &str = "Oracle 21 ODBC driver";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The data source every command runs against.
    pub datasource: DataSourceConfig,
}

/// Data source configuration as written in YAML.
#[derive(Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Dialect tag: `mysql` or `oracle`.
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306 for MySQL, 1521 for Oracle).
    #[serde(default)]
    pub port: Option<u16>,

    /// MySQL database, or Oracle service name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Schema (MySQL database, Oracle owner) used when a command names none.
    ///
    /// Defaults to `database` for MySQL and the upper-cased `user` for Oracle.
    #[serde(default)]
    pub schema: Option<String>,

    /// TLS mode for MySQL (default: preferred).
    #[serde(default)]
    pub ssl_mode: SslMode,

    /// ODBC driver name for Oracle.
    #[serde(default = "default_odbc_driver")]
    pub odbc_driver: String,
}

impl fmt::Debug for DataSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .field("odbc_driver", &self.odbc_driver)
            .finish()
    }
}

impl DataSourceConfig {
    /// Resolve defaults into an immutable descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedDialect`] when `type` is not a known
    /// dialect.
    pub fn descriptor(&self) -> Result<DataSourceDescriptor> {
        let dialect = Dialect::parse(&self.r#type)?;
        let schema = match &self.schema {
            Some(schema) if !schema.is_empty() => schema.clone(),
            _ => match dialect {
                Dialect::MySql => self.database.clone(),
                Dialect::Oracle => self.user.to_uppercase(),
            },
        };

        Ok(DataSourceDescriptor {
            dialect,
            host: self.host.clone(),
            port: self.port.unwrap_or_else(|| dialect.default_port()),
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            schema,
            ssl_mode: self.ssl_mode,
            odbc_driver: self.odbc_driver.clone(),
        })
    }
}

/// A validated data source: dialect parsed, defaults applied.
#[derive(Clone, PartialEq, Eq)]
pub struct DataSourceDescriptor {
    pub dialect: Dialect,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub schema: String,
    pub ssl_mode: SslMode,
    pub odbc_driver: String,
}

impl fmt::Debug for DataSourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSourceDescriptor")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("ssl_mode", &self.ssl_mode)
            .field("odbc_driver", &self.odbc_driver)
            .finish()
    }
}

/// TLS modes for MySQL connections.
///
/// These modes match MySQL's standard `--ssl-mode` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// No TLS (plain TCP connection).
    Disabled,
    /// Use TLS when the server supports it.
    #[default]
    Preferred,
    /// Require TLS but don't verify the server certificate.
    Required,
    /// Verify the server certificate against the CA but not the hostname.
    VerifyCa,
    /// Full certificate and hostname verification.
    VerifyIdentity,
}

impl SslMode {
    /// Parse an SSL mode from a string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disabled" => Ok(SslMode::Disabled),
            "preferred" | "" => Ok(SslMode::Preferred),
            "required" => Ok(SslMode::Required),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-identity" => Ok(SslMode::VerifyIdentity),
            other => Err(FetchError::Config(format!(
                "Invalid ssl_mode '{}'. Valid values: disabled, preferred, required, verify-ca, verify-identity",
                other
            ))),
        }
    }
}

fn default_odbc_driver() -> String {
    DEFAULT_ODBC_DRIVER.to_string()
}
