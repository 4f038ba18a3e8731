//! Configuration validation.

use super::Config;
use crate::dialect::Dialect;
use crate::error::{FetchError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let source = &config.datasource;

    // Dialect first: an unknown tag is reported before anything else
    Dialect::parse(&source.r#type)?;

    if source.host.is_empty() {
        return Err(FetchError::Config("datasource.host is required".into()));
    }
    if source.database.is_empty() {
        return Err(FetchError::Config("datasource.database is required".into()));
    }
    if source.user.is_empty() {
        return Err(FetchError::Config("datasource.user is required".into()));
    }
    if let Some(0) = source.port {
        return Err(FetchError::Config(
            "datasource.port must be between 1 and 65535".into(),
        ));
    }
    if source.odbc_driver.trim().is_empty() {
        return Err(FetchError::Config(
            "datasource.odbc_driver must not be empty".into(),
        ));
    }

    Ok(())
}
