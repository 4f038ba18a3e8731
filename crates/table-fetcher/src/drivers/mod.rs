//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB driver
//! - [`oracle`]: Oracle driver
//!
//! # Architecture
//!
//! Each driver module provides:
//! - a [`CatalogDialect`] implementation building catalog and rule-table SQL
//! - a [`Connection`] implementation, gated behind the driver's feature flag
//!
//! [`CatalogImpl`] selects the SQL strategy for a [`Dialect`] with a manual
//! enum dispatch; [`connect`] opens a session for a configured data source.

pub mod mysql;
pub mod oracle;

pub use mysql::MysqlCatalog;
pub use oracle::OracleCatalog;

use crate::config::DataSourceDescriptor;
use crate::core::schema::{ColumnFilter, TableFilter};
use crate::core::traits::{BoundQuery, CatalogDialect, Connection};
use crate::dialect::Dialect;
use crate::error::Result;

/// Enum-based static dispatch for catalog strategies.
///
/// The compiler generates a match statement instead of vtable dispatch.
#[derive(Debug, Clone)]
pub enum CatalogImpl {
    MySql(MysqlCatalog),
    Oracle(OracleCatalog),
}

impl CatalogImpl {
    /// Catalog strategy for a dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::MySql => CatalogImpl::MySql(MysqlCatalog::new()),
            Dialect::Oracle => CatalogImpl::Oracle(OracleCatalog::new()),
        }
    }

    /// Catalog strategy for a dialect tag such as `"mysql"`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UnsupportedDialect`](crate::error::FetchError::UnsupportedDialect)
    /// for any tag other than `mysql` or `oracle`.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        Dialect::parse(db_type).map(Self::for_dialect)
    }
}

impl CatalogDialect for CatalogImpl {
    fn dialect(&self) -> Dialect {
        match self {
            CatalogImpl::MySql(d) => d.dialect(),
            CatalogImpl::Oracle(d) => d.dialect(),
        }
    }

    fn list_tables_query(&self, filter: &TableFilter) -> BoundQuery {
        match self {
            CatalogImpl::MySql(d) => d.list_tables_query(filter),
            CatalogImpl::Oracle(d) => d.list_tables_query(filter),
        }
    }

    fn list_columns_query(&self, filter: &ColumnFilter) -> BoundQuery {
        match self {
            CatalogImpl::MySql(d) => d.list_columns_query(filter),
            CatalogImpl::Oracle(d) => d.list_columns_query(filter),
        }
    }

    fn primary_keys_query(&self, schema: &str, table: &str) -> BoundQuery {
        match self {
            CatalogImpl::MySql(d) => d.primary_keys_query(schema, table),
            CatalogImpl::Oracle(d) => d.primary_keys_query(schema, table),
        }
    }

    fn column_info_query(&self, schema: &str, table: &str) -> BoundQuery {
        match self {
            CatalogImpl::MySql(d) => d.column_info_query(schema, table),
            CatalogImpl::Oracle(d) => d.column_info_query(schema, table),
        }
    }

    fn create_rule_table(&self, width: usize) -> String {
        match self {
            CatalogImpl::MySql(d) => d.create_rule_table(width),
            CatalogImpl::Oracle(d) => d.create_rule_table(width),
        }
    }

    fn insert_rule_row(&self, row: &[String]) -> String {
        match self {
            CatalogImpl::MySql(d) => d.insert_rule_row(row),
            CatalogImpl::Oracle(d) => d.insert_rule_row(row),
        }
    }

    fn drop_rule_table(&self) -> String {
        match self {
            CatalogImpl::MySql(d) => d.drop_rule_table(),
            CatalogImpl::Oracle(d) => d.drop_rule_table(),
        }
    }

    fn quote_literal(&self, value: &str) -> String {
        match self {
            CatalogImpl::MySql(d) => d.quote_literal(value),
            CatalogImpl::Oracle(d) => d.quote_literal(value),
        }
    }
}

/// Open a session for a configured data source.
///
/// # Errors
///
/// Returns [`FetchError::Config`](crate::error::FetchError::Config) when the
/// driver for the data source's dialect was not compiled in, and
/// [`FetchError::Connection`](crate::error::FetchError::Connection) when the
/// server cannot be reached.
pub async fn connect(source: &DataSourceDescriptor) -> Result<Box<dyn Connection>> {
    match source.dialect {
        #[cfg(feature = "mysql")]
        Dialect::MySql => Ok(Box::new(mysql::MysqlConnection::connect(source).await?)),
        #[cfg(feature = "oracle")]
        Dialect::Oracle => Ok(Box::new(oracle::OracleConnection::connect(source).await?)),
        #[allow(unreachable_patterns)]
        other => Err(crate::error::FetchError::Config(format!(
            "{} support is not compiled in; rebuild with the '{}' feature",
            other, other
        ))),
    }
}
