//! # table-fetcher
//!
//! Dialect-abstracting table metadata and ad-hoc query service for MySQL
//! and Oracle.
//!
//! This library provides:
//!
//! - **Catalog listing** of tables, unsupported columns and column details
//! - **Column classification** against per-dialect type allowlists
//! - **Safe browsing** of caller SELECTs with ordering and a row cap added
//! - **Rule evaluation** of SQL against caller rows loaded into a temporary table
//!
//! Every operation takes ownership of one connection and closes it before
//! returning.
//!
//! ## Example
//!
//! ```rust,no_run
//! use table_fetcher::{drivers, Config, TableFetcher, TableFilter};
//!
//! #[tokio::main]
//! async fn main() -> table_fetcher::Result<()> {
//!     let source = Config::load("config.yaml")?.descriptor()?;
//!     let fetcher = TableFetcher::for_source(&source);
//!     let conn = drivers::connect(&source).await?;
//!     let tables = fetcher
//!         .list_tables(conn, &TableFilter::new(source.schema.clone()))
//!         .await?;
//!     println!("Found {} tables", tables.len());
//!     Ok(())
//! }
//! ```

pub mod browse;
pub mod classify;
pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod fetcher;
pub mod rule;

// Re-exports for convenient access
pub use browse::BrowseOutcome;
pub use classify::{classify, Classification, TypeSupport};
pub use config::{Config, DataSourceConfig, DataSourceDescriptor, SslMode};
pub use crate::core::{
    share, BoundQuery, CatalogDialect, ColumnDescriptor, ColumnFilter, ColumnInfoRow, Connection,
    ResultSet, RowMapping, RuleRowSet, SharedConnection, SqlValue, TableDescriptor, TableFilter,
    TableRef,
};
pub use dialect::Dialect;
pub use error::{FetchError, Result, RulePhase};
pub use fetcher::TableFetcher;
pub use rule::RuleSession;
