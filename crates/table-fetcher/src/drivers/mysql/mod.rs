//! MySQL/MariaDB database driver.
//!
//! - [`MysqlCatalog`]: catalog and rule-table SQL
//! - [`MysqlConnection`]: session over a dedicated SQLx connection
//!   (only with the `mysql` feature)
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod dialect;
#[cfg(feature = "mysql")]
mod connection;

pub use dialect::MysqlCatalog;
#[cfg(feature = "mysql")]
pub use connection::MysqlConnection;
