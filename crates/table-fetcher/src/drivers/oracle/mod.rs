//! Oracle database driver.
//!
//! - [`OracleCatalog`]: dictionary-view and rule-table SQL
//! - [`OracleConnection`]: session over ODBC (only with the `oracle` feature)
//!
//! # Feature Flag
//!
//! The connection needs unixODBC and an Oracle ODBC driver at link and run
//! time, so it is opt-in:
//!
//! ```toml
//! [dependencies]
//! table-fetcher = { version = "0.3", features = ["oracle"] }
//! ```
//!
//! # Supported Versions
//!
//! Oracle 18c+ (private temporary tables).

mod dialect;
#[cfg(feature = "oracle")]
mod connection;

pub use dialect::OracleCatalog;
#[cfg(feature = "oracle")]
pub use connection::OracleConnection;
