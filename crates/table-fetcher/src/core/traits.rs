//! Core traits for dialect-abstracted catalog access.
//!
//! - [`CatalogDialect`]: SQL generation strategy for one engine's catalog
//!   and rule temporary table
//! - [`Connection`]: the live session every operation runs on
//!
//! Acquiring a connection (driver setup, credentials, TLS) is the job of
//! [`crate::drivers::connect`] or of the embedding service. The fetcher only
//! needs the small surface below: run a query, run a statement, run a batch,
//! and close.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::dialect::Dialect;
use crate::error::Result;

use super::schema::{ColumnFilter, TableFilter};
use super::value::SqlValue;

/// A statement plus its positional parameters.
///
/// Parameters are bound with the driver's placeholder syntax (`?` for MySQL).
/// Dialects that inline escaped literals leave `params` empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<String>,
}

impl BoundQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Catalog SQL strategy for one engine.
///
/// Implementations only build SQL; running it is the caller's job.
pub trait CatalogDialect {
    /// Dialect tag.
    fn dialect(&self) -> Dialect;

    /// Tables of a schema. Result column: `TABLE_NAME`.
    fn list_tables_query(&self, filter: &TableFilter) -> BoundQuery;

    /// Columns of a table. Result columns: `COLUMN_NAME`, `DATA_TYPE`.
    fn list_columns_query(&self, filter: &ColumnFilter) -> BoundQuery;

    /// Primary key columns of a table. Result column: `COLUMN_NAME`.
    fn primary_keys_query(&self, schema: &str, table: &str) -> BoundQuery;

    /// Column facets of a table. Result columns: `COLUMN_NAME`, `DATA_TYPE`,
    /// `DATA_LENGTH`, `DATA_PRECISION`, `DATA_SCALE`.
    fn column_info_query(&self, schema: &str, table: &str) -> BoundQuery;

    /// DDL creating the rule table with `width` string columns `c1..cN`.
    fn create_rule_table(&self, width: usize) -> String;

    /// Insert of one already-padded row into the rule table.
    fn insert_rule_row(&self, row: &[String]) -> String {
        let values = row
            .iter()
            .map(|cell| self.quote_literal(cell))
            .collect::<Vec<_>>()
            .join(",");
        format!("INSERT INTO {} VALUES ({})", self.rule_table(), values)
    }

    /// DDL dropping the rule table.
    fn drop_rule_table(&self) -> String;

    /// Name of the rule table rule SQL must select from.
    fn rule_table(&self) -> &'static str {
        self.dialect().capabilities().rule_table
    }

    /// Quote a string literal, doubling embedded single quotes.
    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// A fully fetched result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column labels in result order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by label, ignoring ASCII case.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(label))
    }

    /// Value at `row` for the labelled column, `Null` when absent.
    pub fn value(&self, row: usize, label: &str) -> &SqlValue {
        const NULL: &SqlValue = &SqlValue::Null;
        self.column_index(label)
            .and_then(|idx| self.rows.get(row).and_then(|r| r.get(idx)))
            .unwrap_or(NULL)
    }

    /// String value at `row` for the labelled column.
    pub fn text(&self, row: usize, label: &str) -> Option<String> {
        self.value(row, label).to_text()
    }
}

/// One live database session.
///
/// A connection is exclusively owned by the operation using it. `close` is
/// idempotent; any other call after `close` fails with
/// [`FetchError::Connection`](crate::error::FetchError::Connection).
#[async_trait]
pub trait Connection: Send {
    /// Dialect this session speaks.
    fn dialect(&self) -> Dialect;

    /// Run a query and fetch every row.
    async fn query(&mut self, query: &BoundQuery) -> Result<ResultSet>;

    /// Run a statement that returns no rows. Returns the affected row count.
    async fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Run several statements as one batch.
    ///
    /// The batch stops at the first failing statement.
    async fn execute_batch(&mut self, statements: &[String]) -> Result<()>;

    /// Close the session.
    async fn close(&mut self) -> Result<()>;

    /// Whether `close` has been called or the session was lost.
    fn is_closed(&self) -> bool;
}

/// A connection shared between callers that must take turns.
///
/// Holding the lock is the only way to use the connection, so multi-statement
/// work such as a rule session cannot interleave with another caller's.
pub type SharedConnection = Arc<Mutex<Box<dyn Connection>>>;

/// Wrap a connection for shared, serialized use.
pub fn share(conn: Box<dyn Connection>) -> SharedConnection {
    Arc::new(Mutex::new(conn))
}
