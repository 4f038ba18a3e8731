//! Oracle session over ODBC.
//!
//! One ODBC connection is held for the lifetime of the session so that the
//! private temporary rule table stays visible between statements. ODBC calls
//! are blocking; each runs to completion inside the async method.

use std::sync::OnceLock;

use async_trait::async_trait;
use odbc_api::{
    buffers::TextRowSet, ConnectionOptions, Cursor, DataType, Environment, ResultSetMetadata,
};
use tracing::{debug, info};

use crate::config::DataSourceDescriptor;
use crate::core::traits::{BoundQuery, Connection, ResultSet};
use crate::core::value::SqlValue;
use crate::dialect::Dialect;
use crate::error::{FetchError, Result};

/// Rows fetched per ODBC round trip.
const FETCH_BATCH_ROWS: usize = 1000;

/// Upper bound for a single text cell. Longer cells fail the fetch.
const MAX_CELL_BYTES: usize = 4096;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| {
        FetchError::connection(
            format!(
                "Failed to create ODBC environment: {}. \
                 Make sure unixODBC and the Oracle Instant Client ODBC driver are installed.",
                e
            ),
            "ODBC environment",
        )
    })?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

/// A live Oracle session.
pub struct OracleConnection {
    conn: Option<odbc_api::Connection<'static>>,
    label: String,
}

impl OracleConnection {
    /// Open a session to the described service.
    ///
    /// `database` is the service name; the driver is addressed with an
    /// EZConnect `host:port/service` string.
    pub async fn connect(source: &DataSourceDescriptor) -> Result<Self> {
        let env = environment()?;
        let label = format!("{}:{}/{}", source.host, source.port, source.database);

        let connection_string = format!(
            "Driver={{{}}};DBQ={};UID={};PWD={};",
            source.odbc_driver, label, source.user, source.password
        );
        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};DBQ={};...",
            source.odbc_driver, label
        );

        let conn = env
            .connect_with_connection_string(&connection_string, ConnectionOptions::default())
            .map_err(|e| {
                FetchError::connection(
                    format!(
                        "Failed to connect to Oracle via ODBC: {}. Check that the username and password are correct.",
                        e
                    ),
                    format!("connecting to Oracle {}", label),
                )
            })?;

        info!("Connected to Oracle via ODBC: {}", label);

        Ok(Self {
            conn: Some(conn),
            label,
        })
    }

    fn live(&self) -> Result<&odbc_api::Connection<'static>> {
        self.conn
            .as_ref()
            .ok_or_else(|| FetchError::connection("connection is closed", self.label.clone()))
    }

    fn run_query(&self, sql: &str) -> Result<ResultSet> {
        let conn = self.live()?;
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<SqlValue>> = Vec::new();

        let Some(mut cursor) = conn
            .execute(sql, ())
            .map_err(|e| FetchError::query(sql, e))?
        else {
            return Ok(ResultSet::new(columns, rows));
        };

        let num_cols = cursor
            .num_result_cols()
            .map_err(|e| FetchError::query(sql, format!("Failed to get column count: {}", e)))?;
        let mut temporal = Vec::with_capacity(num_cols as usize);
        for col in 1..=num_cols as u16 {
            let name = cursor
                .col_name(col)
                .map_err(|e| FetchError::query(sql, format!("Failed to read column name: {}", e)))?;
            let data_type = cursor
                .col_data_type(col)
                .map_err(|e| FetchError::query(sql, format!("Failed to read column type: {}", e)))?;
            columns.push(name);
            temporal.push(matches!(
                data_type,
                DataType::Timestamp { .. } | DataType::Date
            ));
        }

        let mut buffers =
            TextRowSet::for_cursor(FETCH_BATCH_ROWS, &mut cursor, Some(MAX_CELL_BYTES))
                .map_err(|e| FetchError::query(sql, format!("Failed to create row buffer: {}", e)))?;
        let mut row_cursor = cursor
            .bind_buffer(&mut buffers)
            .map_err(|e| FetchError::query(sql, format!("Failed to bind buffer: {}", e)))?;

        while let Some(batch) = row_cursor
            .fetch_with_truncation_check(true)
            .map_err(|e| fetch_error(sql, &columns, e))?
        {
            for row_idx in 0..batch.num_rows() {
                let row: Vec<SqlValue> = (0..columns.len())
                    .map(|col_idx| {
                        batch
                            .at(col_idx, row_idx)
                            .map(|bytes| convert_text(bytes, temporal[col_idx]))
                            .unwrap_or(SqlValue::Null)
                    })
                    .collect();
                rows.push(row);
            }
        }

        Ok(ResultSet::new(columns, rows))
    }

    fn run_statement(&self, sql: &str) -> Result<()> {
        let conn = self.live()?;
        conn.execute(sql, ())
            .map_err(|e| FetchError::query(sql, e))?;
        Ok(())
    }
}

/// Map a fetch failure. A cell longer than the buffer is an error, never a
/// silently shortened value.
fn fetch_error(sql: &str, columns: &[String], e: odbc_api::Error) -> FetchError {
    match e {
        odbc_api::Error::TooLargeValueForBuffer { buffer_index, .. } => {
            let column = columns
                .get(buffer_index)
                .map(String::as_str)
                .unwrap_or("?");
            FetchError::query(
                sql,
                format!(
                    "value of column {} exceeds {} bytes and would be truncated",
                    column, MAX_CELL_BYTES
                ),
            )
        }
        other => FetchError::query(sql, format!("Failed to fetch rows: {}", other)),
    }
}

/// Convert one text cell, parsing date and timestamp columns.
fn convert_text(bytes: &[u8], temporal: bool) -> SqlValue {
    let text = SqlValue::Text(String::from_utf8_lossy(bytes).into_owned());
    if temporal {
        text.to_timestamp().unwrap_or(text)
    } else {
        text
    }
}

#[async_trait]
impl Connection for OracleConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    async fn query(&mut self, query: &BoundQuery) -> Result<ResultSet> {
        if !query.params.is_empty() {
            return Err(FetchError::query(
                &query.sql,
                "positional parameters are not supported over ODBC; inline escaped literals",
            ));
        }
        debug!(sql = %query.sql, "oracle query");
        self.run_query(&query.sql)
    }

    /// ODBC does not report an affected row count on this path; returns 0.
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        debug!(sql, "oracle execute");
        self.run_statement(sql)?;
        Ok(0)
    }

    async fn execute_batch(&mut self, statements: &[String]) -> Result<()> {
        for sql in statements {
            self.run_statement(sql)?;
        }
        debug!(statements = statements.len(), "oracle batch executed");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            drop(conn);
            debug!("Closed Oracle connection: {}", self.label);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}
