//! MySQL/MariaDB session backed by a single SQLx connection.
//!
//! A dedicated connection rather than a pool: the rule table is
//! session-scoped and must survive from CREATE to the final SELECT.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlRow, MySqlSslMode};
use sqlx::{Column, ConnectOptions, Connection as _, Executor, Row, TypeInfo, ValueRef};
use tracing::{debug, info};

use crate::config::{DataSourceDescriptor, SslMode};
use crate::core::traits::{BoundQuery, Connection, ResultSet};
use crate::core::value::SqlValue;
use crate::dialect::Dialect;
use crate::error::{FetchError, Result};

/// A live MySQL session.
pub struct MysqlConnection {
    conn: Option<sqlx::MySqlConnection>,
    label: String,
}

impl MysqlConnection {
    /// Open a session to the described server.
    pub async fn connect(source: &DataSourceDescriptor) -> Result<Self> {
        let ssl_mode = match source.ssl_mode {
            SslMode::Disabled => MySqlSslMode::Disabled,
            SslMode::Preferred => MySqlSslMode::Preferred,
            SslMode::Required => MySqlSslMode::Required,
            SslMode::VerifyCa => MySqlSslMode::VerifyCa,
            SslMode::VerifyIdentity => MySqlSslMode::VerifyIdentity,
        };

        let options = MySqlConnectOptions::new()
            .host(&source.host)
            .port(source.port)
            .database(&source.database)
            .username(&source.user)
            .password(&source.password)
            .ssl_mode(ssl_mode);

        let label = format!("{}:{}/{}", source.host, source.port, source.database);
        let conn = options
            .connect()
            .await
            .map_err(|e| FetchError::connection(e, format!("connecting to MySQL {}", label)))?;

        info!("Connected to MySQL: {}", label);

        Ok(Self {
            conn: Some(conn),
            label,
        })
    }

    fn live(&mut self) -> Result<&mut sqlx::MySqlConnection> {
        let label = &self.label;
        self.conn
            .as_mut()
            .ok_or_else(|| FetchError::connection("connection is closed", label.clone()))
    }

    /// Convert a row to values, choosing the decoder from the column's type.
    fn row_to_values(row: &MySqlRow) -> Vec<SqlValue> {
        (0..row.len())
            .map(|i| {
                let is_null: bool = row.try_get_raw(i).map(|r| r.is_null()).unwrap_or(true);
                if is_null {
                    return SqlValue::Null;
                }

                let type_name = row.column(i).type_info().name().to_ascii_uppercase();
                let typed = match type_name.as_str() {
                    "BOOLEAN" => row.try_get::<bool, _>(i).map(SqlValue::Bool).ok(),
                    "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                        row.try_get::<i64, _>(i).map(SqlValue::I64).ok()
                    }
                    "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED"
                    | "INT UNSIGNED" | "BIGINT UNSIGNED" | "YEAR" => {
                        row.try_get::<u64, _>(i).map(SqlValue::U64).ok()
                    }
                    "FLOAT" | "DOUBLE" => row.try_get::<f64, _>(i).map(SqlValue::F64).ok(),
                    "DECIMAL" => row
                        .try_get::<rust_decimal::Decimal, _>(i)
                        .map(SqlValue::Decimal)
                        .ok(),
                    "DATE" => row.try_get::<chrono::NaiveDate, _>(i).map(SqlValue::Date).ok(),
                    "TIME" => row.try_get::<chrono::NaiveTime, _>(i).map(SqlValue::Time).ok(),
                    "DATETIME" | "TIMESTAMP" => row
                        .try_get::<chrono::NaiveDateTime, _>(i)
                        .map(SqlValue::DateTime)
                        .ok(),
                    "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
                    | "BIT" | "GEOMETRY" => {
                        row.try_get::<Vec<u8>, _>(i).map(SqlValue::Bytes).ok()
                    }
                    _ => None,
                };

                // Text and anything the typed decoders refused
                typed
                    .or_else(|| row.try_get::<String, _>(i).map(SqlValue::Text).ok())
                    .or_else(|| row.try_get::<Vec<u8>, _>(i).map(SqlValue::Bytes).ok())
                    .unwrap_or(SqlValue::Null)
            })
            .collect()
    }
}

#[async_trait]
impl Connection for MysqlConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn query(&mut self, query: &BoundQuery) -> Result<ResultSet> {
        let conn = self.live()?;
        debug!(sql = %query.sql, params = query.params.len(), "mysql query");

        let rows: Vec<MySqlRow> = if query.params.is_empty() {
            // Unprepared: ad-hoc SQL may not be preparable
            conn.fetch_all(query.sql.as_str()).await
        } else {
            let mut q = sqlx::query(&query.sql);
            for param in &query.params {
                q = q.bind(param);
            }
            q.fetch_all(&mut *conn).await
        }
        .map_err(|e| FetchError::query(&query.sql, e))?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<SqlValue>> = rows.iter().map(Self::row_to_values).collect();

        Ok(ResultSet::new(columns, rows))
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        let conn = self.live()?;
        debug!(sql, "mysql execute");
        let result = conn
            .execute(sql)
            .await
            .map_err(|e| FetchError::query(sql, e))?;
        Ok(result.rows_affected())
    }

    async fn execute_batch(&mut self, statements: &[String]) -> Result<()> {
        let conn = self.live()?;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| FetchError::query("BEGIN", e))?;
        for sql in statements {
            (&mut *tx)
                .execute(sql.as_str())
                .await
                .map_err(|e| FetchError::query(sql.as_str(), e))?;
        }
        tx.commit()
            .await
            .map_err(|e| FetchError::query("COMMIT", e))?;
        debug!(statements = statements.len(), "mysql batch committed");
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| FetchError::connection(e, format!("closing MySQL {}", self.label)))?;
            debug!("Closed MySQL connection: {}", self.label);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}
