//! The table fetcher service.
//!
//! Every operation is handed one connection, owns it for the duration of the
//! call and closes it before returning, whether the call succeeded or not.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::browse::{augment, materialize, Augmented, BrowseOutcome};
use crate::classify::classify;
use crate::config::DataSourceDescriptor;
use crate::core::row::{RowMapping, RuleRowSet};
use crate::core::schema::{
    composite_data_type, ColumnDescriptor, ColumnFilter, ColumnInfoRow, TableDescriptor,
    TableFilter, TableRef,
};
use crate::core::traits::{BoundQuery, CatalogDialect, Connection, SharedConnection};
use crate::dialect::Dialect;
use crate::drivers::CatalogImpl;
use crate::error::Result;
use crate::rule;

/// Catalog listing, ad-hoc browsing and rule evaluation for one dialect.
#[derive(Debug, Clone)]
pub struct TableFetcher {
    dialect: Dialect,
    catalog: CatalogImpl,
}

impl TableFetcher {
    /// Fetcher for a dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            catalog: CatalogImpl::for_dialect(dialect),
        }
    }

    /// Fetcher for a configured data source.
    pub fn for_source(source: &DataSourceDescriptor) -> Self {
        Self::new(source.dialect)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Check that the session answers a trivial query.
    pub async fn ping(&self, mut conn: Box<dyn Connection>) -> Result<()> {
        let sql = match self.dialect {
            Dialect::MySql => "SELECT 1",
            Dialect::Oracle => "SELECT 1 FROM DUAL",
        };
        let result = conn.query(&BoundQuery::new(sql)).await.map(|_| ());
        release(conn, result).await
    }

    /// List the base tables of a schema.
    ///
    /// Every descriptor carries the same `create_time`: the moment of this call.
    pub async fn list_tables(
        &self,
        mut conn: Box<dyn Connection>,
        filter: &TableFilter,
    ) -> Result<Vec<TableDescriptor>> {
        let result = self.fetch_tables(conn.as_mut(), filter).await;
        release(conn, result).await
    }

    async fn fetch_tables(
        &self,
        conn: &mut dyn Connection,
        filter: &TableFilter,
    ) -> Result<Vec<TableDescriptor>> {
        let result = conn.query(&self.catalog.list_tables_query(filter)).await?;
        let seen_at = Utc::now();
        let tables: Vec<TableDescriptor> = (0..result.rows.len())
            .filter_map(|row| result.text(row, "TABLE_NAME"))
            .map(|name| TableDescriptor::new(name, seen_at))
            .collect();
        debug!(schema = %filter.schema, tables = tables.len(), "listed tables");
        Ok(tables)
    }

    /// List the columns of a table whose type the dialect cannot capture.
    ///
    /// Supported columns are left out. Unsupported columns whose type is in
    /// the incompatibility set carry a `name/type` annotation.
    pub async fn list_columns(
        &self,
        mut conn: Box<dyn Connection>,
        filter: &ColumnFilter,
    ) -> Result<Vec<ColumnDescriptor>> {
        let result = self.fetch_unsupported_columns(conn.as_mut(), filter).await;
        release(conn, result).await
    }

    async fn fetch_unsupported_columns(
        &self,
        conn: &mut dyn Connection,
        filter: &ColumnFilter,
    ) -> Result<Vec<ColumnDescriptor>> {
        let result = conn.query(&self.catalog.list_columns_query(filter)).await?;
        let mut columns = Vec::new();
        for row in 0..result.rows.len() {
            let column_name = result.text(row, "COLUMN_NAME").unwrap_or_default();
            let data_type = result.text(row, "DATA_TYPE").unwrap_or_default();
            let classification = classify(self.dialect, &data_type);
            if classification.is_supported() {
                continue;
            }
            let incompatible_column = classification
                .incompatible
                .map(|_| format!("{}/{}", column_name, data_type));
            columns.push(ColumnDescriptor {
                column_name,
                data_type,
                incompatible_column,
            });
        }
        debug!(
            table = %filter.table_name,
            unsupported = columns.len(),
            "classified columns"
        );
        Ok(columns)
    }

    /// Run a caller's SELECT with ordering and a row cap added.
    ///
    /// `dialect_override` picks the augmentation rules independently of the
    /// connection's dialect. Statements without a `SELECT` token are not run
    /// and yield [`BrowseOutcome::Rejected`].
    pub async fn browse_table(
        &self,
        mut conn: Box<dyn Connection>,
        sql: &str,
        dialect_override: Option<Dialect>,
    ) -> Result<BrowseOutcome> {
        let dialect = dialect_override.unwrap_or(self.dialect);
        let result = browse(conn.as_mut(), sql, dialect).await;
        release(conn, result).await
    }

    /// [`browse_table`](Self::browse_table) with the historical signature,
    /// where `None` means "not a SELECT".
    pub async fn browse_table_legacy(
        &self,
        conn: Box<dyn Connection>,
        sql: &str,
        dialect_override: Option<Dialect>,
    ) -> Result<Option<Vec<RowMapping>>> {
        self.browse_table(conn, sql, dialect_override)
            .await
            .map(BrowseOutcome::into_option)
    }

    /// Describe every column of a table: composite type and primary key flag.
    ///
    /// The SQL follows the table's own dialect. Column metadata and primary
    /// keys are read on the same connection, which is closed once afterwards.
    pub async fn describe_table_columns(
        &self,
        mut conn: Box<dyn Connection>,
        table: &TableRef,
    ) -> Result<Vec<ColumnInfoRow>> {
        let result = describe(conn.as_mut(), table).await;
        release(conn, result).await
    }

    /// Evaluate rule SQL against the caller's rows on a dedicated connection.
    ///
    /// # Errors
    ///
    /// [`FetchError::Evaluation`](crate::error::FetchError::Evaluation) tagged
    /// with the failing phase.
    pub async fn evaluate_rule(
        &self,
        mut conn: Box<dyn Connection>,
        rule_sql: &str,
        rows: &RuleRowSet,
    ) -> Result<RuleRowSet> {
        let result = rule::evaluate(conn.as_mut(), rule_sql, rows).await;
        if let Err(ref e) = result {
            warn!(error = %e, "rule evaluation failed");
        }
        release(conn, result).await
    }

    /// [`evaluate_rule`](Self::evaluate_rule) with the historical signature.
    ///
    /// `None` means evaluation failed in some phase; the cause is only logged.
    pub async fn evaluate_rule_legacy(
        &self,
        conn: Box<dyn Connection>,
        rule_sql: &str,
        rows: &RuleRowSet,
    ) -> Option<RuleRowSet> {
        self.evaluate_rule(conn, rule_sql, rows).await.ok()
    }

    /// Evaluate rule SQL on a connection shared with other callers.
    ///
    /// The connection's lock is held from create to drop, so evaluations on
    /// the same connection run one after another. A table left by an earlier
    /// caller that was cancelled mid-evaluation is dropped first. The
    /// connection stays open.
    pub async fn evaluate_rule_shared(
        &self,
        conn: &SharedConnection,
        rule_sql: &str,
        rows: &RuleRowSet,
    ) -> Result<RuleRowSet> {
        let mut guard = conn.lock().await;
        rule::discard_stale_table(guard.as_mut()).await;
        let result = rule::evaluate(guard.as_mut(), rule_sql, rows).await;
        if let Err(ref e) = result {
            warn!(error = %e, "rule evaluation failed");
        }
        result
    }
}

async fn browse(conn: &mut dyn Connection, sql: &str, dialect: Dialect) -> Result<BrowseOutcome> {
    match augment(sql, dialect)? {
        Augmented::Rejected => {
            info!(%dialect, "browse rejected: statement is not a SELECT");
            Ok(BrowseOutcome::Rejected)
        }
        Augmented::Query(augmented) => {
            let rows = materialize(conn, &augmented, dialect).await?;
            Ok(BrowseOutcome::Rows(rows))
        }
    }
}

async fn describe(conn: &mut dyn Connection, table: &TableRef) -> Result<Vec<ColumnInfoRow>> {
    let catalog = CatalogImpl::for_dialect(table.dialect);

    let info = conn
        .query(&catalog.column_info_query(&table.schema, &table.table_name))
        .await?;
    let mut columns: Vec<ColumnInfoRow> = (0..info.rows.len())
        .map(|row| {
            let data_length = info.value(row, "DATA_LENGTH").as_i64();
            let data_precision = info.value(row, "DATA_PRECISION").as_i64();
            let data_scale = info.value(row, "DATA_SCALE").as_i64();
            let raw_type = info.text(row, "DATA_TYPE").unwrap_or_default();
            ColumnInfoRow {
                column_name: info.text(row, "COLUMN_NAME").unwrap_or_default(),
                data_type: composite_data_type(&raw_type, data_length, data_precision, data_scale),
                data_length,
                data_precision,
                data_scale,
                is_primary: false,
            }
        })
        .collect();

    let keys = conn
        .query(&catalog.primary_keys_query(&table.schema, &table.table_name))
        .await?;
    for row in 0..keys.rows.len() {
        let Some(key) = keys.text(row, "COLUMN_NAME") else {
            continue;
        };
        if let Some(column) = columns.iter_mut().find(|c| c.column_name == key) {
            column.is_primary = true;
        }
    }

    debug!(
        table = %table.table_name,
        columns = columns.len(),
        "described table columns"
    );
    Ok(columns)
}

/// Close the connection, then hand back the operation's result.
///
/// A failing close is logged; it never replaces the operation's outcome.
async fn release<T>(mut conn: Box<dyn Connection>, result: Result<T>) -> Result<T> {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "failed to close connection");
    }
    result
}
