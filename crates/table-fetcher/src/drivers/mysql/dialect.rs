//! MySQL/MariaDB catalog SQL (Strategy pattern).
//!
//! Catalog queries read `information_schema` and bind their filters as `?`
//! parameters. String columns are cast to `CHAR` so that MySQL 8's binary
//! collation on `information_schema` decodes as text.

use crate::core::schema::{ColumnFilter, TableFilter};
use crate::core::traits::{BoundQuery, CatalogDialect};
use crate::dialect::{Dialect, RULE_COLUMN_WIDTH};

/// MySQL/MariaDB catalog implementation.
///
/// Compatible with MySQL 5.7+, 8.0+, and MariaDB 10.2+.
#[derive(Debug, Clone, Default)]
pub struct MysqlCatalog;

impl MysqlCatalog {
    /// Create a new MySQL catalog instance.
    pub fn new() -> Self {
        Self
    }
}

impl CatalogDialect for MysqlCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn list_tables_query(&self, filter: &TableFilter) -> BoundQuery {
        let mut sql = String::from(
            "SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME \
             FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'",
        );
        let mut query_params = vec![filter.schema.clone()];
        if let Some(ref pattern) = filter.table_name_like {
            sql.push_str(" AND TABLE_NAME LIKE ?");
            query_params.push(pattern.clone());
        }
        sql.push_str(" ORDER BY TABLE_NAME");

        BoundQuery {
            sql,
            params: query_params,
        }
    }

    fn list_columns_query(&self, filter: &ColumnFilter) -> BoundQuery {
        BoundQuery::new(
            "SELECT CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME, \
                    CAST(DATA_TYPE AS CHAR(255)) AS DATA_TYPE \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(&filter.schema)
        .bind(&filter.table_name)
    }

    fn primary_keys_query(&self, schema: &str, table: &str) -> BoundQuery {
        BoundQuery::new(
            "SELECT CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_KEY = 'PRI'",
        )
        .bind(schema)
        .bind(table)
    }

    fn column_info_query(&self, schema: &str, table: &str) -> BoundQuery {
        BoundQuery::new(
            "SELECT CAST(t_col.COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME, \
                    CAST(t_col.DATA_TYPE AS CHAR(255)) AS DATA_TYPE, \
                    t_col.CHARACTER_MAXIMUM_LENGTH AS DATA_LENGTH, \
                    t_col.NUMERIC_PRECISION AS DATA_PRECISION, \
                    t_col.NUMERIC_SCALE AS DATA_SCALE \
             FROM information_schema.`COLUMNS` t_col \
             WHERE t_col.TABLE_SCHEMA = ? AND t_col.TABLE_NAME = ? \
             ORDER BY t_col.ORDINAL_POSITION",
        )
        .bind(schema)
        .bind(table)
    }

    fn create_rule_table(&self, width: usize) -> String {
        let columns = (1..=width)
            .map(|i| format!("c{} varchar({})", i, RULE_COLUMN_WIDTH))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TEMPORARY TABLE {} ({}) DEFAULT CHARSET=utf8",
            self.rule_table(),
            columns
        )
    }

    fn drop_rule_table(&self) -> String {
        format!("DROP TEMPORARY TABLE IF EXISTS {}", self.rule_table())
    }

    fn quote_literal(&self, value: &str) -> String {
        // Backslash is an escape character in MySQL's default sql_mode
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_tables_query_binds_schema() {
        let q = MysqlCatalog::new().list_tables_query(&TableFilter::new("dbus"));
        assert!(q.sql.contains("information_schema.TABLES"));
        assert!(q.sql.contains("TABLE_SCHEMA = ?"));
        assert!(!q.sql.contains("LIKE"));
        assert_eq!(q.params, vec!["dbus"]);
    }

    #[test]
    fn test_list_tables_query_with_pattern() {
        let filter = TableFilter::new("dbus").with_name_like("t_%");
        let q = MysqlCatalog::new().list_tables_query(&filter);
        assert!(q.sql.contains("TABLE_NAME LIKE ?"));
        assert_eq!(q.params, vec!["dbus", "t_%"]);
    }

    #[test]
    fn test_column_queries() {
        let catalog = MysqlCatalog::new();
        let q = catalog.list_columns_query(&ColumnFilter::new("dbus", "orders"));
        assert!(q.sql.contains("information_schema.COLUMNS"));
        assert_eq!(q.params, vec!["dbus", "orders"]);

        let q = catalog.primary_keys_query("dbus", "orders");
        assert!(q.sql.contains("COLUMN_KEY = 'PRI'"));
        assert_eq!(q.params, vec!["dbus", "orders"]);

        let q = catalog.column_info_query("dbus", "orders");
        assert!(q.sql.contains("CHARACTER_MAXIMUM_LENGTH AS DATA_LENGTH"));
        assert!(q.sql.contains("NUMERIC_PRECISION AS DATA_PRECISION"));
        assert!(q.sql.contains("NUMERIC_SCALE AS DATA_SCALE"));
    }

    #[test]
    fn test_create_rule_table() {
        let sql = MysqlCatalog::new().create_rule_table(3);
        assert_eq!(
            sql,
            "CREATE TEMPORARY TABLE temp (c1 varchar(512), c2 varchar(512), c3 varchar(512)) DEFAULT CHARSET=utf8"
        );
    }

    #[test]
    fn test_insert_rule_row_escapes_quotes() {
        let sql = MysqlCatalog::new().insert_rule_row(&["it's".to_string(), String::new()]);
        assert_eq!(sql, "INSERT INTO temp VALUES ('it''s','')");
    }

    #[test]
    fn test_quote_literal_escapes_backslash() {
        assert_eq!(MysqlCatalog::new().quote_literal(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_drop_rule_table() {
        assert_eq!(
            MysqlCatalog::new().drop_rule_table(),
            "DROP TEMPORARY TABLE IF EXISTS temp"
        );
    }
}
