//! Oracle catalog SQL.
//!
//! Queries read the `ALL_*` dictionary views. Filters are inlined as escaped
//! literals because the ODBC path runs statements without bound parameters.

use crate::core::schema::{ColumnFilter, TableFilter};
use crate::core::traits::{BoundQuery, CatalogDialect};
use crate::dialect::{Dialect, RULE_COLUMN_WIDTH};

/// Oracle catalog implementation.
///
/// Rule evaluation uses a private temporary table, available from 18c.
#[derive(Debug, Clone, Default)]
pub struct OracleCatalog;

impl OracleCatalog {
    /// Create a new Oracle catalog instance.
    pub fn new() -> Self {
        Self
    }
}

impl CatalogDialect for OracleCatalog {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn list_tables_query(&self, filter: &TableFilter) -> BoundQuery {
        let mut sql = format!(
            "SELECT TABLE_NAME FROM ALL_TABLES WHERE OWNER = {}",
            self.quote_literal(&filter.schema)
        );
        if let Some(ref pattern) = filter.table_name_like {
            sql.push_str(&format!(" AND TABLE_NAME LIKE {}", self.quote_literal(pattern)));
        }
        sql.push_str(" ORDER BY TABLE_NAME");
        BoundQuery::new(sql)
    }

    fn list_columns_query(&self, filter: &ColumnFilter) -> BoundQuery {
        BoundQuery::new(format!(
            "SELECT COLUMN_NAME, DATA_TYPE FROM ALL_TAB_COLUMNS \
             WHERE OWNER = {} AND TABLE_NAME = {} ORDER BY COLUMN_ID",
            self.quote_literal(&filter.schema),
            self.quote_literal(&filter.table_name)
        ))
    }

    fn primary_keys_query(&self, schema: &str, table: &str) -> BoundQuery {
        BoundQuery::new(format!(
            "SELECT cu.COLUMN_NAME FROM all_cons_columns cu, all_constraints au \
             WHERE cu.constraint_name = au.constraint_name AND cu.owner = au.owner \
             AND au.constraint_type = 'P' AND au.owner = {} AND cu.table_name = {}",
            self.quote_literal(schema),
            self.quote_literal(table)
        ))
    }

    fn column_info_query(&self, schema: &str, table: &str) -> BoundQuery {
        BoundQuery::new(format!(
            "SELECT COLUMN_NAME, DATA_TYPE, DATA_LENGTH, DATA_PRECISION, DATA_SCALE \
             FROM ALL_TAB_COLUMNS WHERE OWNER = {} AND TABLE_NAME = {} ORDER BY COLUMN_ID",
            self.quote_literal(schema),
            self.quote_literal(table)
        ))
    }

    fn create_rule_table(&self, width: usize) -> String {
        let columns = (1..=width)
            .map(|i| format!("c{} VARCHAR2({} CHAR)", i, RULE_COLUMN_WIDTH))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE PRIVATE TEMPORARY TABLE {} ({}) ON COMMIT PRESERVE DEFINITION",
            self.rule_table(),
            columns
        )
    }

    fn drop_rule_table(&self) -> String {
        format!("DROP TABLE {}", self.rule_table())
    }
}
