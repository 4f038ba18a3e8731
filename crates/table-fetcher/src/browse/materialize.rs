//! Turn a browse result set into ordered row mappings.

use tracing::debug;

use crate::core::row::RowMapping;
use crate::core::traits::{BoundQuery, Connection, ResultSet};
use crate::core::value::SqlValue;
use crate::dialect::Dialect;
use crate::error::{FetchError, Result};

/// Columns whose label contains this marker may be read as timestamps.
const TIME_LABEL_MARKER: &str = "TIME";

/// Queries mentioning this keyword keep `*TIME*` columns as generic values.
const HEARTBEAT_KEYWORD: &str = "HEARTBEAT";

/// Run `sql` and map every row to label → value.
pub async fn materialize(
    conn: &mut dyn Connection,
    sql: &str,
    dialect: Dialect,
) -> Result<Vec<RowMapping>> {
    debug!(%dialect, sql, "running browse query");
    let result = conn.query(&BoundQuery::new(sql)).await?;
    to_row_mappings(result, sql, dialect)
}

/// Map a fetched result set, applying the timestamp and empty-result rules.
///
/// For dialects that read time columns as timestamps, every column whose
/// label contains `TIME` is coerced to a timestamp unless `sql` contains
/// `HEARTBEAT`. An empty result yields a single row keyed by the column
/// expressions of the `select` clause, all mapped to NULL.
pub fn to_row_mappings(result: ResultSet, sql: &str, dialect: Dialect) -> Result<Vec<RowMapping>> {
    if result.is_empty() {
        let mut placeholder = RowMapping::new();
        for column in select_clause_columns(sql) {
            placeholder.insert(column, SqlValue::Null);
        }
        return Ok(vec![placeholder]);
    }

    let read_timestamps =
        dialect.capabilities().time_columns_as_timestamps && !sql.contains(HEARTBEAT_KEYWORD);
    let timestamp_columns: Vec<bool> = result
        .columns
        .iter()
        .map(|label| read_timestamps && label.contains(TIME_LABEL_MARKER))
        .collect();

    let ResultSet { columns, rows } = result;
    let mut mapped = Vec::with_capacity(rows.len());
    for row in rows {
        let mut mapping = RowMapping::with_capacity(columns.len());
        for (idx, value) in row.into_iter().enumerate() {
            let Some(label) = columns.get(idx) else {
                break;
            };
            let value = if timestamp_columns[idx] {
                value
                    .to_timestamp()
                    .map_err(|e| FetchError::query(sql, format!("column {}: {}", label, e)))?
            } else {
                value
            };
            mapping.insert(label.clone(), value);
        }
        mapped.push(mapping);
    }
    Ok(mapped)
}

/// Column expressions between the first `select` and the following `from`.
///
/// Keywords are located case-insensitively as whole words. The text between
/// them is split on commas and trimmed; expressions and aliases are kept
/// verbatim. Returns nothing when either keyword is missing.
pub fn select_clause_columns(sql: &str) -> Vec<String> {
    let lower = sql.to_ascii_lowercase();
    let Some(select_at) = find_word(&lower, "select", 0) else {
        return Vec::new();
    };
    let start = select_at + "select".len();
    let Some(end) = find_word(&lower, "from", start) else {
        return Vec::new();
    };

    sql[start..end]
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn find_word(haystack: &str, word: &str, from: usize) -> Option<usize> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    let mut offset = from;
    while let Some(pos) = haystack[offset..].find(word) {
        let at = offset + pos;
        let end = at + word.len();
        let before_ok = haystack[..at].chars().next_back().map_or(true, |c| !is_ident(c));
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_ident(c));
        if before_ok && after_ok {
            return Some(at);
        }
        offset = end;
    }
    None
}
