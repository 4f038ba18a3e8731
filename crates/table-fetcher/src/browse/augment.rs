//! Row-capping and ordering heuristics for free-form browse queries.
//!
//! This is token matching, not SQL parsing. The statement is split on
//! whitespace and commas and every lookup compares whole tokens, so
//! `CUSTOMER_ID` never matches `ID`. The only guard against non-read
//! statements is the presence of a standalone `SELECT` token; the cap and
//! ordering clauses are appended by string concatenation.

use crate::dialect::Dialect;
use crate::error::{FetchError, Result};

/// One entry of a dialect's ordering precedence list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingRule {
    /// Order by this column when it appears as a token.
    Column(&'static str),
    /// When `trigger` appears, order by the `order_by` token instead.
    ///
    /// Used for `SCN_NO`, which orders by `SEQNO`. If `SEQNO` is not
    /// selected the augmentation fails.
    Substitute {
        trigger: &'static str,
        order_by: &'static str,
    },
    /// Order by `column`, or by `preferred` when both appear.
    Preferring {
        column: &'static str,
        preferred: &'static str,
    },
}

/// How the row cap is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCap {
    /// Trailing `LIMIT n`.
    Limit(u32),
    /// `rownum <= n` predicate joined with `WHERE` or `AND`.
    RowNum(u32),
}

/// Outcome of augmenting a browse statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Augmented {
    /// The statement has no standalone `SELECT` token.
    Rejected,
    /// The statement to run.
    Query(String),
}

impl Augmented {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Augmented::Rejected)
    }

    pub fn sql(&self) -> Option<&str> {
        match self {
            Augmented::Rejected => None,
            Augmented::Query(sql) => Some(sql),
        }
    }
}

/// A statement split into tokens, in original case and upper case.
///
/// Both vectors are index-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    original: Vec<String>,
    upper: Vec<String>,
}

impl Tokens {
    /// Split on whitespace and commas. Empty tokens between adjacent
    /// separators are kept so indices stay aligned with the raw split.
    pub fn new(sql: &str) -> Self {
        let original: Vec<String> = sql
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(str::to_string)
            .collect();
        let upper = original.iter().map(|t| t.to_uppercase()).collect();
        Self { original, upper }
    }

    /// Position of the first token equal to `needle`, compared upper-cased.
    pub fn find(&self, needle: &str) -> Option<usize> {
        let needle = needle.to_uppercase();
        self.upper.iter().position(|t| *t == needle)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.find(needle).is_some()
    }

    /// Token at `idx` in its original case.
    pub fn original(&self, idx: usize) -> &str {
        &self.original[idx]
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Augment a browse statement for `dialect`.
pub fn augment(sql: &str, dialect: Dialect) -> Result<Augmented> {
    augment_tokens(sql, &Tokens::new(sql), dialect)
}

/// Augment using pre-computed tokens of `sql`.
pub fn augment_tokens(sql: &str, tokens: &Tokens, dialect: Dialect) -> Result<Augmented> {
    if !tokens.contains("SELECT") {
        return Ok(Augmented::Rejected);
    }

    let caps = dialect.capabilities();
    let mut out = sql.to_string();

    if tokens.contains(";") {
        let trimmed = out.trim_end();
        out = trimmed.strip_suffix(';').unwrap_or(trimmed).to_string();
    }

    if let RowCap::RowNum(n) = caps.row_cap {
        let joiner = if tokens.contains("WHERE") { "AND" } else { "WHERE" };
        out.push_str(&format!(" {} rownum <= {}", joiner, n));
    }

    if let Some(column) = ordering_column(sql, tokens, caps.ordering)? {
        out.push_str(&format!(" ORDER BY {} DESC", column));
    }

    if let RowCap::Limit(n) = caps.row_cap {
        out.push_str(&format!(" LIMIT {}", n));
    }

    Ok(Augmented::Query(out))
}

/// Pick the ordering column by precedence, in the statement's own case.
pub fn ordering_column<'t>(
    sql: &str,
    tokens: &'t Tokens,
    rules: &[OrderingRule],
) -> Result<Option<&'t str>> {
    for rule in rules {
        match *rule {
            OrderingRule::Column(column) => {
                if let Some(idx) = tokens.find(column) {
                    return Ok(Some(tokens.original(idx)));
                }
            }
            OrderingRule::Substitute { trigger, order_by } => {
                if tokens.contains(trigger) {
                    return match tokens.find(order_by) {
                        Some(idx) => Ok(Some(tokens.original(idx))),
                        None => Err(FetchError::query(
                            sql,
                            format!("{} is selected but {} is not, cannot order", trigger, order_by),
                        )),
                    };
                }
            }
            OrderingRule::Preferring { column, preferred } => {
                if let Some(idx) = tokens.find(column) {
                    let idx = tokens.find(preferred).unwrap_or(idx);
                    return Ok(Some(tokens.original(idx)));
                }
            }
        }
    }
    Ok(None)
}
