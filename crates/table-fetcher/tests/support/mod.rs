//! In-memory `Connection` double for integration tests.
//!
//! Catalog and browse queries answer from scripted result sets. The rule
//! table is emulated: `CREATE` makes it (failing if it already exists),
//! `INSERT` appends parsed literals, `SELECT c.. FROM <table>` reads it
//! back and `DROP` removes it.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use table_fetcher::{BoundQuery, Connection, Dialect, FetchError, ResultSet, Result, SqlValue};

#[derive(Default)]
struct State {
    calls: Vec<String>,
    close_count: usize,
    closed: bool,
    scripted: Vec<(String, ResultSet)>,
    fail_on: Vec<String>,
    table: Option<TempTable>,
    batch_delay: Option<Duration>,
    fail_close: bool,
}

struct TempTable {
    name: String,
    width: usize,
    rows: Vec<Vec<String>>,
}

/// Observes a [`MemoryConnection`] after it has been handed away.
#[derive(Clone)]
pub struct Probe(Arc<Mutex<State>>);

impl Probe {
    /// Every statement run, in order.
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.0.lock().unwrap().close_count
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().unwrap().closed
    }

    /// Whether the emulated rule table currently exists.
    pub fn has_rule_table(&self) -> bool {
        self.0.lock().unwrap().table.is_some()
    }
}

pub struct MemoryConnection {
    dialect: Dialect,
    state: Arc<Mutex<State>>,
}

impl MemoryConnection {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn probe(&self) -> Probe {
        Probe(self.state.clone())
    }

    /// Answer queries containing `marker` with `result`. First match wins.
    pub fn script(self, marker: &str, result: ResultSet) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripted
            .push((marker.to_string(), result));
        self
    }

    /// Fail every statement containing `marker`.
    pub fn fail_on(self, marker: &str) -> Self {
        self.state.lock().unwrap().fail_on.push(marker.to_string());
        self
    }

    /// Pause between the inserts of a batch, giving other tasks a chance to run.
    pub fn with_batch_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().batch_delay = Some(delay);
        self
    }

    /// Make `close` report an error after marking the connection closed.
    pub fn fail_close(self) -> Self {
        self.state.lock().unwrap().fail_close = true;
        self
    }

    pub fn boxed(self) -> Box<dyn Connection> {
        Box::new(self)
    }

    fn begin(&self, sql: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(FetchError::connection(
                "connection is closed",
                "memory connection",
            ));
        }
        state.calls.push(sql.to_string());
        if state.fail_on.iter().any(|m| sql.contains(m.as_str())) {
            return Err(FetchError::query(sql, "scripted failure"));
        }
        Ok(())
    }

    fn run(&self, sql: &str) -> Result<ResultSet> {
        let upper = sql.trim().to_uppercase();
        let mut state = self.state.lock().unwrap();

        if upper.starts_with("CREATE") {
            if state.table.is_some() {
                return Err(FetchError::query(sql, "rule table already exists"));
            }
            let name = table_name_after(sql, "TABLE").unwrap_or_default();
            let width = upper.matches("VARCHAR").count();
            state.table = Some(TempTable {
                name,
                width,
                rows: Vec::new(),
            });
            return Ok(ResultSet::default());
        }

        if upper.starts_with("INSERT") {
            let table = state
                .table
                .as_mut()
                .ok_or_else(|| FetchError::query(sql, "rule table does not exist"))?;
            let row = parse_values(sql);
            if row.len() != table.width {
                return Err(FetchError::query(sql, "column count mismatch"));
            }
            table.rows.push(row);
            return Ok(ResultSet::default());
        }

        if upper.starts_with("DROP") {
            if state.table.take().is_none() && !upper.contains("IF EXISTS") {
                return Err(FetchError::query(sql, "rule table does not exist"));
            }
            return Ok(ResultSet::default());
        }

        if let Some(table) = &state.table {
            if upper.contains(&format!("FROM {}", table.name.to_uppercase())) {
                return Ok(select_from_table(sql, table));
            }
        }

        Ok(state
            .scripted
            .iter()
            .find(|(marker, _)| sql.contains(marker.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&mut self, query: &BoundQuery) -> Result<ResultSet> {
        self.begin(&query.sql)?;
        self.run(&query.sql)
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        self.begin(sql)?;
        self.run(sql)?;
        Ok(1)
    }

    async fn execute_batch(&mut self, statements: &[String]) -> Result<()> {
        let delay = self.state.lock().unwrap().batch_delay;
        for sql in statements {
            self.begin(sql)?;
            self.run(sql)?;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.close_count += 1;
        state.closed = true;
        if state.fail_close {
            return Err(FetchError::connection(
                "scripted close failure",
                "memory connection",
            ));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

/// Build a result set of text cells; `None` is NULL.
pub fn text_rows(columns: &[&str], rows: &[&[Option<&str>]]) -> ResultSet {
    ResultSet::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| SqlValue::from(*cell)).collect())
            .collect(),
    )
}

fn table_name_after(sql: &str, keyword: &str) -> Option<String> {
    let mut words = sql.split_whitespace();
    words.find(|w| w.eq_ignore_ascii_case(keyword))?;
    words
        .next()
        .map(|w| w.trim_end_matches('(').to_string())
}

/// Parse the quoted literals of `INSERT INTO t VALUES ('a','b''c')`.
fn parse_values(sql: &str) -> Vec<String> {
    let start = sql.find('(').map(|i| i + 1).unwrap_or(0);
    let body = &sql[start..];
    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            continue;
        }
        let mut value = String::new();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    value.push('\'');
                } else {
                    break;
                }
            } else {
                value.push(c);
            }
        }
        values.push(value);
    }
    values
}

/// `SELECT *` or `SELECT c1, c3 FROM <table>`, with an optional
/// `WHERE cN = 'literal'` filter.
fn select_from_table(sql: &str, table: &TempTable) -> ResultSet {
    let upper = sql.to_uppercase();
    let select_end = upper.find("SELECT").map(|i| i + "SELECT".len()).unwrap_or(0);
    let from_at = upper.find(" FROM ").unwrap_or(sql.len());
    let projection: Vec<usize> = sql[select_end..from_at]
        .split(',')
        .map(str::trim)
        .flat_map(|col| {
            if col == "*" {
                (0..table.width).collect::<Vec<_>>()
            } else {
                column_index(col).into_iter().collect()
            }
        })
        .collect();

    let filter = upper.find(" WHERE ").and_then(|at| {
        let clause = &sql[at + " WHERE ".len()..];
        let (col, value) = clause.split_once('=')?;
        let value = parse_values(&format!("({})", value.trim()));
        Some((column_index(col.trim())?, value.into_iter().next()?))
    });

    let rows = table
        .rows
        .iter()
        .filter(|row| match &filter {
            Some((idx, value)) => row.get(*idx) == Some(value),
            None => true,
        })
        .map(|row| {
            projection
                .iter()
                .map(|&idx| SqlValue::from(row[idx].clone()))
                .collect()
        })
        .collect();

    ResultSet::new(
        projection.iter().map(|idx| format!("c{}", idx + 1)).collect(),
        rows,
    )
}

fn column_index(label: &str) -> Option<usize> {
    let n: usize = label.trim().trim_start_matches(['c', 'C']).parse().ok()?;
    n.checked_sub(1)
}
