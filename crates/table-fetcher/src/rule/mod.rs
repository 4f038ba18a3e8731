//! Temp-table rule evaluation.
//!
//! A rule is arbitrary SQL run against a session-scoped table holding the
//! caller's rows. A [`RuleSession`] walks the phases in order:
//!
//! 1. **Create**: `CREATE` the rule table with columns `c1..cN`
//! 2. **Load**: insert every row in one batch
//! 3. **Evaluate**: run the rule SQL and read each result cell as text
//!
//! Each phase failure is reported as [`FetchError::Evaluation`] tagged with
//! its [`RulePhase`]. [`RuleSession::finish`] drops the table best-effort.

use tracing::{debug, warn};

use crate::core::row::RuleRowSet;
use crate::core::traits::{BoundQuery, CatalogDialect, Connection};
use crate::drivers::CatalogImpl;
use crate::error::{FetchError, Result, RulePhase};

/// One rule table on one connection.
///
/// The session borrows the connection mutably for its whole life, so no
/// other statement can run on it between create and drop.
pub struct RuleSession<'c> {
    conn: &'c mut dyn Connection,
    catalog: CatalogImpl,
    width: usize,
}

impl<'c> RuleSession<'c> {
    /// Create the rule table with `width` string columns.
    ///
    /// # Errors
    ///
    /// A zero width or a failing `CREATE` is a [`RulePhase::Create`] error.
    pub async fn create(conn: &'c mut dyn Connection, width: usize) -> Result<RuleSession<'c>> {
        if width == 0 {
            return Err(FetchError::evaluation(
                RulePhase::Create,
                "input has no columns",
            ));
        }

        let catalog = CatalogImpl::for_dialect(conn.dialect());
        let ddl = catalog.create_rule_table(width);
        debug!(sql = %ddl, "creating rule table");
        conn.execute(&ddl)
            .await
            .map_err(|e| FetchError::evaluation(RulePhase::Create, e))?;

        Ok(RuleSession {
            conn,
            catalog,
            width,
        })
    }

    /// Number of columns in the rule table.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Insert every row in a single batch.
    ///
    /// Rows shorter than the table are padded with empty strings.
    pub async fn load(&mut self, rows: &RuleRowSet) -> Result<()> {
        let statements: Vec<String> = rows
            .rows()
            .iter()
            .map(|row| {
                let mut cells = row.clone();
                cells.resize(self.width, String::new());
                self.catalog.insert_rule_row(&cells)
            })
            .collect();
        if statements.is_empty() {
            return Ok(());
        }

        debug!(rows = statements.len(), table = self.catalog.rule_table(), "loading rule rows");
        self.conn
            .execute_batch(&statements)
            .await
            .map_err(|e| FetchError::evaluation(RulePhase::Load, e))
    }

    /// Run the rule SQL and read every result cell as a string.
    ///
    /// NULL cells become empty strings.
    pub async fn evaluate(&mut self, rule_sql: &str) -> Result<RuleRowSet> {
        debug!(sql = rule_sql, "evaluating rule");
        let result = self
            .conn
            .query(&BoundQuery::new(rule_sql))
            .await
            .map_err(|e| FetchError::evaluation(RulePhase::Evaluate, e))?;

        let rows: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_text().unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .collect();
        Ok(RuleRowSet::new(rows))
    }

    /// Drop the rule table. Failures are logged, not returned.
    pub async fn finish(self) {
        let ddl = self.catalog.drop_rule_table();
        if self.conn.is_closed() {
            return;
        }
        if let Err(e) = self.conn.execute(&ddl).await {
            warn!(error = %e, "failed to drop rule table");
        }
    }
}

/// Drop a rule table left behind by an evaluation that never reached
/// [`RuleSession::finish`], such as one whose future was cancelled.
///
/// A missing table is the normal case, so a failing drop is only logged.
pub async fn discard_stale_table(conn: &mut dyn Connection) {
    let catalog = CatalogImpl::for_dialect(conn.dialect());
    if let Err(e) = conn.execute(&catalog.drop_rule_table()).await {
        debug!(error = %e, "no stale rule table to drop");
    }
}

/// Run a complete rule evaluation on one connection.
///
/// Create, load and evaluate run in order; the table is dropped afterwards
/// whether or not load and evaluate succeeded. The connection stays open.
pub async fn evaluate(
    conn: &mut dyn Connection,
    rule_sql: &str,
    rows: &RuleRowSet,
) -> Result<RuleRowSet> {
    let mut session = RuleSession::create(conn, rows.width()).await?;
    let loaded = session.load(rows).await;
    let outcome = match loaded {
        Ok(()) => session.evaluate(rule_sql).await,
        Err(e) => Err(e),
    };
    session.finish().await;
    outcome
}
