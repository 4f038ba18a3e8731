//! Ad-hoc table browsing: augment a caller's SELECT, run it, map the rows.

pub mod augment;
pub mod materialize;

pub use augment::{augment, Augmented, OrderingRule, RowCap, Tokens};
pub use materialize::{materialize, select_clause_columns};

use crate::core::row::RowMapping;

/// Result of a browse request.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseOutcome {
    /// The statement was not a SELECT and was not run.
    Rejected,
    /// Mapped rows of the augmented query.
    Rows(Vec<RowMapping>),
}

impl BrowseOutcome {
    /// Collapse to the legacy shape, where `None` means "not a SELECT".
    pub fn into_option(self) -> Option<Vec<RowMapping>> {
        match self {
            BrowseOutcome::Rejected => None,
            BrowseOutcome::Rows(rows) => Some(rows),
        }
    }
}
