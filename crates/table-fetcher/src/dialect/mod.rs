//! Dialect tag and per-dialect capability table.
//!
//! Only two engines exist, so the dialect is a closed enum rather than an
//! open registry. Everything that differs between the engines and is pure
//! data (ordering heuristics, row capping, supported types, rule table shape)
//! lives in a static [`Capabilities`] table selected once from the tag.
//! Behavior that needs a connection lives in [`crate::drivers`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::browse::augment::{OrderingRule, RowCap};
use crate::classify::registry;
use crate::error::{FetchError, Result};

/// Number of rows a browse query may return.
pub const BROWSE_ROW_CAP: u32 = 100;

/// Width of every column in the rule temporary table.
pub const RULE_COLUMN_WIDTH: u32 = 512;

/// Relational engine a data source speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Oracle,
}

/// Static, per-dialect behavior table.
#[derive(Debug)]
pub struct Capabilities {
    /// Ordering columns tried in order, first match wins.
    pub ordering: &'static [OrderingRule],
    /// How the row cap is expressed.
    pub row_cap: RowCap,
    /// Whether columns labelled `*TIME*` are read back as timestamps.
    pub time_columns_as_timestamps: bool,
    /// Upper-cased names of the types downstream processing accepts.
    pub supported_types: &'static [&'static str],
    /// Types that can never be captured, regardless of the allowlist.
    pub incompatible_types: &'static [&'static str],
    /// Name of the session temporary table used by rule evaluation.
    pub rule_table: &'static str,
}

static MYSQL: Capabilities = Capabilities {
    ordering: &[
        OrderingRule::Column("ID"),
        OrderingRule::Substitute {
            trigger: "SCN_NO",
            order_by: "SEQNO",
        },
        OrderingRule::Preferring {
            column: "CREATE_TIME",
            preferred: "PULL_REQ_CREATE_TIME",
        },
    ],
    row_cap: RowCap::Limit(BROWSE_ROW_CAP),
    time_columns_as_timestamps: false,
    supported_types: registry::MYSQL_SUPPORTED,
    incompatible_types: &[],
    rule_table: "temp",
};

static ORACLE: Capabilities = Capabilities {
    ordering: &[
        OrderingRule::Column("ID"),
        OrderingRule::Substitute {
            trigger: "SCN_NO",
            order_by: "SEQNO",
        },
        OrderingRule::Preferring {
            column: "CREATE_TIME",
            preferred: "PULL_REQ_CREATE_TIME",
        },
        OrderingRule::Column("EVENT_TIME"),
        OrderingRule::Column("DDL_TIME"),
        OrderingRule::Column("DATE_TYPE"),
        OrderingRule::Column("PULL_REQ_CREATE_TIME"),
    ],
    row_cap: RowCap::RowNum(BROWSE_ROW_CAP),
    time_columns_as_timestamps: true,
    supported_types: registry::ORACLE_SUPPORTED,
    incompatible_types: registry::ORACLE_INCOMPATIBLE,
    rule_table: "ORA$PTT_TEMP",
};

impl Dialect {
    /// Every dialect, in tag order.
    pub const ALL: [Dialect; 2] = [Dialect::MySql, Dialect::Oracle];

    /// The configuration tag for this dialect.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Oracle => "oracle",
        }
    }

    /// Capability table for this dialect.
    pub fn capabilities(&self) -> &'static Capabilities {
        match self {
            Dialect::MySql => &MYSQL,
            Dialect::Oracle => &ORACLE,
        }
    }

    /// Default listener port.
    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::MySql => 3306,
            Dialect::Oracle => 1521,
        }
    }

    /// Parse a dialect tag.
    ///
    /// Tags are matched exactly against `mysql` and `oracle` (ASCII case is
    /// ignored); anything else is an [`FetchError::UnsupportedDialect`].
    pub fn parse(tag: &str) -> Result<Self> {
        Dialect::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(tag))
            .ok_or_else(|| FetchError::UnsupportedDialect(tag.to_string()))
    }
}

impl FromStr for Dialect {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Dialect::parse(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
