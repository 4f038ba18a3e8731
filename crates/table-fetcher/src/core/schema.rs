//! Table and column descriptors produced by catalog queries, plus the
//! filter parameters callers pass in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::dialect::Dialect;

/// Status tag given to every freshly fetched table.
pub const TABLE_STATUS_OK: &str = "ok";

/// A table found in the source catalog.
///
/// `create_time` is the moment the table was fetched, not the table's real
/// creation time. It marks when the table was first seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub table_name: String,
    /// Regex matching the physical table name(s). Defaults to the exact name.
    pub physical_table_regex: String,
    pub ver_id: Option<i64>,
    pub status: String,
    pub create_time: DateTime<Utc>,
}

impl TableDescriptor {
    /// Descriptor for a table seen at `seen_at`.
    pub fn new(table_name: impl Into<String>, seen_at: DateTime<Utc>) -> Self {
        let table_name = table_name.into();
        Self {
            physical_table_regex: table_name.clone(),
            table_name,
            ver_id: None,
            status: TABLE_STATUS_OK.to_string(),
            create_time: seen_at,
        }
    }
}

/// A column whose type cannot be captured as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub column_name: String,
    pub data_type: String,
    /// `name/type` when the type is in the incompatibility set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incompatible_column: Option<String>,
}

/// Full column description with composite type and primary key flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ColumnInfoRow {
    pub column_name: String,
    /// `TYPE`, `TYPE(length)` or `TYPE(precision,scale)`.
    pub data_type: String,
    pub data_length: Option<i64>,
    pub data_precision: Option<i64>,
    pub data_scale: Option<i64>,
    #[serde(serialize_with = "yes_no")]
    pub is_primary: bool,
}

impl ColumnInfoRow {
    /// Primary key flag as reported to callers.
    pub fn primary_flag(&self) -> &'static str {
        if self.is_primary {
            "YES"
        } else {
            "NO"
        }
    }
}

fn yes_no<S: Serializer>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "YES" } else { "NO" })
}

/// Build the composite type string from catalog facets.
///
/// Length wins; otherwise precision/scale are rendered with a missing
/// facet left empty (`NUMBER(,2)`); otherwise the bare type.
pub fn composite_data_type(
    data_type: &str,
    length: Option<i64>,
    precision: Option<i64>,
    scale: Option<i64>,
) -> String {
    if let Some(len) = length {
        return format!("{}({})", data_type, len);
    }
    if precision.is_some() || scale.is_some() {
        let p = precision.map(|v| v.to_string()).unwrap_or_default();
        let s = scale.map(|v| v.to_string()).unwrap_or_default();
        return format!("{}({},{})", data_type, p, s);
    }
    data_type.to_string()
}

/// Filter for table listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFilter {
    /// Schema (MySQL database) or owner (Oracle).
    pub schema: String,
    /// Optional SQL `LIKE` pattern on the table name.
    #[serde(default)]
    pub table_name_like: Option<String>,
}

impl TableFilter {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table_name_like: None,
        }
    }

    pub fn with_name_like(mut self, pattern: impl Into<String>) -> Self {
        self.table_name_like = Some(pattern.into());
        self
    }
}

/// Filter for column listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub schema: String,
    pub table_name: String,
}

impl ColumnFilter {
    pub fn new(schema: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table_name: table_name.into(),
        }
    }
}

/// A table addressed for column description, carrying its own dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub dialect: Dialect,
    pub schema: String,
    pub table_name: String,
}

impl TableRef {
    pub fn new(dialect: Dialect, schema: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            dialect,
            schema: schema.into(),
            table_name: table_name.into(),
        }
    }
}
