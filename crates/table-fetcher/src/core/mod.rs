//! Core types shared by the catalog, browse and rule components.
//!
//! - [`schema`]: table and column descriptors, filter parameters
//! - [`value`]: SQL cell values
//! - [`row`]: row shapes returned to callers
//! - [`traits`]: the connection abstraction every operation runs on

pub mod row;
pub mod schema;
pub mod traits;
pub mod value;

pub use row::{RowMapping, RuleRowSet};
pub use schema::{
    ColumnDescriptor, ColumnFilter, ColumnInfoRow, TableDescriptor, TableFilter, TableRef,
};
pub use traits::{share, BoundQuery, CatalogDialect, Connection, ResultSet, SharedConnection};
pub use value::SqlValue;
