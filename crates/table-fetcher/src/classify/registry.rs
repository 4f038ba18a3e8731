//! Supported-type registries per dialect.
//!
//! Names are stored upper-cased with parenthesized facets removed, the form
//! produced by [`super::normalize_type_name`].

/// MySQL/MariaDB types the capture pipeline can decode.
pub const MYSQL_SUPPORTED: &[&str] = &[
    // Integer
    "BIT",
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "INTEGER",
    "BIGINT",
    "BOOL",
    "BOOLEAN",
    // Fixed and floating point
    "DECIMAL",
    "NUMERIC",
    "FLOAT",
    "DOUBLE",
    "REAL",
    // Temporal
    "DATE",
    "DATETIME",
    "TIMESTAMP",
    "TIME",
    "YEAR",
    // Character
    "CHAR",
    "VARCHAR",
    "TINYTEXT",
    "TEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "ENUM",
    "SET",
    // Binary
    "BINARY",
    "VARBINARY",
    "TINYBLOB",
    "BLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
];

/// Oracle types the capture pipeline can decode.
pub const ORACLE_SUPPORTED: &[&str] = &[
    // Character
    "CHAR",
    "NCHAR",
    "VARCHAR",
    "VARCHAR2",
    "NVARCHAR2",
    "CLOB",
    "NCLOB",
    "LONG",
    // Numeric
    "NUMBER",
    "FLOAT",
    "INTEGER",
    "BINARY_FLOAT",
    "BINARY_DOUBLE",
    // Temporal
    "DATE",
    "TIMESTAMP",
    "TIMESTAMP WITH TIME ZONE",
    "TIMESTAMP WITH LOCAL TIME ZONE",
    "INTERVAL YEAR TO MONTH",
    "INTERVAL DAY TO SECOND",
    // Binary
    "RAW",
    "LONG RAW",
    "BLOB",
    // Row identifiers
    "ROWID",
    "UROWID",
];

/// Oracle object types that can never be captured.
pub const ORACLE_INCOMPATIBLE: &[&str] = &["Anydata", "Anytype", "XMLType"];
