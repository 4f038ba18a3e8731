//! Error types for the table fetcher library.

use std::fmt;

use thiserror::Error;

/// Exit code for configuration errors (bad YAML, unknown dialect).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for connection failures.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Exit code for catalog/browse query failures.
pub const EXIT_QUERY_ERROR: u8 = 3;
/// Exit code for rule evaluation failures.
pub const EXIT_EVALUATION_ERROR: u8 = 4;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Phase of a rule evaluation, used to tag evaluation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePhase {
    /// Creating the session temporary table.
    Create,
    /// Batch-loading the input rows.
    Load,
    /// Running the caller's rule query.
    Evaluate,
}

impl fmt::Display for RulePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RulePhase::Create => "create",
            RulePhase::Load => "insert",
            RulePhase::Evaluate => "custom sql command",
        };
        f.write_str(s)
    }
}

/// Main error type for fetcher operations.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Dialect tag is not one of the supported engines.
    #[error("Unsupported dialect: '{0}'. Supported dialects: mysql, oracle")]
    UnsupportedDialect(String),

    /// Configuration error (invalid YAML values, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection unavailable, failed to open, or already closed
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Catalog or browse query failed
    #[error("Query failed: {message}\n  SQL: {sql}")]
    Query { sql: String, message: String },

    /// Rule evaluation failed in one of its phases
    #[error("Execute {phase} failed: {message}")]
    Evaluation { phase: RulePhase, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FetchError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl fmt::Display, context: impl Into<String>) -> Self {
        FetchError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Query error for the given statement
    pub fn query(sql: impl Into<String>, message: impl fmt::Display) -> Self {
        FetchError::Query {
            sql: sql.into(),
            message: message.to_string(),
        }
    }

    /// Create an Evaluation error for a rule phase
    pub fn evaluation(phase: RulePhase, message: impl fmt::Display) -> Self {
        FetchError::Evaluation {
            phase,
            message: message.to_string(),
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            FetchError::UnsupportedDialect(_)
            | FetchError::Config(_)
            | FetchError::Yaml(_)
            | FetchError::Json(_) => EXIT_CONFIG_ERROR,
            FetchError::Connection { .. } => EXIT_CONNECTION_ERROR,
            FetchError::Query { .. } => EXIT_QUERY_ERROR,
            FetchError::Evaluation { .. } => EXIT_EVALUATION_ERROR,
            FetchError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for fetcher operations.
pub type Result<T> = std::result::Result<T, FetchError>;
