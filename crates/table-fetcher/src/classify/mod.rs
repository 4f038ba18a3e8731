//! Column data type classification.
//!
//! Each dialect owns an allowlist of types downstream processing can decode.
//! Oracle additionally has a small set of object types that are always
//! incompatible. The two checks are independent: a column may be both
//! unsupported and incompatible.

pub mod registry;

use serde::Serialize;

use crate::dialect::Dialect;

/// Allowlist verdict for a raw type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSupport {
    Supported,
    Unsupported,
}

/// Result of classifying one column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub support: TypeSupport,
    /// Set when the type is in the dialect's incompatibility set.
    pub incompatible: Option<String>,
}

impl Classification {
    pub fn is_supported(&self) -> bool {
        self.support == TypeSupport::Supported
    }

    pub fn is_incompatible(&self) -> bool {
        self.incompatible.is_some()
    }
}

/// Classify a raw catalog type name for a dialect.
///
/// The incompatibility reason is the matched type name as registered
/// (`Anydata`, `Anytype`, `XMLType`).
pub fn classify(dialect: Dialect, raw_type: &str) -> Classification {
    let caps = dialect.capabilities();
    let normalized = normalize_type_name(raw_type);

    let support = if caps.supported_types.contains(&normalized.as_str()) {
        TypeSupport::Supported
    } else {
        TypeSupport::Unsupported
    };

    let incompatible = caps
        .incompatible_types
        .iter()
        .find(|t| t.eq_ignore_ascii_case(raw_type.trim()))
        .map(|t| t.to_string());

    Classification {
        support,
        incompatible,
    }
}

/// Upper-case a type name and drop parenthesized facets.
///
/// `timestamp(6) with time zone` becomes `TIMESTAMP WITH TIME ZONE`.
pub fn normalize_type_name(raw_type: &str) -> String {
    let mut stripped = String::with_capacity(raw_type.len());
    let mut depth = 0usize;
    for ch in raw_type.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
