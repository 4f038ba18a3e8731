//! SQL cell values returned by catalog, browse and rule queries.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::ser::{Serialize, Serializer};

/// Timestamp layouts accepted when a textual value is read as a timestamp.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d-%b-%y %I.%M.%S%.f %p",
];

/// A single cell of a result set.
///
/// Drivers produce the most specific variant they can decode; ODBC sources
/// fall back to [`SqlValue::Text`] for everything that is not temporal.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    /// Unsigned integers that do not fit in `i64` (MySQL `BIGINT UNSIGNED`).
    U64(u64),
    F64(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// String form of the value, `None` for NULL.
    ///
    /// Mirrors what a driver's `getString` returns: numbers and temporal
    /// values are rendered in their canonical text form, bytes are decoded
    /// lossily as UTF-8.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            other => Some(other.to_string()),
        }
    }

    /// Integer view used for catalog facets (length, precision, scale).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::I64(v) => Some(*v),
            SqlValue::U64(v) => i64::try_from(*v).ok(),
            SqlValue::Bool(v) => Some(i64::from(*v)),
            SqlValue::Decimal(d) => d.trunc().to_string().parse().ok(),
            SqlValue::F64(v) if v.fract() == 0.0 => Some(*v as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the value as a timestamp.
    ///
    /// NULL stays NULL, dates become midnight timestamps and text is parsed
    /// with the layouts drivers commonly emit. Anything else is an error
    /// carrying a description of the offending value.
    pub fn to_timestamp(&self) -> std::result::Result<SqlValue, String> {
        match self {
            SqlValue::Null => Ok(SqlValue::Null),
            SqlValue::DateTime(v) => Ok(SqlValue::DateTime(*v)),
            SqlValue::Date(d) => Ok(SqlValue::DateTime(d.and_time(NaiveTime::MIN))),
            SqlValue::Text(s) => {
                let s = s.trim();
                TIMESTAMP_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                    .or_else(|| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .ok()
                            .map(|d| d.and_time(NaiveTime::MIN))
                    })
                    .map(SqlValue::DateTime)
                    .ok_or_else(|| format!("'{}' is not a timestamp", s))
            }
            other => Err(format!("{:?} is not a timestamp", other)),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(v) => write!(f, "{}", v),
            SqlValue::I64(v) => write!(f, "{}", v),
            SqlValue::U64(v) => write!(f, "{}", v),
            SqlValue::F64(v) => write!(f, "{}", v),
            SqlValue::Decimal(v) => write!(f, "{}", v),
            SqlValue::Text(v) => f.write_str(v),
            SqlValue::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            SqlValue::Date(v) => write!(f, "{}", v),
            SqlValue::Time(v) => write!(f, "{}", v),
            SqlValue::DateTime(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Bool(v) => serializer.serialize_bool(*v),
            SqlValue::I64(v) => serializer.serialize_i64(*v),
            SqlValue::U64(v) => serializer.serialize_u64(*v),
            SqlValue::F64(v) => serializer.serialize_f64(*v),
            other => serializer.collect_str(other),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I64(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
