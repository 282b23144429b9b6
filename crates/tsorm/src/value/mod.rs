//! Value representation and SQL literal rendering.
//!
//! The ORM never sends bound parameters: every value, whether a tag, a
//! column, or a predicate argument, is rendered into the SQL text as a
//! literal by [`sql_literal`]. [`explain`] applies the same rendering to a
//! parameterized statement for diagnostics.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::error::{OrmError, OrmResult};

/// A single database value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit NULL. Distinct from an *absent* value, which is modeled as
    /// `Option::<Value>::None` at the record accessor and never reaches SQL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Str(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp value.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Returns true if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Tries to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Tries to get as a signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Tries to get as an unsigned integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Tries to get as a float. Integers widen losslessly where possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Tries to get as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Tries to get as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Tries to get as a timestamp. Integer values are interpreted as
    /// milliseconds since the Unix epoch, the wire format most drivers use.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Int(ms) => Utc.timestamp_millis_opt(*ms).single(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Renders a value as a SQL literal.
///
/// Text is single-quoted with internal quotes backslash-escaped; binary
/// data is quoted as text; timestamps are quoted in RFC 3339 form with
/// nanosecond precision and an explicit `Z`; NULL renders unquoted.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => format!("'{}'", s.replace('\'', "\\'")),
        Value::Bytes(b) => format!("'{}'", String::from_utf8_lossy(b)),
        Value::Timestamp(ts) => {
            format!("'{}'", ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
        }
    }
}

/// Substitutes `?` placeholders with rendered literals, left to right.
///
/// One placeholder is consumed per argument. Placeholders beyond the
/// argument count are left untouched; arguments beyond the placeholder
/// count are silently unused. Exposed for "explain this statement"
/// diagnostics as well as internal predicate resolution.
pub fn explain(sql: &str, args: &[Value]) -> String {
    let mut out = sql.to_string();
    let mut from = 0;
    for arg in args {
        let Some(pos) = out[from..].find('?').map(|p| p + from) else {
            break;
        };
        let literal = sql_literal(arg);
        out.replace_range(pos..pos + 1, &literal);
        from = pos + literal.len();
    }
    out
}

/// Trait for converting a [`Value`] back into a native type during scans.
pub trait FromValue: Sized {
    /// Converts from a value, returning `None` on a kind mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i8 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().map(|v| v as i8)
    }
}

impl FromValue for i16 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().map(|v| v as i16)
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().map(|v| v as i32)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for u8 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64().map(|v| v as u8)
    }
}

impl FromValue for u16 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64().map(|v| v as u16)
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64().map(|v| v as u32)
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(|s| s.to_string())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(b) => Some(b.clone()),
            Value::Str(s) => Some(s.as_bytes().to_vec()),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => value.as_timestamp(),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// Converts a scanned value, producing a [`OrmError::Scan`] on mismatch.
///
/// Intended for use inside [`Record::assign`](crate::schema::Record::assign)
/// implementations.
pub fn scan<T: FromValue>(column: &str, value: &Value) -> OrmResult<T> {
    T::from_value(value).ok_or_else(|| OrmError::Scan {
        column: column.to_string(),
        message: format!("cannot convert {:?}", value),
    })
}

/// Like [`scan`], but maps NULL to `None` instead of failing.
pub fn scan_opt<T: FromValue>(column: &str, value: &Value) -> OrmResult<Option<T>> {
    if value.is_null() {
        return Ok(None);
    }
    scan(column, value).map(Some)
}
