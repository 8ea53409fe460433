use rusqlite::types::{Value as SqlValue, ValueRef};
use std::error::Error;
use strata::common::{Value, DATETIME_FORMAT, DATE_FORMAT};
use strata::errors::{ErrorKind, StrataError};

/// Errors raised while converting between strata values and SQLite values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SqliteValueError {
    #[error("Text value is not valid UTF-8: {0}")]
    InvalidText(String),
    #[error("Cannot render {0} as a SQL literal")]
    UnsupportedLiteral(String),
}

impl From<SqliteValueError> for StrataError {
    fn from(err: SqliteValueError) -> Self {
        match err {
            SqliteValueError::InvalidText(_) => {
                StrataError::new(&err.to_string(), ErrorKind::EncodingError)
            }
            SqliteValueError::UnsupportedLiteral(_) => {
                StrataError::new(&err.to_string(), ErrorKind::InvalidDataType)
            }
        }
    }
}

/// Converts a strata [Value] into an owned SQLite value for parameter binding.
///
/// Booleans are stored as `1`/`0`; dates and date-times as text in the strata
/// formats, which SQLite's date functions understand.
pub(crate) fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(*v as i64),
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Float(v) => SqlValue::Real(*v),
        Value::String(v) => SqlValue::Text(v.clone()),
        Value::Date(v) => SqlValue::Text(v.format(DATE_FORMAT).to_string()),
        Value::DateTime(v) => SqlValue::Text(v.format(DATETIME_FORMAT).to_string()),
    }
}

/// Reads a raw SQLite value. Callers coerce the result to the column type.
pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Result<Value, SqliteValueError> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::Integer(v)),
        ValueRef::Real(v) => Ok(Value::Float(v)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| SqliteValueError::InvalidText(e.to_string())),
        ValueRef::Blob(bytes) => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// Renders a value as a SQL literal for `DEFAULT` clauses, which cannot be bound.
pub(crate) fn sql_literal(value: &Value) -> Result<String, SqliteValueError> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(v) => Ok(if *v { "1" } else { "0" }.to_string()),
        Value::Integer(v) => Ok(v.to_string()),
        Value::Float(v) if v.is_finite() => Ok(format!("{:?}", v)),
        Value::Float(v) => Err(SqliteValueError::UnsupportedLiteral(v.to_string())),
        Value::String(_) | Value::Date(_) | Value::DateTime(_) => {
            Ok(quote_string(&value.to_string()))
        }
    }
}

/// Parses the `dflt_value` column of `PRAGMA table_info` back into its text form.
///
/// Returns `None` for a missing or `NULL` default. Quoted strings are unquoted.
pub(crate) fn parse_default(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    let unwrapped = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);
    match unwrapped
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        Some(inner) => Some(inner.replace("''", "'")),
        None => Some(unwrapped.to_string()),
    }
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn quote_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Maps a SQLite error to StrataError.
///
/// Statement failures keep the database's own message (e.g. `no such table: people`)
/// so callers see exactly what SQLite reported. Failures to open the database file are
/// reported as I/O errors.
pub(crate) fn to_strata_error(error: impl Error) -> StrataError {
    let error_msg = error.to_string();
    let error_kind = if error_msg.contains("unable to open") {
        ErrorKind::IOError
    } else {
        ErrorKind::StatementInvalid
    };
    StrataError::new(&error_msg, error_kind)
}
