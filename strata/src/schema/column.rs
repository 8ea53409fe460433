use crate::common::{Value, DATE_FORMAT};
use crate::errors::{ErrorKind, StrataError, StrataResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Abstract column types a migration can declare.
///
/// Adapters map each type to a native SQL type (see the adapter's type mapping), and
/// map native types read back from the database to the closest abstract type with
/// [ColumnType::from_sql_type].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    PrimaryKey,
    String,
    Text,
    Integer,
    Float,
    DateTime,
    Timestamp,
    Time,
    Date,
    Binary,
    Boolean,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::PrimaryKey => "primary_key",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::DateTime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Time => "time",
            ColumnType::Date => "date",
            ColumnType::Binary => "binary",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Maps a native SQL type declaration back to an abstract column type.
    ///
    /// The match is on substrings, in an order that keeps `datetime` from being read
    /// as `date` or `time`. Unknown declarations fall back to [ColumnType::String].
    pub fn from_sql_type(sql_type: &str) -> ColumnType {
        let lower = sql_type.to_lowercase();
        if lower.contains("int") {
            ColumnType::Integer
        } else if lower.contains("float") || lower.contains("double") || lower.contains("real")
            || lower.contains("decimal") || lower.contains("numeric")
        {
            ColumnType::Float
        } else if lower.contains("datetime") {
            ColumnType::DateTime
        } else if lower.contains("timestamp") {
            ColumnType::Timestamp
        } else if lower.contains("time") {
            ColumnType::Time
        } else if lower.contains("date") {
            ColumnType::Date
        } else if lower.contains("clob") || lower.contains("text") {
            ColumnType::Text
        } else if lower.contains("blob") || lower.contains("binary") {
            ColumnType::Binary
        } else if lower.contains("char") || lower.contains("string") {
            ColumnType::String
        } else if lower.contains("bool") {
            ColumnType::Boolean
        } else {
            ColumnType::String
        }
    }

    /// Converts the textual form of a value (as found in a column default) into a
    /// typed [Value] for this column type.
    pub fn typecast(&self, raw: &str) -> StrataResult<Value> {
        match self {
            ColumnType::Boolean => parse_bool(raw).map(Value::Bool),
            ColumnType::Integer | ColumnType::PrimaryKey => {
                Ok(Value::Integer(raw.trim().parse::<i64>()?))
            }
            ColumnType::Float => Ok(Value::Float(raw.trim().parse::<f64>()?)),
            ColumnType::Date => Ok(Value::Date(NaiveDate::parse_from_str(
                raw.trim(),
                DATE_FORMAT,
            )?)),
            ColumnType::DateTime | ColumnType::Timestamp => {
                parse_datetime(raw.trim()).map(Value::DateTime)
            }
            ColumnType::String | ColumnType::Text | ColumnType::Time | ColumnType::Binary => {
                Ok(Value::String(raw.to_string()))
            }
        }
    }

    /// Coerces a value read from storage into the representation of this column type,
    /// e.g. `1` stored in a boolean column becomes `true`.
    pub fn coerce(&self, value: Value) -> StrataResult<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (ColumnType::Boolean, Value::Integer(v)) => Ok(Value::Bool(v != 0)),
            (ColumnType::Boolean, Value::String(v)) => parse_bool(&v).map(Value::Bool),
            (ColumnType::Integer | ColumnType::PrimaryKey, Value::String(v)) => {
                Ok(Value::Integer(v.trim().parse::<i64>()?))
            }
            (ColumnType::Integer | ColumnType::PrimaryKey, Value::Bool(v)) => {
                Ok(Value::Integer(v as i64))
            }
            (ColumnType::Float, Value::Integer(v)) => Ok(Value::Float(v as f64)),
            (ColumnType::Float, Value::String(v)) => Ok(Value::Float(v.trim().parse::<f64>()?)),
            (ColumnType::Date, Value::String(v)) => self.typecast(&v),
            (ColumnType::Date, Value::DateTime(v)) => Ok(Value::Date(v.date())),
            (ColumnType::DateTime | ColumnType::Timestamp, Value::String(v)) => self.typecast(&v),
            (ColumnType::DateTime | ColumnType::Timestamp, Value::Date(v)) => {
                Ok(Value::DateTime(v.and_time(chrono::NaiveTime::MIN)))
            }
            (ColumnType::String | ColumnType::Text, Value::Integer(v)) => {
                Ok(Value::String(v.to_string()))
            }
            (ColumnType::String | ColumnType::Text, Value::Float(v)) => {
                Ok(Value::String(v.to_string()))
            }
            (_, value) => Ok(value),
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColumnType {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary_key" => Ok(ColumnType::PrimaryKey),
            "string" => Ok(ColumnType::String),
            "text" => Ok(ColumnType::Text),
            "integer" => Ok(ColumnType::Integer),
            "float" => Ok(ColumnType::Float),
            "datetime" => Ok(ColumnType::DateTime),
            "timestamp" => Ok(ColumnType::Timestamp),
            "time" => Ok(ColumnType::Time),
            "date" => Ok(ColumnType::Date),
            "binary" => Ok(ColumnType::Binary),
            "boolean" => Ok(ColumnType::Boolean),
            other => Err(StrataError::new(
                &format!("Unknown column type: {}", other),
                ErrorKind::InvalidDataType,
            )),
        }
    }
}

fn parse_bool(raw: &str) -> StrataResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        other => Err(StrataError::new(
            &format!("Cannot read '{}' as a boolean", other),
            ErrorKind::InvalidDataType,
        )),
    }
}

fn parse_datetime(raw: &str) -> StrataResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(StrataError::from)
}

/// Per-column options recognised by the DDL surface: nullability, default value and
/// length limit.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOptions {
    pub null: bool,
    pub default: Option<Value>,
    pub limit: Option<u32>,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        ColumnOptions {
            null: true,
            default: None,
            limit: None,
        }
    }
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_null(mut self) -> Self {
        self.null = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The default, if any, ignoring an explicit `DEFAULT NULL`.
    pub fn effective_default(&self) -> Option<&Value> {
        self.default.as_ref().filter(|v| !v.is_null())
    }
}

/// A column declared by a migration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub options: ColumnOptions,
}

impl ColumnDefinition {
    pub fn new(name: &str, column_type: ColumnType, options: ColumnOptions) -> Self {
        ColumnDefinition {
            name: name.to_string(),
            column_type,
            options,
        }
    }
}

/// A column as reported by an adapter's introspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    sql_type: String,
    column_type: ColumnType,
    null: bool,
    default: Option<Value>,
    primary: bool,
}

impl Column {
    pub fn new(
        name: &str,
        sql_type: &str,
        column_type: ColumnType,
        null: bool,
        default: Option<Value>,
        primary: bool,
    ) -> Self {
        Column {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            column_type,
            null,
            default,
            primary,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn null(&self) -> bool {
        self.null
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn primary(&self) -> bool {
        self.primary
    }
}
