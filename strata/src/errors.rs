use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for strata operations
///
/// Each kind describes one category of failure so callers can tell configuration
/// problems (raised before anything executes) apart from statement failures raised
/// by an adapter in the middle of a run.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::errors::{StrataError, ErrorKind, StrataResult};
///
/// fn example() -> StrataResult<()> {
///     Err(StrataError::new("no such table: reminders", ErrorKind::StatementInvalid))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Statement Errors - raised by adapters, never caught by the migrator
    /// The database rejected a statement (syntax, constraint, missing object)
    StatementInvalid,

    // Discovery Errors - configuration problems surfaced before any migration runs
    /// A migration identifier does not follow the `<version>_<name>` convention
    InvalidMigrationName,
    /// Two discovered migrations share the same version
    DuplicateMigrationVersion,
    /// A migration artifact provides only one of its up/down bodies
    MissingMigrationBody,

    // Validation Errors
    /// Generic validation error
    ValidationError,
    /// Invalid data type for operation
    InvalidDataType,

    // Operation Errors
    /// The operation is not valid in the current context
    InvalidOperation,

    // IO Errors - raised while scanning migration directories
    /// Generic IO error
    IOError,
    /// The file was not found
    FileNotFound,
    /// Permission denied for file operation
    PermissionDenied,
    /// Error encoding or decoding data
    EncodingError,

    // Extension Errors - allows adapter crates to plug in their own categories
    /// Error from an extension module (e.g., an adapter backend)
    Extension(String),

    // Generic/Internal Errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::StatementInvalid => write!(f, "Statement invalid"),
            ErrorKind::InvalidMigrationName => write!(f, "Invalid migration name"),
            ErrorKind::DuplicateMigrationVersion => write!(f, "Duplicate migration version"),
            ErrorKind::MissingMigrationBody => write!(f, "Missing migration body"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::FileNotFound => write!(f, "File not found"),
            ErrorKind::PermissionDenied => write!(f, "Permission denied"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::Extension(name) => write!(f, "{} error", name),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

impl ErrorKind {
    /// Returns true for the kinds raised by migration discovery.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidMigrationName
                | ErrorKind::DuplicateMigrationVersion
                | ErrorKind::MissingMigrationBody
        )
    }
}

/// Custom strata error type.
///
/// `StrataError` carries a message, a kind and an optional cause. The backtrace is
/// captured unresolved and only symbolized when the error is debug-printed.
///
/// # Examples
///
/// ```rust,ignore
/// use strata::errors::{StrataError, ErrorKind};
///
/// let err = StrataError::new("duplicate column name: last_name", ErrorKind::StatementInvalid);
///
/// let cause = StrataError::new("IO failed", ErrorKind::IOError);
/// let err = StrataError::new_with_cause("Cannot read migrations", ErrorKind::IOError, cause);
/// ```
#[derive(Clone)]
pub struct StrataError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StrataError>>,
    backtrace: Backtrace,
}

impl StrataError {
    /// Creates a new `StrataError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StrataError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new_unresolved(),
        }
    }

    /// Creates a new `StrataError` wrapping a cause error.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StrataError) -> Self {
        StrataError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new_unresolved(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StrataError> {
        self.cause.as_deref()
    }
}

impl Display for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.clone();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for StrataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        let error_kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => ErrorKind::EncodingError,
            _ => ErrorKind::IOError,
        };
        StrataError::new(&format!("IO error: {}", err), error_kind)
    }
}

impl From<std::num::ParseIntError> for StrataError {
    fn from(err: std::num::ParseIntError) -> Self {
        StrataError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<std::num::ParseFloatError> for StrataError {
    fn from(err: std::num::ParseFloatError) -> Self {
        StrataError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<chrono::ParseError> for StrataError {
    fn from(err: chrono::ParseError) -> Self {
        StrataError::new(
            &format!("Date parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<String> for StrataError {
    fn from(msg: String) -> Self {
        StrataError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for StrataError {
    fn from(msg: &str) -> Self {
        StrataError::new(msg, ErrorKind::InternalError)
    }
}
