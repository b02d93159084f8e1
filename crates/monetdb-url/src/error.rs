//! Error types for URL parsing and parameter handling.

use std::fmt;

/// The primary error type for this crate.
///
/// Errors fall into two user-facing taxonomies plus one intermediate one:
/// parse errors (malformed URL text), value errors (a single key/value pair
/// that could not be stored), and validation errors (a well-formed but
/// semantically inconsistent configuration). All are deterministic
/// functions of the input; none are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// URL text could not be parsed
    Parse(ParseError),
    /// A parameter value could not be converted or stored
    Value(ValueError),
    /// The configuration failed cross-field validation
    Validation(ValidationError),
}

/// A malformed-URL error with an optional byte position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the URL text, where applicable
    pub position: Option<usize>,
}

/// Failure to apply a single key/value pair to the parameter store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    pub kind: ValueErrorKind,
    /// The parameter name involved, when known
    pub parameter: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// Text did not parse as a boolean
    InvalidBool,
    /// Text did not parse as an integer
    InvalidInt,
    /// Parameter name not recognized
    UnknownParameter,
    /// Core parameter rejected in a restricted context
    CoreNotAllowed,
}

/// A cross-field validation failure.
///
/// Carries the message of the first failing rule; later rules are not
/// checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub(crate) fn at(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }
}

impl ValueError {
    pub(crate) fn invalid_bool(parameter: Option<&str>) -> Self {
        Self {
            kind: ValueErrorKind::InvalidBool,
            parameter: parameter.map(str::to_owned),
            message: "invalid boolean value".to_string(),
        }
    }

    pub(crate) fn invalid_int(parameter: Option<&str>, empty: bool) -> Self {
        Self {
            kind: ValueErrorKind::InvalidInt,
            parameter: parameter.map(str::to_owned),
            message: if empty {
                "integer parameter cannot be empty string".to_string()
            } else {
                "invalid integer".to_string()
            },
        }
    }

    pub(crate) fn unknown(name: &str) -> Self {
        Self {
            kind: ValueErrorKind::UnknownParameter,
            parameter: Some(name.to_string()),
            message: format!("unknown parameter '{name}'"),
        }
    }

    pub(crate) fn core_not_allowed(name: &str) -> Self {
        Self {
            kind: ValueErrorKind::CoreNotAllowed,
            parameter: Some(name.to_string()),
            message: "parameter not allowed here".to_string(),
        }
    }
}

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Value(e) => write!(f, "{e}"),
            Error::Validation(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ParseError {}
impl std::error::Error for ValueError {}
impl std::error::Error for ValidationError {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<ValueError> for Error {
    fn from(err: ValueError) -> Self {
        Error::Value(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
