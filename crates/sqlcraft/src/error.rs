//! Error types for sqlcraft

use thiserror::Error;

/// Result type alias for sqlcraft operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for rendering and executing statements
#[derive(Debug, Error)]
pub enum SqlError {
    /// Template placeholders and supplied arguments disagree
    #[error("Template mismatch: template has {expected} positional placeholder(s), got {got} argument(s)")]
    TemplateMismatch { expected: usize, got: usize },

    /// A named placeholder has no matching argument
    #[error("Template mismatch: no argument named '{0}'")]
    MissingArgument(String),

    /// An argument cannot be used in the slot it was given to
    #[error("Template mismatch: {0}")]
    InvalidArgument(String),

    /// A single-row or scalar accessor found no rows
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// The backend rejected or failed the statement
    #[error(transparent)]
    Execute(Box<ExecuteError>),

    /// Builder state cannot be compiled into the requested statement
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The active dialect has no native form of the requested statement
    #[error("{feature} is not supported by the {dialect} dialect")]
    Unsupported {
        dialect: &'static str,
        feature: &'static str,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

/// A statement failure reported by the backend.
///
/// `code` is the backend-native error code, kept verbatim: SQLite reports its
/// result code (`"1"`), Postgres its SQLSTATE (`"42P01"`), MySQL its error number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Execute error{}: {message}\nQuery: {debug_query}", code_suffix(.code))]
pub struct ExecuteError {
    pub code: Option<String>,
    pub message: String,
    /// Statement with values inlined, for human inspection only.
    pub debug_query: String,
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

impl SqlError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an empty result error
    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult(message.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Wrap a backend failure together with the statement that caused it
    pub fn execute(
        code: Option<String>,
        message: impl Into<String>,
        debug_query: impl Into<String>,
    ) -> Self {
        Self::Execute(Box::new(ExecuteError {
            code,
            message: message.into(),
            debug_query: debug_query.into(),
        }))
    }

    /// Check if this is an empty result error
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }

    /// Check if this is a backend execution error
    pub fn is_execute(&self) -> bool {
        matches!(self, Self::Execute(_))
    }

    /// Check if this is a template mismatch of any kind
    pub fn is_template_mismatch(&self) -> bool {
        matches!(
            self,
            Self::TemplateMismatch { .. } | Self::MissingArgument(_) | Self::InvalidArgument(_)
        )
    }

    /// Backend-native error code, if this is an execution error that carries one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Execute(e) => e.code.as_deref(),
            _ => None,
        }
    }

    /// Human-readable statement attached to an execution error
    pub fn debug_query(&self) -> Option<&str> {
        match self {
            Self::Execute(e) => Some(&e.debug_query),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
