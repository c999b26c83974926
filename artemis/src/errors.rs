use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for mapping and repository operations.
///
/// Each kind names one category of failure so callers can branch on
/// [`MappingError::kind`] instead of matching on messages.
///
/// # Examples
///
/// ```rust,ignore
/// use artemis::errors::{ErrorKind, MappingError, MappingResult};
///
/// fn example() -> MappingResult<()> {
///     Err(MappingError::new("Person has no default constructor", ErrorKind::MappingError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A type cannot be described or converted
    MappingError,
    /// A query method name failed to parse or lacks positional arguments
    DynamicQueryError,
    /// A single-result query matched more than one entity
    NonUniqueResultError,
    /// A store collaborator does not provide the capability its slot requires
    IllegalStateError,
    /// A required argument was absent
    NullArgument,
    /// Failure reported by an external store driver
    StoreError,
    /// A persist listener failed
    HookError,
    /// An asynchronous operation was cancelled before completion
    Cancelled,

    /// Error from an extension crate, the string names the extension
    Extension(String),

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MappingError => write!(f, "Mapping error"),
            ErrorKind::DynamicQueryError => write!(f, "Dynamic query error"),
            ErrorKind::NonUniqueResultError => write!(f, "Non unique result error"),
            ErrorKind::IllegalStateError => write!(f, "Illegal state error"),
            ErrorKind::NullArgument => write!(f, "Null argument"),
            ErrorKind::StoreError => write!(f, "Store error"),
            ErrorKind::HookError => write!(f, "Hook error"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::Extension(name) => write!(f, "Extension error: {}", name),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// The error type of the crate.
///
/// Carries a message, an [`ErrorKind`], an optional cause and the backtrace
/// captured at construction. Errors chain through [`MappingError::new_with_cause`]
/// and expose the chain through [`std::error::Error::source`].
///
/// # Examples
///
/// ```rust,ignore
/// use artemis::errors::{ErrorKind, MappingError};
///
/// let cause = MappingError::new("cannot convert 'abc' to i32", ErrorKind::MappingError);
/// let err = MappingError::new_with_cause(
///     "failed to read field age of Person",
///     ErrorKind::MappingError,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct MappingError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MappingError>>,
    backtrace: Arc<Backtrace>,
}

impl MappingError {
    /// Creates a new `MappingError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MappingError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `MappingError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MappingError) -> Self {
        MappingError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Precondition failure for an absent argument, named by `parameter`.
    pub fn null_argument(parameter: &str) -> Self {
        MappingError::new(&format!("{} is required", parameter), ErrorKind::NullArgument)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&MappingError> {
        self.cause.as_deref()
    }
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// `MappingResult<T>` is shorthand for `Result<T, MappingError>`.
pub type MappingResult<T> = Result<T, MappingError>;

#[cfg(feature = "serde")]
impl serde::de::Error for MappingError {
    fn custom<T: Display>(msg: T) -> Self {
        MappingError::new(&msg.to_string(), ErrorKind::MappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for MappingError {
    fn custom<T: Display>(msg: T) -> Self {
        MappingError::new(&msg.to_string(), ErrorKind::MappingError)
    }
}

impl From<std::fmt::Error> for MappingError {
    fn from(err: std::fmt::Error) -> Self {
        MappingError::new(&format!("Formatting error: {}", err), ErrorKind::InternalError)
    }
}

impl From<std::num::ParseIntError> for MappingError {
    fn from(err: std::num::ParseIntError) -> Self {
        MappingError::new(&format!("Integer parsing error: {}", err), ErrorKind::MappingError)
    }
}

impl From<std::num::ParseFloatError> for MappingError {
    fn from(err: std::num::ParseFloatError) -> Self {
        MappingError::new(&format!("Float parsing error: {}", err), ErrorKind::MappingError)
    }
}

impl From<regex::Error> for MappingError {
    fn from(err: regex::Error) -> Self {
        MappingError::new(&format!("Invalid pattern: {}", err), ErrorKind::DynamicQueryError)
    }
}

impl From<String> for MappingError {
    fn from(msg: String) -> Self {
        MappingError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MappingError {
    fn from(msg: &str) -> Self {
        MappingError::new(msg, ErrorKind::InternalError)
    }
}
