use backtrace::Backtrace;
use parking_lot::RwLock;
use smallvec::{smallvec, SmallVec};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for migration operations
///
/// A [`MigrationError`] carries one primary kind and any number of secondary
/// kinds, so a failure can belong to several categories at once. For example
/// a fingerprint that cannot be computed is both a [`ErrorKind::FileAccessError`]
/// and a [`ErrorKind::MigrationFailed`]. Use [`MigrationError::matches`] to branch
/// on a category.
///
/// # Examples
///
/// ```rust
/// use scriptum::errors::{ErrorKind, MigrationError};
///
/// let err = MigrationError::new("hash drift", ErrorKind::HashMismatchError)
///     .also(ErrorKind::MigrationFailed);
/// assert!(err.matches(&ErrorKind::HashMismatchError));
/// assert!(err.matches(&ErrorKind::MigrationFailed));
/// assert!(!err.matches(&ErrorKind::FileAccessError));
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    // Filesystem
    /// The scripts directory or a script file could not be read
    FileAccessError,

    // Ledger
    /// The ledger could not be reached (existence check, creation, read or write)
    LedgerAccessError,
    /// A ledger operation was rejected or failed at the store level
    LedgerOperationError,

    // Reconciliation
    /// A not yet applied script sorts before an already applied one
    OrderMismatchError,
    /// An applied script's content no longer matches its recorded fingerprint
    HashMismatchError,

    // Apply phase
    /// A pending script failed to run against the store
    ExecutionError,
    /// A script ran but its ledger record could not be written
    PersistError,

    /// The migration run was aborted
    MigrationFailed,

    // Setup
    /// The migrator was configured with missing or invalid settings
    InvalidConfiguration,
    /// A ledger record could not be mapped to or from its stored form
    ObjectMappingError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FileAccessError => write!(f, "File access error"),
            ErrorKind::LedgerAccessError => write!(f, "Ledger access error"),
            ErrorKind::LedgerOperationError => write!(f, "Ledger operation error"),
            ErrorKind::OrderMismatchError => write!(f, "Order mismatch"),
            ErrorKind::HashMismatchError => write!(f, "Hash mismatch"),
            ErrorKind::ExecutionError => write!(f, "Execution error"),
            ErrorKind::PersistError => write!(f, "Persist error"),
            ErrorKind::MigrationFailed => write!(f, "Migration failed"),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

type KindVec = SmallVec<[ErrorKind; 3]>;

/// Error type for every fallible operation in this crate.
///
/// `MigrationError` carries a human-readable message, a classification made of
/// one or more [`ErrorKind`]s, the id of the offending script when there is one,
/// and an optional cause. A backtrace is captured at construction time and shown
/// by the `Debug` representation.
///
/// # Examples
///
/// ```rust
/// use scriptum::errors::{ErrorKind, MigrationError};
///
/// let cause = MigrationError::new("connection refused", ErrorKind::LedgerAccessError);
/// let err = MigrationError::new_with_cause(
///     "Unable to save migration info for '002_users.sql'",
///     ErrorKind::PersistError,
///     cause,
/// )
/// .for_script("002_users.sql");
///
/// assert_eq!(err.kind(), &ErrorKind::PersistError);
/// assert_eq!(err.script_id(), Some("002_users.sql"));
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct MigrationError {
    message: String,
    kinds: KindVec,
    script_id: Option<String>,
    cause: Option<Box<MigrationError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl MigrationError {
    /// Creates a new `MigrationError` with the specified message and primary kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MigrationError {
            message: message.to_string(),
            kinds: smallvec![error_kind],
            script_id: None,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    /// Creates a new `MigrationError` that keeps `cause` in its error chain.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MigrationError) -> Self {
        MigrationError {
            message: message.to_string(),
            kinds: smallvec![error_kind],
            script_id: None,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    /// Adds a secondary classification. Adding a kind twice has no effect.
    pub fn also(mut self, error_kind: ErrorKind) -> Self {
        if !self.kinds.contains(&error_kind) {
            self.kinds.push(error_kind);
        }
        self
    }

    /// Attaches the id of the script this error is about.
    pub fn for_script(mut self, script_id: &str) -> Self {
        self.script_id = Some(script_id.to_string());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The primary kind, i.e. the one the error was created with.
    pub fn kind(&self) -> &ErrorKind {
        &self.kinds[0]
    }

    pub fn kinds(&self) -> &[ErrorKind] {
        &self.kinds
    }

    /// Returns `true` if this error belongs to the given category.
    pub fn matches(&self, error_kind: &ErrorKind) -> bool {
        self.kinds.contains(error_kind)
    }

    pub fn script_id(&self) -> Option<&str> {
        self.script_id.as_deref()
    }

    pub fn cause(&self) -> Option<&MigrationError> {
        self.cause.as_deref()
    }
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // kinds and message first, then either the cause chain or the stack trace
        match &self.cause {
            Some(cause) => write!(
                f,
                "[{}] {}\nCaused by: {:?}",
                self.kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", "),
                self.message,
                cause
            ),
            None => write!(
                f,
                "[{}] {}\n{:?}",
                self.kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", "),
                self.message,
                self.backtrace.read()
            ),
        }
    }
}

impl Error for MigrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for migration operations.
///
/// `MigrationResult<T>` is shorthand for `Result<T, MigrationError>`.
pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(feature = "serde")]
impl serde::de::Error for MigrationError {
    fn custom<T: Display>(msg: T) -> Self {
        MigrationError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for MigrationError {
    fn custom<T: Display>(msg: T) -> Self {
        MigrationError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::io::Error> for MigrationError {
    fn from(err: std::io::Error) -> Self {
        MigrationError::new(&err.to_string(), ErrorKind::FileAccessError)
    }
}

impl From<std::string::FromUtf8Error> for MigrationError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        MigrationError::new(
            &format!("Script is not valid UTF-8: {}", err),
            ErrorKind::FileAccessError,
        )
    }
}

impl From<String> for MigrationError {
    fn from(msg: String) -> Self {
        MigrationError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MigrationError {
    fn from(msg: &str) -> Self {
        MigrationError::new(msg, ErrorKind::InternalError)
    }
}
