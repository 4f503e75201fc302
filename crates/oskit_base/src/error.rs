use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Better control over error handling
- No dependencies to compile and integrate
- More transparency into error handling logic
 */

/// Error variants that can occur in oskit operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError { path: PathBuf, source: io::Error },

    /// Environment variable could not be read or written
    EnvError { name: String, message: String },

    /// Caller passed something the platform cannot accept
    InvalidInput { message: String },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/* 📖 # Why classify failures into a FailureReason?

The sentinel surface of the facade collapses every failure into `false`, `0` or an empty
value. Callers that need to tell "missing" from "denied" from "broken" go through the PAL
instead, and `FailureReason` is the small, stable vocabulary for that distinction.
*/

/// Coarse classification of why an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    Other,
}

impl From<io::ErrorKind> for FailureReason {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => FailureReason::NotFound,
            io::ErrorKind::PermissionDenied => FailureReason::PermissionDenied,
            io::ErrorKind::AlreadyExists => FailureReason::AlreadyExists,
            _ => FailureReason::Other,
        }
    }
}

/* 📖 # Why separate ErrorKind and OsError?
This two-layer design provides a clear separation of concerns:
- ErrorKind: structural variants with specific contexts (file paths, variable names)
- OsError: wraps ErrorKind with context strings, an optional cause and a span trace

Users can pattern match on ErrorKind for specific handling while OsError keeps context
attachment ergonomic during propagation.
*/

/// Error type wrapping ErrorKind with context, an optional cause and a captured span trace.
pub struct OsError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<OsError>>,
    span_trace: SpanTrace,
}

impl OsError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a `Message` error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a `FileError` for the given path.
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: OsError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&OsError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Classifies the failure. Falls back to the cause when this error carries no I/O source.
    pub fn reason(&self) -> FailureReason {
        match &self.kind {
            ErrorKind::FileError { source, .. } => source.kind().into(),
            _ => self
                .cause
                .as_ref()
                .map_or(FailureReason::Other, |cause| cause.reason()),
        }
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_kind(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::EnvError { name, message } => {
                write!(f, "Environment variable '{}': {}", name, message)
            }
            ErrorKind::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let children = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let connector = if i + 1 == children { "└─" } else { "├─" };
            writeln!(f, "{indent}{connector} {ctx}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "{indent}└─ cause: ")?;
            cause.fmt_kind(f)?;
            writeln!(f)?;
            cause.fmt_tree(f, &format!("{indent}   "))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for OsError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for OsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            _ => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        self.fmt_kind(f)
    }
}

/* 📖 # Why a tree-shaped Debug output?

Errors usually surface through `unwrap()` in tests or through log lines. Printing the message,
then each context and cause as a tree, then the span trace, makes the failure readable
without reaching for a debugger.
*/

impl fmt::Debug for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_kind(f)?;
        writeln!(f)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<OsError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.
*/

/// Standard result type for oskit operations.
pub type OsResult<T> = std::result::Result<T, Box<OsError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> OsResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> OsResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for OsResult<T> {
    fn context(self, context: impl Into<String>) -> OsResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> OsResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Builds a boxed `Message` error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        ::std::boxed::Box::new($crate::error::OsError::message(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_io_error_kind() {
        let cases = [
            (io::ErrorKind::NotFound, FailureReason::NotFound),
            (io::ErrorKind::PermissionDenied, FailureReason::PermissionDenied),
            (io::ErrorKind::AlreadyExists, FailureReason::AlreadyExists),
            (io::ErrorKind::Interrupted, FailureReason::Other),
        ];
        for (kind, expected) in cases {
            let error = OsError::file("x", io::Error::new(kind, "boom"));
            assert_eq!(error.reason(), expected);
        }
    }

    #[test]
    fn test_reason_of_message_is_other() {
        assert_eq!(OsError::message("nope").reason(), FailureReason::Other);
    }

    #[test]
    fn test_reason_falls_back_to_cause() {
        let inner = OsError::file("a", io::Error::new(io::ErrorKind::NotFound, "gone"));
        let outer = OsError::message("outer").caused_by(inner);
        assert_eq!(outer.reason(), FailureReason::NotFound);
    }

    #[test]
    fn test_env_error_display() {
        let error = OsError::new(ErrorKind::EnvError {
            name: "PATH".to_string(),
            message: "contains NUL".to_string(),
        });
        assert_eq!(error.to_string(), "Environment variable 'PATH': contains NUL");
    }

    #[test]
    fn test_invalid_input_display() {
        let error = OsError::new(ErrorKind::InvalidInput {
            message: "empty path".to_string(),
        })
        .context("join");
        assert_eq!(error.to_string(), "join: Invalid input: empty path");
    }

    #[test]
    fn test_err_macro_formats_message() {
        let error: Box<OsError> = crate::err!("bad value {}", 7);
        assert_eq!(error.to_string(), "bad value 7");
    }

    #[test]
    fn test_cause_is_error_source() {
        let outer = OsError::message("outer").caused_by(OsError::message("inner"));
        assert_eq!(outer.source().map(|s| s.to_string()).as_deref(), Some("inner"));
        assert_eq!(outer.root_cause().to_string(), "inner");
    }
}
