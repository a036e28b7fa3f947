//! The common error type for easel operations.

use std::fmt;

/// An error raised by the drawing state machine or a rendering backend.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An unmatched `pop`/`restore`; the payload describes the stack involved.
    StackUnderflow(&'static str),
    /// A path-mutation command was issued while no path was being built.
    NoActivePath,
    /// An argument fell outside its domain; the message names it.
    InvalidArgument(String),
    /// A failure reported by the rendering backend.
    BackendError(Box<dyn std::error::Error>),
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }
}

/// Create a new error of the given kind.
pub(crate) fn new_error(kind: ErrorKind) -> Error {
    Error(Box::new(kind))
}

/// Shorthand for an `InvalidArgument` error.
pub(crate) fn invalid_arg(msg: impl Into<String>) -> Error {
    new_error(ErrorKind::InvalidArgument(msg.into()))
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::StackUnderflow(msg) => write!(f, "{msg}"),
            ErrorKind::NoActivePath => {
                write!(f, "no active path; call begin_path first")
            }
            ErrorKind::InvalidArgument(ref msg) => write!(f, "{msg}"),
            ErrorKind::BackendError(ref e) => {
                write!(f, "backend error: ")?;
                e.fmt(f)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<Box<dyn std::error::Error>> for Error {
    fn from(e: Box<dyn std::error::Error>) -> Error {
        new_error(ErrorKind::BackendError(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        new_error(ErrorKind::BackendError(Box::new(e)))
    }
}
