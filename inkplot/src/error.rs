//! The common error type for render operations.

use std::fmt;

/// An error that can occur while rendering.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A `restore` without a matching `save`.
    StackUnbalance,
    /// An image source could not be decoded.
    ImageDecode(Box<dyn std::error::Error>),
    /// An error from the underlying surface.
    BackendError(Box<dyn std::error::Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::StackUnbalance => write!(f, "Stack unbalanced"),
            Error::ImageDecode(e) => write!(f, "Image decode error: {e}"),
            Error::BackendError(e) => write!(f, "Backend error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ImageDecode(e) | Error::BackendError(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<Box<dyn std::error::Error>> for Error {
    fn from(e: Box<dyn std::error::Error>) -> Error {
        Error::BackendError(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Error {
        Error::ImageDecode(Box::new(e))
    }
}
