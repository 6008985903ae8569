use std::fmt;

/// The kind of failure reported by an [`Error`].
///
/// This is a closed taxonomy, not an open set of types: callers match on `kind` rather than
/// downcasting, the way the rest of this crate's API is built around plain `Result<T, Error>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A graph failed structural validation: an out-of-range neighbor, a non-finite weight, a
    /// missing mirror edge when symmetry was required, or an unreached index when connectivity
    /// was required.
    InvalidGraph,
    /// An origin/destination index was out of range, a lat/lon pair was out of bounds, or a
    /// grid endpoint's closest cell turned out to be disconnected.
    InvalidEndpoint,
    /// An algorithm completed and the destination is still at distance infinity.
    Disconnected,
    /// The periodic cycle check in the negative-weight algorithm walked back to its own start.
    NegativeCycle,
    /// An unrecognized enum value, a non-positive bound, an inconsistent option pair, or an
    /// export/import version mismatch.
    InvalidArgument,
    /// A persistence read or write failed, including a filename with the wrong extension.
    IOError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidGraph => "InvalidGraph",
            ErrorKind::InvalidEndpoint => "InvalidEndpoint",
            ErrorKind::Disconnected => "Disconnected",
            ErrorKind::NegativeCycle => "NegativeCycle",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::IOError => "IOError",
        };
        write!(f, "{}", s)
    }
}

/// A library error: a [`ErrorKind`] plus a human-readable message.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        let error = Error {
            kind,
            message: message.into(),
        };
        tracing::debug!(kind = %error.kind, message = %error.message, "operation failed");
        error
    }

    pub fn invalid_graph<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::InvalidGraph, message)
    }

    pub fn invalid_endpoint<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::InvalidEndpoint, message)
    }

    pub fn disconnected<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::Disconnected, message)
    }

    pub fn negative_cycle<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::NegativeCycle, message)
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::InvalidArgument, message)
    }

    pub fn io_error<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::IOError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::io_error(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Error {
        Error::io_error(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_stable_and_non_empty() {
        let e = Error::disconnected("no path from 0 to 5");
        let s = format!("{}", e);
        assert_eq!(s, "Disconnected: no path from 0 to 5");
    }

    #[test]
    fn test_kind_display_values() {
        assert_eq!(format!("{}", ErrorKind::InvalidGraph), "InvalidGraph");
        assert_eq!(format!("{}", ErrorKind::NegativeCycle), "NegativeCycle");
    }
}
