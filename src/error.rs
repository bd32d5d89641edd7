//! Unified error type.

use std::fmt;

/// The error type returned by the server's fallible operations.
///
/// HTTP-level failures (a missing spec file, an unsatisfiable range) are
/// [`Response`](crate::Response) values, not `Error`s. This type surfaces
/// infrastructure failures: binding the listener or reading its address.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl Error {
    /// The underlying I/O error kind.
    pub fn kind(&self) -> std::io::ErrorKind {
        self.0.kind()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn wraps_io_error() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken"));
        assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);
        assert_eq!(err.to_string(), "io: port taken");
        assert!(err.source().is_some());
    }
}
