//! Error types for the transport

use std::io;

use thiserror::Error;

/// Errors that can occur while talking to the set-top-box socket
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection could not be established
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Writing a frame failed
    #[error("Write error: {0}")]
    Write(#[source] io::Error),

    /// Reading a frame failed
    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    /// No data moved within the configured timeout
    #[error("Operation timed out")]
    Timeout,

    /// The peer closed or reset the connection
    #[error("Connection closed by peer")]
    Closed,
}

impl TransportError {
    /// True when a write hit a broken pipe.
    ///
    /// The box drops the socket when commands arrive faster than it can
    /// process them, so a broken pipe still proves it is powered on.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, TransportError::Write(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }

    pub(crate) fn from_read(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof => TransportError::Closed,
            _ => TransportError::Read(error),
        }
    }

    pub(crate) fn from_write(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::Timeout,
            _ => TransportError::Write(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_detection() {
        let err = TransportError::Write(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(err.is_broken_pipe());

        let err = TransportError::Write(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_broken_pipe());

        assert!(!TransportError::Closed.is_broken_pipe());
    }

    #[test]
    fn test_read_error_classification() {
        assert!(matches!(
            TransportError::from_read(io::Error::from(io::ErrorKind::WouldBlock)),
            TransportError::Timeout
        ));
        assert!(matches!(
            TransportError::from_read(io::Error::from(io::ErrorKind::ConnectionReset)),
            TransportError::Closed
        ));
        assert!(matches!(
            TransportError::from_read(io::Error::from(io::ErrorKind::InvalidData)),
            TransportError::Read(_)
        ));
    }

    #[test]
    fn test_write_keeps_broken_pipe() {
        let err = TransportError::from_write(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(err.is_broken_pipe());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", TransportError::Closed), "Connection closed by peer");
        assert_eq!(format!("{}", TransportError::Timeout), "Operation timed out");
    }
}
