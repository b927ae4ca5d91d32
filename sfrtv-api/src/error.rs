use stb_transport::TransportError;
use thiserror::Error;

/// Wire codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    /// The request could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame is not a response object
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame carried no data
    #[error("Empty response frame")]
    EmptyFrame,
}

/// Errors raised by a remote session
///
/// The first three variants are protocol-level outcomes: the box answered
/// but refused or was not understood, or it hung up. The rest are lower
/// level failures passed through unchanged.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The box rejected the request
    #[error("Access denied by device")]
    AccessDenied,

    /// The box answered with a response code this client does not handle
    #[error("Unhandled response code: {0}")]
    UnhandledResponse(String),

    /// The peer closed the connection
    #[error("Connection closed by device")]
    ConnectionClosed,

    /// Socket level failure
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),

    /// Malformed frame
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// A closed socket is a protocol outcome, not a generic I/O failure
impl From<TransportError> for RemoteError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Closed => RemoteError::ConnectionClosed,
            other => RemoteError::Transport(other),
        }
    }
}

/// Type alias for results that can return a RemoteError
pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_conversion() {
        let err: RemoteError = TransportError::Closed.into();
        assert!(matches!(err, RemoteError::ConnectionClosed));

        let err: RemoteError = TransportError::Timeout.into();
        assert!(matches!(err, RemoteError::Transport(TransportError::Timeout)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", RemoteError::AccessDenied), "Access denied by device");
        assert_eq!(
            format!("{}", RemoteError::UnhandledResponse("BUSY".to_string())),
            "Unhandled response code: BUSY"
        );
    }
}
