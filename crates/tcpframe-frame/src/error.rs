use std::time::Duration;

use tcpframe_transport::TransportError;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Nothing became readable within the requested wait.
    #[error("timed out after {0:?} waiting for a frame")]
    Timeout(Duration),

    /// The connection was closed before a complete frame was transferred.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Whether a bounded readiness wait elapsed with no data.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FrameError::Timeout(_))
    }

    /// Whether the peer closed or reset the connection.
    pub fn is_connection_closed(&self) -> bool {
        match self {
            FrameError::ConnectionClosed => true,
            FrameError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

impl From<TransportError> for FrameError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionClosed => FrameError::ConnectionClosed,
            TransportError::Io(io) | TransportError::Accept(io) => FrameError::Io(io),
            TransportError::Resolve { source, .. }
            | TransportError::Connect { source, .. }
            | TransportError::Bind { source, .. }
            | TransportError::Listen { source, .. } => FrameError::Io(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
