use tcpframe_frame::FrameError;
use tcpframe_transport::TransportError;

/// Errors that can occur in client and server operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// The client has no live connection, or the server has no accepted client.
    #[error("not connected")]
    NotConnected,

    /// The server has no listening socket.
    #[error("not listening")]
    NotListening,

    /// Transport-level error (resolve, connect, bind, accept).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error (timeout, closed connection, oversized frame, I/O).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

impl PeerError {
    /// Whether a bounded wait elapsed before any data arrived.
    ///
    /// The connection is still usable after a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PeerError::Frame(err) if err.is_timeout())
    }

    /// Whether the peer closed or reset the connection.
    pub fn is_connection_closed(&self) -> bool {
        match self {
            PeerError::Frame(err) => err.is_connection_closed(),
            PeerError::Transport(err) => err.is_connection_closed(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PeerError>;
