use std::net::SocketAddr;
use std::time::Duration;

use tcpframe_frame::{Frame, FrameConfig, FramedStream, Wait};
use tcpframe_transport::TcpConnection;
use tracing::{debug, info};

use crate::error::{PeerError, Result};

/// Client behavior configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Framing limits and per-call socket timeout.
    pub frame: FrameConfig,
    /// Bound on each connect attempt. `None` or zero uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Set `TCP_NODELAY` on new connections.
    pub nodelay: bool,
}

/// An outbound framed connection.
///
/// Starts unconnected. [`TcpClient::connect`] opens the connection,
/// [`TcpClient::close`] or dropping the client releases it.
#[derive(Debug, Default)]
pub struct TcpClient {
    conn: Option<FramedStream<TcpConnection>>,
    host: String,
    port: u16,
    config: ClientConfig,
}

impl TcpClient {
    /// Create an unconnected client with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unconnected client with explicit configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Connect to `host:port`, closing any existing connection first.
    ///
    /// Name resolution blocks the calling thread. On failure the client is
    /// left unconnected.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.close();

        let conn = TcpConnection::connect(host, port, self.config.connect_timeout)?;
        if self.config.nodelay {
            conn.set_nodelay(true)?;
        }
        let peer = conn.peer_addr();
        let framed = FramedStream::with_config_tcp(conn, self.config.frame.clone())?;

        info!(host, port, %peer, "client connected");
        self.conn = Some(framed);
        self.host = host.to_string();
        self.port = port;
        Ok(())
    }

    /// Receive one frame from the server.
    ///
    /// A bounded `wait` that elapses yields an error for which
    /// [`PeerError::is_timeout`] is true; the connection stays usable.
    /// Any other error leaves the connection unusable.
    pub fn read(&mut self, wait: Wait) -> Result<Frame> {
        let conn = self.conn.as_mut().ok_or(PeerError::NotConnected)?;
        Ok(conn.read_frame(wait)?)
    }

    /// Send `payload` as one frame.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        let conn = self.conn.as_mut().ok_or(PeerError::NotConnected)?;
        Ok(conn.send(payload)?)
    }

    /// Send `text` as one frame, stopping at its first NUL.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let conn = self.conn.as_mut().ok_or(PeerError::NotConnected)?;
        Ok(conn.send_text(text)?)
    }

    /// Release the connection if one is held. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!(peer = %conn.get_ref().peer_addr(), "closing client connection");
        }
        self.host.clear();
        self.port = 0;
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Host given to the last successful connect; empty when unconnected.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port given to the last successful connect; `0` when unconnected.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolved address of the server, if connected.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.conn.as_ref().map(|conn| conn.get_ref().peer_addr())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
