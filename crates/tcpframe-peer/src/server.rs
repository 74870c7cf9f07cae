use std::net::SocketAddr;

use tcpframe_frame::{Frame, FrameConfig, FramedStream, Wait};
use tcpframe_transport::{TcpConnection, TcpListenerSocket};
use tracing::{debug, info};

use crate::error::{PeerError, Result};

/// Server behavior configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Framing limits and per-call socket timeout for accepted clients.
    pub frame: FrameConfig,
    /// Set `TCP_NODELAY` on accepted connections.
    pub nodelay: bool,
}

/// A listening socket with a single client slot.
///
/// The listening socket and the accepted client are owned separately:
/// accepting a new client closes the previous one but keeps listening,
/// and closing the client leaves the listener open.
#[derive(Debug, Default)]
pub struct TcpServer {
    listener: Option<TcpListenerSocket>,
    client: Option<FramedStream<TcpConnection>>,
    client_addr: Option<SocketAddr>,
    config: ServerConfig,
}

impl TcpServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Listen on every IPv4 interface at `port` with the given backlog.
    ///
    /// Any existing listening socket is closed first. Port `0` picks an
    /// ephemeral port; see [`TcpServer::local_addr`].
    pub fn listen(&mut self, port: u16, backlog: i32) -> Result<()> {
        self.close_listener();
        self.listener = Some(TcpListenerSocket::bind(port, backlog)?);
        Ok(())
    }

    /// Block until a client connects and make it the current client.
    ///
    /// A client still held from an earlier accept is closed once the new
    /// one is in hand.
    pub fn accept(&mut self) -> Result<SocketAddr> {
        let listener = self.listener.as_ref().ok_or(PeerError::NotListening)?;
        let conn = listener.accept()?;
        if self.config.nodelay {
            conn.set_nodelay(true)?;
        }
        let peer = conn.peer_addr();
        let framed = FramedStream::with_config_tcp(conn, self.config.frame.clone())?;

        if let Some(previous) = self.client.replace(framed) {
            debug!(
                previous = %previous.get_ref().peer_addr(),
                "closing replaced client connection"
            );
        }
        self.client_addr = Some(peer);

        info!(%peer, "client accepted");
        Ok(peer)
    }

    /// IP address of the most recently accepted client, as text.
    pub fn client_address(&self) -> Option<String> {
        self.client_addr.map(|addr| addr.ip().to_string())
    }

    /// Full socket address of the most recently accepted client.
    pub fn client_socket_addr(&self) -> Option<SocketAddr> {
        self.client_addr
    }

    /// Receive one frame from the current client.
    ///
    /// Timeouts are reported as in [`crate::TcpClient::read`].
    pub fn read(&mut self, wait: Wait) -> Result<Frame> {
        let client = self.client.as_mut().ok_or(PeerError::NotConnected)?;
        Ok(client.read_frame(wait)?)
    }

    /// Send `payload` as one frame to the current client.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        let client = self.client.as_mut().ok_or(PeerError::NotConnected)?;
        Ok(client.send(payload)?)
    }

    /// Send `text` as one frame to the current client, stopping at its first NUL.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let client = self.client.as_mut().ok_or(PeerError::NotConnected)?;
        Ok(client.send_text(text)?)
    }

    /// Close the current client connection only.
    pub fn close_client(&mut self) {
        if let Some(client) = self.client.take() {
            debug!(peer = %client.get_ref().peer_addr(), "closing client connection");
        }
    }

    /// Close the listening socket only.
    pub fn close_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            debug!(addr = %listener.local_addr(), "closing listening socket");
        }
    }

    /// Close the client connection and the listening socket.
    ///
    /// Each is released independently; safe to call repeatedly.
    pub fn close(&mut self) {
        self.close_client();
        self.close_listener();
        self.client_addr = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Bound address of the listening socket.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(TcpListenerSocket::local_addr)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
