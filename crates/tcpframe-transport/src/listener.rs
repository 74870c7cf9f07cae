use std::net::{Ipv4Addr, SocketAddr, TcpListener};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::signal::ignore_sigpipe;
use crate::stream::TcpConnection;

/// A bound, listening TCP socket.
///
/// Dropping the value closes the listening socket. Accepted connections
/// are independent of it and outlive it.
pub struct TcpListenerSocket {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpListenerSocket {
    /// Default pending-connection queue length.
    pub const DEFAULT_BACKLOG: i32 = 5;

    /// Listen on the IPv4 wildcard address.
    ///
    /// Port `0` asks the OS for an ephemeral port; see [`Self::local_addr`].
    pub fn bind(port: u16, backlog: i32) -> Result<Self> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)), backlog)
    }

    /// Listen on an explicit address.
    ///
    /// The socket gets `SO_REUSEADDR` before binding. If any step fails the
    /// partially configured socket is closed before returning.
    pub fn bind_addr(addr: SocketAddr, backlog: i32) -> Result<Self> {
        ignore_sigpipe();

        let bind_err = |source| TransportError::Bind { addr, source };

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(bind_err)?;
        socket.set_reuse_address(true).map_err(bind_err)?;
        socket.bind(&addr.into()).map_err(bind_err)?;
        socket
            .listen(backlog)
            .map_err(|source| TransportError::Listen {
                addr,
                backlog,
                source,
            })?;

        let listener = TcpListener::from(socket);
        let local_addr = listener.local_addr()?;

        info!(%local_addr, backlog, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<TcpConnection> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(TcpConnection::from_std(stream, peer))
    }

    /// The address this socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl std::fmt::Debug for TcpListenerSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpListenerSocket")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}
