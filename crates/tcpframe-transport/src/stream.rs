use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::signal::ignore_sigpipe;
use crate::traits::WaitReadable;

/// A connected TCP stream implementing `Read` and `Write`.
///
/// Owns its socket exclusively; dropping the value closes it.
pub struct TcpConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpConnection {
    pub(crate) fn from_std(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    /// Resolve `host` and connect to the first address that accepts.
    ///
    /// Name resolution is synchronous and blocks the calling thread. With
    /// `timeout` set, each connect attempt is bounded by it. A zero timeout
    /// is treated as unset.
    pub fn connect(host: &str, port: u16, timeout: Option<Duration>) -> Result<Self> {
        ignore_sigpipe();

        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                host: host.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "host resolved to no addresses",
                ),
            });
        }

        let timeout = timeout.filter(|t| !t.is_zero());
        let mut last_err = None;
        for addr in addrs {
            let attempt = match timeout {
                Some(t) => TcpStream::connect_timeout(&addr, t),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    debug!(%addr, "connected to tcp peer");
                    return Ok(Self::from_std(stream, addr));
                }
                Err(err) => {
                    debug!(%addr, error = %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(TransportError::Connect {
            addr: format!("{host}:{port}"),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotConnected, "no address attempted")
            }),
        })
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Address of the local end.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.stream.local_addr().map_err(Into::into)
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Disable Nagle's algorithm.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.stream.set_nodelay(nodelay).map_err(Into::into)
    }
}

impl Read for TcpConnection {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpConnection {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }
}

impl WaitReadable for TcpConnection {
    #[cfg(unix)]
    fn wait_readable(&self, timeout: Option<Duration>) -> std::io::Result<bool> {
        use std::os::fd::AsRawFd;

        let timeout_ms: libc::c_int = match timeout {
            None => -1,
            Some(d) => d
                .as_nanos()
                .div_ceil(1_000_000)
                .min(libc::c_int::MAX as u128) as libc::c_int,
        };
        let mut pfd = libc::pollfd {
            fd: self.stream.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };

        // SAFETY: `pfd` is a valid, writable pollfd for the duration of the call,
        // the count matches, and the descriptor is owned by `self.stream`.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        match rc {
            -1 => Err(std::io::Error::last_os_error()),
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    #[cfg(not(unix))]
    fn wait_readable(&self, timeout: Option<Duration>) -> std::io::Result<bool> {
        let previous = self.stream.read_timeout()?;
        // A zero read timeout is rejected by the socket layer.
        let timeout = timeout.map(|d| d.max(Duration::from_millis(1)));
        self.stream.set_read_timeout(timeout)?;

        let mut probe = [0u8; 1];
        let outcome = match self.stream.peek(&mut probe) {
            Ok(_) => Ok(true),
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        };

        self.stream.set_read_timeout(previous)?;
        outcome
    }
}

#[cfg(unix)]
impl std::os::fd::AsRawFd for TcpConnection {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        self.stream.as_raw_fd()
    }
}

impl std::fmt::Debug for TcpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnection")
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Instant;

    use super::*;
    use crate::io::{read_exactly, write_exactly};

    fn loopback_pair() -> (TcpConnection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = TcpConnection::connect("127.0.0.1", port, None).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn connect_and_exchange_bytes() {
        let (mut client, mut server) = loopback_pair();
        write_exactly(&mut client, b"hello").unwrap();

        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");

        server.write_all(b"world").unwrap();
        let mut buf = [0u8; 5];
        read_exactly(&mut client, &mut buf).unwrap();
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn connect_resolves_localhost_name() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let conn = TcpConnection::connect("localhost", port, Some(Duration::from_secs(2)));
        assert!(conn.is_ok());
    }

    #[test]
    fn zero_connect_timeout_means_no_bound() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let conn = TcpConnection::connect("127.0.0.1", port, Some(Duration::ZERO));
        assert!(conn.is_ok());
    }

    #[test]
    fn connect_refused_reports_connect_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = TcpConnection::connect("127.0.0.1", port, None).unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[test]
    fn unresolvable_host_reports_resolve_error() {
        let err = TcpConnection::connect("no-such-host.invalid", 80, None).unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
    }

    #[test]
    fn wait_readable_times_out_on_silent_peer() {
        let (client, _server) = loopback_pair();
        let start = Instant::now();
        let ready = client
            .wait_readable(Some(Duration::from_millis(100)))
            .unwrap();
        assert!(!ready);
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[test]
    fn wait_readable_sees_pending_data() {
        let (client, mut server) = loopback_pair();
        server.write_all(b"x").unwrap();
        assert!(client.wait_readable(Some(Duration::from_secs(2))).unwrap());
    }

    #[test]
    fn wait_readable_treats_closed_peer_as_ready() {
        let (mut client, server) = loopback_pair();
        drop(server);
        assert!(client.wait_readable(Some(Duration::from_secs(2))).unwrap());

        let mut buf = [0u8; 1];
        let err = read_exactly(&mut client, &mut buf).unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed));
    }

    #[test]
    fn peer_addr_matches_target() {
        let (client, server) = loopback_pair();
        assert_eq!(client.peer_addr(), server.local_addr().unwrap());
        assert_eq!(client.local_addr().unwrap(), server.peer_addr().unwrap());
    }
}
