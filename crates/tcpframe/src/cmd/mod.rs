use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use tcpframe_frame::FrameConfig;
use tcpframe_peer::PeerError;
use tcpframe_transport::TcpListenerSocket;

use crate::exit::{peer_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod listen;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept clients one at a time and echo every frame back.
    Serve(ServeArgs),
    /// Accept clients and print received frames.
    Listen(ListenArgs),
    /// Connect, send a single frame, optionally wait for one reply.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, frame: FrameConfig) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, frame),
        Command::Listen(args) => listen::run(args, format, frame),
        Command::Send(args) => send::run(args, format, frame),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TCP port to listen on (all IPv4 interfaces). 0 picks a free port.
    #[arg(long, short = 'p')]
    pub port: u16,
    /// Pending-connection backlog.
    #[arg(long, default_value_t = TcpListenerSocket::DEFAULT_BACKLOG)]
    pub backlog: i32,
    /// Drop a client that sends nothing for this long (e.g. 30s, 500ms).
    #[arg(long, default_value = "5s")]
    pub idle_timeout: String,
    /// Exit after the first client disconnects.
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// TCP port to listen on (all IPv4 interfaces). 0 picks a free port.
    #[arg(long, short = 'p')]
    pub port: u16,
    /// Pending-connection backlog.
    #[arg(long, default_value_t = TcpListenerSocket::DEFAULT_BACKLOG)]
    pub backlog: i32,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Host name or address to connect to.
    pub host: String,
    /// Port to connect to.
    pub port: u16,
    /// Text payload. Sent up to its first NUL.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub data: Option<String>,
    /// Read a binary payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
    /// Wait for one reply frame and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
    /// Maximum time for each connect attempt (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

/// What a server loop does after a failed read from its current client.
#[derive(Debug)]
pub(crate) enum RecvDisposition {
    /// Nothing arrived within the poll interval.
    Idle,
    /// The client went away.
    Disconnected,
    /// The client sent something unusable and the stream is out of sync.
    DropClient(PeerError),
    Fatal(CliError),
}

pub(crate) fn classify_recv_error(err: PeerError) -> RecvDisposition {
    if err.is_timeout() {
        return RecvDisposition::Idle;
    }
    if err.is_connection_closed() {
        return RecvDisposition::Disconnected;
    }
    match err {
        PeerError::Frame(_) | PeerError::Transport(_) => RecvDisposition::DropClient(err),
        other => RecvDisposition::Fatal(peer_error("receive failed", other)),
    }
}

/// Clear `running` on Ctrl-C and poke the listener on `wake_port` so a
/// blocked accept returns.
pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>, wake_port: u16) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        let _ = TcpStream::connect(("127.0.0.1", wake_port));
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use std::io;

    use tcpframe_frame::FrameError;

    use super::*;

    #[test]
    fn timeout_keeps_client() {
        let disposition = classify_recv_error(PeerError::Frame(FrameError::Timeout(
            Duration::from_millis(250),
        )));
        assert!(matches!(disposition, RecvDisposition::Idle));
    }

    #[test]
    fn closed_peer_ends_session() {
        let disposition = classify_recv_error(PeerError::Frame(FrameError::ConnectionClosed));
        assert!(matches!(disposition, RecvDisposition::Disconnected));

        let reset = PeerError::Frame(FrameError::Io(io::Error::from(
            io::ErrorKind::ConnectionReset,
        )));
        assert!(matches!(
            classify_recv_error(reset),
            RecvDisposition::Disconnected
        ));
    }

    #[test]
    fn oversized_frame_drops_only_the_client() {
        let disposition =
            classify_recv_error(PeerError::Frame(FrameError::PayloadTooLarge { size: 9, max: 8 }));
        assert!(matches!(
            disposition,
            RecvDisposition::DropClient(PeerError::Frame(FrameError::PayloadTooLarge { .. }))
        ));

        let timed_out_io = PeerError::Frame(FrameError::Io(io::Error::from(
            io::ErrorKind::WouldBlock,
        )));
        assert!(matches!(
            classify_recv_error(timed_out_io),
            RecvDisposition::DropClient(_)
        ));
    }

    #[test]
    fn missing_client_is_fatal() {
        match classify_recv_error(PeerError::NotConnected) {
            RecvDisposition::Fatal(err) => assert_eq!(err.code, INTERNAL),
            other => panic!("expected fatal, got {other:?}"),
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration(" 3 ").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("bad").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
        assert!(parse_duration("-1s").is_err());
    }
}
