use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tcpframe_frame::{FrameConfig, Wait};
use tcpframe_peer::{ServerConfig, TcpServer};

use crate::cmd::{
    classify_recv_error, install_ctrlc_handler, parse_duration, RecvDisposition, ServeArgs,
};
use crate::exit::{peer_error, CliResult, SUCCESS};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ServeArgs, frame: FrameConfig) -> CliResult<i32> {
    let idle_timeout = parse_duration(&args.idle_timeout)?;

    let mut server = TcpServer::with_config(ServerConfig {
        frame,
        ..ServerConfig::default()
    });
    server
        .listen(args.port, args.backlog)
        .map_err(|err| peer_error("listen failed", err))?;
    let port = server.local_addr().map(|addr| addr.port()).unwrap_or(args.port);
    eprintln!("listening on 0.0.0.0:{port}");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone(), port)?;

    while running.load(Ordering::SeqCst) {
        let peer = server
            .accept()
            .map_err(|err| peer_error("accept failed", err))?;
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let mut last_activity = Instant::now();
        while running.load(Ordering::SeqCst) {
            let frame = match server.read(Wait::Bounded(POLL_INTERVAL.min(idle_timeout))) {
                Ok(frame) => frame,
                Err(err) => match classify_recv_error(err) {
                    RecvDisposition::Idle => {
                        if last_activity.elapsed() >= idle_timeout {
                            tracing::info!(%peer, ?idle_timeout, "dropping idle client");
                            break;
                        }
                        continue;
                    }
                    RecvDisposition::Disconnected => {
                        tracing::info!(%peer, "client disconnected");
                        break;
                    }
                    RecvDisposition::DropClient(err) => {
                        tracing::warn!(%peer, error = %err, "dropping client after receive error");
                        break;
                    }
                    RecvDisposition::Fatal(cli_err) => return Err(cli_err),
                },
            };
            last_activity = Instant::now();

            tracing::info!(%peer, size = frame.len(), "echoing frame");
            if let Err(err) = server.write(&frame.payload) {
                if err.is_connection_closed() {
                    tracing::info!(%peer, "client disconnected");
                } else {
                    tracing::warn!(%peer, error = %err, "dropping client after echo failure");
                }
                break;
            }
        }
        server.close_client();

        if args.once {
            break;
        }
    }

    server.close();
    Ok(SUCCESS)
}
