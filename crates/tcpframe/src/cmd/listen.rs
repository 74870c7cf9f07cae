use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tcpframe_frame::{FrameConfig, Wait};
use tcpframe_peer::{ServerConfig, TcpServer};

use crate::cmd::{classify_recv_error, install_ctrlc_handler, ListenArgs, RecvDisposition};
use crate::exit::{peer_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(args: ListenArgs, format: OutputFormat, frame: FrameConfig) -> CliResult<i32> {
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

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let peer = server
            .accept()
            .map_err(|err| peer_error("accept failed", err))?;
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let peer = peer.to_string();

        while running.load(Ordering::SeqCst) {
            let frame = match server.read(Wait::Bounded(POLL_INTERVAL)) {
                Ok(frame) => frame,
                Err(err) => match classify_recv_error(err) {
                    RecvDisposition::Idle => continue,
                    RecvDisposition::Disconnected => {
                        tracing::debug!(%peer, "client disconnected");
                        break;
                    }
                    RecvDisposition::DropClient(err) => {
                        tracing::warn!(%peer, error = %err, "dropping client after receive error");
                        break;
                    }
                    RecvDisposition::Fatal(cli_err) => return Err(cli_err),
                },
            };

            print_frame(&frame, &peer, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    server.close();
                    return Ok(SUCCESS);
                }
            }
        }
        server.close_client();
    }

    server.close();
    Ok(SUCCESS)
}
