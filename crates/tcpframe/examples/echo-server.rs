//! Minimal echo server: accepts one client and echoes frames back.
//!
//! Run with:
//!   cargo run --example echo-server -- 9000
//!
//! In another terminal:
//!   cargo run --features cli -- send 127.0.0.1 9000 --data hello --wait

use tcpframe::peer::{TcpServer, Wait};
use tcpframe::transport::TcpListenerSocket;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0,
    };

    let mut server = TcpServer::new();
    server.listen(port, TcpListenerSocket::DEFAULT_BACKLOG)?;
    if let Some(addr) = server.local_addr() {
        eprintln!("Listening on {addr}");
    }

    let peer = server.accept()?;
    eprintln!("Client connected: {peer}");

    loop {
        match server.read(Wait::Forever) {
            Ok(frame) => {
                eprintln!("Received {} bytes", frame.len());
                server.write(&frame.payload)?;
            }
            Err(e) => {
                eprintln!("Client disconnected: {e}");
                break;
            }
        }
    }

    server.close();
    Ok(())
}
