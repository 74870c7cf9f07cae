use std::fs;

use tcpframe_frame::{FrameConfig, Wait};
use tcpframe_peer::{ClientConfig, TcpClient};

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{io_error, peer_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

pub fn run(args: SendArgs, format: OutputFormat, frame: FrameConfig) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let connect_timeout = parse_duration(&args.connect_timeout)?;
    let payload = resolve_payload(&args)?;

    let mut client = TcpClient::with_config(ClientConfig {
        frame,
        connect_timeout: Some(connect_timeout),
        nodelay: true,
    });
    client
        .connect(&args.host, args.port)
        .map_err(|err| peer_error("connect failed", err))?;

    let sent = match &payload {
        Payload::Text(text) => client.write_text(text),
        Payload::Binary(bytes) => client.write(bytes),
    };
    sent.map_err(|err| peer_error("send failed", err))?;

    if args.wait {
        let reply = client
            .read(Wait::Bounded(wait_timeout))
            .map_err(|err| peer_error("receive failed", err))?;
        let peer = client
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", args.host, args.port));
        print_frame(&reply, &peer, format);
    }

    client.close();
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Payload> {
    if let Some(path) = &args.file {
        return fs::read(path)
            .map(Payload::Binary)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Payload::Text(args.data.clone().unwrap_or_default()))
}
