use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use tcpframe_frame::Frame;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    peer: &'a str,
    payload_size: usize,
    encoding: &'static str,
    payload: String,
    timestamp: u64,
}

pub fn print_frame(frame: &Frame, peer: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", frame_json(frame, peer));
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PEER", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    peer.to_string(),
                    frame.len().to_string(),
                    payload_preview(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "peer={} size={} payload={}",
                peer,
                frame.len(),
                payload_preview(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

fn frame_json(frame: &Frame, peer: &str) -> String {
    let (encoding, payload) = match frame.as_text() {
        Some(text) => ("utf8", text.to_string()),
        None => ("hex", hex(frame.payload.as_ref())),
    };
    let out = FrameOutput {
        peer,
        payload_size: frame.len(),
        encoding,
        payload,
        timestamp: now_unix_seconds(),
    };
    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn hex(payload: &[u8]) -> String {
    payload.iter().map(|b| format!("{b:02x}")).collect()
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_carries_text_payload() {
        let frame = Frame::new(&b"pong"[..]);
        let value: serde_json::Value =
            serde_json::from_str(&frame_json(&frame, "127.0.0.1:9000")).unwrap();
        assert_eq!(value["peer"], "127.0.0.1:9000");
        assert_eq!(value["payload_size"], 4);
        assert_eq!(value["encoding"], "utf8");
        assert_eq!(value["payload"], "pong");
    }

    #[test]
    fn json_hex_encodes_binary_payload() {
        let frame = Frame::new(vec![0xff, 0x00, 0x10]);
        let value: serde_json::Value = serde_json::from_str(&frame_json(&frame, "peer")).unwrap();
        assert_eq!(value["encoding"], "hex");
        assert_eq!(value["payload"], "ff0010");
    }

    #[test]
    fn preview_marks_binary() {
        assert_eq!(payload_preview(b"hi"), "hi");
        assert_eq!(payload_preview(&[0xff, 0xfe]), "<binary 2 bytes>");
    }
}
