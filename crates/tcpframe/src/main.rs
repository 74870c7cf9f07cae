mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use tcpframe_frame::{FrameConfig, DEFAULT_MAX_PAYLOAD};

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tcpframe", version, about = "Length-prefixed TCP messaging CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Largest frame payload accepted or sent, in bytes.
    #[arg(
        long,
        value_name = "BYTES",
        env = "TCPFRAME_MAX_PAYLOAD",
        default_value_t = DEFAULT_MAX_PAYLOAD,
        global = true
    )]
    max_payload: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let frame_config = FrameConfig {
        max_payload_size: cli.max_payload,
        ..FrameConfig::default()
    };
    let result = cmd::run(cli.command, format, frame_config);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "tcpframe",
            "send",
            "127.0.0.1",
            "9000",
            "--data",
            "hello",
        ])
        .expect("send args should parse");

        assert!(matches!(cli.command, Command::Send(_)));
        assert_eq!(cli.max_payload, DEFAULT_MAX_PAYLOAD);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "tcpframe",
            "send",
            "127.0.0.1",
            "9000",
            "--file",
            "/tmp/payload.bin",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_serve_with_global_max_payload() {
        let cli = Cli::try_parse_from([
            "tcpframe",
            "serve",
            "--port",
            "9000",
            "--backlog",
            "16",
            "--max-payload",
            "1024",
        ])
        .expect("serve args should parse");

        assert_eq!(cli.max_payload, 1024);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, 9000);
                assert_eq!(args.backlog, 16);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn rejects_port_out_of_range() {
        let err = Cli::try_parse_from(["tcpframe", "listen", "--port", "70000"])
            .expect_err("port should be validated");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
