mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "graphpipe", version, about = "Graph engine command channel CLI")]
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

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

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
    fn parses_submit_subcommand() {
        let cli = Cli::try_parse_from([
            "graphpipe",
            "submit",
            "add",
            "Node1",
            "--pipe",
            "/tmp/graph_pipe",
            "--timeout",
            "500ms",
        ])
        .expect("submit args should parse");

        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.verb, "add");
                assert_eq!(args.label, "Node1");
                assert_eq!(args.timeout.as_deref(), Some("500ms"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn submit_accepts_empty_and_dashed_labels() {
        let cli = Cli::try_parse_from(["graphpipe", "submit", "add", ""])
            .expect("empty label should reach validation");
        assert!(matches!(cli.command, Command::Submit(ref args) if args.label.is_empty()));

        let cli = Cli::try_parse_from(["graphpipe", "submit", "add", "-node"])
            .expect("dashed label should parse");
        assert!(matches!(cli.command, Command::Submit(ref args) if args.label == "-node"));
    }

    #[test]
    fn parses_listen_subcommand() {
        let cli = Cli::try_parse_from([
            "graphpipe",
            "listen",
            "--pipe",
            "/tmp/graph_pipe",
            "--create",
            "--count",
            "2",
        ])
        .expect("listen args should parse");
        match cli.command {
            Command::Listen(args) => {
                assert!(args.create);
                assert_eq!(args.count, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_output_format() {
        let err = Cli::try_parse_from(["graphpipe", "--format", "yaml", "doctor"])
            .expect_err("unknown format should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
