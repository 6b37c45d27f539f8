use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use graphpipe_bridge::SubmitOutcome;
use graphpipe_command::Command;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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
struct SubmitOutput<'a> {
    path: String,
    command: String,
    #[serde(flatten)]
    outcome: &'a SubmitOutcome,
}

#[derive(Serialize)]
struct CommandOutput<'a> {
    verb: &'a str,
    label: &'a str,
    line: String,
    received_at: u64,
}

pub fn print_outcome(path: &Path, command: &str, outcome: &SubmitOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SubmitOutput {
                path: path.display().to_string(),
                command: command.to_string(),
                outcome,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PIPE", "COMMAND", "STATUS", "DETAIL"])
                .add_row(vec![
                    path.display().to_string(),
                    command.to_string(),
                    status_name(outcome).to_string(),
                    outcome_detail(outcome),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} <- {command:?}: {}", path.display(), outcome.message());
        }
        OutputFormat::Raw => {
            println!("{}", status_name(outcome));
        }
    }
}

pub fn print_command(command: &Command, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = CommandOutput {
                verb: command.verb().as_str(),
                label: command.label(),
                line: command.to_string(),
                received_at: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["VERB", "LABEL"])
                .add_row(vec![command.verb().as_str(), command.label()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("verb={} label={:?}", command.verb(), command.label());
        }
        OutputFormat::Raw => {
            print_raw(command.encode().as_bytes());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn status_name(outcome: &SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Acked { .. } => "acked",
        SubmitOutcome::Rejected { .. } => "rejected",
        SubmitOutcome::Failed { .. } => "failed",
    }
}

fn outcome_detail(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Acked {
            bytes_written,
            elapsed_ms,
        } => format!("{bytes_written} bytes in {elapsed_ms}ms"),
        SubmitOutcome::Rejected { reason, detail } => format!("{reason}: {detail}"),
        SubmitOutcome::Failed { kind, detail, .. } => format!("{kind}: {detail}"),
    }
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
