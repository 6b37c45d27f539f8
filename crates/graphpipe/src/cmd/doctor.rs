use std::path::Path;

use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    path: String,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let path = args.pipe.path()?;

    let mut checks = vec![platform_check(), compiled_features_check()];
    let pipe_ok = {
        let check = pipe_path_check(&path);
        let ok = check.status == CheckStatus::Pass;
        checks.push(check);
        ok
    };
    checks.push(if pipe_ok {
        engine_attached_check(&path)
    } else {
        CheckResult::new(
            "engine_attached",
            CheckStatus::Skip,
            "pipe unavailable, reader not probed",
        )
    });

    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    let output = DoctorOutput {
        path: path.display().to_string(),
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("graphpipe doctor ({})\n", output.path);
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_check() -> CheckResult {
    if cfg!(unix) {
        CheckResult::new("platform", CheckStatus::Pass, "POSIX named pipes available")
    } else {
        CheckResult::new(
            "platform",
            CheckStatus::Fail,
            "named pipe channel requires a Unix platform",
        )
    }
}

fn compiled_features_check() -> CheckResult {
    let mut features = vec!["cli"];
    if cfg!(feature = "async") {
        features.push("async");
    }
    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

#[cfg(unix)]
fn pipe_path_check(path: &Path) -> CheckResult {
    match std::fs::metadata(path) {
        Ok(_) if graphpipe_transport::is_fifo(path) => {
            CheckResult::new("pipe_path", CheckStatus::Pass, "exists and is a fifo")
        }
        Ok(_) => CheckResult::new("pipe_path", CheckStatus::Fail, "exists but is not a fifo"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => CheckResult::new(
            "pipe_path",
            CheckStatus::Fail,
            "does not exist (is the engine running?)",
        ),
        Err(err) => CheckResult::new("pipe_path", CheckStatus::Fail, err.to_string()),
    }
}

#[cfg(not(unix))]
fn pipe_path_check(_path: &Path) -> CheckResult {
    CheckResult::new("pipe_path", CheckStatus::Skip, "not supported on this platform")
}

#[cfg(unix)]
fn engine_attached_check(path: &Path) -> CheckResult {
    match graphpipe_transport::probe_reader(path) {
        Ok(true) => CheckResult::new("engine_attached", CheckStatus::Pass, "reader attached"),
        Ok(false) => CheckResult::new(
            "engine_attached",
            CheckStatus::Warn,
            "no reader attached; submissions will time out",
        ),
        Err(err) => CheckResult::new("engine_attached", CheckStatus::Fail, err.to_string()),
    }
}

#[cfg(not(unix))]
fn engine_attached_check(_path: &Path) -> CheckResult {
    CheckResult::new("engine_attached", CheckStatus::Skip, "not supported on this platform")
}
