use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use graphpipe_command::{LineConfig, LineError, LineReader};
#[cfg(unix)]
use graphpipe_transport::{FifoReader, NamedPipe};
use tracing::{info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{line_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_command, OutputFormat};

/// How often the read loop wakes up to check for Ctrl-C.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

#[cfg(not(unix))]
pub fn run(_args: ListenArgs, _format: OutputFormat) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::FAILURE,
        "listen requires named pipes, which are only available on Unix",
    ))
}

#[cfg(unix)]
pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let path = args.pipe.path()?;

    // Held for the whole loop; removes the FIFO on exit if it was created here.
    let pipe = if args.create {
        Some(NamedPipe::create(&path).map_err(|err| transport_error("create failed", err))?)
    } else {
        None
    };

    let reader = match &pipe {
        Some(pipe) => pipe.open_reader(),
        None => FifoReader::open_persistent(&path),
    }
    .map_err(|err| transport_error("open failed", err))?;
    info!(path = %path.display(), "listening for commands");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = LineConfig {
        read_timeout: Some(SHUTDOWN_POLL),
        ..LineConfig::default()
    };
    let mut lines = LineReader::with_config_fifo(reader, config);
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let command = match lines.read_command() {
            Ok(command) => command,
            Err(LineError::Io(err)) if err.kind() == ErrorKind::TimedOut => continue,
            Err(err @ (LineError::Invalid(_) | LineError::InvalidUtf8)) => {
                warn!(error = %err, "skipping malformed line");
                continue;
            }
            Err(LineError::ConnectionClosed) => break,
            Err(err) => return Err(line_error("receive failed", err)),
        };

        print_command(&command, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
