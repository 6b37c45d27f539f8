use graphpipe_bridge::{CommandBridge, SubmitOutcome};
use tracing::debug;

use crate::cmd::SubmitArgs;
use crate::exit::{bridge_error, CliResult, SUCCESS};
use crate::output::{print_outcome, OutputFormat};

pub fn run(args: SubmitArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.pipe.bridge_config(args.timeout.as_deref())?;
    debug!(path = %config.path.display(), timeout = ?config.timeout, "submitting from cli");

    let bridge = CommandBridge::new(config);
    let result = bridge.submit_str(&args.verb, &args.label);

    let command = format!("{} {}", args.verb, args.label);
    let outcome = SubmitOutcome::from_result(&result);
    print_outcome(&bridge.config().path, &command, &outcome, format);

    match result {
        Ok(_) => Ok(SUCCESS),
        Err(err) => Err(bridge_error("submit failed", &err)),
    }
}
