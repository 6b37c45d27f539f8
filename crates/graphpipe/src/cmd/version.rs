use graphpipe_bridge::{DEFAULT_CHANNEL_PATH, DEFAULT_TIMEOUT};
use graphpipe_command::{Verb, DEFAULT_MAX_LINE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("graphpipe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let verbs: Vec<&str> = Verb::ALL.iter().map(|verb| verb.as_str()).collect();

    println!("name: graphpipe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("GRAPHPIPE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: async={}, cli=true", cfg!(feature = "async"));
    println!("verbs: {}", verbs.join(", "));
    println!("default_pipe: {DEFAULT_CHANNEL_PATH}");
    println!("default_timeout: {DEFAULT_TIMEOUT:?}");
    println!("max_line_bytes: {DEFAULT_MAX_LINE}");

    Ok(SUCCESS)
}
