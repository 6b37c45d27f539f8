use clap::{Args, Subcommand};
use std::path::PathBuf;

use graphpipe_bridge::BridgeConfig;

use crate::exit::{config_error, CliResult};
use crate::output::OutputFormat;

pub mod doctor;
pub mod listen;
pub mod submit;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit one command to the graph engine.
    Submit(SubmitArgs),
    /// Act as the engine: read and print commands from the pipe.
    Listen(ListenArgs),
    /// Check that the pipe exists and an engine is attached.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Submit(args) => submit::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Command verb (e.g. add).
    pub verb: String,
    /// Node label.
    #[arg(allow_hyphen_values = true)]
    pub label: String,
    #[command(flatten)]
    pub pipe: PipeArgs,
    /// How long to wait for the engine to attach (e.g. 2s, 500ms).
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub pipe: PipeArgs,
    /// Create the pipe if it does not exist (removed again on exit).
    #[arg(long)]
    pub create: bool,
    /// Exit after receiving N commands.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub pipe: PipeArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct PipeArgs {
    /// Path of the engine's named pipe [env: GRAPHPIPE_PATH, default: graph_pipe].
    #[arg(long, value_name = "PATH")]
    pub pipe: Option<PathBuf>,
}

impl PipeArgs {
    /// Environment and defaults, overridden by command-line flags.
    pub fn bridge_config(&self, timeout: Option<&str>) -> CliResult<BridgeConfig> {
        let mut config =
            BridgeConfig::from_env().map_err(|err| config_error("invalid environment", err))?;
        if let Some(path) = &self.pipe {
            config.path = path.clone();
        }
        if let Some(timeout) = timeout {
            config.timeout = graphpipe_bridge::parse_duration(timeout)
                .map_err(|err| config_error("invalid --timeout", err))?;
        }
        Ok(config)
    }

    pub fn path(&self) -> CliResult<PathBuf> {
        match &self.pipe {
            Some(path) => Ok(path.clone()),
            None => self.bridge_config(None).map(|config| config.path),
        }
    }
}
