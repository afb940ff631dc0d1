use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;

pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the motor-control node.
    Serve(ServeArgs),
    /// Send one motor command to a running node.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to the INI configuration file.
    pub config: PathBuf,

    /// Override the configured HTTP port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the configured IPC socket path.
    #[arg(long)]
    pub socket: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// IPC socket path of a running node.
    pub path: PathBuf,

    /// Four motor speeds, comma-separated (motor0..motor3).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub speeds: Vec<f32>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
