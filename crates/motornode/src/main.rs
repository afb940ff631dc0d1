mod cmd;
mod exit;
mod logging;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "motornode", version, about = "PWM motor-control command node")]
struct Cli {
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

    match cmd::run(cli.command) {
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
    fn parses_serve_subcommand() {
        let cli = Cli::try_parse_from(["motornode", "serve", "/etc/motornode.ini"])
            .expect("serve args should parse");
        assert!(matches!(cli.command, Command::Serve(_)));
    }

    #[test]
    fn serve_requires_a_config_path() {
        let err = Cli::try_parse_from(["motornode", "serve"]).expect_err("should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_send_with_negative_speeds() {
        let cli = Cli::try_parse_from([
            "motornode",
            "send",
            "/run/motornode.sock",
            "--speeds",
            "10,-5,0,100",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send subcommand");
        };
        assert_eq!(args.speeds, vec![10.0, -5.0, 0.0, 100.0]);
    }

    #[test]
    fn log_flags_are_global() {
        let cli = Cli::try_parse_from([
            "motornode",
            "version",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("version args should parse");
        assert!(matches!(cli.command, Command::Version(_)));
    }
}
