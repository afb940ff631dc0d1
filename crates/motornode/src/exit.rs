use std::fmt;
use std::io;

use motornode_config::ConfigError;
use motornode_pwm::PwmError;
use motornode_server::ServerError;

// Exit code constants; sysexits-compatible where a match exists.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const CONFIG_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(CONFIG_INVALID, format!("{context}: {err}"))
}

pub fn pwm_error(context: &str, err: PwmError) -> CliError {
    let code = match &err {
        PwmError::Init { source, .. } | PwmError::Write { source, .. } => match source.kind() {
            io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
            _ => FAILURE,
        },
        PwmError::InvalidChannel { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn server_error(context: &str, err: ServerError) -> CliError {
    match err {
        ServerError::BindTcp { source, .. }
        | ServerError::BindIpc { source, .. }
        | ServerError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}
