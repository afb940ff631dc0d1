use std::path::PathBuf;

/// Errors raised by the serving loops.
///
/// Bind-time failures are fatal — the node cannot start. Accept and
/// per-connection I/O failures are recoverable and never surface here; the
/// loops log them and keep serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the TCP listener.
    #[error("failed to bind tcp listener on port {port}: {source}")]
    BindTcp { port: u16, source: std::io::Error },

    /// Failed to bind the IPC socket.
    #[error("failed to bind ipc socket at {path}: {source}")]
    BindIpc {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The IPC socket path exceeds the platform limit.
    #[error("ipc socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// An I/O error outside any single connection.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
