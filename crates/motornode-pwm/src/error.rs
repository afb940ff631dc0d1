use std::path::PathBuf;

/// Errors that can occur when driving PWM channels.
#[derive(Debug, thiserror::Error)]
pub enum PwmError {
    /// Failed to initialize a channel at the given sysfs path.
    #[error("failed to initialize pwm channel at {path}: {source}")]
    Init {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a channel attribute file.
    #[error("failed to write pwm attribute {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The channel index is outside the fixed motor range.
    #[error("invalid channel index {index} (motor channels are 0..{count})")]
    InvalidChannel { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, PwmError>;
