use std::path::PathBuf;

/// Errors that can occur while loading node configuration.
///
/// All of these are fatal at startup; there is no partially-configured node.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A line is not a section header, a key=value pair, or a comment.
    #[error("configuration syntax error at line {line}: {text:?}")]
    Syntax { line: usize, text: String },

    /// A motor section is missing its required channel path.
    #[error("missing pwm channel path (section [{section}], key \"path\")")]
    MissingMotorPath { section: String },

    /// A recognized key holds a value of the wrong shape.
    #[error("invalid value for {section}.{key} at line {line}: {value:?}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        line: usize,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
