use std::path::{Path, PathBuf};

use motornode_pwm::{DEFAULT_PERIOD_NS, MOTOR_COUNT};
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::ini::{self, IniEntry};

/// Which speed-to-duty policy the node runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapperKind {
    /// Speeds are duty cycles already.
    Identity,
    /// Map `min_rpm..max_rpm` linearly onto 0..100% duty.
    RpmRange { min_rpm: f32, max_rpm: f32 },
}

/// Fully-loaded node configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Sysfs channel directories, positional motor0..motor3. All required.
    pub motor_paths: [PathBuf; MOTOR_COUNT],
    /// PWM period in nanoseconds, shared by all channels.
    pub period_ns: u32,
    /// TCP port of the HTTP command server.
    pub http_port: u16,
    /// Worker threads handling HTTP connections.
    pub http_workers: usize,
    /// Unix socket path of the IPC command channel.
    pub ipc_socket: PathBuf,
    pub mapper: MapperKind,
}

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_HTTP_WORKERS: usize = 8;
pub const DEFAULT_IPC_SOCKET: &str = "/run/motornode.sock";

impl NodeConfig {
    /// Load from an INI file. Any error here is fatal to startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&text)
    }

    /// Parse from INI text.
    ///
    /// Recognized keys are applied; unrecognized keys are logged and skipped
    /// without aborting the rest of the file.
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let entries = ini::parse(text)?;

        let mut motor_paths: [Option<PathBuf>; MOTOR_COUNT] = Default::default();
        let mut period_ns = DEFAULT_PERIOD_NS;
        let mut http_port = DEFAULT_HTTP_PORT;
        let mut http_workers = DEFAULT_HTTP_WORKERS;
        let mut ipc_socket = PathBuf::from(DEFAULT_IPC_SOCKET);
        let mut min_rpm: Option<f32> = None;
        let mut max_rpm: Option<f32> = None;

        for entry in &entries {
            match (entry.section.as_str(), entry.key.as_str()) {
                ("motor0", "path") => motor_paths[0] = Some(PathBuf::from(&entry.value)),
                ("motor1", "path") => motor_paths[1] = Some(PathBuf::from(&entry.value)),
                ("motor2", "path") => motor_paths[2] = Some(PathBuf::from(&entry.value)),
                ("motor3", "path") => motor_paths[3] = Some(PathBuf::from(&entry.value)),
                ("pwm", "period_ns") => period_ns = parse_value(entry)?,
                ("server", "port") => http_port = parse_value(entry)?,
                ("server", "workers") => http_workers = parse_value(entry)?,
                ("ipc", "socket") => ipc_socket = PathBuf::from(&entry.value),
                ("mapper", "min_rpm") => min_rpm = Some(parse_value(entry)?),
                ("mapper", "max_rpm") => max_rpm = Some(parse_value(entry)?),
                (section, key) => {
                    warn!(section, key, line = entry.line, "unrecognized configuration key");
                }
            }
        }

        let mapper = match (min_rpm, max_rpm) {
            (None, None) => MapperKind::Identity,
            (Some(min), Some(max)) if min < max => MapperKind::RpmRange {
                min_rpm: min,
                max_rpm: max,
            },
            _ => {
                // One bound missing, or an empty/inverted range.
                let entry = entries
                    .iter()
                    .rfind(|e| e.section == "mapper")
                    .expect("mapper bounds came from a mapper entry");
                return Err(ConfigError::InvalidValue {
                    section: entry.section.clone(),
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    line: entry.line,
                });
            }
        };

        let mut paths = Vec::with_capacity(MOTOR_COUNT);
        for (index, slot) in motor_paths.into_iter().enumerate() {
            match slot {
                Some(path) => paths.push(path),
                None => {
                    return Err(ConfigError::MissingMotorPath {
                        section: format!("motor{index}"),
                    })
                }
            }
        }
        let motor_paths = paths
            .try_into()
            .expect("exactly MOTOR_COUNT paths were collected");

        Ok(Self {
            motor_paths,
            period_ns,
            http_port,
            http_workers,
            ipc_socket,
            mapper,
        })
    }
}

fn parse_value<T: std::str::FromStr>(entry: &IniEntry) -> Result<T> {
    entry.value.parse().map_err(|_| ConfigError::InvalidValue {
        section: entry.section.clone(),
        key: entry.key.clone(),
        value: entry.value.clone(),
        line: entry.line,
    })
}
