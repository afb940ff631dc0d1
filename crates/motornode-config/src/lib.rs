//! Configuration loading for motornode.
//!
//! The node is configured by a small INI file. The required part is the four
//! motor sections naming the PWM channel paths:
//!
//! ```ini
//! [motor0]
//! path = /sys/class/pwm/pwmchip0/pwm0
//! ```
//!
//! Unrecognized keys are logged and skipped; anything else wrong with the
//! file (unreadable, bad syntax, missing motor path) is fatal before the
//! node starts serving.

pub mod config;
pub mod error;
pub mod ini;

pub use config::{MapperKind, NodeConfig};
pub use error::{ConfigError, Result};
pub use ini::IniEntry;
