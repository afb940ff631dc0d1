//! PWM actuation layer for motornode.
//!
//! This is the hardware boundary of the node. It owns the four PWM channels
//! that drive the motors and everything that touches them:
//! - [`SysfsPwm`]: one channel backed by the Linux sysfs PWM interface
//! - [`SpeedMapper`]: the replaceable speed-to-duty-cycle policy
//! - [`ChannelBank`]: the four channels behind per-channel locks
//!
//! Everything above this crate talks in motor speeds; everything below it is
//! duty-cycle writes to device files.

pub mod actuator;
pub mod bank;
pub mod error;
pub mod mapper;

pub use actuator::{Actuator, SysfsPwm, DEFAULT_PERIOD_NS};
pub use bank::{ChannelBank, MOTOR_COUNT};
pub use error::{PwmError, Result};
pub use mapper::{IdentityMapper, RpmRangeMapper, SpeedMapper};
