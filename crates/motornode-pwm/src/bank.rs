use std::sync::Mutex;

use crate::actuator::Actuator;
use crate::error::{PwmError, Result};

/// Number of motor channels. A wire-protocol contract, not a tunable.
pub const MOTOR_COUNT: usize = 4;

/// The four actuator channels behind per-channel locks.
///
/// Both the IPC command loop and HTTP handlers actuate through this type, so
/// every duty-cycle write is serialized per channel. Locks are held only for
/// the duration of a single write; there is no whole-bank lock, so distinct
/// channels can be driven concurrently.
pub struct ChannelBank<A> {
    channels: [Mutex<A>; MOTOR_COUNT],
}

impl<A: Actuator> ChannelBank<A> {
    /// Take ownership of the four channels, positional motor0..motor3.
    pub fn new(channels: [A; MOTOR_COUNT]) -> Self {
        Self {
            channels: channels.map(Mutex::new),
        }
    }

    /// Apply a duty cycle to one channel.
    pub fn set_duty_cycle(&self, index: usize, percent: f32) -> Result<()> {
        let slot = self
            .channels
            .get(index)
            .ok_or(PwmError::InvalidChannel {
                index,
                count: MOTOR_COUNT,
            })?;
        let mut channel = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        channel.set_duty_cycle(percent)
    }

    /// Snapshot of the current duty cycles, channel order 0..3.
    pub fn duty_cycles(&self) -> [f32; MOTOR_COUNT] {
        let mut cycles = [0.0; MOTOR_COUNT];
        for (slot, out) in self.channels.iter().zip(cycles.iter_mut()) {
            *out = slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .duty_cycle();
        }
        cycles
    }
}
