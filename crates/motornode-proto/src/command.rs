use bytes::{Buf, BufMut, BytesMut};
use motornode_pwm::MOTOR_COUNT;

use crate::error::CommandError;

/// Wire size of one command: four little-endian f32 speeds.
pub const COMMAND_SIZE: usize = MOTOR_COUNT * 4;

/// One actuation command: a target speed per motor.
///
/// Wire format (no header, no checksum, no length prefix):
/// ```text
/// ┌────────────┬────────────┬────────────┬────────────┐
/// │ motor0     │ motor1     │ motor2     │ motor3     │
/// │ f32 LE     │ f32 LE     │ f32 LE     │ f32 LE     │
/// └────────────┴────────────┴────────────┴────────────┘
/// ```
/// Channel assignment is positional. Constructed per received message and
/// consumed immediately; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    pub speeds: [f32; MOTOR_COUNT],
}

impl MotorCommand {
    pub fn new(speeds: [f32; MOTOR_COUNT]) -> Self {
        Self { speeds }
    }
}

/// Encode a command into the wire format.
pub fn encode_command(command: &MotorCommand, dst: &mut BytesMut) {
    dst.reserve(COMMAND_SIZE);
    for speed in command.speeds {
        dst.put_f32_le(speed);
    }
}

/// Decode a command from the start of a buffer.
///
/// The sender contract is exactly [`COMMAND_SIZE`] bytes per message; a
/// shorter buffer is an undersized message, never an out-of-bounds read.
pub fn decode_command(mut src: &[u8]) -> Result<MotorCommand, CommandError> {
    if src.len() < COMMAND_SIZE {
        return Err(CommandError::UndersizedMessage {
            size: src.len(),
            expected: COMMAND_SIZE,
        });
    }

    let mut speeds = [0.0; MOTOR_COUNT];
    for slot in &mut speeds {
        *slot = src.get_f32_le();
    }
    Ok(MotorCommand { speeds })
}
