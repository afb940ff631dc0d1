use std::io::Write;

use bytes::BytesMut;
use motornode_proto::{encode_command, MotorCommand};
use motornode_pwm::MOTOR_COUNT;
use motornode_server::CommandSocket;
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{io_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let speeds: [f32; MOTOR_COUNT] = args.speeds.as_slice().try_into().map_err(|_| {
        CliError::new(
            USAGE,
            format!(
                "expected {MOTOR_COUNT} speeds (motor0..motor3), got {}",
                args.speeds.len()
            ),
        )
    })?;

    let mut stream =
        CommandSocket::connect(&args.path).map_err(|err| io_error("connect failed", err))?;

    let mut wire = BytesMut::new();
    encode_command(&MotorCommand::new(speeds), &mut wire);
    stream
        .write_all(&wire)
        .map_err(|err| io_error("send failed", err))?;

    info!(?speeds, "motor command sent");
    Ok(SUCCESS)
}
