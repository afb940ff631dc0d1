use std::io::Read;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use motornode_proto::{decode_command, COMMAND_SIZE};
use motornode_pwm::Actuator;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::state::NodeState;
use crate::uds::{peer_credentials, CommandSocket};

/// The binary IPC command loop.
///
/// Single-consumer contract: exactly one client is served at a time. The
/// loop accepts a connection, then reads fixed 16-byte command messages
/// sequentially until the client disconnects, then returns to accept. A
/// second client connecting while the first is live waits in the listen
/// backlog. Commands are one-way; no acknowledgment is sent.
///
/// A trailing partial message is dropped and logged — undersized input is a
/// recoverable per-message condition, never an out-of-bounds read and never
/// fatal to the loop.
pub struct IpcCommandLoop<A> {
    socket: CommandSocket,
    state: Arc<NodeState<A>>,
    running: Arc<AtomicBool>,
    message_limit: Option<usize>,
}

enum MessageRead {
    Complete([u8; COMMAND_SIZE]),
    Disconnected,
    Undersized(usize),
}

impl<A: Actuator> IpcCommandLoop<A> {
    /// Bind the command socket at `path`.
    pub fn bind(path: impl AsRef<Path>, state: Arc<NodeState<A>>) -> Result<Self> {
        let socket = CommandSocket::bind(path)?;
        Ok(Self {
            socket,
            state,
            running: Arc::new(AtomicBool::new(true)),
            message_limit: None,
        })
    }

    /// Share a shutdown flag; the loop stops accepting once it reads false.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Return from [`run`](Self::run) after handling this many commands.
    pub fn with_message_limit(mut self, limit: usize) -> Self {
        self.message_limit = Some(limit);
        self
    }

    /// Bound socket path.
    pub fn path(&self) -> &Path {
        self.socket.path()
    }

    /// Serve forever (or until the running flag clears / the message limit
    /// is reached). Only bind-time errors escape; everything at message or
    /// connection scope is logged and survived.
    pub fn run(&self) -> Result<()> {
        let mut handled = 0usize;

        while self.running.load(Ordering::SeqCst) {
            let mut stream = match self.socket.accept() {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "ipc accept failed");
                    continue;
                }
            };

            match peer_credentials(&stream) {
                Some((uid, gid, pid)) => info!(uid, gid, pid, "ipc client connected"),
                None => info!("ipc client connected"),
            }

            while self.running.load(Ordering::SeqCst) {
                match read_message(&mut stream) {
                    Ok(MessageRead::Complete(buf)) => {
                        let command = match decode_command(&buf) {
                            Ok(command) => command,
                            Err(err) => {
                                warn!(%err, "dropping undecodable ipc message");
                                continue;
                            }
                        };
                        debug!(speeds = ?command.speeds, "motor command received");
                        self.state.apply_speeds(&command.speeds);

                        handled += 1;
                        if self.message_limit.is_some_and(|limit| handled >= limit) {
                            return Ok(());
                        }
                    }
                    Ok(MessageRead::Disconnected) => {
                        debug!("ipc client disconnected");
                        break;
                    }
                    Ok(MessageRead::Undersized(size)) => {
                        warn!(
                            size,
                            expected = COMMAND_SIZE,
                            "dropping undersized ipc message"
                        );
                        break;
                    }
                    Err(err) => {
                        warn!(%err, "ipc read failed, closing connection");
                        break;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Read one fixed-length message, tolerating partial reads.
fn read_message(stream: &mut UnixStream) -> std::io::Result<MessageRead> {
    let mut buf = [0u8; COMMAND_SIZE];
    let mut filled = 0usize;

    while filled < COMMAND_SIZE {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Ok(if filled == 0 {
                    MessageRead::Disconnected
                } else {
                    MessageRead::Undersized(filled)
                });
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(MessageRead::Complete(buf))
}
