use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, ServerError};

/// The Unix domain socket carrying binary motor commands.
///
/// Binds at a filesystem path with stale-socket cleanup and owner-only
/// permissions; the path is removed again on drop.
pub struct CommandSocket {
    listener: UnixListener,
    path: PathBuf,
}

impl CommandSocket {
    /// Permission mode for the created socket path.
    pub const SOCKET_MODE: u32 = 0o600;
    /// `sockaddr_un.sun_path` is 108 bytes on Linux, 104 on macOS.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen at `path`.
    ///
    /// An existing socket file at the path is treated as stale and removed;
    /// an existing non-socket file is an error, never deleted.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let path_len = path.as_os_str().len();
        if path_len >= Self::MAX_PATH_LEN {
            return Err(ServerError::PathTooLong {
                path,
                len: path_len,
                max: Self::MAX_PATH_LEN,
            });
        }

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|source| {
                ServerError::BindIpc {
                    path: path.clone(),
                    source,
                }
            })?;
            if metadata.file_type().is_socket() {
                debug!(?path, "removing stale command socket");
                std::fs::remove_file(&path).map_err(|source| ServerError::BindIpc {
                    path: path.clone(),
                    source,
                })?;
            } else {
                return Err(ServerError::BindIpc {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                });
            }
        }

        let listener = UnixListener::bind(&path).map_err(|source| ServerError::BindIpc {
            path: path.clone(),
            source,
        })?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(Self::SOCKET_MODE))
            .map_err(|source| ServerError::BindIpc {
                path: path.clone(),
                source,
            })?;

        info!(?path, "ipc command socket listening");
        Ok(Self { listener, path })
    }

    /// Accept the next client (blocking).
    pub fn accept(&self) -> std::io::Result<UnixStream> {
        let (stream, _addr) = self.listener.accept()?;
        debug!("ipc client accepted");
        Ok(stream)
    }

    /// Connect to a listening command socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> std::io::Result<UnixStream> {
        UnixStream::connect(path)
    }

    /// The bound socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CommandSocket {
    fn drop(&mut self) {
        if let Ok(metadata) = std::fs::symlink_metadata(&self.path) {
            if metadata.file_type().is_socket() {
                debug!(path = ?self.path, "removing command socket file");
                let _ = std::fs::remove_file(&self.path);
            }
        }
    }
}

/// Credentials of the connected peer via `SO_PEERCRED`: `(uid, gid, pid)`.
#[cfg(target_os = "linux")]
pub fn peer_credentials(stream: &UnixStream) -> Option<(u32, u32, u32)> {
    use std::os::fd::AsRawFd;

    let fd = stream.as_raw_fd();
    let mut cred = libc::ucred {
        pid: 0,
        uid: 0,
        gid: 0,
    };
    let mut len = std::mem::size_of::<libc::ucred>() as libc::socklen_t;

    // SAFETY: `cred` and `len` are valid writable pointers for the provided
    // sizes, and `fd` is an open socket descriptor owned by this process.
    let rc = unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_PEERCRED,
            (&mut cred as *mut libc::ucred).cast::<libc::c_void>(),
            &mut len,
        )
    };

    if rc == 0 && len as usize == std::mem::size_of::<libc::ucred>() {
        Some((cred.uid, cred.gid, cred.pid as u32))
    } else {
        None
    }
}

/// Peer credentials are not exposed on this platform.
#[cfg(not(target_os = "linux"))]
pub fn peer_credentials(_stream: &UnixStream) -> Option<(u32, u32, u32)> {
    None
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    fn make_sock_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("motornode-uds-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn bind_accept_connect_roundtrip() {
        let dir = make_sock_dir("roundtrip");
        let sock_path = dir.join("cmd.sock");
        let socket = CommandSocket::bind(&sock_path).expect("socket should bind");

        let path_clone = sock_path.clone();
        let client = std::thread::spawn(move || {
            let mut stream = CommandSocket::connect(&path_clone).expect("client should connect");
            stream.write_all(b"ping").expect("write should succeed");
        });

        let mut server = socket.accept().expect("accept should succeed");
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).expect("read should succeed");
        assert_eq!(&buf, b"ping");

        client.join().expect("client thread should finish");
        drop(socket);
        assert!(!sock_path.exists(), "socket file should be removed on drop");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_replaces_stale_socket() {
        let dir = make_sock_dir("stale");
        let sock_path = dir.join("cmd.sock");

        let first = CommandSocket::bind(&sock_path).expect("first bind should succeed");
        // Simulate an unclean shutdown leaving the file behind.
        std::mem::forget(first);

        let second = CommandSocket::bind(&sock_path);
        assert!(second.is_ok());

        drop(second);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_rejects_existing_non_socket_file() {
        let dir = make_sock_dir("file");
        let sock_path = dir.join("not-a-socket");
        std::fs::write(&sock_path, b"regular file").expect("write should succeed");

        let result = CommandSocket::bind(&sock_path);
        assert!(matches!(result, Err(ServerError::BindIpc { .. })));
        assert!(sock_path.exists(), "regular file must not be deleted");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bind_rejects_overlong_path() {
        let long_path = std::env::temp_dir().join("a".repeat(200)).join("cmd.sock");
        let result = CommandSocket::bind(&long_path);
        assert!(matches!(result, Err(ServerError::PathTooLong { .. })));
    }

    #[test]
    fn socket_mode_is_owner_only() {
        let dir = make_sock_dir("mode");
        let sock_path = dir.join("cmd.sock");
        let socket = CommandSocket::bind(&sock_path).expect("socket should bind");

        let mode = std::fs::metadata(&sock_path)
            .expect("socket metadata should be readable")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, CommandSocket::SOCKET_MODE);

        drop(socket);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
