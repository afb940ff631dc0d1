//! Wire formats for motornode.
//!
//! Two codecs, one per transport:
//! - [`command`]: the fixed 16-byte binary motor command carried over IPC
//! - [`http`]: the minimal HTTP-like request/response text protocol
//!
//! Both are pure byte-level code; no sockets here.

pub mod command;
pub mod error;
pub mod http;

pub use command::{decode_command, encode_command, MotorCommand, COMMAND_SIZE};
pub use error::{CommandError, RequestError};
pub use http::{
    build_response, parse_request, HttpConfig, Method, Request, BODY_DELIMITER,
    DEFAULT_MAX_BODY, MAX_RESPONSE_BODY, RESPONSE_PREAMBLE,
};
