//! Command ingestion and dispatch for motornode.
//!
//! Two independent entry points feed a shared actuation state:
//! - [`IpcCommandLoop`]: sequential, single-consumer binary command channel
//!   over a Unix domain socket
//! - [`HttpServer`]: minimal HTTP-like command server with a bounded worker
//!   pool
//!
//! Routing state ([`Router`]) is immutable once serving starts; actuation
//! state ([`NodeState`]) is shared and serialized per channel.

pub mod error;
pub mod http;
pub mod ipc;
pub mod router;
pub mod state;
pub mod uds;

pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use ipc::IpcCommandLoop;
pub use router::{Handler, Router};
pub use state::NodeState;
pub use uds::CommandSocket;
