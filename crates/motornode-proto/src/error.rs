/// Errors decoding a binary motor command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The message is shorter than the fixed command layout.
    ///
    /// Recoverable: the receive loop drops the message and keeps serving.
    #[error("undersized command message ({size} bytes, expected {expected})")]
    UndersizedMessage { size: usize, expected: usize },
}

/// Errors parsing an HTTP-like request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The buffer holds no `METHOD PATH VERSION` request line.
    ///
    /// Recoverable: the connection still receives the fixed success
    /// preamble with an empty body.
    #[error("missing or malformed request line")]
    MissingRequestLine,
}
