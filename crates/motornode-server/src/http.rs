use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::bounded;
use motornode_proto::{build_response, parse_request, HttpConfig, BODY_DELIMITER};
use socket2::{Domain, Socket, Type};
use tracing::{debug, warn};

use crate::error::{Result, ServerError};
use crate::router::Router;

/// The HTTP-like command server.
///
/// Accepts TCP connections and hands them to a fixed pool of worker threads
/// over a bounded queue — the acceptor blocks when all workers are busy and
/// the queue is full, so concurrency is capped instead of growing one thread
/// per connection. Per-connection read/write timeouts keep a stalled client
/// from occupying a worker forever. Both bounds are hardenings over the
/// original unbounded thread-per-connection behavior.
///
/// Every request is answered with the fixed success preamble; there are no
/// other status codes. Requests that fail to parse get the preamble with an
/// empty body.
pub struct HttpServer {
    listener: TcpListener,
    router: Arc<Router>,
    config: HttpConfig,
    workers: usize,
    running: Arc<AtomicBool>,
    connection_limit: Option<usize>,
}

impl HttpServer {
    /// Listen backlog: two pending connections, a wire-protocol contract.
    pub const DEFAULT_BACKLOG: i32 = 2;
    pub const DEFAULT_WORKERS: usize = 8;

    /// Bind on all interfaces with the default backlog.
    pub fn bind(port: u16) -> Result<Self> {
        Self::bind_with_backlog(port, Self::DEFAULT_BACKLOG)
    }

    /// Bind with an explicit listen backlog.
    pub fn bind_with_backlog(port: u16, backlog: i32) -> Result<Self> {
        let bind_err = |source| ServerError::BindTcp { port, source };

        let socket = Socket::new(Domain::IPV4, Type::STREAM, None).map_err(bind_err)?;
        socket.set_reuse_address(true).map_err(bind_err)?;
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        socket.bind(&addr.into()).map_err(bind_err)?;
        socket.listen(backlog).map_err(bind_err)?;

        Ok(Self {
            listener: socket.into(),
            router: Arc::new(Router::new()),
            config: HttpConfig::default(),
            workers: Self::DEFAULT_WORKERS,
            running: Arc::new(AtomicBool::new(true)),
            connection_limit: None,
        })
    }

    /// Attach the endpoint table. Immutable from here on.
    pub fn with_router(mut self, router: Arc<Router>) -> Self {
        self.router = router;
        self
    }

    /// Override protocol bounds and timeouts.
    pub fn with_config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Share a shutdown flag; checked between accepted connections.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Stop accepting after this many connections (remaining queued
    /// connections are still handled before [`serve`](Self::serve) returns).
    pub fn with_connection_limit(mut self, limit: usize) -> Self {
        self.connection_limit = Some(limit);
        self
    }

    /// The bound address — useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(ServerError::Io)
    }

    /// Run the accept loop on the calling thread.
    ///
    /// Only bind/spawn failures escape. `accept` errors and per-connection
    /// I/O errors close that connection only and are logged.
    pub fn serve(&self) -> Result<()> {
        let (sender, receiver) = bounded::<TcpStream>(self.workers);

        let mut worker_handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let receiver = receiver.clone();
            let router = Arc::clone(&self.router);
            let config = self.config.clone();
            let handle = std::thread::Builder::new()
                .name(format!("http-worker-{id}"))
                .spawn(move || {
                    for stream in receiver.iter() {
                        handle_connection(stream, &router, &config);
                    }
                })
                .map_err(ServerError::Io)?;
            worker_handles.push(handle);
        }
        drop(receiver);

        let mut accepted = 0usize;
        while self.running.load(Ordering::SeqCst) {
            if self.connection_limit.is_some_and(|limit| accepted >= limit) {
                break;
            }

            let stream = match self.listener.accept() {
                Ok((stream, addr)) => {
                    debug!(%addr, "http connection accepted");
                    stream
                }
                Err(err) => {
                    warn!(%err, "http accept failed");
                    continue;
                }
            };
            accepted += 1;

            if let Err(err) = stream
                .set_read_timeout(self.config.read_timeout)
                .and_then(|()| stream.set_write_timeout(self.config.write_timeout))
            {
                warn!(%err, "failed to set connection timeouts");
                continue;
            }

            if sender.send(stream).is_err() {
                break;
            }
        }

        drop(sender);
        for handle in worker_handles {
            let _ = handle.join();
        }
        Ok(())
    }
}

/// One connection: read, parse, route, respond, close.
///
/// Reading stops once the header/body delimiter has been seen, the buffer is
/// full, the client half-closes, or the read times out. There is no length
/// negotiation — the body is whatever arrived with the request.
fn handle_connection(mut stream: TcpStream, router: &Router, config: &HttpConfig) {
    let mut buf = vec![0u8; config.request_buffer_size];
    let mut filled = 0usize;

    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                if contains_delimiter(&buf[..filled]) {
                    break;
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(err) => {
                debug!(%err, "http read failed");
                return;
            }
        }
    }

    let body = match parse_request(&buf[..filled], config.max_body_size) {
        Ok(request) => {
            debug!(endpoint = %request.endpoint, method = ?request.method, "request parsed");
            // Routing miss: empty body, status unchanged.
            router.dispatch(&request).unwrap_or_default()
        }
        Err(err) => {
            debug!(%err, "unparseable request");
            String::new()
        }
    };

    let response = build_response(&body);
    if let Err(err) = stream.write_all(response.as_bytes()) {
        debug!(%err, "http send failed");
    }
    let _ = stream.shutdown(Shutdown::Both);
}

fn contains_delimiter(buf: &[u8]) -> bool {
    buf.windows(BODY_DELIMITER.len())
        .any(|window| window == BODY_DELIMITER)
}
