//! Status server exposing readiness, liveness and metrics over HTTP/1.1.
//!
//! # Endpoints
//!
//! | Path | Response |
//! |------|----------|
//! | `/live` | 200, empty JSON body |
//! | `/ready` | 200 when every check is up, 500 otherwise; body is the report |
//! | `/metrics` | Prometheus text exposition |
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_healthcheck::server::StatusServer;
//!
//! let server = Arc::new(StatusServer::new(config.server, hc, metrics));
//! let listener = server.bind().await?;
//! let runner = tokio::spawn({
//!     let server = Arc::clone(&server);
//!     async move { server.run(listener).await }
//! });
//!
//! // On SIGTERM: readiness goes down first, the listener closes after `grace`
//! server.shutdown_gracefully(grace).await;
//! runner.await??;
//! ```
//!
//! # Graceful Shutdown
//!
//! [`StatusServer::trigger_shutdown`] stops the accept loop and asks every open
//! connection to finish its in-flight request. [`StatusServer::run`] then waits
//! up to the configured shutdown timeout for connections to drain; if they do
//! not, in-flight readiness runs are cancelled.

mod handlers;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::health::Healthcheck;
use crate::observability::Metrics;

pub use handlers::{handle_request, RequestContext, UNKNOWN_REPORT_BODY};

/// Error type at the server edge.
pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP server for `/live`, `/ready` and `/metrics`.
pub struct StatusServer {
    config: ServerConfig,
    ctx: Arc<RequestContext>,
    /// Cancelled when the drain deadline passes; parent of every `/ready` run.
    requests: CancellationToken,
    active_connections: Arc<AtomicUsize>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    shutdown_initiated: AtomicBool,
}

impl StatusServer {
    pub fn new(config: ServerConfig, health: Arc<Healthcheck>, metrics: Arc<Metrics>) -> Self {
        let requests = CancellationToken::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            ctx: Arc::new(RequestContext {
                health,
                metrics,
                token: requests.clone(),
            }),
            requests,
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
            shutdown_rx,
            shutdown_initiated: AtomicBool::new(false),
        }
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        Ok(listener)
    }

    /// Serve connections from `listener` until shutdown is triggered and
    /// connections have drained.
    pub async fn run(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr: SocketAddr = listener.local_addr()?;
        info!("Status server listening on http://{}", local_addr);

        let mut shutdown_rx = self.shutdown_rx.clone();
        if !*shutdown_rx.borrow() {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        let (stream, remote_addr) = match accepted {
                            Ok(conn) => conn,
                            Err(e) => {
                                warn!(error = %e, "Accept failed");
                                continue;
                            }
                        };
                        let _ = stream.set_nodelay(true);
                        debug!(remote = %remote_addr, "Connection accepted");
                        self.spawn_connection(stream);
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("Status server received shutdown signal, stopping accept loop");
                        break;
                    }
                }
            }
        }
        drop(listener);

        if !self.wait_for_drain(self.config.shutdown_timeout).await {
            self.requests.cancel();
        }
        info!("Status server stopped");
        Ok(())
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream) {
        let ctx = Arc::clone(&self.ctx);
        let guard = ConnectionGuard::new(Arc::clone(&self.active_connections));
        let mut shutdown_rx = self.shutdown_rx.clone();

        tokio::spawn(async move {
            let _guard = guard;
            let service = service_fn(move |req| {
                let ctx = Arc::clone(&ctx);
                async move { Ok::<_, std::convert::Infallible>(handle_request(req, &ctx).await) }
            });

            let io = TokioIo::new(stream);
            let conn = http1::Builder::new().serve_connection(io, service);
            tokio::pin!(conn);

            let mut draining = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(e) = result {
                            debug!(error = %e, "Connection closed with error");
                        }
                        break;
                    }
                    _ = shutdown_rx.changed(), if !draining => {
                        draining = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        });
    }

    /// Trigger graceful shutdown.
    /// Stops the accept loop and closes idle keep-alive connections.
    pub fn trigger_shutdown(&self) {
        if self.shutdown_initiated.swap(true, Ordering::SeqCst) {
            return; // Already initiated
        }
        let _ = self.shutdown_tx.send(true);
    }

    /// Turn readiness down, keep serving for `grace`, then trigger shutdown.
    ///
    /// The grace period lets the orchestrator observe a failing `/ready` and
    /// stop routing traffic before the listener closes.
    pub async fn shutdown_gracefully(&self, grace: Duration) {
        self.ctx.health.shutdown();
        if !grace.is_zero() {
            info!(grace_ms = grace.as_millis() as u64, "Readiness down, waiting before closing listener");
            tokio::time::sleep(grace).await;
        }
        self.trigger_shutdown();
    }

    /// Number of open connections.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Wait for all active connections to drain.
    /// Returns true if drained successfully, false if timeout was reached.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        let check_interval = Duration::from_millis(50);

        loop {
            let active = self.active_connections();
            if active == 0 {
                return true;
            }

            if start.elapsed() >= timeout {
                warn!("Drain timeout reached with {} active connections", active);
                return false;
            }

            debug!("Waiting for {} connections to drain...", active);
            tokio::time::sleep(check_interval).await;
        }
    }
}

/// Decrements the connection count when the connection task ends.
struct ConnectionGuard(Arc<AtomicUsize>);

impl ConnectionGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}
