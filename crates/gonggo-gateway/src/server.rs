use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use crate::error::GatewayError;
use crate::proxy::Upstreams;
use crate::router::build_router;

const DEFAULT_MAX_BODY: usize = 60 * 1024 * 1024;

#[derive(Clone)]
pub(crate) struct AppState {
    pub client: reqwest::Client,
    pub upstreams: Arc<Upstreams>,
    pub max_body_size: usize,
    pub started_at: Instant,
}

impl AppState {
    pub(crate) fn new(upstreams: Upstreams, max_body_size: usize) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            upstreams: Arc::new(upstreams),
            max_body_size,
            started_at: Instant::now(),
        })
    }
}

pub struct GatewayServer {
    addr: SocketAddr,
    upstreams: Upstreams,
    max_body_size: usize,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        upstreams: Upstreams,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("proxy binding to 0.0.0.0, it has no authentication");
        }

        Self {
            addr,
            upstreams,
            max_body_size: DEFAULT_MAX_BODY,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the proxy and run until the shutdown signal flips to `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let state = AppState::new(self.upstreams, self.max_body_size)?;
        let router = build_router(state);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("proxy listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("proxy shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}
