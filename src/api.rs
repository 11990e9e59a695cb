use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::net::ToSocketAddrs;

/// Serves the registry in the Prometheus text exposition format.
///
/// Gathering drives a full scrape of the container runtime, which blocks, so it
/// runs on the blocking thread pool. Failures of individual containers never
/// surface here: the response is a `200` with whatever the collectors produced.
async fn metrics(State(registry): State<Registry>) -> Response {
    let families = match tokio::task::spawn_blocking(move || registry.gather()).await {
        Ok(families) => families,
        Err(err) => {
            log::error!("Metrics collection task failed: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to collect metrics",
            )
                .into_response();
        }
    };

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    if let Err(err) = encoder.encode(&families, &mut body) {
        log::error!("Failed to encode metrics: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to encode metrics",
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_owned())],
        body,
    )
        .into_response()
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new(registry: Registry) -> Self {
        let router = axum::Router::new()
            .route("/metrics", get(metrics))
            .with_state(registry);
        Self { router }
    }

    /// Serves the API on `addr` until Ctrl-C is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Serving metrics on http://{}/metrics", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received Ctrl-C, shutting down"),
        Err(err) => {
            log::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
