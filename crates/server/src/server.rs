use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::Instant};

use crate::{auth, info, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: auth::Authenticator,
    /// Budget of every engine call made while serving one request.
    pub request_timeout: Duration,
}

impl ServerState {
    pub fn new(engine: Engine, auth: auth::Authenticator, request_timeout: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            auth,
            request_timeout,
        }
    }

    pub(crate) fn deadline(&self) -> Instant {
        Instant::now() + self.request_timeout
    }
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/api/info", get(info::get))
        .route("/api/sendCoin", post(transactions::send_coin))
        .route("/api/buy/{item}", get(transactions::buy))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/api/auth", post(auth::authenticate))
        .merge(protected)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

pub async fn run(state: ServerState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    run_with_listener(state, listener).await
}

/// Serve until Ctrl-C, letting in-flight requests finish.
pub async fn run_with_listener(
    state: ServerState,
    listener: TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
