use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::{
    Error, Res,
    api::{self, AppState},
    config::Config,
    info,
};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/authorize", post(api::authorize))
        .route("/callback", get(api::callback))
        .route("/next-song", post(api::next_song))
        .route("/artist-suggestions", get(api::artist_suggestions))
        .route("/artist-playlist", post(api::artist_playlist))
        .layer(Extension(state))
}

pub async fn start_api_server(config: Config) -> Res<()> {
    let addr = SocketAddr::from_str(&config.server_address)
        .map_err(|e| Error::Config(format!("invalid SERVER_ADDRESS: {}", e)))?;

    let state = Arc::new(AppState::from_config(&config)?);
    spawn_state_sweeper(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Config(format!("cannot bind {}: {}", addr, e)))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Config(format!("server error: {}", e)))
}

/// Periodically drops abandoned authorization attempts.
fn spawn_state_sweeper(state: Arc<AppState>) {
    let period = state.sessions.pending_state_ttl().max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = state.sessions.evict_expired_states().await;
            if evicted > 0 {
                info!("Evicted {} expired authorization states", evicted);
            }
        }
    });
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        // without a signal handler, run until killed
        Err(_) => std::future::pending::<()>().await,
    }
}
