use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Extension, Router, http::StatusCode, routing::get};
use songcat::{
    ProviderError,
    spotify::{SpotifyApi, SpotifyClient},
};

async fn bad_gateway(Extension(hits): Extension<Arc<AtomicUsize>>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::BAD_GATEWAY
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Serves a fake Web API on a random local port; returns its base URL.
async fn serve(hits: Arc<AtomicUsize>) -> String {
    let app = Router::new()
        .route("/me/player", get(bad_gateway))
        .route("/audio-features/{id}", get(no_content))
        .layer(Extension(hits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_bad_gateway_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(Arc::clone(&hits)).await;
    let client = SpotifyClient::new(&base, &format!("{}/api/token", base), Duration::from_secs(5))
        .unwrap();

    let result = client.authorized("token".into()).current_playback().await;

    // Should surface the first 502 as is, after a single call
    assert!(matches!(result, Err(ProviderError::Status { status: 502, .. })));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_content_means_no_data() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(hits).await;
    let client = SpotifyClient::new(&base, &format!("{}/api/token", base), Duration::from_secs(5))
        .unwrap();

    let features = client
        .authorized("token".into())
        .audio_features("abc")
        .await
        .unwrap();
    assert!(features.is_none());
}
