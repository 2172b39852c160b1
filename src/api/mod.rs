//! # API Module
//!
//! HTTP handlers for the songcat server. The handlers are thin: each one
//! resolves the caller's session, calls into [`crate::recommend`] or
//! [`crate::management`], and renders the outcome as plain text or JSON.
//!
//! ## Endpoints
//!
//! - [`health`] - liveness and version
//! - [`authorize`] - starts the Spotify authorization for a tenant
//! - [`callback`] - redirect target Spotify calls after the user consented
//! - [`next_song`] - queues the most similar songs from a catalog
//! - [`artist_suggestions`] - associated artists for the playing track
//! - [`artist_playlist`] - builds and plays the artist playlist
//!
//! ## Errors
//!
//! Every handler returns [`crate::Error`] on failure, rendered by its
//! [`IntoResponse`] impl: authentication problems are `401`, unknown names
//! `400`, missing data `404`, upstream failures `502` and timeouts `504`.
//! "No similar song found" is a normal `200` answer.

mod auth;
mod health;
mod recommend;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub use auth::{authorize, callback};
pub use health::health;
pub use recommend::{artist_playlist, artist_suggestions, next_song};

use crate::{
    Error, ErrorKind, Res,
    config::Config,
    management::{AuthSettings, SessionManager},
    recommend::{ArtistMatch, CatalogSources},
    spotify::SpotifyClient,
    warning,
};

/// Shared by every handler through an `Extension` layer.
pub struct AppState {
    pub sessions: SessionManager,
    pub spotify: SpotifyClient,
    pub catalogs: CatalogSources,
    pub queue_length: usize,
    pub artist_match: ArtistMatch,
    pub frontend_url: Option<String>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Res<Self> {
        let spotify = SpotifyClient::from_config(config)?;
        let sessions = SessionManager::in_memory(
            AuthSettings::from_config(config),
            std::sync::Arc::new(spotify.clone()),
        );

        Ok(Self {
            sessions,
            spotify,
            catalogs: CatalogSources::new(config.catalogs.clone()),
            queue_length: config.queue_length.max(1),
            artist_match: ArtistMatch {
                case_sensitive: config.artist_match_case_sensitive,
            },
            frontend_url: config.frontend_url.clone(),
        })
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoCompatibleCandidates => StatusCode::OK,
            Error::ProviderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            other => match other.kind() {
                ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::NoData => StatusCode::NOT_FOUND,
                ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if matches!(self, Error::NoCompatibleCandidates) {
            return (status, "No similar song found.".to_string()).into_response();
        }

        warning!("Request failed: {}", self);
        (status, self.to_string()).into_response()
    }
}
