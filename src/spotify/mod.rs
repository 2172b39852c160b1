//! # Spotify Integration Module
//!
//! This module is the only place that talks HTTP to Spotify. It exposes two
//! seams so the rest of the crate can be exercised without a network:
//!
//! - [`TokenEndpoint`] - the accounts service (code exchange, refresh)
//! - [`SpotifyApi`] - the Web API calls made on behalf of one user
//!
//! [`SpotifyClient`] implements [`TokenEndpoint`] and hands out a [`WebApi`]
//! per access token, which implements [`SpotifyApi`].
//!
//! ```text
//! Session Manager ──► TokenEndpoint ──► POST /api/token
//! Similarity / Playlist ──► SpotifyApi ──► /me/player, /playlists, ...
//! ```
//!
//! Every request goes through one `reqwest::Client` built with the configured
//! timeout, so no call can block indefinitely. A timeout surfaces as
//! [`ProviderError::Timeout`]. Nothing is retried: the first failed response
//! is the error the caller sees.

pub mod auth;
pub mod player;
pub mod playlist;
pub mod tracks;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    Error, ProviderError, Res,
    config::Config,
    types::{AudioFeatures, ClientCredentials, Playlist, Token, Track},
};

/// The accounts-service calls the session manager needs.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<Token, ProviderError>;

    async fn refresh(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Token, ProviderError>;
}

/// Web API calls made with one user's access token.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// The track currently playing, if any.
    async fn current_playback(&self) -> Result<Option<Track>, ProviderError>;

    async fn audio_features(&self, track_id: &str)
    -> Result<Option<AudioFeatures>, ProviderError>;

    /// Looks up the playable URI of a track id.
    async fn track_uri(&self, track_id: &str) -> Result<String, ProviderError>;

    async fn add_to_queue(&self, uri: &str) -> Result<(), ProviderError>;

    async fn current_user(&self) -> Result<String, ProviderError>;

    async fn list_user_playlists(&self) -> Result<Vec<Playlist>, ProviderError>;

    async fn create_playlist(&self, user_id: &str, name: &str)
    -> Result<Playlist, ProviderError>;

    /// Inserts `uris` at `position`; Spotify caps one call at 100 items.
    async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: usize,
    ) -> Result<(), ProviderError>;

    async fn unfollow_playlist(&self, playlist_id: &str) -> Result<(), ProviderError>;

    async fn start_playback(&self, context_uri: &str) -> Result<(), ProviderError>;

    async fn set_shuffle(&self, state: bool) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token_url: String,
}

impl SpotifyClient {
    pub fn new(api_url: &str, token_url: &str, timeout: Duration) -> Res<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Res<Self> {
        Self::new(&config.api_url, &config.token_url, config.request_timeout)
    }

    /// The shared, timeout-bound HTTP client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// A Web API handle acting with `access_token`.
    pub fn authorized(&self, access_token: String) -> WebApi {
        WebApi {
            http: self.http.clone(),
            api_url: self.api_url.clone(),
            access_token,
        }
    }
}

pub struct WebApi {
    http: Client,
    api_url: String,
    access_token: String,
}

impl WebApi {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(&self.access_token)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.http.put(self.url(path)).bearer_auth(&self.access_token)
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path)).bearer_auth(&self.access_token)
    }

    /// GET that maps 204 and 404 to `None`.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ProviderError> {
        let response = self.get(url).send().await?;
        if matches!(
            response.status(),
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND
        ) {
            return Ok(None);
        }

        let response = check(response).await?;
        parse_json(response).await.map(Some)
    }
}

/// Turns a non-2xx response into [`ProviderError::Status`] carrying the body.
pub(crate) async fn check(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))
}

#[async_trait]
impl SpotifyApi for WebApi {
    async fn current_playback(&self) -> Result<Option<Track>, ProviderError> {
        player::current_playback(self).await
    }

    async fn audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, ProviderError> {
        tracks::audio_features(self, track_id).await
    }

    async fn track_uri(&self, track_id: &str) -> Result<String, ProviderError> {
        tracks::track_uri(self, track_id).await
    }

    async fn add_to_queue(&self, uri: &str) -> Result<(), ProviderError> {
        player::add_to_queue(self, uri).await
    }

    async fn current_user(&self) -> Result<String, ProviderError> {
        playlist::current_user(self).await
    }

    async fn list_user_playlists(&self) -> Result<Vec<Playlist>, ProviderError> {
        playlist::list_user_playlists(self).await
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Playlist, ProviderError> {
        playlist::create(self, user_id, name).await
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: usize,
    ) -> Result<(), ProviderError> {
        playlist::add_tracks(self, playlist_id, uris, position).await
    }

    async fn unfollow_playlist(&self, playlist_id: &str) -> Result<(), ProviderError> {
        playlist::unfollow(self, playlist_id).await
    }

    async fn start_playback(&self, context_uri: &str) -> Result<(), ProviderError> {
        player::start_playback(self, context_uri).await
    }

    async fn set_shuffle(&self, state: bool) -> Result<(), ProviderError> {
        player::set_shuffle(self, state).await
    }
}
