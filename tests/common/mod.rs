#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use songcat::{
    ProviderError,
    recommend::{CatalogRow, FeatureParam},
    spotify::{SpotifyApi, TokenEndpoint},
    types::{ArtistRef, AudioFeatures, ClientCredentials, Playlist, Token, Track},
};

pub fn track(id: &str, name: &str, artists: &[&str]) -> Track {
    Track {
        id: Some(id.to_string()),
        name: name.to_string(),
        uri: format!("spotify:track:{}", id),
        artists: artists
            .iter()
            .map(|a| ArtistRef {
                id: None,
                name: a.to_string(),
            })
            .collect(),
    }
}

/// Row with danceability/energy set, which is all most tests need.
pub fn row(id: &str, name: &str, artists: &[&str], features: [f64; 2]) -> CatalogRow {
    CatalogRow::new(id, name, artists)
        .with_feature(FeatureParam::Danceability, features[0])
        .with_feature(FeatureParam::Energy, features[1])
}

pub fn features(danceability: f64, energy: f64) -> AudioFeatures {
    AudioFeatures {
        danceability: Some(danceability),
        energy: Some(energy),
        ..AudioFeatures::default()
    }
}

#[derive(Default)]
pub struct MockState {
    pub playing: Option<Track>,
    pub features: HashMap<String, AudioFeatures>,
    pub uri_lookups: Vec<String>,
    pub queue: Vec<String>,
    pub fail_queue_timeout: bool,
    pub user_id: String,
    pub playlists: Vec<Playlist>,
    pub created: usize,
    pub add_calls: Vec<(String, Vec<String>, usize)>,
    pub fail_add_call: Option<usize>,
    pub unfollowed: Vec<String>,
    pub shuffle: Option<bool>,
    pub started: Option<String>,
}

/// In-process stand-in for the Spotify Web API.
#[derive(Default)]
pub struct MockSpotify {
    pub state: Mutex<MockState>,
}

impl MockSpotify {
    pub fn playing(track: Track, features: AudioFeatures) -> Self {
        let mock = MockSpotify::default();
        {
            let mut state = mock.state.lock().unwrap();
            state.user_id = "listener".to_string();
            state
                .features
                .insert(track.id.clone().unwrap(), features);
            state.playing = Some(track);
        }
        mock
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn playlists_named(&self, name: &str) -> usize {
        self.with(|s| s.playlists.iter().filter(|p| p.name == name).count())
    }
}

#[async_trait]
impl SpotifyApi for MockSpotify {
    async fn current_playback(&self) -> Result<Option<Track>, ProviderError> {
        Ok(self.with(|s| s.playing.clone()))
    }

    async fn audio_features(
        &self,
        track_id: &str,
    ) -> Result<Option<AudioFeatures>, ProviderError> {
        Ok(self.with(|s| s.features.get(track_id).cloned()))
    }

    async fn track_uri(&self, track_id: &str) -> Result<String, ProviderError> {
        self.with(|s| s.uri_lookups.push(track_id.to_string()));
        Ok(format!("spotify:track:{}", track_id))
    }

    async fn add_to_queue(&self, uri: &str) -> Result<(), ProviderError> {
        self.with(|s| {
            if s.fail_queue_timeout {
                return Err(ProviderError::Timeout("queue".into()));
            }
            s.queue.push(uri.to_string());
            Ok(())
        })
    }

    async fn current_user(&self) -> Result<String, ProviderError> {
        Ok(self.with(|s| s.user_id.clone()))
    }

    async fn list_user_playlists(&self) -> Result<Vec<Playlist>, ProviderError> {
        Ok(self.with(|s| s.playlists.clone()))
    }

    async fn create_playlist(
        &self,
        _user_id: &str,
        name: &str,
    ) -> Result<Playlist, ProviderError> {
        Ok(self.with(|s| {
            s.created += 1;
            let playlist = Playlist {
                id: format!("pl{}", s.created),
                name: name.to_string(),
                uri: format!("spotify:playlist:pl{}", s.created),
            };
            s.playlists.push(playlist.clone());
            playlist
        }))
    }

    async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: usize,
    ) -> Result<(), ProviderError> {
        self.with(|s| {
            if s.fail_add_call == Some(s.add_calls.len()) {
                return Err(ProviderError::Status {
                    status: 500,
                    message: "boom".into(),
                });
            }
            s.add_calls
                .push((playlist_id.to_string(), uris.to_vec(), position));
            Ok(())
        })
    }

    async fn unfollow_playlist(&self, playlist_id: &str) -> Result<(), ProviderError> {
        self.with(|s| {
            s.unfollowed.push(playlist_id.to_string());
            s.playlists.retain(|p| p.id != playlist_id);
        });
        Ok(())
    }

    async fn start_playback(&self, context_uri: &str) -> Result<(), ProviderError> {
        self.with(|s| s.started = Some(context_uri.to_string()));
        Ok(())
    }

    async fn set_shuffle(&self, state: bool) -> Result<(), ProviderError> {
        self.with(|s| s.shuffle = Some(state));
        Ok(())
    }
}

/// Accounts service that counts calls and hands out numbered tokens.
#[derive(Default)]
pub struct MockTokens {
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub fail_exchange: bool,
    pub timeout_exchange: bool,
    pub fail_refresh: bool,
    pub omit_refresh_token: bool,
    pub expires_in: u64,
}

impl MockTokens {
    pub fn new() -> Self {
        Self {
            expires_in: 3600,
            ..Self::default()
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenEndpoint for MockTokens {
    async fn exchange_code(
        &self,
        _credentials: &ClientCredentials,
        code: &str,
        _redirect_uri: &str,
        _code_verifier: &str,
    ) -> Result<Token, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.timeout_exchange {
            return Err(ProviderError::Timeout("token".into()));
        }
        if self.fail_exchange {
            return Err(ProviderError::Status {
                status: 400,
                message: "invalid_grant".into(),
            });
        }
        Ok(Token {
            access_token: format!("access-{}", code),
            refresh_token: Some(format!("refresh-{}", code)),
            scope: None,
            expires_in: self.expires_in,
        })
    }

    async fn refresh(
        &self,
        _credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Token, ProviderError> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        // let concurrent callers pile up on the refresh lock
        tokio::task::yield_now().await;
        if self.fail_refresh {
            return Err(ProviderError::Status {
                status: 400,
                message: "invalid_grant".into(),
            });
        }
        Ok(Token {
            access_token: format!("access-refreshed-{}", n),
            refresh_token: (!self.omit_refresh_token)
                .then(|| format!("{}-rotated", refresh_token)),
            scope: None,
            expires_in: 3600,
        })
    }
}
