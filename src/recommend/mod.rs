//! # Recommendation Module
//!
//! Everything between a parsed catalog and the calls that change what the
//! user hears:
//!
//! - [`catalog`] - parses the tabular song catalog into typed rows
//! - [`features`] - feature vectors keyed by acoustic parameter
//! - [`similarity`] - ranks rows by distance and queues the closest songs
//! - [`playlist`] - builds the artist playlist and starts playback
//! - [`associations`] - static associated-artist suggestions
//!
//! The pure parts (`rank_candidates`, `PlaylistPlan`) take no provider; the
//! async entry points take any [`SpotifyApi`] so they run against a mock in
//! tests.

pub mod associations;
pub mod catalog;
pub mod features;
pub mod playlist;
pub mod similarity;

pub use catalog::{Catalog, CatalogRow, CatalogSources};
pub use features::{FeatureParam, FeatureVector};
pub use playlist::{ArtistMatch, PlaylistPlan, build_artist_playlist};
pub use similarity::{RankedCandidate, best_next_songs, queue_similar, rank_candidates};

use crate::{Error, Res, spotify::SpotifyApi, types::Track};

/// The track currently playing and its feature vector.
#[derive(Debug, Clone)]
pub struct Reference {
    pub id: String,
    pub track: Track,
    pub features: FeatureVector,
}

/// The playing track; [`Error::NoActiveTrack`] when there is none or it has
/// no Spotify id (local files).
pub async fn current_track<A>(api: &A) -> Res<Track>
where
    A: SpotifyApi + ?Sized,
{
    let track = api.current_playback().await?.ok_or(Error::NoActiveTrack)?;
    if track.id.is_none() {
        return Err(Error::NoActiveTrack);
    }
    Ok(track)
}

pub async fn current_reference<A>(api: &A) -> Res<Reference>
where
    A: SpotifyApi + ?Sized,
{
    let track = current_track(api).await?;
    let id = track.id.clone().ok_or(Error::NoActiveTrack)?;

    let features = api
        .audio_features(&id)
        .await?
        .ok_or_else(|| Error::FeaturesUnavailable(id.clone()))?;
    let features = FeatureVector::from(&features);
    if features.is_empty() {
        return Err(Error::FeaturesUnavailable(id));
    }

    Ok(Reference {
        id,
        track,
        features,
    })
}
