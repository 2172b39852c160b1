use std::sync::Arc;

use axum::{Extension, Json, extract::Query};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Res,
    api::AppState,
    recommend::{self, associations, catalog},
    spotify::WebApi,
};

#[derive(Debug, Deserialize)]
pub struct NextSongRequest {
    pub user_id: String,
    #[serde(default)]
    pub catalog: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub user_id: String,
    /// Only suggest artists present in this catalog.
    #[serde(default)]
    pub catalog: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub primary: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistPlaylistRequest {
    pub user_id: String,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<String>>,
}

async fn user_api(state: &AppState, user_id: &str) -> Res<WebApi> {
    let token = state.sessions.ensure_valid(user_id).await?;
    Ok(state.spotify.authorized(token))
}

pub async fn next_song(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<NextSongRequest>,
) -> Res<String> {
    let api = user_api(&state, &request.user_id).await?;
    let url = state.catalogs.resolve(request.catalog.as_deref())?;

    let (catalog, reference) = tokio::try_join!(
        catalog::fetch(state.spotify.http(), url),
        recommend::current_reference(&api),
    )?;

    let queued = recommend::queue_similar(&api, &catalog, &reference, state.queue_length).await?;
    let closest = queued.first().ok_or(Error::NoCompatibleCandidates)?;

    Ok(match queued.len() {
        1 => format!("Added {} to queue!", closest.name),
        n => format!("Added {} and {} more to queue!", closest.name, n - 1),
    })
}

pub async fn artist_suggestions(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SuggestionsQuery>,
) -> Res<Json<SuggestionsResponse>> {
    let api = user_api(&state, &query.user_id).await?;
    let choice = query.catalog.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let (track, catalog) = match choice {
        None => (recommend::current_track(&api).await?, None),
        Some(choice) => {
            let url = state.catalogs.resolve(Some(choice))?;
            let (catalog, track) = tokio::try_join!(
                catalog::fetch(state.spotify.http(), url),
                recommend::current_track(&api),
            )?;
            (track, Some(catalog))
        }
    };
    let primary = track.primary_artist().ok_or(Error::NoActiveTrack)?;

    let suggestions = match &catalog {
        Some(catalog) => associations::suggest_in(primary, catalog, state.artist_match),
        None => associations::suggest(primary)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    Ok(Json(SuggestionsResponse {
        primary: primary.to_string(),
        suggestions,
    }))
}

pub async fn artist_playlist(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<ArtistPlaylistRequest>,
) -> Res<String> {
    let api = user_api(&state, &request.user_id).await?;
    let url = state.catalogs.resolve(request.catalog.as_deref())?;

    let (catalog, track) = tokio::try_join!(
        catalog::fetch(state.spotify.http(), url),
        recommend::current_track(&api),
    )?;

    let artist_set = associations::artist_set(&track, request.artists.as_deref());
    let name = recommend::build_artist_playlist(
        &api,
        &catalog,
        &track,
        &artist_set,
        state.artist_match,
    )
    .await?;

    Ok(format!("Playlist '{}' created and now playing!", name))
}
