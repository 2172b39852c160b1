use reqwest::header::CONTENT_LENGTH;

use crate::{
    ProviderError,
    spotify::{WebApi, check},
    types::{CurrentPlayback, StartPlaybackRequest, Track},
};

/// `GET /me/player`; `None` when nothing is loaded on any device.
pub async fn current_playback(api: &WebApi) -> Result<Option<Track>, ProviderError> {
    let playback: Option<CurrentPlayback> = api.fetch(&api.url("/me/player")).await?;
    Ok(playback.and_then(|p| p.item))
}

pub async fn add_to_queue(api: &WebApi, uri: &str) -> Result<(), ProviderError> {
    let response = api
        .post("/me/player/queue")
        .query(&[("uri", uri)])
        .header(CONTENT_LENGTH, 0)
        .send()
        .await?;
    check(response).await?;
    Ok(())
}

pub async fn start_playback(api: &WebApi, context_uri: &str) -> Result<(), ProviderError> {
    let response = api
        .put("/me/player/play")
        .json(&StartPlaybackRequest {
            context_uri: context_uri.to_string(),
        })
        .send()
        .await?;
    check(response).await?;
    Ok(())
}

pub async fn set_shuffle(api: &WebApi, state: bool) -> Result<(), ProviderError> {
    let response = api
        .put("/me/player/shuffle")
        .query(&[("state", state)])
        .header(CONTENT_LENGTH, 0)
        .send()
        .await?;
    check(response).await?;
    Ok(())
}
