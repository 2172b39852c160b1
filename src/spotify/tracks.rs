use crate::{
    ProviderError,
    spotify::WebApi,
    types::{AudioFeatures, Track},
};

/// `GET /audio-features/{id}`; `None` if Spotify has no analysis for it.
pub async fn audio_features(
    api: &WebApi,
    track_id: &str,
) -> Result<Option<AudioFeatures>, ProviderError> {
    api.fetch(&api.url(&format!("/audio-features/{}", track_id)))
        .await
}

pub async fn track_uri(api: &WebApi, track_id: &str) -> Result<String, ProviderError> {
    let track: Option<Track> = api.fetch(&api.url(&format!("/tracks/{}", track_id))).await?;
    track.map(|t| t.uri).ok_or_else(|| ProviderError::Status {
        status: 404,
        message: format!("track {} not found", track_id),
    })
}
