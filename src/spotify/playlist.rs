use reqwest::header::CONTENT_LENGTH;

use crate::{
    ProviderError,
    spotify::{WebApi, check, parse_json},
    types::{
        AddTrackToPlaylistRequest, CreatePlaylistRequest, CurrentUser, GetUserPlaylistsResponse,
        Playlist,
    },
};

const PLAYLIST_PAGE_SIZE: u32 = 50;

pub async fn current_user(api: &WebApi) -> Result<String, ProviderError> {
    let user: Option<CurrentUser> = api.fetch(&api.url("/me")).await?;
    user.map(|u| u.id)
        .ok_or_else(|| ProviderError::Decode("empty /me response".into()))
}

/// Every playlist of the current user, following `next` links.
pub async fn list_user_playlists(api: &WebApi) -> Result<Vec<Playlist>, ProviderError> {
    let mut playlists = Vec::new();
    let mut next = Some(api.url(&format!("/me/playlists?limit={}", PLAYLIST_PAGE_SIZE)));

    while let Some(url) = next {
        let page: Option<GetUserPlaylistsResponse> = api.fetch(&url).await?;
        let Some(page) = page else {
            break;
        };
        playlists.extend(page.items);
        next = page.next;
    }

    Ok(playlists)
}

pub async fn create(api: &WebApi, user_id: &str, name: &str) -> Result<Playlist, ProviderError> {
    let response = api
        .post(&format!("/users/{}/playlists", user_id))
        .json(&CreatePlaylistRequest {
            name: name.to_string(),
            description: "Built by songcat from the artist catalog".to_string(),
            public: false,
        })
        .send()
        .await?;

    parse_json(check(response).await?).await
}

pub async fn add_tracks(
    api: &WebApi,
    playlist_id: &str,
    uris: &[String],
    position: usize,
) -> Result<(), ProviderError> {
    let response = api
        .post(&format!("/playlists/{}/tracks", playlist_id))
        .json(&AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
            position,
        })
        .send()
        .await?;
    check(response).await?;
    Ok(())
}

/// Spotify has no playlist deletion; unfollowing removes it from the library.
pub async fn unfollow(api: &WebApi, playlist_id: &str) -> Result<(), ProviderError> {
    let response = api
        .delete(&format!("/playlists/{}/followers", playlist_id))
        .header(CONTENT_LENGTH, 0)
        .send()
        .await?;
    check(response).await?;
    Ok(())
}
