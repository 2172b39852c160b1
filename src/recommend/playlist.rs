use crate::{
    Error, Res,
    recommend::catalog::{Catalog, bare_track_id},
    spotify::SpotifyApi,
    success,
    types::{Playlist, Track},
    utils, warning,
};

/// Most items Spotify accepts in one add-tracks call.
pub const BATCH_SIZE: usize = 100;

pub const PLAYLIST_SUFFIX: &str = " .cat";

pub fn playlist_name(primary_artist: &str) -> String {
    format!("{}{}", primary_artist, PLAYLIST_SUFFIX)
}

/// How a catalog artist is matched against the wanted artists.
#[derive(Debug, Clone, Copy)]
pub struct ArtistMatch {
    pub case_sensitive: bool,
}

impl Default for ArtistMatch {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl ArtistMatch {
    /// `true` if any wanted artist is contained in any of the row's artists.
    pub fn matches(&self, row_artists: &[String], wanted: &[String]) -> bool {
        row_artists.iter().any(|artist| {
            wanted.iter().any(|w| {
                if self.case_sensitive {
                    artist.contains(w.as_str())
                } else {
                    artist.to_lowercase().contains(&w.to_lowercase())
                }
            })
        })
    }
}

/// What `build_artist_playlist` is going to write, computed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistPlan {
    pub name: String,
    /// Filtered catalog URIs in catalog order, reference track last.
    pub uris: Vec<String>,
}

impl PlaylistPlan {
    pub fn new(
        catalog: &Catalog,
        reference: &Track,
        artist_set: &[String],
        matcher: ArtistMatch,
    ) -> Res<Self> {
        let reference_id = reference.id.as_deref().ok_or(Error::NoActiveTrack)?;
        let primary = reference.primary_artist().ok_or(Error::NoActiveTrack)?;
        let reference_id = bare_track_id(reference_id);

        let mut rows: Vec<_> = catalog
            .rows()
            .iter()
            .filter(|row| matcher.matches(&row.artists, artist_set))
            .filter(|row| row.bare_id() != reference_id)
            .collect();
        utils::remove_duplicates_by(&mut rows, |row| row.bare_id().to_string());

        let mut uris: Vec<String> = rows.iter().map(|row| row.playable_uri()).collect();
        uris.push(reference.uri.clone());

        Ok(Self {
            name: playlist_name(primary),
            uris,
        })
    }

    /// `(position, uris)` per add call.
    pub fn batches(&self) -> impl Iterator<Item = (usize, &[String])> + '_ {
        self.uris
            .chunks(BATCH_SIZE)
            .enumerate()
            .map(|(i, chunk)| (i * BATCH_SIZE, chunk))
    }
}

/// Replaces the user's `<primary artist> .cat` playlist with the catalog
/// songs of `artist_set`, then starts shuffled playback of it.
///
/// Existing playlists with the same name are unfollowed first. If adding a
/// batch fails, the half-built playlist is unfollowed again before the error
/// is returned.
pub async fn build_artist_playlist<A>(
    api: &A,
    catalog: &Catalog,
    reference: &Track,
    artist_set: &[String],
    matcher: ArtistMatch,
) -> Res<String>
where
    A: SpotifyApi + ?Sized,
{
    let plan = PlaylistPlan::new(catalog, reference, artist_set, matcher)?;
    let create_failed = |e| Error::classify(e, Error::PlaylistCreateFailed);

    let existing = api.list_user_playlists().await.map_err(create_failed)?;
    for old in existing.iter().filter(|p| p.name == plan.name) {
        api.unfollow_playlist(&old.id).await.map_err(create_failed)?;
    }

    let user_id = api.current_user().await.map_err(create_failed)?;
    let playlist = api
        .create_playlist(&user_id, &plan.name)
        .await
        .map_err(create_failed)?;

    for (batch, (position, uris)) in plan.batches().enumerate() {
        if let Err(e) = api.add_tracks(&playlist.id, uris, position).await {
            let err = Error::classify(e, |reason| Error::BatchAddFailed { batch, reason });
            discard_partial(api, &playlist).await;
            return Err(err);
        }
    }

    api.set_shuffle(true).await?;
    api.start_playback(&playlist.uri).await?;

    success!(
        "Playlist '{}' created with {} tracks and now playing",
        plan.name,
        plan.uris.len()
    );
    Ok(plan.name)
}

async fn discard_partial<A>(api: &A, playlist: &Playlist)
where
    A: SpotifyApi + ?Sized,
{
    if let Err(e) = api.unfollow_playlist(&playlist.id).await {
        warning!(
            "Could not remove partially built playlist '{}': {}",
            playlist.name,
            e
        );
    }
}
