mod common;

use common::{MockSpotify, features, row, track};
use songcat::{
    Error,
    recommend::{
        ArtistMatch, Catalog, PlaylistPlan,
        associations::{artist_set, suggest, suggest_in},
        build_artist_playlist,
        playlist::{BATCH_SIZE, playlist_name},
    },
    types::Track,
};

fn reference() -> Track {
    track("ref", "Reference Song", &["Radiohead", "Thom Yorke"])
}

fn wanted(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// `n` Radiohead rows plus the reference itself and an unrelated artist.
fn radiohead_catalog(n: usize) -> Catalog {
    let mut rows = vec![row("ref", "Reference Song", &["Radiohead"], [0.0, 0.0])];
    for i in 0..n {
        rows.push(row(&format!("t{}", i), &format!("Song {}", i), &["Radiohead"], [0.1, 0.1]));
    }
    rows.push(row("other", "Other", &["Daft Punk"], [0.2, 0.2]));
    Catalog::new(rows)
}

#[test]
fn test_plan_puts_reference_last_exactly_once() {
    let plan = PlaylistPlan::new(
        &radiohead_catalog(3),
        &reference(),
        &wanted(&["Radiohead"]),
        ArtistMatch::default(),
    )
    .unwrap();

    assert_eq!(plan.name, "Radiohead .cat");
    assert_eq!(
        plan.uris,
        vec![
            "spotify:track:t0",
            "spotify:track:t1",
            "spotify:track:t2",
            "spotify:track:ref",
        ]
    );
}

#[test]
fn test_plan_dedupes_and_uses_catalog_uris() {
    let catalog = Catalog::new(vec![
        row("a", "A", &["Radiohead"], [0.0, 0.0]).with_uri("spotify:track:a-uri"),
        row("spotify:track:a", "A again", &["Radiohead"], [0.0, 0.0]),
        row("b", "B", &["Radiohead"], [0.0, 0.0]),
    ]);

    let plan =
        PlaylistPlan::new(&catalog, &reference(), &wanted(&["Radiohead"]), ArtistMatch::default())
            .unwrap();

    assert_eq!(
        plan.uris,
        vec!["spotify:track:a-uri", "spotify:track:b", "spotify:track:ref"]
    );
}

#[test]
fn test_plan_artist_matching() {
    let catalog = Catalog::new(vec![
        row("a", "A", &["radiohead"], [0.0, 0.0]),
        row("b", "B", &["Radiohead & Friends"], [0.0, 0.0]),
        row("c", "C", &["Portishead"], [0.0, 0.0]),
    ]);
    let artists = wanted(&["Radiohead"]);

    // Containment, case-sensitive by default
    let plan = PlaylistPlan::new(&catalog, &reference(), &artists, ArtistMatch::default()).unwrap();
    assert_eq!(plan.uris, vec!["spotify:track:b", "spotify:track:ref"]);

    let insensitive = ArtistMatch {
        case_sensitive: false,
    };
    let plan = PlaylistPlan::new(&catalog, &reference(), &artists, insensitive).unwrap();
    assert_eq!(
        plan.uris,
        vec!["spotify:track:a", "spotify:track:b", "spotify:track:ref"]
    );
}

#[test]
fn test_plan_batches() {
    let plan = PlaylistPlan::new(
        &radiohead_catalog(250),
        &reference(),
        &wanted(&["Radiohead"]),
        ArtistMatch::default(),
    )
    .unwrap();

    let batches: Vec<(usize, usize)> = plan.batches().map(|(p, uris)| (p, uris.len())).collect();
    assert_eq!(batches, vec![(0, 100), (100, 100), (200, 51)]);
    assert_eq!(BATCH_SIZE, 100);
}

#[test]
fn test_plan_requires_playable_reference() {
    let mut no_id = reference();
    no_id.id = None;
    let result = PlaylistPlan::new(&radiohead_catalog(1), &no_id, &[], ArtistMatch::default());
    assert!(matches!(result, Err(Error::NoActiveTrack)));

    let mut no_artist = reference();
    no_artist.artists.clear();
    let result = PlaylistPlan::new(&radiohead_catalog(1), &no_artist, &[], ArtistMatch::default());
    assert!(matches!(result, Err(Error::NoActiveTrack)));
}

#[tokio::test]
async fn test_build_adds_all_batches_and_starts_playback() {
    let api = MockSpotify::playing(reference(), features(0.0, 0.0));
    let catalog = radiohead_catalog(250);
    let artists = wanted(&["Radiohead"]);
    let plan = PlaylistPlan::new(&catalog, &reference(), &artists, ArtistMatch::default()).unwrap();

    let name = build_artist_playlist(&api, &catalog, &reference(), &artists, ArtistMatch::default())
        .await
        .unwrap();

    assert_eq!(name, playlist_name("Radiohead"));
    api.with(|s| {
        // ceil(251 / 100) calls, concatenated in plan order
        assert_eq!(s.add_calls.len(), 3);
        let positions: Vec<usize> = s.add_calls.iter().map(|(_, _, p)| *p).collect();
        assert_eq!(positions, vec![0, 100, 200]);
        let added: Vec<String> = s.add_calls.iter().flat_map(|(_, uris, _)| uris.clone()).collect();
        assert_eq!(added, plan.uris);
        assert_eq!(added.last().map(String::as_str), Some("spotify:track:ref"));

        assert_eq!(s.shuffle, Some(true));
        assert_eq!(s.started.as_deref(), Some("spotify:playlist:pl1"));
    });
}

#[tokio::test]
async fn test_build_replaces_existing_playlist() {
    let api = MockSpotify::playing(reference(), features(0.0, 0.0));
    let catalog = radiohead_catalog(2);
    let artists = wanted(&["Radiohead"]);

    for _ in 0..2 {
        build_artist_playlist(&api, &catalog, &reference(), &artists, ArtistMatch::default())
            .await
            .unwrap();
    }

    assert_eq!(api.playlists_named("Radiohead .cat"), 1);
    api.with(|s| {
        assert_eq!(s.unfollowed, vec!["pl1"]);
        assert_eq!(s.started.as_deref(), Some("spotify:playlist:pl2"));
    });
}

#[tokio::test]
async fn test_build_discards_partial_playlist_on_batch_failure() {
    let api = MockSpotify::playing(reference(), features(0.0, 0.0));
    api.with(|s| s.fail_add_call = Some(1));

    let result = build_artist_playlist(
        &api,
        &radiohead_catalog(250),
        &reference(),
        &wanted(&["Radiohead"]),
        ArtistMatch::default(),
    )
    .await;

    assert!(matches!(result, Err(Error::BatchAddFailed { batch: 1, .. })));
    assert_eq!(api.playlists_named("Radiohead .cat"), 0);
    api.with(|s| {
        assert_eq!(s.unfollowed, vec!["pl1"]);
        assert_eq!(s.started, None);
        assert_eq!(s.shuffle, None);
    });
}

#[test]
fn test_artist_set() {
    let reference = reference();

    // No selection: every credited artist
    assert_eq!(artist_set(&reference, None), wanted(&["Radiohead", "Thom Yorke"]));
    assert_eq!(
        artist_set(&reference, Some(wanted(&[" "]).as_slice())),
        wanted(&["Radiohead", "Thom Yorke"])
    );

    // Selection: primary plus the selection, without duplicates
    let selection = wanted(&["The Smile", "Radiohead", "The Smile"]);
    assert_eq!(
        artist_set(&reference, Some(selection.as_slice())),
        wanted(&["Radiohead", "The Smile"])
    );
}

#[test]
fn test_suggest() {
    assert!(suggest("radiohead").contains(&"The Smile"));
    assert!(suggest("Unknown Artist").is_empty());
}

#[test]
fn test_suggest_in_keeps_artists_present_in_catalog() {
    let catalog = Catalog::new(vec![
        row("a", "A", &["The Smile"], [0.0, 0.0]),
        row("b", "B", &["thom yorke"], [0.0, 0.0]),
    ]);

    assert_eq!(
        suggest_in("Radiohead", &catalog, ArtistMatch::default()),
        wanted(&["The Smile"])
    );
    assert_eq!(
        suggest_in("Radiohead", &catalog, ArtistMatch { case_sensitive: false }),
        wanted(&["Thom Yorke", "The Smile"])
    );
    assert!(suggest_in("Unknown Artist", &catalog, ArtistMatch::default()).is_empty());
}
