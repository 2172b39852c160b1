mod common;

use common::{MockSpotify, features, row, track};
use songcat::{
    Error,
    recommend::{
        Catalog, CatalogRow, FeatureParam, FeatureVector, best_next_songs, current_reference,
        features::euclidean, queue_similar, rank_candidates,
    },
    types::AudioFeatures,
};

fn reference_vector() -> FeatureVector {
    [(FeatureParam::Danceability, 0.0), (FeatureParam::Energy, 1.0)]
        .into_iter()
        .collect()
}

// A and B tie at distance 1.0, C is far away
fn abc_catalog() -> Catalog {
    Catalog::new(vec![
        row("A", "Song A", &["Artist A"], [1.0, 1.0]).with_uri("spotify:track:A"),
        row("B", "Song B", &["Artist B"], [0.0, 0.0]),
        row("C", "Song C", &["Artist C"], [5.0, 5.0]),
    ])
}

#[test]
fn test_rank_candidates_orders_by_distance() {
    let ranked = rank_candidates(&abc_catalog(), &reference_vector(), "R", 3);

    let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Song A", "Song B", "Song C"]);
    assert_eq!(ranked[0].distance, 1.0);
    assert_eq!(ranked[1].distance, 1.0);
    assert!((ranked[2].distance - 41f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_rank_candidates_numeric_ids() {
    let catalog = Catalog::new(vec![
        row("1", "A", &["x"], [0.0, 0.0]),
        row("2", "B", &["x"], [1.0, 1.0]),
        row("3", "C", &["x"], [5.0, 5.0]),
    ]);

    let ranked = rank_candidates(&catalog, &reference_vector(), "9", 3);

    let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(rank_candidates(&catalog, &reference_vector(), "9", 1)[0].name, "A");
}

#[test]
fn test_rank_candidates_ties_keep_catalog_order() {
    let catalog = Catalog::new(vec![
        row("B", "Song B", &["x"], [0.0, 0.0]),
        row("A", "Song A", &["x"], [1.0, 1.0]),
    ]);

    let ranked = rank_candidates(&catalog, &reference_vector(), "R", 1);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].name, "Song B");
}

#[test]
fn test_rank_candidates_skips_reference() {
    let mut rows = abc_catalog().rows().to_vec();
    rows.insert(0, row("R", "Reference", &["Artist R"], [0.0, 1.0]));
    let catalog = Catalog::new(rows);

    // Given as URI, matched by bare id
    let ranked = rank_candidates(&catalog, &reference_vector(), "spotify:track:R", 10);
    assert!(ranked.iter().all(|c| c.id != "R"));
    assert_eq!(ranked.len(), 3);
}

#[test]
fn test_rank_candidates_fewer_than_limit() {
    let ranked = rank_candidates(&abc_catalog(), &reference_vector(), "R", 50);
    assert_eq!(ranked.len(), 3);

    let ranked = rank_candidates(&abc_catalog(), &reference_vector(), "R", 0);
    assert!(ranked.is_empty());
}

#[test]
fn test_rank_candidates_skips_incompatible_rows() {
    let catalog = Catalog::new(vec![
        CatalogRow::new("D", "Danceability only", &["x"])
            .with_feature(FeatureParam::Danceability, 0.0),
        row("A", "Song A", &["x"], [1.0, 1.0]).with_feature(FeatureParam::Tempo, 120.0),
        row("B", "Song B", &["x"], [0.0, 0.0]),
    ]);

    let ranked = rank_candidates(&catalog, &reference_vector(), "R", 10);
    let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Song B"]);
}

#[test]
fn test_distance_properties() {
    let a = reference_vector();
    let b: FeatureVector = [(FeatureParam::Danceability, 3.0), (FeatureParam::Energy, 5.0)]
        .into_iter()
        .collect();

    // Zero against itself and symmetric
    assert_eq!(a.distance(&a), Some(0.0));
    assert_eq!(a.distance(&b), b.distance(&a));
    assert_eq!(a.distance(&b), Some(5.0));
    assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
}

#[test]
fn test_feature_vector_from_audio_features() {
    let features = AudioFeatures {
        danceability: Some(0.7),
        tempo: Some(f64::NAN),
        key: Some(5.0),
        ..AudioFeatures::default()
    };
    let vector = FeatureVector::from(&features);

    // NaN and absent values are dropped, order follows the parameter list
    assert_eq!(vector.len(), 2);
    assert_eq!(
        vector.params().collect::<Vec<_>>(),
        vec![FeatureParam::Danceability, FeatureParam::Key]
    );
    assert_eq!(vector.get(FeatureParam::Key), Some(5.0));
    assert_eq!(vector.get(FeatureParam::Tempo), None);

    let other: FeatureVector = [(FeatureParam::Danceability, 0.1)].into_iter().collect();
    assert!(!vector.is_compatible(&other));
    assert_eq!(vector.distance(&other), None);
}

#[tokio::test]
async fn test_queue_similar_queues_closest_first() {
    let api = MockSpotify::playing(track("R", "Reference", &["Artist R"]), features(0.0, 1.0));
    let reference = current_reference(&api).await.unwrap();

    let queued = queue_similar(&api, &abc_catalog(), &reference, 2).await.unwrap();

    assert_eq!(queued.len(), 2);
    api.with(|s| {
        // A carries its own URI, B is looked up
        assert_eq!(s.queue, vec!["spotify:track:A", "spotify:track:B"]);
        assert_eq!(s.uri_lookups, vec!["B"]);
    });
}

#[tokio::test]
async fn test_best_next_songs_returns_closest_name() {
    let api = MockSpotify::playing(track("R", "Reference", &["Artist R"]), features(0.0, 1.0));

    let name = best_next_songs(&api, &abc_catalog(), 1).await.unwrap();

    assert_eq!(name, "Song A");
    api.with(|s| assert_eq!(s.queue, vec!["spotify:track:A"]));
}

#[tokio::test]
async fn test_no_compatible_candidates() {
    let api = MockSpotify::playing(track("R", "Reference", &["Artist R"]), features(0.0, 1.0));
    let catalog = Catalog::new(vec![
        CatalogRow::new("X", "Tempo only", &["x"]).with_feature(FeatureParam::Tempo, 90.0),
    ]);

    let result = best_next_songs(&api, &catalog, 1).await;

    assert!(matches!(result, Err(Error::NoCompatibleCandidates)));
    api.with(|s| assert!(s.queue.is_empty()));
}

#[tokio::test]
async fn test_nothing_playing() {
    let api = MockSpotify::default();
    let result = best_next_songs(&api, &abc_catalog(), 1).await;
    assert!(matches!(result, Err(Error::NoActiveTrack)));
}

#[tokio::test]
async fn test_features_unavailable() {
    let api = MockSpotify::playing(track("R", "Reference", &["Artist R"]), features(0.0, 1.0));
    api.with(|s| s.features.clear());

    let result = best_next_songs(&api, &abc_catalog(), 1).await;
    assert!(matches!(result, Err(Error::FeaturesUnavailable(id)) if id == "R"));
}

#[tokio::test]
async fn test_queue_timeout_is_reported_as_timeout() {
    let api = MockSpotify::playing(track("R", "Reference", &["Artist R"]), features(0.0, 1.0));
    api.with(|s| s.fail_queue_timeout = true);

    let result = best_next_songs(&api, &abc_catalog(), 1).await;
    assert!(matches!(result, Err(Error::ProviderTimeout(_))));
}
