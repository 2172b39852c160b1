use crate::{
    Error, Res,
    recommend::{
        Reference,
        catalog::{Catalog, CatalogRow, bare_track_id},
        current_reference,
        features::FeatureVector,
    },
    spotify::SpotifyApi,
    success,
};

/// A catalog row scored against the reference track.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub name: String,
    pub id: String,
    pub distance: f64,
    /// Pre-resolved URI from the catalog, if it had one.
    pub uri: Option<String>,
}

impl RankedCandidate {
    fn from_row(row: &CatalogRow, distance: f64) -> Self {
        Self {
            name: row.name.clone(),
            id: row.id.clone(),
            distance,
            uri: row.uri.clone(),
        }
    }
}

/// Ranks catalog rows by distance to `reference`, closest first.
///
/// The reference track itself and rows whose feature set differs from the
/// reference's are skipped. Ties keep catalog order. Returns at most `limit`
/// candidates and an empty list when nothing is comparable.
pub fn rank_candidates(
    catalog: &Catalog,
    reference: &FeatureVector,
    reference_id: &str,
    limit: usize,
) -> Vec<RankedCandidate> {
    let reference_id = bare_track_id(reference_id);

    let mut ranked: Vec<RankedCandidate> = catalog
        .rows()
        .iter()
        .filter(|row| row.bare_id() != reference_id)
        .filter_map(|row| {
            row.vector()
                .distance(reference)
                .map(|d| RankedCandidate::from_row(row, d))
        })
        .collect();

    // stable: equal distances keep catalog order
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(limit);
    ranked
}

/// The catalog URI when present, otherwise one lookup by track id.
pub async fn resolve_uri<A>(api: &A, candidate: &RankedCandidate) -> Res<String>
where
    A: SpotifyApi + ?Sized,
{
    if let Some(uri) = &candidate.uri {
        return Ok(uri.clone());
    }
    Ok(api.track_uri(bare_track_id(&candidate.id)).await?)
}

/// Queues the `limit` songs closest to `reference`, closest first.
///
/// Returns the queued candidates; fails with
/// [`Error::NoCompatibleCandidates`] when there was nothing to queue.
pub async fn queue_similar<A>(
    api: &A,
    catalog: &Catalog,
    reference: &Reference,
    limit: usize,
) -> Res<Vec<RankedCandidate>>
where
    A: SpotifyApi + ?Sized,
{
    let ranked = rank_candidates(catalog, &reference.features, &reference.id, limit);
    if ranked.is_empty() {
        return Err(Error::NoCompatibleCandidates);
    }

    for candidate in &ranked {
        let uri = resolve_uri(api, candidate).await?;
        api.add_to_queue(&uri).await?;
        success!(
            "Queued {} (distance {:.3})",
            candidate.name,
            candidate.distance
        );
    }

    Ok(ranked)
}

/// Queues the songs most similar to what is playing now and returns the name
/// of the closest one.
pub async fn best_next_songs<A>(api: &A, catalog: &Catalog, limit: usize) -> Res<String>
where
    A: SpotifyApi + ?Sized,
{
    let reference = current_reference(api).await?;
    let queued = queue_similar(api, catalog, &reference, limit).await?;
    queued
        .into_iter()
        .next()
        .map(|c| c.name)
        .ok_or(Error::NoCompatibleCandidates)
}
