use std::time::Duration;

use reqwest::Client;
use tabled::Table;

use crate::{
    Error, Res, config, info,
    recommend::{catalog, rank_candidates},
    types::CandidateTableRow,
};

/// Ranks a catalog against one of its own tracks and prints the result.
pub async fn similar(location: &str, track_id: &str, limit: usize) -> Res<()> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config::DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Config(e.to_string()))?;

    let catalog = catalog::load(&http, location).await?;
    info!("Loaded {} tracks from {}", catalog.len(), location);

    let reference = catalog
        .find(track_id)
        .ok_or_else(|| Error::InvalidCatalog(format!("track {} is not in the catalog", track_id)))?;
    let vector = reference.vector();
    info!(
        "Reference: {} by {} ({} features)",
        reference.name,
        reference.artists.join(", "),
        vector.len()
    );

    let ranked = rank_candidates(&catalog, &vector, &reference.id, limit);
    if ranked.is_empty() {
        return Err(Error::NoCompatibleCandidates);
    }

    let rows: Vec<CandidateTableRow> = ranked
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateTableRow {
            rank: i + 1,
            name: c.name.clone(),
            artists: catalog
                .find(&c.id)
                .map(|r| r.artists.join(", "))
                .unwrap_or_default(),
            distance: format!("{:.4}", c.distance),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}
