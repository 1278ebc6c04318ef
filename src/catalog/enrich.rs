use std::time::Duration;

use futures_util::future::join_all;

use crate::catalog::jikan::MetadataLookup;
use crate::config::UnmatchedTitlePolicy;
use crate::models::{AnimeMetadata, Recommendation, RecommendationCard};

/// Look up every title concurrently and build display cards.
///
/// Each lookup has its own timeout; a failure or miss only affects that
/// card, which is then kept or dropped according to `policy`.
pub async fn enrich(
    lookup: &dyn MetadataLookup,
    recommendations: &[Recommendation],
    timeout: Duration,
    policy: UnmatchedTitlePolicy,
) -> Vec<RecommendationCard> {
    let lookups = recommendations
        .iter()
        .map(|r| lookup_one(lookup, &r.title, timeout));
    let results = join_all(lookups).await;

    recommendations
        .iter()
        .zip(results)
        .filter_map(|(rec, metadata)| {
            let found = metadata.is_some();
            if !found && policy == UnmatchedTitlePolicy::Omit {
                return None;
            }
            Some(RecommendationCard {
                title: rec.title.clone(),
                explanation: rec.explanation.clone(),
                metadata,
                details_available: Some(found),
            })
        })
        .collect()
}

async fn lookup_one(
    lookup: &dyn MetadataLookup,
    title: &str,
    timeout: Duration,
) -> Option<AnimeMetadata> {
    match tokio::time::timeout(timeout, lookup.lookup(title)).await {
        Ok(Ok(Some(meta))) => Some(meta),
        Ok(Ok(None)) => {
            tracing::info!("No catalog entry for '{title}'");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("Catalog lookup failed for '{title}': {e:#}");
            None
        }
        Err(_) => {
            tracing::warn!("Catalog lookup for '{title}' timed out after {timeout:?}");
            None
        }
    }
}
