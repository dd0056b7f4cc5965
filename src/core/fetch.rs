use crate::core::cache::ResultCache;
use crate::core::normalize::{parse_response, ResponseOutcome};
use crate::core::prompt::build_search_prompt;
use crate::domain::model::Listing;
use crate::domain::ports::{Clock, SearchBackend, SessionStore, SystemClock};
use crate::utils::error::{GemsError, Result};

/// Cache-or-fetch pipeline for one postal code.
///
/// One attempt per call, no retries. Two overlapping calls for the same key
/// may both miss the cache; the later write wins.
pub struct ListingFetcher<B: SearchBackend, S: SessionStore, K: Clock = SystemClock> {
    backend: B,
    cache: ResultCache<S, K>,
}

impl<B: SearchBackend, S: SessionStore> ListingFetcher<B, S, SystemClock> {
    pub fn new(backend: B, store: S) -> Self {
        Self::with_cache(backend, ResultCache::new(store))
    }
}

impl<B: SearchBackend, S: SessionStore, K: Clock> ListingFetcher<B, S, K> {
    pub fn with_cache(backend: B, cache: ResultCache<S, K>) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &ResultCache<S, K> {
        &self.cache
    }

    pub async fn fetch(&self, postal_code: &str) -> Result<Vec<Listing>> {
        if let Some(entry) = self.cache.get(postal_code) {
            tracing::info!("Returning cached results for ZIP code: {}", postal_code);
            return Ok(entry.data);
        }

        if !self.backend.has_credential() {
            return Err(GemsError::configuration(
                "API_KEY environment variable is not set.",
            ));
        }

        let prompt = build_search_prompt(postal_code);
        tracing::info!(
            "🔎 Querying {} for listings in {}",
            self.backend.name(),
            postal_code
        );

        let raw = self.backend.generate(&prompt).await.map_err(|e| match e {
            GemsError::Configuration { .. }
            | GemsError::Format { .. }
            | GemsError::Fetch { .. }
            | GemsError::Transport(_) => e,
            other => GemsError::fetch(other.to_string()),
        })?;

        let listings = match parse_response(&raw)? {
            ResponseOutcome::Listings(listings) => listings,
            outcome => return Ok(outcome.into_listings()),
        };

        if listings.is_empty() {
            tracing::info!("No listings returned for ZIP code: {}", postal_code);
            return Ok(listings);
        }

        if let Err(e) = self.cache.put(postal_code, &listings) {
            tracing::warn!("Could not cache results for {}: {}", postal_code, e);
        } else {
            tracing::info!(
                "Fetched and cached {} results for ZIP code: {}",
                listings.len(),
                postal_code
            );
        }

        Ok(listings)
    }
}
