//! Session state container.
//!
//! Holds the last searched postal code, the discount threshold, the current
//! result set and the view state. The postal code and threshold are mirrored
//! into the session store so they survive as long as the store does.
//!
//! Every search takes a ticket carrying a generation number. A completion is
//! applied only if no newer search has started since; otherwise it is
//! dropped.

use crate::core::fetch::ListingFetcher;
use crate::core::view::{DiscountLevel, ViewState};
use crate::domain::model::Listing;
use crate::domain::ports::{Clock, SearchBackend, SessionStore};
use crate::utils::error::Result;
use crate::utils::validation::validate_postal_code;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    postal_code: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The cleaned postal code this search was issued for.
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }
}

/// Owned copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub postal_code: Option<String>,
    pub discount: DiscountLevel,
    pub active_count: usize,
    pub filtered_count: usize,
    pub visible: Vec<Listing>,
    pub selected: Option<String>,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    postal_code: Option<String>,
    listings: Vec<Listing>,
    view: ViewState,
    loading: bool,
    error: Option<String>,
}

pub struct SearchSession<S: SessionStore> {
    store: S,
    zip_key: String,
    discount_key: String,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl<S: SessionStore> SearchSession<S> {
    /// Rebuilds the session from `store`, reading `<prefix>-zip` and
    /// `<prefix>-discount`. A missing or unsupported threshold falls back to
    /// 10%.
    pub fn restore(store: S, prefix: &str) -> Self {
        let zip_key = format!("{}-zip", prefix);
        let discount_key = format!("{}-discount", prefix);

        let postal_code = store.get_item(&zip_key).filter(|z| !z.is_empty());
        let discount = store
            .get_item(&discount_key)
            .and_then(|raw| match serde_json::from_str::<DiscountLevel>(&raw) {
                Ok(level) => Some(level),
                Err(e) => {
                    tracing::warn!("Ignoring stored discount {:?}: {}", raw, e);
                    None
                }
            })
            .unwrap_or_default();

        if let Some(zip) = &postal_code {
            tracing::debug!("Restored session for ZIP {} at {}", zip, discount);
        }

        Self {
            store,
            zip_key,
            discount_key,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                postal_code,
                view: ViewState::new(discount),
                ..SessionState::default()
            }),
        }
    }

    pub fn postal_code(&self) -> Option<String> {
        self.state.lock().postal_code.clone()
    }

    pub fn discount(&self) -> DiscountLevel {
        self.state.lock().view.discount()
    }

    pub fn listings(&self) -> Vec<Listing> {
        self.state.lock().listings.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Validates `input` and starts a new search generation.
    ///
    /// Clears the displayed results, error, window and selection before the
    /// request is issued.
    pub fn begin_search(&self, input: &str) -> Result<SearchTicket> {
        let postal_code = validate_postal_code(input)?;

        let generation = {
            let mut state = self.state.lock();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.postal_code = Some(postal_code.clone());
            state.listings.clear();
            state.error = None;
            state.loading = true;
            state.view.reset();
            generation
        };

        if let Err(e) = self.store.set_item(&self.zip_key, &postal_code) {
            tracing::warn!("Could not persist last search: {}", e);
        }

        tracing::debug!("Search generation {} started for {}", generation, postal_code);
        Ok(SearchTicket {
            generation,
            postal_code,
        })
    }

    /// Applies the outcome of `ticket`'s search. Returns `false` when a newer
    /// search has started, in which case nothing changes.
    pub fn finish_search(&self, ticket: SearchTicket, outcome: Result<Vec<Listing>>) -> bool {
        let mut state = self.state.lock();

        let latest = self.generation.load(Ordering::SeqCst);
        if ticket.generation != latest {
            tracing::debug!(
                "Discarding result of search generation {} (latest is {})",
                ticket.generation,
                latest
            );
            return false;
        }

        state.loading = false;
        match outcome {
            Ok(listings) => {
                tracing::info!("📊 {} listings loaded", listings.len());
                state.listings = listings;
                state.error = None;
            }
            Err(e) => {
                tracing::error!(
                    "❌ Search failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                state.listings.clear();
                state.error = Some(e.user_friendly_message());
            }
        }
        true
    }

    /// Runs a complete search. Input validation errors are returned; fetch
    /// errors become the session's error message. The boolean reports whether
    /// the outcome was applied.
    pub async fn search<B, T, K>(&self, fetcher: &ListingFetcher<B, T, K>, input: &str) -> Result<bool>
    where
        B: SearchBackend,
        T: SessionStore,
        K: Clock,
    {
        let ticket = self.begin_search(input)?;
        let outcome = fetcher.fetch(ticket.postal_code()).await;
        Ok(self.finish_search(ticket, outcome))
    }

    /// Re-runs the restored search, if any.
    pub async fn resume<B, T, K>(&self, fetcher: &ListingFetcher<B, T, K>) -> Result<bool>
    where
        B: SearchBackend,
        T: SessionStore,
        K: Clock,
    {
        match self.postal_code() {
            Some(postal_code) => {
                tracing::info!("Resuming session search for ZIP code: {}", postal_code);
                self.search(fetcher, &postal_code).await
            }
            None => Ok(false),
        }
    }

    pub fn set_discount(&self, level: DiscountLevel) {
        self.state.lock().view.set_discount(level);
        match serde_json::to_string(&level) {
            Ok(raw) => {
                if let Err(e) = self.store.set_item(&self.discount_key, &raw) {
                    tracing::warn!("Could not persist discount: {}", e);
                }
            }
            Err(e) => tracing::warn!("Could not encode discount: {}", e),
        }
    }

    /// Uses `level` as the threshold unless the store already holds one.
    /// The fallback is not persisted, so a later stored choice wins.
    pub fn apply_default_discount(&self, level: DiscountLevel) -> bool {
        if self.store.get_item(&self.discount_key).is_some() {
            tracing::debug!("Keeping stored discount over configured default {}", level);
            return false;
        }
        self.state.lock().view.set_discount(level);
        true
    }

    pub fn load_more(&self) -> bool {
        let mut state = self.state.lock();
        let filtered_len = state.view.derive(&state.listings).filtered_count();
        state.view.load_more(filtered_len)
    }

    pub fn toggle_selection(&self, id: &str) {
        self.state.lock().view.toggle_selection(id);
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.lock();
        let view = state.view.derive(&state.listings);

        ViewSnapshot {
            postal_code: state.postal_code.clone(),
            discount: state.view.discount(),
            active_count: view.active_count,
            filtered_count: view.filtered_count(),
            visible: view.visible().iter().map(|l| (*l).clone()).collect(),
            selected: state.view.selected().map(str::to_string),
            has_more: view.has_more(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}
