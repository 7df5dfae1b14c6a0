use crate::config::normalize_max_results;
use crate::error::{PlacesError, SearchError};
use crate::models::{BusinessListing, SearchFilters};
use crate::search::categories::build_queries;
use crate::search::map_layer::MapLayer;
use crate::search::scoring::digital_score;
use crate::search::traits::PlacesProvider;
use crate::search::types::{PlaceCandidate, SearchOrigin, SearchRequest, SearchStatus};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Result of one search invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Completed(Vec<BusinessListing>),
    /// A newer search started while this one was in flight; its results
    /// were discarded
    Superseded,
}

/// Dashboard business search: fan-out nearby queries, merge, enrich, score,
/// filter, and redraw the map layer it owns.
pub struct BusinessSearch {
    places: Arc<dyn PlacesProvider>,
    radius_m: u32,
    map: Mutex<MapLayer>,
    status: Mutex<SearchStatus>,
    latest: AtomicU64,
}

impl BusinessSearch {
    pub fn new(places: Arc<dyn PlacesProvider>, radius_m: u32) -> Self {
        Self {
            places,
            radius_m,
            map: Mutex::new(MapLayer::new()),
            status: Mutex::new(SearchStatus::Idle),
            latest: AtomicU64::new(0),
        }
    }

    /// Centre the owned map on a freshly resolved origin
    pub fn show_origin(&self, origin: &SearchOrigin) {
        self.map_layer().set_origin(origin);
    }

    /// Snapshot of the map layer
    pub fn map(&self) -> MapLayer {
        self.map_layer().clone()
    }

    pub fn status(&self) -> SearchStatus {
        self.status_slot().clone()
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_status(SearchStatus::Loading);
        info!("Starting business search #{}", token);

        let result = self.run(request).await;

        if self.latest.load(Ordering::SeqCst) != token {
            debug!("Search #{} superseded, discarding results", token);
            return Ok(SearchOutcome::Superseded);
        }

        match result {
            Ok(listings) => {
                {
                    let mut map = self.map_layer();
                    map.clear();
                    for listing in &listings {
                        map.add(listing);
                    }
                }
                info!("Search completed successfully with {} businesses", listings.len());
                self.set_status(SearchStatus::Ready(listings.len()));
                Ok(SearchOutcome::Completed(listings))
            }
            Err(e) => {
                error!("Error searching businesses: {}", e);
                self.map_layer().clear();
                self.set_status(SearchStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run(&self, request: &SearchRequest) -> Result<Vec<BusinessListing>, SearchError> {
        let queries = build_queries(&request.categories, request.custom_category.as_deref());
        debug!(
            "Searching for types: {:?}",
            queries.iter().map(|q| q.tag.as_str()).collect::<Vec<_>>()
        );

        let searches = queries.iter().map(|query| {
            self.places
                .nearby_search(request.origin, self.radius_m, query)
        });
        let pages = join_all(searches).await;

        let mut candidates = Vec::new();
        for (query, page) in queries.iter().zip(pages) {
            match page {
                Ok(results) => {
                    debug!("Found {} results for {}", results.len(), query.tag);
                    candidates.extend(results);
                }
                Err(PlacesError::MissingKey) => {
                    return Err(SearchError::Unavailable(PlacesError::MissingKey.to_string()));
                }
                Err(e) => warn!("No results for {}: {}", query.tag, e),
            }
        }

        let unique = dedupe(candidates);
        let limit = normalize_max_results(request.max_results);
        let limited: Vec<_> = unique.into_iter().take(limit).collect();
        info!("Processing {} businesses...", limited.len());

        let enriched = join_all(limited.into_iter().map(|c| self.enrich(c))).await;
        Ok(score_and_filter(enriched, &request.filters))
    }

    async fn enrich(&self, candidate: PlaceCandidate) -> BusinessListing {
        let mut listing = BusinessListing {
            id: candidate.place_id,
            name: candidate.name,
            address: candidate.vicinity,
            phone: None,
            website: None,
            rating: candidate.rating,
            photos: candidate.photo_reference.into_iter().collect(),
            location: candidate.location,
            digital_score: 0,
        };

        match self.places.place_details(&listing.id).await {
            Ok(details) => {
                listing.phone = details.formatted_phone_number;
                listing.website = details.website;
            }
            Err(e) => debug!("Details unavailable for {}: {}", listing.id, e),
        }
        listing
    }

    fn map_layer(&self) -> MutexGuard<'_, MapLayer> {
        self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn status_slot(&self) -> MutexGuard<'_, SearchStatus> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_status(&self, status: SearchStatus) {
        *self.status_slot() = status;
    }
}

/// Keep the first occurrence of each place id, in query order
pub fn dedupe(candidates: impl IntoIterator<Item = PlaceCandidate>) -> Vec<PlaceCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.place_id.clone()))
        .collect()
}

/// Attach digital scores, then apply the active filters
pub fn score_and_filter(
    listings: Vec<BusinessListing>,
    filters: &SearchFilters,
) -> Vec<BusinessListing> {
    let scored = listings
        .into_iter()
        .map(|mut listing| {
            listing.digital_score = digital_score(&listing);
            listing
        })
        .collect();
    filters.apply(scored)
}
