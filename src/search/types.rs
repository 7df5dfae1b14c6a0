use crate::models::{LatLng, SearchFilters};
use serde::{Deserialize, Serialize};

/// Device geolocation accuracy profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    High,
    Low,
}

/// Where a search origin came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OriginSource {
    HighAccuracy,
    LowAccuracy,
    IpLookup,
    Default,
}

/// Resolved centre for nearby searches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchOrigin {
    pub location: LatLng,
    pub source: OriginSource,
}

impl SearchOrigin {
    /// Only a high-accuracy fix counts as the user's actual position
    pub fn is_precise(&self) -> bool {
        self.source == OriginSource::HighAccuracy
    }
}

/// One nearby-search query sent to the places provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    /// Tag the user selected, used in logs
    pub tag: String,
    pub place_type: Option<String>,
    pub keyword: String,
}

/// Raw nearby-search hit before enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub vicinity: Option<String>,
    pub rating: Option<f64>,
    /// First photo reference; never a keyed URL
    pub photo_reference: Option<String>,
    pub location: LatLng,
}

/// Contact detail fields from a place details lookup
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Parameters of one dashboard search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: LatLng,
    /// Selected category tags; empty means "any establishment"
    pub categories: Vec<String>,
    pub custom_category: Option<String>,
    pub max_results: usize,
    pub filters: SearchFilters,
}

impl SearchRequest {
    pub fn new(origin: LatLng) -> Self {
        Self {
            origin,
            categories: Vec::new(),
            custom_category: None,
            max_results: 50,
            filters: SearchFilters::default(),
        }
    }
}

/// Dashboard-facing state of the search component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Ready(usize),
    Failed(String),
}
