use crate::models::{BusinessListing, LatLng};
use crate::search::scoring::ScoreBand;
use crate::search::types::SearchOrigin;
use serde::Serialize;

const USER_MARKER_COLOR: &str = "#3B82F6";

/// Content of the panel opened when a business marker is activated
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InfoPanel {
    pub name: String,
    pub address: String,
    pub score: u8,
    pub band: &'static str,
    pub color: &'static str,
    pub rating: Option<f64>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    /// `None` for the user's own position
    pub business_id: Option<String>,
    pub position: LatLng,
    pub title: String,
    pub color: &'static str,
    pub info: Option<InfoPanel>,
}

/// Markers currently drawn on the dashboard map
#[derive(Debug, Clone, Default, Serialize)]
pub struct MapLayer {
    center: Option<LatLng>,
    user_marker: Option<Marker>,
    markers: Vec<Marker>,
}

impl MapLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Centre the map on the search origin; a precise fix also gets a
    /// "Your Current Location" marker
    pub fn set_origin(&mut self, origin: &SearchOrigin) {
        self.center = Some(origin.location);
        self.user_marker = origin.is_precise().then(|| Marker {
            business_id: None,
            position: origin.location,
            title: "Your Current Location".to_string(),
            color: USER_MARKER_COLOR,
            info: None,
        });
    }

    /// Drop every business marker
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn add(&mut self, listing: &BusinessListing) {
        let band = ScoreBand::from_score(listing.digital_score);
        self.markers.push(Marker {
            business_id: Some(listing.id.clone()),
            position: listing.location,
            title: format!("{} (Score: {})", listing.name, listing.digital_score),
            color: band.color(),
            info: Some(InfoPanel {
                name: listing.name.clone(),
                address: listing
                    .address
                    .clone()
                    .unwrap_or_else(|| "Address not available".to_string()),
                score: listing.digital_score,
                band: band.label(),
                color: band.color(),
                rating: listing.rating,
                website: listing.website.clone(),
            }),
        });
    }

    /// Panel for the marker of `business_id`, as opened on click
    pub fn open_info(&self, business_id: &str) -> Option<&InfoPanel> {
        self.markers
            .iter()
            .find(|m| m.business_id.as_deref() == Some(business_id))
            .and_then(|m| m.info.as_ref())
    }

    pub fn center(&self) -> Option<LatLng> {
        self.center
    }

    pub fn user_marker(&self) -> Option<&Marker> {
        self.user_marker.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}
