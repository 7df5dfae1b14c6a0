use crate::error::{LocationError, PlacesError};
use crate::models::LatLng;
use crate::search::types::{Accuracy, CategoryQuery, PlaceCandidate, PlaceDetails};
use async_trait::async_trait;

/// Position fix from the host device
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn locate(&self, accuracy: Accuracy) -> Result<LatLng, LocationError>;
}

/// Coarse position from the client's public IP
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn locate(&self) -> Result<LatLng, LocationError>;
}

/// Nearby search and place details from a maps provider.
/// Implement this to plug in another provider.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// One provider page of candidates around `origin`
    async fn nearby_search(
        &self,
        origin: LatLng,
        radius_m: u32,
        query: &CategoryQuery,
    ) -> Result<Vec<PlaceCandidate>, PlacesError>;

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;

    /// Place id of the best match for a free-text query
    async fn find_place(&self, text: &str) -> Result<Option<String>, PlacesError>;

    fn provider_name(&self) -> &'static str;
}
