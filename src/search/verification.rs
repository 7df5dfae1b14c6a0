use crate::error::PlacesError;
use crate::models::VerifiedBusinessData;
use crate::search::traits::PlacesProvider;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;
use std::sync::Arc;
use tracing::info;

/// Confirms that a Google Maps link points at a real business
#[async_trait]
pub trait BusinessVerifier: Send + Sync {
    async fn verify(&self, maps_url: &str) -> Result<VerifiedBusinessData, PlacesError>;
}

/// [`BusinessVerifier`] backed by a places provider's details lookup
pub struct PlacesVerifier {
    places: Arc<dyn PlacesProvider>,
}

impl PlacesVerifier {
    pub fn new(places: Arc<dyn PlacesProvider>) -> Self {
        Self { places }
    }
}

#[async_trait]
impl BusinessVerifier for PlacesVerifier {
    async fn verify(&self, maps_url: &str) -> Result<VerifiedBusinessData, PlacesError> {
        verify_business(self.places.as_ref(), maps_url).await
    }
}

/// What a Google Maps link tells us about the place it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapsReference {
    PlaceId(String),
    Text(String),
}

/// Extract a place id, or failing that a searchable name, from a maps link.
///
/// Handles `?place_id=`, `?query_place_id=`, `?q=`/`?query=` and
/// `/maps/place/<name>/...` forms.
pub fn parse_maps_url(maps_url: &str) -> Option<MapsReference> {
    let url = Url::parse(maps_url.trim()).ok()?;

    let mut text = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "place_id" | "query_place_id" if !value.is_empty() => {
                return Some(MapsReference::PlaceId(value.into_owned()));
            }
            "q" | "query" if !value.trim().is_empty() => {
                text = Some(value.trim().to_string());
            }
            _ => {}
        }
    }
    if text.is_some() {
        return text.map(MapsReference::Text);
    }

    let mut segments = url.path_segments()?;
    segments.find(|s| *s == "place")?;
    let name = segments.next()?.replace('+', " ");
    let name = name.trim();
    (!name.is_empty()).then(|| MapsReference::Text(name.to_string()))
}

/// Resolve a Google Maps link to verified business details
pub async fn verify_business(
    places: &dyn PlacesProvider,
    maps_url: &str,
) -> Result<VerifiedBusinessData, PlacesError> {
    let place_id = match parse_maps_url(maps_url) {
        Some(MapsReference::PlaceId(id)) => id,
        Some(MapsReference::Text(text)) => places
            .find_place(&text)
            .await?
            .ok_or_else(|| PlacesError::Status(format!("No place found for '{text}'")))?,
        None => {
            return Err(PlacesError::Status(
                "Not a recognizable Google Maps link".to_string(),
            ))
        }
    };

    let details = places.place_details(&place_id).await?;
    info!("Verified business {} via {}", place_id, places.provider_name());

    Ok(VerifiedBusinessData {
        name: details.name.unwrap_or_default(),
        address: details.formatted_address,
        phone: details.formatted_phone_number,
        website: details.website,
        rating: details.rating,
        place_id,
        verified_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatLng;
    use crate::search::types::{CategoryQuery, PlaceCandidate, PlaceDetails};

    struct OnePlace;

    #[async_trait]
    impl PlacesProvider for OnePlace {
        async fn nearby_search(
            &self,
            _origin: LatLng,
            _radius_m: u32,
            _query: &CategoryQuery,
        ) -> Result<Vec<PlaceCandidate>, PlacesError> {
            Ok(Vec::new())
        }

        async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
            if place_id != "ChIJbakery" {
                return Err(PlacesError::Status("NOT_FOUND".to_string()));
            }
            Ok(PlaceDetails {
                name: Some("Corner Bakery".to_string()),
                formatted_phone_number: Some("+1 555 0100".to_string()),
                rating: Some(4.5),
                ..PlaceDetails::default()
            })
        }

        async fn find_place(&self, text: &str) -> Result<Option<String>, PlacesError> {
            Ok((text == "Corner Bakery").then(|| "ChIJbakery".to_string()))
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    #[test]
    fn test_place_id_param() {
        assert_eq!(
            parse_maps_url("https://www.google.com/maps/search/?api=1&query=Bakery&query_place_id=ChIJabc"),
            Some(MapsReference::PlaceId("ChIJabc".to_string()))
        );
    }

    #[test]
    fn test_query_param() {
        assert_eq!(
            parse_maps_url("https://maps.google.com/?q=Corner+Bakery+NYC"),
            Some(MapsReference::Text("Corner Bakery NYC".to_string()))
        );
    }

    #[test]
    fn test_place_path() {
        assert_eq!(
            parse_maps_url("https://www.google.com/maps/place/Corner+Bakery/@40.7,-74.0,17z"),
            Some(MapsReference::Text("Corner Bakery".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_links() {
        assert_eq!(parse_maps_url("not a url"), None);
        assert_eq!(parse_maps_url("https://www.google.com/maps/@40.7,-74.0,17z"), None);
    }

    #[tokio::test]
    async fn test_verify_by_name_lookup() {
        let verifier = PlacesVerifier::new(Arc::new(OnePlace));
        let data = verifier
            .verify("https://www.google.com/maps/place/Corner+Bakery/@40.7,-74.0,17z")
            .await
            .unwrap();
        assert_eq!(data.place_id, "ChIJbakery");
        assert_eq!(data.name, "Corner Bakery");
        assert_eq!(data.phone.as_deref(), Some("+1 555 0100"));
    }

    #[tokio::test]
    async fn test_verify_unknown_place_fails() {
        let verifier = PlacesVerifier::new(Arc::new(OnePlace));
        assert!(verifier
            .verify("https://maps.google.com/?q=Nowhere")
            .await
            .is_err());
        assert!(verifier.verify("not a url").await.is_err());
    }
}
