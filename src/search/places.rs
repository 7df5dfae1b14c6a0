use crate::error::PlacesError;
use crate::models::LatLng;
use crate::search::traits::PlacesProvider;
use crate::search::types::{CategoryQuery, PlaceCandidate, PlaceDetails};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const PLACES_BASE: &str = "https://maps.googleapis.com/maps/api/place";
const DETAIL_FIELDS: &str = "name,formatted_address,formatted_phone_number,website,url,rating";

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: String,
    name: String,
    #[serde(default)]
    vicinity: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    photos: Vec<Photo>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    candidates: Vec<FindPlaceCandidate>,
}

#[derive(Debug, Deserialize)]
struct FindPlaceCandidate {
    place_id: String,
}

/// Google Places web service client
pub struct GooglePlacesClient {
    client: Client,
    api_key: Option<String>,
}

impl GooglePlacesClient {
    /// A missing key is allowed; every call then fails with
    /// [`PlacesError::MissingKey`]
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, api_key })
    }

    fn key(&self) -> Result<&str, PlacesError> {
        self.api_key.as_deref().ok_or(PlacesError::MissingKey)
    }

    /// Display URL for a stored photo reference. Carries the API key, so
    /// it is built at render time and never stored.
    pub fn photo_url(&self, reference: &str) -> Option<String> {
        let key = self.api_key.as_deref()?;
        Some(format!(
            "{PLACES_BASE}/photo?maxwidth=400&maxheight=300&photo_reference={reference}&key={key}"
        ))
    }
}

fn to_candidate(result: NearbyResult) -> PlaceCandidate {
    PlaceCandidate {
        photo_reference: result.photos.into_iter().next().map(|p| p.photo_reference),
        place_id: result.place_id,
        name: result.name,
        vicinity: result.vicinity,
        rating: result.rating,
        location: result.geometry.location,
    }
}

/// `ZERO_RESULTS` is a valid empty page; anything else but `OK` is an error
fn check_status(status: &str, message: Option<&str>) -> Result<bool, PlacesError> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        other => {
            let detail = match message {
                Some(m) => format!("{other}: {m}"),
                None => other.to_string(),
            };
            Err(PlacesError::Status(detail))
        }
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn nearby_search(
        &self,
        origin: LatLng,
        radius_m: u32,
        query: &CategoryQuery,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let key = self.key()?;
        let mut params = vec![
            ("location", format!("{},{}", origin.lat, origin.lng)),
            ("radius", radius_m.to_string()),
            ("keyword", query.keyword.clone()),
            ("key", key.to_string()),
        ];
        if let Some(place_type) = &query.place_type {
            params.push(("type", place_type.clone()));
        }

        debug!("Nearby search for {}", query.tag);
        let response: NearbyResponse = self
            .client
            .get(format!("{PLACES_BASE}/nearbysearch/json"))
            .query(&params)
            .send()
            .await?
            .json()
            .await?;

        if !check_status(&response.status, response.error_message.as_deref())? {
            return Ok(Vec::new());
        }

        Ok(response.results.into_iter().map(to_candidate).collect())
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let key = self.key()?;
        let response: DetailsResponse = self
            .client
            .get(format!("{PLACES_BASE}/details/json"))
            .query(&[("place_id", place_id), ("fields", DETAIL_FIELDS), ("key", key)])
            .send()
            .await?
            .json()
            .await?;

        if !check_status(&response.status, response.error_message.as_deref())? {
            return Err(PlacesError::Status("ZERO_RESULTS".to_string()));
        }
        response
            .result
            .ok_or_else(|| PlacesError::Status("details without result".to_string()))
    }

    async fn find_place(&self, text: &str) -> Result<Option<String>, PlacesError> {
        let key = self.key()?;
        let response: FindPlaceResponse = self
            .client
            .get(format!("{PLACES_BASE}/findplacefromtext/json"))
            .query(&[
                ("input", text),
                ("inputtype", "textquery"),
                ("fields", "place_id"),
                ("key", key),
            ])
            .send()
            .await?
            .json()
            .await?;

        if !check_status(&response.status, None)? {
            info!("No place matches '{}'", text);
            return Ok(None);
        }
        if response.candidates.len() > 1 {
            warn!("{} places match '{}', using the first", response.candidates.len(), text);
        }
        Ok(response.candidates.into_iter().next().map(|c| c.place_id))
    }

    fn provider_name(&self) -> &'static str {
        "Google Places"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_response_parses() {
        let json = r#"{
            "status": "OK",
            "results": [{
                "place_id": "ChIJ1",
                "name": "Corner Bakery",
                "vicinity": "12 Main St",
                "rating": 4.6,
                "photos": [{"photo_reference": "ref-1", "height": 1, "width": 1}],
                "geometry": {"location": {"lat": 40.7, "lng": -74.0}}
            }]
        }"#;
        let parsed: NearbyResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].photos[0].photo_reference, "ref-1");
        assert_eq!(parsed.results[0].geometry.location, LatLng::new(40.7, -74.0));
    }

    #[test]
    fn test_candidate_keeps_photo_reference_without_key() {
        let json = r#"{
            "place_id": "ChIJ2",
            "name": "Main St Gym",
            "photos": [
                {"photo_reference": "ref-a"},
                {"photo_reference": "ref-b"}
            ],
            "geometry": {"location": {"lat": 40.7, "lng": -74.0}}
        }"#;
        let result: NearbyResult = serde_json::from_str(json).unwrap();
        let candidate = to_candidate(result);
        assert_eq!(candidate.photo_reference.as_deref(), Some("ref-a"));
    }

    #[test]
    fn test_photo_url_needs_key() {
        let keyless = GooglePlacesClient::new(None, Duration::from_secs(1)).unwrap();
        assert_eq!(keyless.photo_url("ref-a"), None);

        let keyed =
            GooglePlacesClient::new(Some("k123".to_string()), Duration::from_secs(1)).unwrap();
        let url = keyed.photo_url("ref-a").unwrap();
        assert!(url.contains("photo_reference=ref-a"));
        assert!(url.ends_with("key=k123"));
    }

    #[test]
    fn test_status_handling() {
        assert!(check_status("OK", None).unwrap());
        assert!(!check_status("ZERO_RESULTS", None).unwrap());
        let err = check_status("REQUEST_DENIED", Some("API key not authorized")).unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED: API key not authorized"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = GooglePlacesClient::new(None, Duration::from_secs(1)).unwrap();
        let query = CategoryQuery {
            tag: "cafe".to_string(),
            place_type: Some("cafe".to_string()),
            keyword: "cafe".to_string(),
        };
        let result = client.nearby_search(LatLng::new(0.0, 0.0), 5000, &query).await;
        assert!(matches!(result, Err(PlacesError::MissingKey)));
    }
}
