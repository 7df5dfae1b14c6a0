use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Geographic coordinate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A business found by a nearby search, enriched and scored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessListing {
    /// Place identifier issued by the maps provider
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    /// Provider photo references, resolved to URLs only for display
    #[serde(default)]
    pub photos: Vec<String>,
    pub location: LatLng,
    #[serde(default)]
    pub digital_score: u8,
}

impl BusinessListing {
    pub fn has_website(&self) -> bool {
        present(&self.website)
    }

    pub fn has_phone(&self) -> bool {
        present(&self.phone)
    }

    pub fn has_address(&self) -> bool {
        present(&self.address)
    }

    /// Google search link for the business's social media presence
    pub fn social_search_url(&self) -> Option<String> {
        let query = format!(
            "{} {} social media",
            self.name,
            self.address.as_deref().unwrap_or("")
        );
        Url::parse_with_params("https://www.google.com/search", &[("q", query)])
            .ok()
            .map(String::from)
    }
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().map_or(false, |v| !v.trim().is_empty())
}

/// A bookmarked business snapshot owned by one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedBusiness {
    pub user_id: String,
    pub business: BusinessListing,
    pub saved_at: DateTime<Utc>,
}

/// Independent boolean predicates applied conjunctively to search results
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub has_website: bool,
    pub has_phone: bool,
    pub has_address: bool,
}

impl SearchFilters {
    pub fn matches(&self, listing: &BusinessListing) -> bool {
        (!self.has_website || listing.has_website())
            && (!self.has_phone || listing.has_phone())
            && (!self.has_address || listing.has_address())
    }

    pub fn apply(&self, listings: Vec<BusinessListing>) -> Vec<BusinessListing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, website: bool, phone: bool, address: bool) -> BusinessListing {
        BusinessListing {
            id: id.to_string(),
            name: format!("Business {}", id),
            address: address.then(|| "1 Main St".to_string()),
            phone: phone.then(|| "+1 555 0100".to_string()),
            website: website.then(|| "https://example.com".to_string()),
            rating: None,
            photos: vec![],
            location: LatLng::new(40.0, -74.0),
            digital_score: 0,
        }
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let filters = SearchFilters {
            has_website: true,
            has_phone: true,
            has_address: false,
        };
        let results = filters.apply(vec![
            listing("a", true, true, false),
            listing("b", true, false, true),
            listing("c", false, true, true),
            listing("d", true, true, true),
        ]);

        let ids: Vec<_> = results.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert!(results.iter().all(|l| l.has_website() && l.has_phone()));
    }

    #[test]
    fn test_default_filters_keep_everything() {
        let results = SearchFilters::default().apply(vec![
            listing("a", false, false, false),
            listing("b", true, true, true),
        ]);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_blank_fields_do_not_count_as_present() {
        let mut l = listing("a", false, false, false);
        l.website = Some("   ".to_string());
        assert!(!l.has_website());
    }

    #[test]
    fn test_social_search_url_encodes_query() {
        let url = listing("a", false, false, true).social_search_url().unwrap();
        assert!(url.starts_with("https://www.google.com/search?q="));
        assert!(url.contains("Business+a+1+Main+St+social+media"));
    }
}
