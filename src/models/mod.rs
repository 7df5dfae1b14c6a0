pub mod business;
pub mod catalog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use business::{BusinessListing, LatLng, SavedBusiness, SearchFilters};

/// Which side of the marketplace an account belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Freelancer,
    Business,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Freelancer => "freelancer",
            UserType::Business => "business",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "freelancer" => Some(UserType::Freelancer),
            "business" => Some(UserType::Business),
            _ => None,
        }
    }
}

/// Social profile URLs collected during onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
}

impl SocialLinks {
    /// Non-empty links as (platform, url) pairs
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("linkedin", self.linkedin.as_str()),
            ("instagram", self.instagram.as_str()),
            ("facebook", self.facebook.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .collect()
    }
}

/// Place details attached to a business during the map verification step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedBusinessData {
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub verified_at: DateTime<Utc>,
}

/// User profile, shared by both account types.
///
/// Freelancer-only fields (`purpose`, `custom_purpose`) and business-only
/// fields (`business_type` onwards) stay empty for the other variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub business_name: String,
    #[serde(default)]
    pub social_links: SocialLinks,

    #[serde(default)]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_purpose: Option<String>,

    #[serde(default)]
    pub business_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_business_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_business_data: Option<VerifiedBusinessData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_description: Option<String>,

    /// Provider identity id, filled in once the account exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

impl Profile {
    /// Person name for freelancers, business name for businesses
    pub fn display_name(&self) -> &str {
        match self.user_type {
            Some(UserType::Business) if !self.business_name.trim().is_empty() => {
                &self.business_name
            }
            _ if !self.name.trim().is_empty() => &self.name,
            _ => &self.business_name,
        }
    }

    /// Merge a freshly created provider identity into the profile
    pub fn with_identity(mut self, identity: &Identity) -> Self {
        self.id = Some(identity.id.clone());
        if let Some(email) = &identity.email {
            self.email = email.clone();
        }
        self.is_authenticated = true;
        self
    }
}

/// Opaque user identity returned by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub user_metadata: serde_json::Value,
}

/// Opaque provider session token bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<Identity>,
}

/// Locally persisted proof of authentication plus the cached profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub session: Option<ProviderSession>,
    #[serde(default)]
    pub user_data: Option<Profile>,
    /// Creation or last refresh instant, stored as epoch milliseconds
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(
        user: Option<Identity>,
        session: Option<ProviderSession>,
        user_data: Profile,
    ) -> Self {
        Self {
            user,
            session,
            user_data: Some(user_data),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.user_data.as_ref().and_then(|p| p.user_type)
    }
}
