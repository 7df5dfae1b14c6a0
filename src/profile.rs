use crate::models::catalog::{business_type_label, purpose_label, OTHER};
use crate::models::{Profile, SocialLinks, UserType};
use crate::session::SessionStore;
use tracing::{info, warn};

/// Read-only summary shown on a dashboard's profile panel
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub title: &'static str,
    pub display_name: String,
    pub email: String,
    /// Purpose label for freelancers, business type label for businesses
    pub kind_label: String,
    pub description: Option<String>,
    pub social_links: Vec<(&'static str, String)>,
    pub verified: bool,
}

impl ProfileSummary {
    pub fn from_profile(profile: &Profile) -> Self {
        let (title, kind_label) = match profile.user_type {
            Some(UserType::Business) => (
                "Business Profile",
                choice_label(
                    business_type_label(&profile.business_type),
                    &profile.business_type,
                    profile.custom_business_type.as_deref(),
                ),
            ),
            _ => (
                "Freelancer Profile",
                choice_label(
                    purpose_label(&profile.purpose),
                    &profile.purpose,
                    profile.custom_purpose.as_deref(),
                ),
            ),
        };

        Self {
            title,
            display_name: profile.display_name().to_string(),
            email: profile.email.clone(),
            kind_label,
            description: profile
                .business_description
                .clone()
                .filter(|d| !d.trim().is_empty()),
            social_links: profile
                .social_links
                .entries()
                .into_iter()
                .map(|(platform, url)| (platform, url.to_string()))
                .collect(),
            verified: profile.verified_business_data.is_some(),
        }
    }
}

/// "Other" selections show the free text the user typed instead
fn choice_label(label: &str, id: &str, custom: Option<&str>) -> String {
    match custom.map(str::trim) {
        Some(text) if id == OTHER && !text.is_empty() => text.to_string(),
        _ => label.to_string(),
    }
}

/// Edits to the signed-in user's profile. Only the business description and
/// the social links may change after onboarding.
pub struct ProfileEditor {
    sessions: SessionStore,
}

impl ProfileEditor {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// The current profile, if a valid session exists
    pub async fn current(&self) -> Option<Profile> {
        self.sessions.get_valid_session().await?.user_data
    }

    pub async fn update_description(&self, description: &str) -> Option<Profile> {
        let mut profile = self.current().await?;
        if profile.user_type != Some(UserType::Business) {
            warn!("Only business profiles carry a description");
            return None;
        }
        let description = description.trim();
        profile.business_description =
            (!description.is_empty()).then(|| description.to_string());
        self.persist(profile).await
    }

    pub async fn update_social_links(&self, links: SocialLinks) -> Option<Profile> {
        let mut profile = self.current().await?;
        profile.social_links = SocialLinks {
            linkedin: links.linkedin.trim().to_string(),
            instagram: links.instagram.trim().to_string(),
            facebook: links.facebook.trim().to_string(),
        };
        self.persist(profile).await
    }

    async fn persist(&self, profile: Profile) -> Option<Profile> {
        let record = self.sessions.update_profile(profile).await?;
        info!("Profile updated");
        record.user_data
    }
}
