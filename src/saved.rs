use crate::error::SavedBusinessError;
use crate::gateway::ProfileGateway;
use crate::models::{BusinessListing, SavedBusiness};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-user bookmark list backed by the profile gateway
pub struct SavedBusinessStore {
    gateway: Arc<dyn ProfileGateway>,
}

impl SavedBusinessStore {
    pub fn new(gateway: Arc<dyn ProfileGateway>) -> Self {
        Self { gateway }
    }

    /// Bookmarks, newest first. Missing identity or a failing backend
    /// yields an empty list.
    pub async fn list(&self, user_id: Option<&str>) -> Vec<SavedBusiness> {
        let Some(user_id) = user_id else {
            return Vec::new();
        };
        match self.gateway.list_saved(user_id).await {
            Ok(mut saved) => {
                saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
                info!("Loaded {} saved businesses", saved.len());
                saved
            }
            Err(e) => {
                warn!("Failed to load saved businesses: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn save(
        &self,
        user_id: Option<&str>,
        listing: &BusinessListing,
    ) -> Result<SavedBusiness, SavedBusinessError> {
        let user_id = user_id.ok_or(SavedBusinessError::NoIdentity)?;

        if self.gateway.find_saved(user_id, &listing.id).await?.is_some() {
            return Err(SavedBusinessError::AlreadySaved);
        }

        let saved = SavedBusiness {
            user_id: user_id.to_string(),
            business: listing.clone(),
            saved_at: Utc::now(),
        };
        match self.gateway.insert_saved(&saved).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                info!("Business {} saved concurrently", listing.id);
                return Err(SavedBusinessError::AlreadySaved);
            }
            Err(e) => return Err(e.into()),
        }
        info!("Business saved: {}", listing.name);
        Ok(saved)
    }

    /// Absent bookmarks are removed successfully
    pub async fn remove(
        &self,
        user_id: Option<&str>,
        business_id: &str,
    ) -> Result<(), SavedBusinessError> {
        let user_id = user_id.ok_or(SavedBusinessError::NoIdentity)?;
        self.gateway.delete_saved(user_id, business_id).await?;
        info!("Business removed from saved list: {}", business_id);
        Ok(())
    }

    /// Remove when saved, save otherwise. Returns whether the business is
    /// saved afterwards.
    pub async fn toggle(
        &self,
        user_id: Option<&str>,
        listing: &BusinessListing,
    ) -> Result<bool, SavedBusinessError> {
        match self.save(user_id, listing).await {
            Ok(_) => Ok(true),
            Err(SavedBusinessError::AlreadySaved) => {
                self.remove(user_id, &listing.id).await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
