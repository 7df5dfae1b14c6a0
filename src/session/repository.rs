use crate::models::{Profile, SessionRecord, UserType};
use crate::session::storage::KeyValueStore;
use anyhow::{Context, Result};
use std::sync::Arc;

pub const SESSION_KEY: &str = "clientaimap_session";
pub const DRAFT_KEY: &str = "clientaimap_userdata";
pub const OAUTH_PENDING_KEY: &str = "clientaimap_oauth_pending";
pub const OAUTH_USER_TYPE_KEY: &str = "clientaimap_oauth_usertype";

/// Typed access to the persisted session blob and its companion keys.
///
/// The storage medium sits behind [`KeyValueStore`]; callers only see
/// records, drafts and the pending-OAuth marker.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<SessionRecord>> {
        self.load_json(SESSION_KEY).await
    }

    pub async fn save(&self, record: &SessionRecord) -> Result<()> {
        self.save_json(SESSION_KEY, record).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(SESSION_KEY).await
    }

    /// Raw onboarding form data kept for sign-in and OAuth resume
    pub async fn load_draft(&self) -> Result<Option<Profile>> {
        self.load_json(DRAFT_KEY).await
    }

    pub async fn save_draft(&self, draft: &Profile) -> Result<()> {
        self.save_json(DRAFT_KEY, draft).await
    }

    pub async fn clear_draft(&self) -> Result<()> {
        self.store.remove(DRAFT_KEY).await
    }

    /// User type of an OAuth sign-up that left for the provider, if any
    pub async fn oauth_pending(&self) -> Result<Option<UserType>> {
        let pending = self.store.get(OAUTH_PENDING_KEY).await?;
        if pending.as_deref() != Some("true") {
            return Ok(None);
        }
        let user_type = self.store.get(OAUTH_USER_TYPE_KEY).await?;
        Ok(user_type.as_deref().and_then(UserType::parse))
    }

    pub async fn mark_oauth_pending(&self, user_type: UserType) -> Result<()> {
        self.store.set(OAUTH_PENDING_KEY, "true").await?;
        self.store
            .set(OAUTH_USER_TYPE_KEY, user_type.as_str())
            .await
    }

    pub async fn clear_oauth_pending(&self) -> Result<()> {
        self.store.remove(OAUTH_PENDING_KEY).await?;
        self.store.remove(OAUTH_USER_TYPE_KEY).await
    }

    async fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .with_context(|| format!("Corrupt value under {key}")),
        }
    }

    async fn save_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize value for {key}"))?;
        self.store.set(key, &json).await
    }
}
