use crate::models::{Identity, Profile, ProviderSession, SessionRecord};
use crate::session::repository::SessionRepository;
use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

/// Owner of the persisted session record.
///
/// Every method fails closed: storage errors are logged and read as
/// "no session", so callers always fall back to the unauthenticated view.
#[derive(Clone)]
pub struct SessionStore {
    repository: SessionRepository,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(repository: SessionRepository, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Write a fresh record stamped with the current time
    pub async fn create_session(
        &self,
        identity: Option<Identity>,
        session: Option<ProviderSession>,
        profile: Profile,
    ) -> SessionRecord {
        let record = SessionRecord::new(identity, session, profile);
        match self.repository.save(&record).await {
            Ok(()) => info!("Session stored for {:?}", record.user_type()),
            Err(e) => error!("Failed to store session: {:#}", e),
        }
        record
    }

    pub async fn is_valid(&self) -> bool {
        self.get_valid_session().await.is_some()
    }

    /// The stored record, only if it is still valid
    pub async fn get_valid_session(&self) -> Option<SessionRecord> {
        let record = match self.repository.load().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No stored session found");
                return None;
            }
            Err(e) => {
                warn!("Unreadable session record: {:#}", e);
                return None;
            }
        };

        let Some(timestamp) = record.timestamp else {
            debug!("Session missing timestamp");
            return None;
        };

        if Utc::now() - timestamp > self.ttl {
            info!("Session expired, removing from storage");
            if let Err(e) = self.repository.clear().await {
                warn!("Failed to purge expired session: {:#}", e);
            }
            return None;
        }

        if record.user_type().is_none() {
            debug!("Session profile has no user type");
            return None;
        }

        Some(record)
    }

    /// Replace identity and provider session of the stored record and bump
    /// its timestamp, keeping the cached profile
    pub async fn refresh(&self, identity: Identity, session: ProviderSession) -> Option<SessionRecord> {
        let existing = match self.repository.load().await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Unreadable session record during refresh: {:#}", e);
                None
            }
        };

        let mut record = existing.unwrap_or(SessionRecord {
            user: None,
            session: None,
            user_data: None,
            timestamp: None,
        });
        record.user = Some(identity);
        record.session = Some(session);
        record.timestamp = Some(Utc::now());

        match self.repository.save(&record).await {
            Ok(()) => Some(record),
            Err(e) => {
                error!("Failed to refresh session: {:#}", e);
                None
            }
        }
    }

    /// Swap the cached profile of a valid session
    pub async fn update_profile(&self, profile: Profile) -> Option<SessionRecord> {
        let mut record = self.get_valid_session().await?;
        record.user_data = Some(profile);
        record.timestamp = Some(Utc::now());

        match self.repository.save(&record).await {
            Ok(()) => Some(record),
            Err(e) => {
                error!("Failed to save edited profile: {:#}", e);
                None
            }
        }
    }

    /// Remove the record and any transient onboarding artifacts
    pub async fn destroy_session(&self) {
        let results = [
            self.repository.clear().await,
            self.repository.clear_draft().await,
            self.repository.clear_oauth_pending().await,
        ];
        for result in results {
            if let Err(e) = result {
                warn!("Failed to clear session storage: {:#}", e);
            }
        }
        info!("Session destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;
    use crate::session::repository::SESSION_KEY;
    use crate::session::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let kv = Arc::new(MemoryStore::new());
        let store = SessionStore::new(SessionRepository::new(kv.clone()), Duration::hours(24));
        (kv, store)
    }

    fn profile(user_type: Option<UserType>) -> Profile {
        Profile {
            user_type,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            ..Profile::default()
        }
    }

    fn identity() -> Identity {
        Identity {
            id: "user-1".to_string(),
            email: Some("ada@example.com".to_string()),
            user_metadata: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_fresh_session_is_valid() {
        let (_, store) = store();
        store
            .create_session(Some(identity()), None, profile(Some(UserType::Freelancer)))
            .await;

        assert!(store.is_valid().await);
        let record = store.get_valid_session().await.unwrap();
        assert_eq!(record.user.unwrap().id, "user-1");
    }

    #[tokio::test]
    async fn test_no_record_is_invalid() {
        let (_, store) = store();
        assert!(!store.is_valid().await);
        assert!(store.get_valid_session().await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_invalid_and_purged() {
        let (kv, store) = store();
        let mut record = SessionRecord::new(None, None, profile(Some(UserType::Business)));
        record.timestamp = Some(Utc::now() - Duration::hours(25));
        store.repository().save(&record).await.unwrap();

        assert!(!store.is_valid().await);
        assert!(kv.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_user_type_is_invalid_even_when_fresh() {
        let (kv, store) = store();
        store.create_session(Some(identity()), None, profile(None)).await;

        assert!(!store.is_valid().await);
        // Not expired, so the record is left in place
        assert!(kv.get(SESSION_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_timestamp_is_invalid() {
        let (kv, store) = store();
        kv.set(SESSION_KEY, r#"{"userData":{"userType":"freelancer"}}"#)
            .await
            .unwrap();
        assert!(!store.is_valid().await);
    }

    #[tokio::test]
    async fn test_unrecognized_user_type_is_invalid() {
        let (kv, store) = store();
        let ts = Utc::now().timestamp_millis();
        kv.set(
            SESSION_KEY,
            &format!(r#"{{"userData":{{"userType":"admin"}},"timestamp":{ts}}}"#),
        )
        .await
        .unwrap();
        assert!(!store.is_valid().await);
    }

    #[tokio::test]
    async fn test_corrupt_storage_reads_as_no_session() {
        let (kv, store) = store();
        kv.set(SESSION_KEY, "{{{").await.unwrap();
        assert!(store.get_valid_session().await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_keeps_profile_and_bumps_timestamp() {
        let (_, store) = store();
        let mut record = SessionRecord::new(None, None, profile(Some(UserType::Freelancer)));
        record.timestamp = Some(Utc::now() - Duration::hours(23));
        store.repository().save(&record).await.unwrap();

        let session = ProviderSession {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            user: None,
        };
        let refreshed = store.refresh(identity(), session).await.unwrap();

        assert_eq!(refreshed.user_data.unwrap().name, "Ada");
        assert!(Utc::now() - refreshed.timestamp.unwrap() < Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_destroy_session_removes_transient_artifacts() {
        let (_, store) = store();
        let draft = profile(Some(UserType::Business));
        store.repository().save_draft(&draft).await.unwrap();
        store.repository().mark_oauth_pending(UserType::Business).await.unwrap();
        store.create_session(None, None, draft).await;

        store.destroy_session().await;

        assert!(!store.is_valid().await);
        assert!(store.repository().load_draft().await.unwrap().is_none());
        assert!(store.repository().oauth_pending().await.unwrap().is_none());
    }
}
