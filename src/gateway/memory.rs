use crate::error::GatewayError;
use crate::gateway::callback::session_from_callback;
use crate::gateway::traits::{AuthGateway, AuthOutcome, GatewayResult, ProfileGateway, SignUpMetadata};
use crate::models::{Identity, Profile, ProviderSession, SavedBusiness, VerifiedBusinessData};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<String, (String, Identity)>,
    session: Option<ProviderSession>,
    /// Access tokens this backend would accept, by owner
    issued: HashMap<String, Identity>,
    freelancers: Vec<Profile>,
    businesses: Vec<Profile>,
    saved: Vec<SavedBusiness>,
    verified: HashMap<String, VerifiedBusinessData>,
}

/// In-process backend for offline runs and tests.
///
/// Accounts are confirmed immediately, so sign-up always yields a session.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    next_id: AtomicU64,
    fail_profile_writes: AtomicBool,
    unavailable: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make freelancer/business inserts fail from now on
    pub fn fail_profile_writes(&self, fail: bool) {
        self.fail_profile_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every call fail as if the backend were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Pretend the provider holds a live session, as after an OAuth redirect
    pub fn set_live_session(&self, identity: Identity) -> GatewayResult<ProviderSession> {
        let mut tables = self.tables()?;
        let session = self.issue_session(&mut tables, &identity);
        tables.session = Some(session.clone());
        Ok(session)
    }

    /// Issue a valid session without making it live, as one held only by a
    /// redirect URL or a previous run's storage
    pub fn issue_detached_session(&self, identity: Identity) -> GatewayResult<ProviderSession> {
        let mut tables = self.tables()?;
        Ok(self.issue_session(&mut tables, &identity))
    }

    pub fn freelancer_count(&self) -> usize {
        self.tables().map(|t| t.freelancers.len()).unwrap_or(0)
    }

    pub fn business_count(&self) -> usize {
        self.tables().map(|t| t.businesses.len()).unwrap_or(0)
    }

    fn tables(&self) -> GatewayResult<MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::provider(503, "Service unavailable"));
        }
        self.tables
            .lock()
            .map_err(|_| GatewayError::Decode("memory gateway lock poisoned".to_string()))
    }

    fn issue_session(&self, tables: &mut Tables, identity: &Identity) -> ProviderSession {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let session = ProviderSession {
            access_token: format!("memory-token-{n}"),
            refresh_token: Some(format!("memory-refresh-{n}")),
            expires_in: Some(3600),
            user: Some(identity.clone()),
        };
        tables
            .issued
            .insert(session.access_token.clone(), identity.clone());
        session
    }

    /// Make `session` live when its token was issued here
    fn adopt(&self, session: &ProviderSession) -> GatewayResult<ProviderSession> {
        let mut tables = self.tables()?;
        let Some(identity) = tables.issued.get(&session.access_token).cloned() else {
            return Err(GatewayError::provider(401, "Invalid token"));
        };
        let live = ProviderSession {
            user: Some(identity),
            ..session.clone()
        };
        tables.session = Some(live.clone());
        Ok(live)
    }
}

#[async_trait]
impl AuthGateway for MemoryGateway {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> GatewayResult<AuthOutcome> {
        let mut tables = self.tables()?;
        let key = email.to_lowercase();
        if tables.accounts.contains_key(&key) {
            return Err(GatewayError::provider(422, "User already registered"));
        }

        let identity = Identity {
            id: format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            email: Some(email.to_string()),
            user_metadata: json!({
                "user_type": metadata.user_type.as_str(),
                "name": metadata.name,
            }),
        };
        let session = self.issue_session(&mut tables, &identity);
        tables
            .accounts
            .insert(key, (password.to_string(), identity.clone()));
        tables.session = Some(session.clone());
        debug!("Memory account created: {}", identity.id);

        Ok(AuthOutcome {
            identity,
            session: Some(session),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<AuthOutcome> {
        let mut tables = self.tables()?;
        let identity = match tables.accounts.get(&email.to_lowercase()) {
            Some((stored, identity)) if stored == password => identity.clone(),
            _ => return Err(GatewayError::provider(400, "Invalid login credentials")),
        };
        let session = self.issue_session(&mut tables, &identity);
        tables.session = Some(session.clone());
        Ok(AuthOutcome {
            identity,
            session: Some(session),
        })
    }

    async fn start_oauth(&self, provider: &str, redirect_to: &str) -> GatewayResult<String> {
        drop(self.tables()?);
        Ok(format!("memory://oauth/{provider}?redirect_to={redirect_to}"))
    }

    async fn restore_session(&self, session: &ProviderSession) -> GatewayResult<()> {
        self.adopt(session).map(|_| ())
    }

    async fn complete_oauth_callback(&self, callback_url: &str) -> GatewayResult<ProviderSession> {
        let session = session_from_callback(callback_url)?;
        let live = self.adopt(&session)?;
        debug!("Memory OAuth session adopted");
        Ok(live)
    }

    async fn current_session(&self) -> GatewayResult<Option<ProviderSession>> {
        Ok(self.tables()?.session.clone())
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        let mut tables = self.tables()?;
        if let Some(session) = tables.session.take() {
            tables.issued.remove(&session.access_token);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileGateway for MemoryGateway {
    async fn insert_freelancer(&self, profile: &Profile) -> GatewayResult<()> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::provider(500, "freelancers insert rejected"));
        }
        self.tables()?.freelancers.push(profile.clone());
        Ok(())
    }

    async fn insert_business(&self, profile: &Profile) -> GatewayResult<()> {
        if self.fail_profile_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::provider(500, "businesses insert rejected"));
        }
        self.tables()?.businesses.push(profile.clone());
        Ok(())
    }

    async fn list_saved(&self, user_id: &str) -> GatewayResult<Vec<SavedBusiness>> {
        let mut saved: Vec<_> = self
            .tables()?
            .saved
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saved)
    }

    async fn find_saved(
        &self,
        user_id: &str,
        business_id: &str,
    ) -> GatewayResult<Option<SavedBusiness>> {
        Ok(self
            .tables()?
            .saved
            .iter()
            .find(|s| s.user_id == user_id && s.business.id == business_id)
            .cloned())
    }

    async fn insert_saved(&self, saved: &SavedBusiness) -> GatewayResult<()> {
        let mut tables = self.tables()?;
        let exists = tables
            .saved
            .iter()
            .any(|s| s.user_id == saved.user_id && s.business.id == saved.business.id);
        if exists {
            // Mirrors the unique (user_id, business_id) constraint
            return Err(GatewayError::provider(409, "duplicate key value"));
        }
        tables.saved.push(saved.clone());
        Ok(())
    }

    async fn delete_saved(&self, user_id: &str, business_id: &str) -> GatewayResult<()> {
        self.tables()?
            .saved
            .retain(|s| !(s.user_id == user_id && s.business.id == business_id));
        Ok(())
    }

    async fn get_verified_business(
        &self,
        user_id: &str,
    ) -> GatewayResult<Option<VerifiedBusinessData>> {
        Ok(self.tables()?.verified.get(user_id).cloned())
    }

    async fn set_verified_business(
        &self,
        user_id: &str,
        data: &VerifiedBusinessData,
    ) -> GatewayResult<()> {
        self.tables()?
            .verified
            .insert(user_id.to_string(), data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserType;

    fn metadata() -> SignUpMetadata {
        SignUpMetadata {
            user_type: UserType::Freelancer,
            name: "Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let gateway = MemoryGateway::new();
        let created = gateway
            .sign_up("Ada@Example.com", "secret1", &metadata())
            .await
            .unwrap();
        assert!(created.session.is_some());

        let signed_in = gateway.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(signed_in.identity.id, created.identity.id);

        let wrong = gateway.sign_in("ada@example.com", "nope").await;
        assert!(wrong.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_rejected() {
        let gateway = MemoryGateway::new();
        gateway.sign_up("a@b.co", "secret1", &metadata()).await.unwrap();
        let err = gateway.sign_up("a@b.co", "secret1", &metadata()).await.unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_live_session() {
        let gateway = MemoryGateway::new();
        gateway.sign_up("a@b.co", "secret1", &metadata()).await.unwrap();
        assert!(gateway.current_session().await.unwrap().is_some());

        gateway.sign_out().await.unwrap();
        assert!(gateway.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_callback_adopts_only_issued_tokens() {
        let gateway = MemoryGateway::new();
        let identity = Identity {
            id: "user-g".to_string(),
            email: None,
            user_metadata: serde_json::Value::Null,
        };
        let issued = gateway.issue_detached_session(identity).unwrap();
        assert!(gateway.current_session().await.unwrap().is_none());

        let forged = gateway
            .complete_oauth_callback("http://localhost/cb#access_token=forged")
            .await;
        assert!(matches!(forged, Err(GatewayError::Provider { status: 401, .. })));

        let url = format!("http://localhost/cb#access_token={}", issued.access_token);
        let live = gateway.complete_oauth_callback(&url).await.unwrap();
        assert_eq!(live.user.unwrap().id, "user-g");
        assert!(gateway.current_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_signed_out_token_cannot_be_restored() {
        let gateway = MemoryGateway::new();
        let session = gateway
            .sign_up("a@b.co", "secret1", &metadata())
            .await
            .unwrap()
            .session
            .unwrap();
        gateway.sign_out().await.unwrap();

        assert!(gateway.restore_session(&session).await.is_err());
        assert!(gateway.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_backend_fails_every_call() {
        let gateway = MemoryGateway::new();
        gateway.set_unavailable(true);
        assert!(gateway.list_saved("u").await.is_err());
        assert!(gateway.current_session().await.is_err());
    }
}
