use crate::error::GatewayError;
use crate::models::{Identity, Profile, ProviderSession, SavedBusiness, UserType, VerifiedBusinessData};
use async_trait::async_trait;
use serde::Serialize;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Metadata attached to a new account
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SignUpMetadata {
    pub user_type: UserType,
    pub name: String,
}

/// Identity plus provider session returned by sign-up and sign-in.
///
/// `session` is `None` when the provider still requires email confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub identity: Identity,
    pub session: Option<ProviderSession>,
}

/// Account lifecycle at the authentication provider
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> GatewayResult<AuthOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<AuthOutcome>;

    /// URL the user must be sent to for an OAuth sign-in with `provider`
    async fn start_oauth(&self, provider: &str, redirect_to: &str) -> GatewayResult<String>;

    /// Adopt a session persisted by an earlier run so later calls carry it
    async fn restore_session(&self, session: &ProviderSession) -> GatewayResult<()>;

    /// Adopt the session carried by an OAuth redirect URL
    async fn complete_oauth_callback(&self, callback_url: &str) -> GatewayResult<ProviderSession>;

    /// The provider's current live session, if any
    async fn current_session(&self) -> GatewayResult<Option<ProviderSession>>;

    async fn sign_out(&self) -> GatewayResult<()>;
}

/// Profile and bookmark tables at the backend
#[async_trait]
pub trait ProfileGateway: Send + Sync {
    async fn insert_freelancer(&self, profile: &Profile) -> GatewayResult<()>;

    async fn insert_business(&self, profile: &Profile) -> GatewayResult<()>;

    /// Bookmarks of `user_id`, most recently saved first
    async fn list_saved(&self, user_id: &str) -> GatewayResult<Vec<SavedBusiness>>;

    async fn find_saved(
        &self,
        user_id: &str,
        business_id: &str,
    ) -> GatewayResult<Option<SavedBusiness>>;

    async fn insert_saved(&self, saved: &SavedBusiness) -> GatewayResult<()>;

    /// Deleting an absent bookmark succeeds
    async fn delete_saved(&self, user_id: &str, business_id: &str) -> GatewayResult<()>;

    async fn get_verified_business(
        &self,
        user_id: &str,
    ) -> GatewayResult<Option<VerifiedBusinessData>>;

    async fn set_verified_business(
        &self,
        user_id: &str,
        data: &VerifiedBusinessData,
    ) -> GatewayResult<()>;
}
