use crate::error::GatewayError;
use crate::models::{Identity, Profile, UserType};
use crate::onboarding::{OnboardingFlow, OnboardingServices};
use crate::session::SessionStore;
use tracing::{debug, error, info, warn};

/// Top-level screen the shell is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    FreelancerDashboard,
    BusinessDashboard,
}

impl View {
    pub fn dashboard_for(user_type: UserType) -> Self {
        match user_type {
            UserType::Freelancer => View::FreelancerDashboard,
            UserType::Business => View::BusinessDashboard,
        }
    }
}

/// Routes between landing, onboarding and the dashboards, and owns the
/// signed-in profile.
pub struct AppShell {
    services: OnboardingServices,
    view: View,
    profile: Option<Profile>,
}

impl AppShell {
    pub fn new(services: OnboardingServices) -> Self {
        Self {
            services,
            view: View::Landing,
            profile: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.services.sessions
    }

    /// Pick the first view: a pending OAuth sign-up is completed first,
    /// then a valid stored session opens its dashboard, otherwise landing
    pub async fn resolve_start_view(&mut self) -> View {
        if let Some(profile) = self.resume_oauth().await {
            return self.enter(profile);
        }

        let Some(record) = self.sessions().get_valid_session().await else {
            info!("No valid session found, showing landing page");
            return self.leave();
        };

        if let Some(session) = &record.session {
            if let Err(e) = self.services.auth.restore_session(session).await {
                warn!("Stored provider session not restored: {}", e);
            }
        }

        let mut profile = record.user_data.unwrap_or_default();
        if let Ok(Some(live)) = self.services.auth.current_session().await {
            if let Some(identity) = live.user.clone() {
                if let Some(refreshed) = self.sessions().refresh(identity, live).await {
                    profile = refreshed.user_data.unwrap_or(profile);
                }
            }
        }

        info!("Valid session found, restoring {}", profile.display_name());
        self.enter(profile)
    }

    /// Entry point for the OAuth redirect: adopt the session its URL
    /// carries, then resolve the start view as on any launch
    pub async fn handle_oauth_callback(&mut self, callback_url: &str) -> View {
        match self.services.auth.complete_oauth_callback(callback_url).await {
            Ok(_) => info!("OAuth callback accepted"),
            Err(e) => warn!("OAuth callback rejected: {}", e),
        }
        self.resolve_start_view().await
    }

    async fn resume_oauth(&self) -> Option<Profile> {
        let repository = self.sessions().repository();
        let pending = match repository.oauth_pending().await {
            Ok(Some(pending)) => pending,
            Ok(None) => return None,
            Err(e) => {
                warn!("Unreadable OAuth marker: {:#}", e);
                return None;
            }
        };

        debug!("Handling OAuth callback for {}", pending.as_str());
        let resumed = self.complete_oauth(pending).await;
        if let Err(e) = repository.clear_oauth_pending().await {
            warn!("Failed to clear OAuth marker: {:#}", e);
        }
        resumed
    }

    async fn complete_oauth(&self, pending: UserType) -> Option<Profile> {
        let draft = match self.sessions().repository().load_draft().await {
            Ok(Some(draft)) => draft,
            Ok(None) => {
                warn!("OAuth marker without stored onboarding data");
                return None;
            }
            Err(e) => {
                error!("Error reading OAuth onboarding data: {:#}", e);
                return None;
            }
        };

        let session = match self.services.auth.current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("No provider session after OAuth redirect");
                return None;
            }
            Err(e) => {
                error!("Error handling OAuth callback: {}", e);
                return None;
            }
        };
        let Some(identity) = session.user.clone() else {
            warn!("Provider session carries no user");
            return None;
        };

        let mut profile = draft.with_identity(&identity);
        profile.user_type = profile.user_type.or(Some(pending));
        self.sessions()
            .create_session(Some(identity), Some(session), profile.clone())
            .await;
        info!("OAuth sign-up completed");
        Some(profile)
    }

    pub fn start_onboarding(&self, user_type: UserType) -> OnboardingFlow {
        OnboardingFlow::new(user_type, self.services.clone())
    }

    /// Accept the profile an onboarding flow completed with
    pub async fn complete_onboarding(&mut self, completed: Profile) -> View {
        if completed.user_type.is_none() {
            error!("Completed onboarding without a user type");
            return self.leave();
        }

        let record = self.sessions().get_valid_session().await;
        let (identity, session) = match record {
            Some(r) => (r.user, r.session),
            None => (None, None),
        };
        self.sessions()
            .create_session(identity, session, completed.clone())
            .await;
        self.enter(completed)
    }

    /// Credential sign-in. The stored onboarding draft, when present,
    /// supplies the profile.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<View, GatewayError> {
        let outcome = self.services.auth.sign_in(email.trim(), password).await?;

        let draft = match self.sessions().repository().load_draft().await {
            Ok(draft) => draft.unwrap_or_default(),
            Err(e) => {
                warn!("Unreadable onboarding draft: {:#}", e);
                Profile::default()
            }
        };
        let mut profile = draft.with_identity(&outcome.identity);
        profile.user_type = profile
            .user_type
            .or_else(|| metadata_user_type(&outcome.identity));

        self.sessions()
            .create_session(Some(outcome.identity), outcome.session, profile.clone())
            .await;

        match profile.user_type {
            Some(_) => Ok(self.enter(profile)),
            None => {
                warn!("Signed-in account has no user type");
                Ok(self.leave())
            }
        }
    }

    /// Provider sign-out is best-effort; local state is always cleared
    pub async fn logout(&mut self) -> View {
        if let Err(e) = self.services.auth.sign_out().await {
            error!("Error during logout: {}", e);
        }
        self.sessions().destroy_session().await;
        self.leave()
    }

    fn enter(&mut self, profile: Profile) -> View {
        self.view = match profile.user_type {
            Some(user_type) => View::dashboard_for(user_type),
            None => View::Landing,
        };
        self.profile = Some(profile);
        self.view
    }

    fn leave(&mut self) -> View {
        self.profile = None;
        self.view = View::Landing;
        self.view
    }
}

fn metadata_user_type(identity: &Identity) -> Option<UserType> {
    identity
        .user_metadata
        .get("user_type")
        .and_then(|v| v.as_str())
        .and_then(UserType::parse)
}
