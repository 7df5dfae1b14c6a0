use crate::config::Timings;
use crate::gateway::{AuthGateway, ProfileGateway, SignUpMetadata};
use crate::models::{Profile, UserType};
use crate::onboarding::form::{FieldErrors, FormField, OnboardingForm, SUBMIT};
use crate::onboarding::steps::{self, Step};
use crate::search::BusinessVerifier;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const GOOGLE_PROVIDER: &str = "google";

/// Result of pressing "next"
#[derive(Debug, Clone, PartialEq)]
pub enum NextOutcome {
    /// Validation failed; see [`OnboardingFlow::errors`]
    Blocked,
    Advanced(Step),
    /// Account creation failed with a `submit` error; the form is untouched
    SubmitFailed,
    /// Account created and session written
    Completed(Profile),
}

/// Services the flow talks to
#[derive(Clone)]
pub struct OnboardingServices {
    pub auth: Arc<dyn AuthGateway>,
    pub profiles: Arc<dyn ProfileGateway>,
    pub sessions: SessionStore,
    pub verifier: Option<Arc<dyn BusinessVerifier>>,
    pub oauth_redirect: String,
    pub success_delay: Duration,
}

impl OnboardingServices {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        profiles: Arc<dyn ProfileGateway>,
        sessions: SessionStore,
        timings: &Timings,
    ) -> Self {
        Self {
            auth,
            profiles,
            sessions,
            verifier: None,
            oauth_redirect: String::new(),
            success_delay: timings.success_delay,
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn BusinessVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_oauth_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.oauth_redirect = redirect.into();
        self
    }
}

/// Step-gated sign-up for one account type
pub struct OnboardingFlow {
    user_type: UserType,
    current_step: usize,
    form: OnboardingForm,
    errors: FieldErrors,
    services: OnboardingServices,
}

impl OnboardingFlow {
    pub fn new(user_type: UserType, services: OnboardingServices) -> Self {
        Self {
            user_type,
            current_step: 1,
            form: OnboardingForm::new(user_type),
            errors: FieldErrors::new(),
            services,
        }
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// 1-indexed position; `total_steps() + 1` is the success screen
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        steps::track(self.user_type).len()
    }

    pub fn step(&self) -> Step {
        steps::step_at(self.user_type, self.current_step)
    }

    pub fn form(&self) -> &OnboardingForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Edit one input and drop its pending error
    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value.into());
        self.errors.remove(field.key());
    }

    /// Validate the current step, replacing the error map
    pub fn validate_step(&mut self) -> bool {
        self.errors = self.form.validate(self.step());
        self.errors.is_empty()
    }

    pub async fn next(&mut self) -> NextOutcome {
        let step = self.step();
        if step == Step::Success {
            return NextOutcome::Advanced(step);
        }
        if !self.validate_step() {
            debug!("Step {:?} blocked by {} errors", step, self.errors.len());
            return NextOutcome::Blocked;
        }
        if self.current_step == self.total_steps() {
            return self.submit().await;
        }

        self.current_step += 1;
        debug!("Onboarding moved to step {}", self.current_step);
        NextOutcome::Advanced(self.step())
    }

    /// Step back without touching entered data. No-op on the first and
    /// the success step.
    pub fn previous(&mut self) -> Step {
        if self.current_step > 1 && self.step() != Step::Success {
            self.current_step -= 1;
        }
        self.step()
    }

    /// Resolve the entered Google Maps link. Failure is recorded on the
    /// link field and never blocks the flow.
    pub async fn verify_business(&mut self) -> bool {
        let key = FormField::GoogleMapsUrl.key();
        let Some(url) = self.form.profile.google_maps_url.clone() else {
            self.errors
                .insert(key, "Please enter your Google Maps link".to_string());
            return false;
        };
        let Some(verifier) = self.services.verifier.clone() else {
            self.errors
                .insert(key, "Business verification is not available".to_string());
            return false;
        };

        match verifier.verify(&url).await {
            Ok(data) => {
                info!("Business verified: {}", data.name);
                self.form.profile.verified_business_data = Some(data);
                self.errors.remove(key);
                true
            }
            Err(e) => {
                warn!("Business verification failed: {}", e);
                self.errors
                    .insert(key, format!("Could not verify business: {e}"));
                false
            }
        }
    }

    /// Store the partial profile and the pending-OAuth marker, then return
    /// the provider URL to send the user to. On failure the markers are
    /// cleared again and a `submit` error is set.
    pub async fn start_google_sign_up(&mut self) -> Option<String> {
        let mut draft = self.form.profile.clone();
        draft.name = self.form.account_name().to_string();
        draft.is_authenticated = true;

        let repository = self.services.sessions.repository();
        let stored = match repository.save_draft(&draft).await {
            Ok(()) => repository.mark_oauth_pending(self.user_type).await,
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            error!("Failed to store OAuth draft: {:#}", e);
            return self
                .fail_google("Failed to sign up with Google. Please try again.".to_string())
                .await;
        }

        let started = self
            .services
            .auth
            .start_oauth(GOOGLE_PROVIDER, &self.services.oauth_redirect)
            .await;
        match started {
            Ok(url) => {
                info!("Google OAuth initiated for {}", self.user_type.as_str());
                Some(url)
            }
            Err(e) => self.fail_google(format!("Google sign up failed: {e}")).await,
        }
    }

    async fn fail_google(&mut self, message: String) -> Option<String> {
        warn!("{}", message);
        if let Err(e) = self.services.sessions.repository().clear_oauth_pending().await {
            warn!("Failed to clear OAuth marker: {:#}", e);
        }
        self.errors = FieldErrors::from([(SUBMIT, message)]);
        None
    }

    async fn submit(&mut self) -> NextOutcome {
        let services = self.services.clone();

        if let Err(e) = services.sessions.repository().save_draft(&self.form.profile).await {
            warn!("Failed to store onboarding draft: {:#}", e);
        }

        let metadata = SignUpMetadata {
            user_type: self.user_type,
            name: self.form.account_name().to_string(),
        };
        let created = services
            .auth
            .sign_up(self.form.profile.email.trim(), &self.form.password, &metadata)
            .await;
        let outcome = match created {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error creating account: {}", e);
                self.errors =
                    FieldErrors::from([(SUBMIT, format!("Failed to create account: {e}"))]);
                return NextOutcome::SubmitFailed;
            }
        };
        info!("Account created: {}", outcome.identity.id);

        let profile = self.form.profile.clone().with_identity(&outcome.identity);
        self.save_profile_record(&profile).await;

        services
            .sessions
            .create_session(Some(outcome.identity), outcome.session, profile.clone())
            .await;

        self.errors.clear();
        self.current_step = self.total_steps() + 1;
        tokio::time::sleep(services.success_delay).await;

        info!("Onboarding complete for {}", profile.display_name());
        NextOutcome::Completed(profile)
    }

    /// Profile table writes are best-effort; the account already exists
    async fn save_profile_record(&self, profile: &Profile) {
        let profiles = &self.services.profiles;
        let saved = match self.user_type {
            UserType::Freelancer => profiles.insert_freelancer(profile).await,
            UserType::Business => profiles.insert_business(profile).await,
        };
        if let Err(e) = saved {
            warn!("Profile data save failed: {}", e);
        }

        if let (Some(id), Some(data)) = (&profile.id, &profile.verified_business_data) {
            if let Err(e) = profiles.set_verified_business(id, data).await {
                warn!("Verified business save failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlacesError;
    use crate::gateway::MemoryGateway;
    use crate::models::VerifiedBusinessData;
    use crate::session::{MemoryStore, SessionRepository};
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedVerifier;

    #[async_trait]
    impl BusinessVerifier for FixedVerifier {
        async fn verify(&self, maps_url: &str) -> Result<VerifiedBusinessData, PlacesError> {
            if !maps_url.contains("bakery") {
                return Err(PlacesError::Status("ZERO_RESULTS".to_string()));
            }
            Ok(VerifiedBusinessData {
                place_id: "ChIJbakery".to_string(),
                name: "Corner Bakery".to_string(),
                address: Some("12 Main St".to_string()),
                phone: None,
                website: None,
                rating: Some(4.4),
                verified_at: Utc::now(),
            })
        }
    }

    fn setup(user_type: UserType) -> (Arc<MemoryGateway>, SessionStore, OnboardingFlow) {
        let gateway = Arc::new(MemoryGateway::new());
        let sessions = SessionStore::new(
            SessionRepository::new(Arc::new(MemoryStore::new())),
            chrono::Duration::hours(24),
        );
        let timings = Timings {
            success_delay: Duration::from_millis(1),
            ..Timings::default()
        };
        let services =
            OnboardingServices::new(gateway.clone(), gateway.clone(), sessions.clone(), &timings)
                .with_verifier(Arc::new(FixedVerifier))
                .with_oauth_redirect("http://localhost/callback");
        (gateway, sessions, OnboardingFlow::new(user_type, services))
    }

    fn fill_account(flow: &mut OnboardingFlow) {
        flow.update_field(FormField::Name, "Ada");
        flow.update_field(FormField::BusinessName, "Corner Bakery");
        flow.update_field(FormField::Email, "ada@example.com");
        flow.update_field(FormField::Password, "secret1");
        flow.update_field(FormField::ConfirmPassword, "secret1");
    }

    #[tokio::test]
    async fn test_blocked_step_stays_put() {
        let (_, _, mut flow) = setup(UserType::Freelancer);
        assert_eq!(flow.next().await, NextOutcome::Blocked);
        assert_eq!(flow.current_step(), 1);
        assert!(flow.error("purpose").is_some());
    }

    #[tokio::test]
    async fn test_update_field_clears_its_error() {
        let (_, _, mut flow) = setup(UserType::Freelancer);
        flow.next().await;
        flow.update_field(FormField::Purpose, "find-work");
        assert!(flow.error("purpose").is_none());
    }

    #[tokio::test]
    async fn test_back_navigation_preserves_values() {
        let (_, _, mut flow) = setup(UserType::Business);
        flow.update_field(FormField::BusinessType, "small-business");
        flow.next().await;
        flow.update_field(FormField::GoogleMapsUrl, "https://maps.google.com/?q=bakery");
        flow.next().await;
        flow.update_field(FormField::Linkedin, "https://linkedin.com/company/bakery");
        assert_eq!(flow.next().await, NextOutcome::Advanced(Step::Account));
        assert_eq!(flow.current_step(), 4);

        assert_eq!(flow.previous(), Step::SocialLinks);
        assert_eq!(flow.previous(), Step::MapVerification);
        assert_eq!(flow.next().await, NextOutcome::Advanced(Step::SocialLinks));

        let form = flow.form();
        assert_eq!(form.get(FormField::BusinessType), "small-business");
        assert_eq!(form.get(FormField::GoogleMapsUrl), "https://maps.google.com/?q=bakery");
        assert_eq!(form.get(FormField::Linkedin), "https://linkedin.com/company/bakery");
    }

    #[tokio::test]
    async fn test_previous_is_blocked_at_first_step() {
        let (_, _, mut flow) = setup(UserType::Freelancer);
        assert_eq!(flow.previous(), Step::Purpose);
        assert_eq!(flow.current_step(), 1);
    }

    #[tokio::test]
    async fn test_freelancer_submission() {
        let (gateway, sessions, mut flow) = setup(UserType::Freelancer);
        flow.update_field(FormField::Purpose, "find-work");
        flow.next().await;
        flow.next().await;
        fill_account(&mut flow);

        let NextOutcome::Completed(profile) = flow.next().await else {
            panic!("expected completion");
        };
        assert!(profile.is_authenticated);
        assert!(profile.id.is_some());
        assert_eq!(flow.step(), Step::Success);
        assert_eq!(gateway.freelancer_count(), 1);

        let record = sessions.get_valid_session().await.unwrap();
        assert_eq!(record.user_type(), Some(UserType::Freelancer));
        assert!(record.session.is_some());

        // Draft never carries the password
        let draft = sessions.repository().load_draft().await.unwrap().unwrap();
        assert_eq!(draft.email, "ada@example.com");
        assert!(!serde_json::to_string(&draft).unwrap().contains("secret1"));

        assert_eq!(flow.previous(), Step::Success);
    }

    #[tokio::test]
    async fn test_business_submission_keeps_verification() {
        let (gateway, _, mut flow) = setup(UserType::Business);
        flow.update_field(FormField::BusinessType, "small-business");
        flow.next().await;
        flow.update_field(FormField::GoogleMapsUrl, "https://maps.google.com/?q=bakery");
        assert!(flow.verify_business().await);
        flow.next().await;
        flow.next().await;
        fill_account(&mut flow);

        let NextOutcome::Completed(profile) = flow.next().await else {
            panic!("expected completion");
        };
        assert_eq!(profile.verified_business_data.unwrap().place_id, "ChIJbakery");
        assert_eq!(gateway.business_count(), 1);
        let id = profile.id.unwrap();
        assert!(gateway.get_verified_business(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_verification_does_not_block() {
        let (_, _, mut flow) = setup(UserType::Business);
        flow.update_field(FormField::BusinessType, "agency");
        flow.next().await;
        flow.update_field(FormField::GoogleMapsUrl, "https://maps.google.com/?q=nowhere");

        assert!(!flow.verify_business().await);
        assert!(flow.error("googleMapsUrl").is_some());
        assert_eq!(flow.next().await, NextOutcome::Advanced(Step::SocialLinks));
    }

    #[tokio::test]
    async fn test_sign_up_failure_sets_single_submit_error() {
        let (gateway, sessions, mut flow) = setup(UserType::Freelancer);
        flow.update_field(FormField::Purpose, "find-work");
        flow.next().await;
        flow.next().await;
        fill_account(&mut flow);
        gateway.set_unavailable(true);

        assert_eq!(flow.next().await, NextOutcome::SubmitFailed);
        assert_eq!(flow.errors().len(), 1);
        assert!(flow.error("submit").unwrap().starts_with("Failed to create account:"));
        assert_eq!(flow.current_step(), 3);
        assert_eq!(flow.form().get(FormField::Email), "ada@example.com");
        assert!(!sessions.is_valid().await);
    }

    #[tokio::test]
    async fn test_profile_write_failure_still_completes() {
        let (gateway, sessions, mut flow) = setup(UserType::Freelancer);
        gateway.fail_profile_writes(true);
        flow.update_field(FormField::Purpose, "find-work");
        flow.next().await;
        flow.next().await;
        fill_account(&mut flow);

        assert!(matches!(flow.next().await, NextOutcome::Completed(_)));
        assert_eq!(gateway.freelancer_count(), 0);
        assert!(sessions.is_valid().await);
    }

    #[tokio::test]
    async fn test_google_sign_up_marks_pending() {
        let (_, sessions, mut flow) = setup(UserType::Business);
        flow.update_field(FormField::BusinessType, "startup");
        flow.update_field(FormField::BusinessName, "Rocket Labs");

        let url = flow.start_google_sign_up().await.unwrap();
        assert!(url.contains("google"));

        let repo = sessions.repository();
        assert_eq!(repo.oauth_pending().await.unwrap(), Some(UserType::Business));
        let draft = repo.load_draft().await.unwrap().unwrap();
        assert_eq!(draft.name, "Rocket Labs");
        assert!(draft.is_authenticated);
    }

    #[tokio::test]
    async fn test_google_sign_up_failure_clears_marker() {
        let (gateway, sessions, mut flow) = setup(UserType::Freelancer);
        // Storage still works, only the provider is down
        let repo = sessions.repository().clone();
        gateway.set_unavailable(true);

        assert!(flow.start_google_sign_up().await.is_none());
        assert!(flow.error("submit").unwrap().starts_with("Google sign up failed"));
        assert!(repo.oauth_pending().await.unwrap().is_none());
    }
}
