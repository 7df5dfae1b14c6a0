use crate::models::{Profile, UserType};
use crate::onboarding::steps::Step;
use std::collections::BTreeMap;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Error key for failures that are not tied to one field
pub const SUBMIT: &str = "submit";

/// Per-field validation messages, keyed by the field's form name
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Editable onboarding inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Purpose,
    CustomPurpose,
    BusinessType,
    CustomBusinessType,
    GoogleMapsUrl,
    Linkedin,
    Instagram,
    Facebook,
    Name,
    BusinessName,
    Email,
    Password,
    ConfirmPassword,
}

impl FormField {
    /// Form name, also the key of this field's error
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Purpose => "purpose",
            FormField::CustomPurpose => "customPurpose",
            FormField::BusinessType => "businessType",
            FormField::CustomBusinessType => "customBusinessType",
            FormField::GoogleMapsUrl => "googleMapsUrl",
            FormField::Linkedin => "socialLinks.linkedin",
            FormField::Instagram => "socialLinks.instagram",
            FormField::Facebook => "socialLinks.facebook",
            FormField::Name => "name",
            FormField::BusinessName => "businessName",
            FormField::Email => "email",
            FormField::Password => "password",
            FormField::ConfirmPassword => "confirmPassword",
        }
    }
}

/// Everything entered so far. Credentials live beside the profile so they
/// never end up in a persisted draft.
#[derive(Debug, Clone, Default)]
pub struct OnboardingForm {
    pub profile: Profile,
    pub password: String,
    pub confirm_password: String,
}

impl OnboardingForm {
    pub fn new(user_type: UserType) -> Self {
        Self {
            profile: Profile {
                user_type: Some(user_type),
                ..Profile::default()
            },
            ..Self::default()
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        let p = &mut self.profile;
        match field {
            FormField::Purpose => p.purpose = value,
            FormField::CustomPurpose => p.custom_purpose = non_empty(value),
            FormField::BusinessType => p.business_type = value,
            FormField::CustomBusinessType => p.custom_business_type = non_empty(value),
            FormField::GoogleMapsUrl => {
                p.google_maps_url = non_empty(value);
                p.verified_business_data = None;
            }
            FormField::Linkedin => p.social_links.linkedin = value,
            FormField::Instagram => p.social_links.instagram = value,
            FormField::Facebook => p.social_links.facebook = value,
            FormField::Name => p.name = value,
            FormField::BusinessName => p.business_name = value,
            FormField::Email => p.email = value,
            FormField::Password => self.password = value,
            FormField::ConfirmPassword => self.confirm_password = value,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        let p = &self.profile;
        match field {
            FormField::Purpose => &p.purpose,
            FormField::CustomPurpose => p.custom_purpose.as_deref().unwrap_or_default(),
            FormField::BusinessType => &p.business_type,
            FormField::CustomBusinessType => p.custom_business_type.as_deref().unwrap_or_default(),
            FormField::GoogleMapsUrl => p.google_maps_url.as_deref().unwrap_or_default(),
            FormField::Linkedin => &p.social_links.linkedin,
            FormField::Instagram => &p.social_links.instagram,
            FormField::Facebook => &p.social_links.facebook,
            FormField::Name => &p.name,
            FormField::BusinessName => &p.business_name,
            FormField::Email => &p.email,
            FormField::Password => &self.password,
            FormField::ConfirmPassword => &self.confirm_password,
        }
    }

    /// Name sent to the auth provider: person name, else business name
    pub fn account_name(&self) -> &str {
        if self.profile.name.trim().is_empty() {
            &self.profile.business_name
        } else {
            &self.profile.name
        }
    }

    /// Errors for `step`; empty when the step may be left
    pub fn validate(&self, step: Step) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let p = &self.profile;
        match step {
            Step::Purpose => {
                if p.purpose.trim().is_empty() {
                    errors.insert(
                        FormField::Purpose.key(),
                        "Please tell us your purpose on the platform".to_string(),
                    );
                }
            }
            Step::BusinessType => {
                if p.business_type.trim().is_empty() {
                    errors.insert(
                        FormField::BusinessType.key(),
                        "Please select your business type".to_string(),
                    );
                }
            }
            Step::Account => {
                match p.user_type {
                    Some(UserType::Business) if p.business_name.trim().is_empty() => {
                        errors.insert(
                            FormField::BusinessName.key(),
                            "Business name is required".to_string(),
                        );
                    }
                    Some(UserType::Freelancer) if p.name.trim().is_empty() => {
                        errors.insert(FormField::Name.key(), "Name is required".to_string());
                    }
                    _ => {}
                }
                self.validate_credentials(&mut errors);
            }
            Step::MapVerification | Step::SocialLinks | Step::Success => {}
        }
        errors
    }

    fn validate_credentials(&self, errors: &mut FieldErrors) {
        let email = self.profile.email.trim();
        if email.is_empty() {
            errors.insert(FormField::Email.key(), "Email is required".to_string());
        } else if !is_valid_email(email) {
            errors.insert(FormField::Email.key(), "Please enter a valid email".to_string());
        }

        if self.password.is_empty() {
            errors.insert(FormField::Password.key(), "Password is required".to_string());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                FormField::Password.key(),
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }

        if self.password != self.confirm_password {
            errors.insert(
                FormField::ConfirmPassword.key(),
                "Passwords do not match".to_string(),
            );
        }
    }
}

/// Basic `local@domain.tld` shape: some run of non-blank characters holding
/// an `@` with text before it and a `.` with text on both sides after it
pub fn is_valid_email(email: &str) -> bool {
    email.split_whitespace().any(|token| {
        token.char_indices().any(|(i, c)| {
            c == '@' && i > 0 && {
                let domain = &token[i + 1..];
                domain
                    .char_indices()
                    .any(|(j, d)| d == '.' && j > 0 && j + 1 < domain.len())
            }
        })
    })
}

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_form(user_type: UserType) -> OnboardingForm {
        let mut form = OnboardingForm::new(user_type);
        form.set(FormField::Name, "Ada".to_string());
        form.set(FormField::BusinessName, "Corner Bakery".to_string());
        form.set(FormField::Email, "ada@example.com".to_string());
        form.set(FormField::Password, "secret1".to_string());
        form.set(FormField::ConfirmPassword, "secret1".to_string());
        form
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada@example."));
        assert!(!is_valid_email("ada example.com"));
    }

    #[test]
    fn test_complete_account_step_passes() {
        assert!(account_form(UserType::Freelancer).validate(Step::Account).is_empty());
        assert!(account_form(UserType::Business).validate(Step::Account).is_empty());
    }

    #[test]
    fn test_account_step_errors() {
        let mut form = account_form(UserType::Freelancer);
        form.set(FormField::Name, "  ".to_string());
        form.set(FormField::Email, "not-an-email".to_string());
        form.set(FormField::Password, "12345".to_string());

        let errors = form.validate(Step::Account);
        assert_eq!(errors["name"], "Name is required");
        assert_eq!(errors["email"], "Please enter a valid email");
        assert_eq!(errors["password"], "Password must be at least 6 characters");
        assert_eq!(errors["confirmPassword"], "Passwords do not match");
    }

    #[test]
    fn test_business_account_requires_business_name() {
        let mut form = account_form(UserType::Business);
        form.set(FormField::Name, String::new());
        form.set(FormField::BusinessName, String::new());

        let errors = form.validate(Step::Account);
        assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["businessName"]);
    }

    #[test]
    fn test_selection_steps() {
        let form = OnboardingForm::new(UserType::Business);
        assert!(form.validate(Step::BusinessType).contains_key("businessType"));
        assert!(form.validate(Step::Purpose).contains_key("purpose"));
        assert!(form.validate(Step::MapVerification).is_empty());
        assert!(form.validate(Step::SocialLinks).is_empty());
    }

    #[test]
    fn test_editing_maps_url_drops_stale_verification() {
        let mut form = OnboardingForm::new(UserType::Business);
        form.profile.verified_business_data = Some(crate::models::VerifiedBusinessData {
            place_id: "p".to_string(),
            name: "n".to_string(),
            address: None,
            phone: None,
            website: None,
            rating: None,
            verified_at: chrono::Utc::now(),
        });
        form.set(FormField::GoogleMapsUrl, "https://maps.google.com/?q=x".to_string());
        assert!(form.profile.verified_business_data.is_none());
    }

    #[test]
    fn test_account_name_falls_back_to_business_name() {
        let mut form = OnboardingForm::new(UserType::Business);
        form.set(FormField::BusinessName, "Corner Bakery".to_string());
        assert_eq!(form.account_name(), "Corner Bakery");
    }
}
