use crate::models::UserType;

/// One screen of the onboarding flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Purpose,
    BusinessType,
    MapVerification,
    SocialLinks,
    Account,
    /// Terminal pseudo-step shown after the account exists
    Success,
}

const FREELANCER_TRACK: &[Step] = &[Step::Purpose, Step::SocialLinks, Step::Account];

const BUSINESS_TRACK: &[Step] = &[
    Step::BusinessType,
    Step::MapVerification,
    Step::SocialLinks,
    Step::Account,
];

/// Real steps of a track, without the terminal success step
pub fn track(user_type: UserType) -> &'static [Step] {
    match user_type {
        UserType::Freelancer => FREELANCER_TRACK,
        UserType::Business => BUSINESS_TRACK,
    }
}

/// Step at a 1-indexed position; anything past the track is [`Step::Success`]
pub fn step_at(user_type: UserType, position: usize) -> Step {
    let steps = track(user_type);
    match position.checked_sub(1).and_then(|i| steps.get(i)) {
        Some(step) => *step,
        None => Step::Success,
    }
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Purpose => "What brings you here?",
            Step::BusinessType => "What type of business are you?",
            Step::MapVerification => "Verify your business on Google Maps",
            Step::SocialLinks => "Connect your social profiles",
            Step::Account => "Create your account",
            Step::Success => "Account created",
        }
    }
}
