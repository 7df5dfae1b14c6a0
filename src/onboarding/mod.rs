pub mod flow;
pub mod form;
pub mod steps;

pub use flow::{NextOutcome, OnboardingFlow, OnboardingServices};
pub use form::{FieldErrors, FormField, OnboardingForm};
pub use steps::Step;
