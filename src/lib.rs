pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod onboarding;
pub mod profile;
pub mod saved;
pub mod search;
pub mod session;

pub use app::{AppShell, View};
pub use config::Config;
