use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Result counts the dashboard lets a user pick from
pub const MAX_RESULT_CHOICES: [usize; 3] = [50, 75, 100];

/// Timeouts and delays used across the search and onboarding flows
#[derive(Debug, Clone)]
pub struct Timings {
    pub high_accuracy: Duration,
    pub low_accuracy: Duration,
    pub ip_lookup: Duration,
    pub http: Duration,
    pub success_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            high_accuracy: Duration::from_secs(8),
            low_accuracy: Duration::from_secs(10),
            ip_lookup: Duration::from_secs(10),
            http: Duration::from_secs(30),
            success_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub storage_dir: PathBuf,
    pub session_ttl: chrono::Duration,
    pub search_radius_m: u32,
    pub max_results: usize,
    pub oauth_redirect: String,
    pub timings: Timings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            google_maps_api_key: None,
            storage_dir: PathBuf::from(".clientaimap"),
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            search_radius_m: 5000,
            max_results: 50,
            oauth_redirect: "http://localhost:3000/auth/callback".to_string(),
            timings: Timings::default(),
        }
    }
}

/// A configuration problem detected at load. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub key: &'static str,
    pub message: String,
    pub remediation: String,
}

impl Config {
    /// Load from the process environment, seeded from `.env` when present
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }

        let defaults = Self::default();
        Self {
            supabase_url: secret("SUPABASE_URL"),
            supabase_anon_key: secret("SUPABASE_ANON_KEY"),
            google_maps_api_key: secret("GOOGLE_MAPS_API_KEY"),
            storage_dir: PathBuf::from(try_load(
                "CLIENTAIMAP_STORAGE_DIR",
                defaults.storage_dir.display().to_string(),
            )),
            session_ttl: session_ttl(try_load::<i64>(
                "CLIENTAIMAP_SESSION_TTL_HOURS",
                DEFAULT_SESSION_TTL_HOURS,
            )),
            search_radius_m: try_load("CLIENTAIMAP_SEARCH_RADIUS_M", defaults.search_radius_m),
            max_results: normalize_max_results(try_load(
                "CLIENTAIMAP_MAX_RESULTS",
                defaults.max_results,
            )),
            oauth_redirect: try_load("CLIENTAIMAP_OAUTH_REDIRECT", defaults.oauth_redirect),
            timings: Timings::default(),
        }
    }

    /// Problems worth a persistent banner, with remediation text
    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.google_maps_api_key.is_none() {
            issues.push(ConfigIssue {
                key: "GOOGLE_MAPS_API_KEY",
                message: "Google Maps API key is not set; business search is disabled".to_string(),
                remediation: "Add GOOGLE_MAPS_API_KEY to your .env file and make sure the key has \
                              the Places API enabled and no referrer restriction blocking this host"
                    .to_string(),
            });
        }
        if self.supabase_url.is_none() || self.supabase_anon_key.is_none() {
            issues.push(ConfigIssue {
                key: "SUPABASE_URL",
                message: "Supabase project URL or anon key is not set; sign-up and saved \
                          businesses are unavailable"
                    .to_string(),
                remediation: "Set SUPABASE_URL and SUPABASE_ANON_KEY from your Supabase project's \
                              API settings"
                    .to_string(),
            });
        }

        issues
    }
}

/// Snap a requested result count to the nearest allowed choice
pub fn normalize_max_results(requested: usize) -> usize {
    if MAX_RESULT_CHOICES.contains(&requested) {
        requested
    } else {
        warn!("Unsupported result count {requested}, using {}", MAX_RESULT_CHOICES[0]);
        MAX_RESULT_CHOICES[0]
    }
}

/// Session window in hours; non-positive or unrepresentable values fall
/// back to the default
pub fn session_ttl(hours: i64) -> chrono::Duration {
    let ttl = (hours > 0)
        .then(|| chrono::Duration::try_hours(hours))
        .flatten();
    match ttl {
        Some(ttl) => ttl,
        None => {
            warn!(
                "Unsupported session TTL of {hours} hours, using {DEFAULT_SESSION_TTL_HOURS}"
            );
            chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS)
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secret(key: &str) -> Option<String> {
    let value = var(key);
    info!("{key}: {}", if value.is_some() { "set" } else { "not set" });
    value
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
    }
}
