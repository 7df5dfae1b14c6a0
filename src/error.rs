use thiserror::Error;

/// Failure talking to the auth/profile backend
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Gateway is not configured: {0}")]
    NotConfigured(&'static str),
}

impl GatewayError {
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Provider {
            status,
            message: message.into(),
        }
    }

    /// Unique-constraint violation: HTTP 409 or Postgres code 23505
    pub fn is_conflict(&self) -> bool {
        match self {
            GatewayError::Provider { status, message } => {
                *status == 409 || message.contains("23505") || message.contains("duplicate key")
            }
            _ => false,
        }
    }
}

/// Failure of a saved-business operation
#[derive(Error, Debug)]
pub enum SavedBusinessError {
    #[error("Business already saved")]
    AlreadySaved,

    #[error("No signed-in user")]
    NoIdentity,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Failure of one location source
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location lookup failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failure of a place query against the maps provider
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Places status {0}")]
    Status(String),

    #[error("Maps API key is not configured")]
    MissingKey,
}

/// Failure that prevents a whole search from running
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search service unavailable: {0}")]
    Unavailable(String),
}
