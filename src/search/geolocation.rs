use crate::config::Timings;
use crate::error::LocationError;
use crate::models::LatLng;
use crate::search::traits::{DeviceLocator, IpLocator};
use crate::search::types::{Accuracy, OriginSource, SearchOrigin};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Used when every location source fails (New York City)
pub const DEFAULT_ORIGIN: LatLng = LatLng::new(40.7128, -74.0060);

/// Resolves a search origin by trying each source in turn:
/// high-accuracy device fix, low-accuracy device fix, IP lookup, default.
pub struct OriginResolver {
    device: Arc<dyn DeviceLocator>,
    ip: Arc<dyn IpLocator>,
    timings: Timings,
    fallback: LatLng,
}

impl OriginResolver {
    pub fn new(device: Arc<dyn DeviceLocator>, ip: Arc<dyn IpLocator>, timings: Timings) -> Self {
        Self {
            device,
            ip,
            timings,
            fallback: DEFAULT_ORIGIN,
        }
    }

    pub fn with_fallback(mut self, fallback: LatLng) -> Self {
        self.fallback = fallback;
        self
    }

    pub async fn resolve(&self) -> SearchOrigin {
        info!("Attempting automatic location detection...");

        let high = attempt(
            "High accuracy geolocation",
            self.timings.high_accuracy,
            self.device.locate(Accuracy::High),
        );
        if let Some(location) = high.await {
            return SearchOrigin {
                location,
                source: OriginSource::HighAccuracy,
            };
        }

        let low = attempt(
            "Low accuracy geolocation",
            self.timings.low_accuracy,
            self.device.locate(Accuracy::Low),
        );
        if let Some(location) = low.await {
            return SearchOrigin {
                location,
                source: OriginSource::LowAccuracy,
            };
        }

        let ip = attempt("IP location", self.timings.ip_lookup, self.ip.locate());
        if let Some(location) = ip.await {
            return SearchOrigin {
                location,
                source: OriginSource::IpLookup,
            };
        }

        warn!("All location detection methods failed, using default location");
        SearchOrigin {
            location: self.fallback,
            source: OriginSource::Default,
        }
    }
}

async fn attempt<F>(name: &'static str, limit: Duration, lookup: F) -> Option<LatLng>
where
    F: Future<Output = Result<LatLng, LocationError>>,
{
    match timeout(limit, lookup).await {
        Ok(Ok(location)) => {
            info!("{} success: {:?}", name, location);
            Some(location)
        }
        Ok(Err(e)) => {
            warn!("{} failed: {}", name, e);
            None
        }
        Err(_) => {
            warn!("{}", LocationError::Timeout(name));
            None
        }
    }
}

/// Device locator for hosts without a positioning API
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDeviceLocation;

#[async_trait]
impl DeviceLocator for NoDeviceLocation {
    async fn locate(&self, _accuracy: Accuracy) -> Result<LatLng, LocationError> {
        Err(LocationError::Unavailable(
            "Geolocation not supported".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
}

/// IP geolocation through ipapi.co
pub struct IpApiLocator {
    client: Client,
    url: String,
}

impl IpApiLocator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: "https://ipapi.co/json/".to_string(),
        })
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn locate(&self) -> Result<LatLng, LocationError> {
        info!("Trying IP-based location...");
        let data: IpApiResponse = self.client.get(&self.url).send().await?.json().await?;

        match (data.latitude, data.longitude) {
            (Some(lat), Some(lng)) => {
                info!(
                    "IP location found: {}, {}",
                    data.city.as_deref().unwrap_or("?"),
                    data.country_name.as_deref().unwrap_or("?")
                );
                Ok(LatLng::new(lat, lng))
            }
            _ => Err(LocationError::Unavailable(
                "No location data from IP service".to_string(),
            )),
        }
    }
}
