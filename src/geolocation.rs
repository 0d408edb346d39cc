//! Host geolocation capability.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::config::Settings;
use crate::error::GeolocationError;
use crate::models::IpLocationResponse;

pub const DETECTING_MESSAGE: &str = "Detecting your location...";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Something that can tell where the user is.
pub trait Geolocator: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

impl GeolocationError {
    /// One-line status shown to the user.
    pub fn status_message(&self) -> String {
        match self {
            GeolocationError::Unsupported => {
                "Geolocation is not supported in this environment.".to_string()
            }
            other => format!("Unable to access your location: {}.", other),
        }
    }
}

/// A host without any positioning capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedGeolocator;

impl Geolocator for UnsupportedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Approximates the user's position from their public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    url: String,
    timeout: Duration,
}

impl IpGeolocator {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    async fn lookup(&self) -> Result<Coordinates, GeolocationError> {
        let unavailable = |e: reqwest::Error| GeolocationError::Unavailable(e.to_string());

        let response = self.client.get(&self.url).send().await.map_err(unavailable)?;
        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GeolocationError::Denied);
        }
        if !status.is_success() {
            return Err(GeolocationError::Unavailable(format!(
                "lookup failed with status {}",
                status
            )));
        }

        let body = response
            .json::<IpLocationResponse>()
            .await
            .map_err(unavailable)?;
        if body.error {
            return Err(GeolocationError::Unavailable(
                body.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }
        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(GeolocationError::Unavailable(
                "no coordinates in response".to_string(),
            )),
        }
    }
}

impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        tokio::time::timeout(self.timeout, self.lookup())
            .await
            .map_err(|_| GeolocationError::Timeout)?
    }
}

/// The geolocator the server runs with, chosen from settings.
#[derive(Debug, Clone)]
pub enum HostGeolocator {
    Ip(IpGeolocator),
    Unsupported(UnsupportedGeolocator),
}

impl HostGeolocator {
    pub fn from_settings(settings: &Settings, client: Client) -> Self {
        if settings.geolocation_enabled {
            HostGeolocator::Ip(IpGeolocator::new(
                client,
                settings.ip_geolocation_url.clone(),
                settings.geolocation_timeout(),
            ))
        } else {
            HostGeolocator::Unsupported(UnsupportedGeolocator)
        }
    }
}

impl Geolocator for HostGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        match self {
            HostGeolocator::Ip(inner) => inner.locate().await,
            HostGeolocator::Unsupported(inner) => inner.locate().await,
        }
    }
}
