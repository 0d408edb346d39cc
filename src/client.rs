//! HTTP access to the weather, geocoding and border-geometry services.

use std::future::Future;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Settings;
use crate::constants::{
    AIR_QUALITY_FIELDS, CURRENT_FIELDS, DAILY_FIELDS, FORECAST_DAYS, GEOCODING_RESULT_COUNT,
    HOURLY_FIELDS,
};
use crate::error::FetchError;
use crate::models::{
    AirQualityResponse, FeatureCollection, ForecastResponse, GeocodingResponse, Place,
    ReverseGeocodeResponse,
};
use crate::overlay::OverlayData;
use crate::units::UnitPreferences;

/// The external services the dashboard consumes. Every call is a single
/// attempt; callers decide what a failure means.
pub trait WeatherApi: Send + Sync {
    /// Geocoding search by name. No match is an empty list, not an error.
    fn search_locations(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Place>, FetchError>> + Send;

    /// Current, hourly and 7-day forecast in the requested units.
    fn forecast(
        &self,
        place: &Place,
        units: UnitPreferences,
    ) -> impl Future<Output = Result<ForecastResponse, FetchError>> + Send;

    fn air_quality(
        &self,
        place: &Place,
    ) -> impl Future<Output = Result<AirQualityResponse, FetchError>> + Send;

    fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<ReverseGeocodeResponse, FetchError>> + Send;

    /// Country and sub-national border geometry, ready to draw.
    fn border_overlay(&self) -> impl Future<Output = Result<OverlayData, FetchError>> + Send;
}

/// [`WeatherApi`] backed by Open-Meteo, BigDataCloud and Natural Earth.
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_base: String,
    geocoding_base: String,
    air_quality_base: String,
    reverse_geocode_url: String,
    country_borders_url: String,
    domestic_borders_url: String,
}

impl OpenMeteoClient {
    /// Creates a new client from settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            forecast_base: settings.forecast_api_base.clone(),
            geocoding_base: settings.geocoding_api_base.clone(),
            air_quality_base: settings.air_quality_api_base.clone(),
            reverse_geocode_url: settings.reverse_geocode_url.clone(),
            country_borders_url: settings.country_borders_url.clone(),
            domestic_borders_url: settings.domestic_borders_url.clone(),
        })
    }

    /// The underlying HTTP client, for collaborators that share its pool.
    pub fn http(&self) -> Client {
        self.client.clone()
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }
}

fn coordinates_query(place: &Place) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", place.latitude.to_string()),
        ("longitude", place.longitude.to_string()),
    ]
}

impl WeatherApi for OpenMeteoClient {
    async fn search_locations(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        let url = format!("{}/search", self.geocoding_base);
        let params = [
            ("name", query.to_string()),
            ("count", GEOCODING_RESULT_COUNT.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let response = self.make_request::<GeocodingResponse>(&url, &params).await?;
        Ok(response.results.unwrap_or_default())
    }

    async fn forecast(
        &self,
        place: &Place,
        units: UnitPreferences,
    ) -> Result<ForecastResponse, FetchError> {
        let url = format!("{}/forecast", self.forecast_base);
        let mut params = coordinates_query(place);
        params.extend([
            ("current", CURRENT_FIELDS.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
            ("temperature_unit", units.temperature.as_query().to_string()),
            ("wind_speed_unit", units.wind.as_query().to_string()),
            ("precipitation_unit", units.precipitation.as_query().to_string()),
        ]);

        let forecast = self.make_request::<ForecastResponse>(&url, &params).await?;
        if forecast.current.is_none() {
            return Err(FetchError::MissingData("No weather data returned."));
        }
        Ok(forecast)
    }

    async fn air_quality(&self, place: &Place) -> Result<AirQualityResponse, FetchError> {
        let url = format!("{}/air-quality", self.air_quality_base);
        let mut params = coordinates_query(place);
        params.extend([
            ("current", AIR_QUALITY_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ]);
        self.make_request(&url, &params).await
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseGeocodeResponse, FetchError> {
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("localityLanguage", "en".to_string()),
        ];
        self.make_request(&self.reverse_geocode_url, &params).await
    }

    async fn border_overlay(&self) -> Result<OverlayData, FetchError> {
        let (countries, domestic) = tokio::try_join!(
            self.make_request::<FeatureCollection>(&self.country_borders_url, &[]),
            self.make_request::<FeatureCollection>(&self.domestic_borders_url, &[]),
        )?;
        Ok(OverlayData::from_geojson(&countries, &domestic))
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
