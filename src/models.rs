use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::units::{PrecipitationUnit, PressureUnit, TemperatureUnit, WindUnit};

// ============================================================================
// Domain
// ============================================================================

/// A resolved or synthetic location used as the key for weather lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub admin1: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Place {
    /// Placeholder for a globe click that has not been reverse geocoded yet.
    pub fn pinned(latitude: f64, longitude: f64) -> Self {
        Self {
            name: "Pinned Location".to_string(),
            admin1: String::new(),
            country: coordinate_summary(latitude, longitude),
            latitude,
            longitude,
            timezone: None,
        }
    }

    /// Non-empty name parts joined with ", ".
    pub fn location_text(&self) -> String {
        [&self.name, &self.admin1, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Upgrades a place with whatever the reverse geocoder knew.
    pub fn resolved_with(&self, found: &ReverseGeocodeResponse) -> Self {
        let name = first_non_empty(&[&found.city, &found.locality]).unwrap_or(self.name.as_str());
        let country = first_non_empty(&[&found.country_name]).unwrap_or(self.country.as_str());
        Self {
            name: name.to_string(),
            admin1: found.principal_subdivision.trim().to_string(),
            country: country.to_string(),
            ..self.clone()
        }
    }
}

fn first_non_empty<'a>(candidates: &[&'a String]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .map(|s: &'a String| s.trim())
        .find(|s| !s.is_empty())
}

pub fn format_coordinate(value: f64) -> String {
    format!("{:.2}", value)
}

/// "Lat 35.68, Lon 139.69"
pub fn coordinate_summary(latitude: f64, longitude: f64) -> String {
    format!(
        "Lat {}, Lon {}",
        format_coordinate(latitude),
        format_coordinate(longitude)
    )
}

// ============================================================================
// Open-Meteo Geocoding API Models
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct GeocodingResponse {
    #[serde(default)]
    pub results: Option<Vec<Place>>,
}

// ============================================================================
// Open-Meteo Forecast API Models
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub current: Option<CurrentWeather>,
    #[serde(default)]
    pub current_units: CurrentUnits,
    #[serde(default)]
    pub hourly: HourlyData,
    #[serde(default)]
    pub hourly_units: HourlyUnits,
    #[serde(default)]
    pub daily: DailyData,
    #[serde(default)]
    pub daily_units: DailyUnits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub time: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: f64,
    pub apparent_temperature: f64,
    pub precipitation: f64,
    pub weather_code: i32,
    pub cloud_cover: f64,
    pub surface_pressure: f64,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentUnits {
    #[serde(rename = "temperature_2m")]
    pub temperature: String,
    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: String,
    pub apparent_temperature: String,
    pub precipitation: String,
    pub cloud_cover: String,
    pub surface_pressure: String,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HourlyUnits {
    #[serde(rename = "temperature_2m")]
    pub temperature: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyData {
    pub time: Vec<String>,
    pub weather_code: Vec<i32>,
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: Vec<f64>,
    pub precipitation_probability_max: Vec<Option<f64>>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
    pub uv_index_max: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyUnits {
    #[serde(rename = "temperature_2m_max")]
    pub temperature_max: String,
    #[serde(rename = "temperature_2m_min")]
    pub temperature_min: String,
    pub precipitation_probability_max: String,
}

// ============================================================================
// Open-Meteo Air Quality API Models
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQualityResponse {
    #[serde(default)]
    pub current: Option<AirQualityCurrent>,
    #[serde(default)]
    pub current_units: AirQualityUnits,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirQualityCurrent {
    pub us_aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub ozone: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirQualityUnits {
    pub pm2_5: String,
    pub pm10: String,
    pub ozone: String,
}

// ============================================================================
// Reverse Geocoding / Geolocation Models
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReverseGeocodeResponse {
    pub city: String,
    pub locality: String,
    pub principal_subdivision: String,
    pub country_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpLocationResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// GeoJSON Models
// ============================================================================

/// `[lng, lat]` with an optional altitude that is ignored.
pub type Position = Vec<f64>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    #[serde(other)]
    Unsupported,
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SearchLocationsRequest {
    /// Place name to look up, e.g. "Tokyo".
    pub query: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SelectLocationRequest {
    /// Zero-based index into the latest search results.
    pub index: usize,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct PinLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SetUnitsRequest {
    pub temperature: Option<TemperatureUnit>,
    pub wind: Option<WindUnit>,
    pub precipitation: Option<PrecipitationUnit>,
    pub pressure: Option<PressureUnit>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SetGlobeStyleRequest {
    /// One of satellite, satellite_labels, topographic, night, borders,
    /// cartographic_light, cartographic_dark.
    pub style: String,
}
