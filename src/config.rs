//! Runtime settings.
//!
//! Values come from built-in defaults, then an optional `globe-weather.toml`
//! in the working directory, then `GLOBE_WEATHER__*` environment variables.

use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::constants::{
    AIR_QUALITY_API_BASE, COUNTRY_BORDERS_URL, DOMESTIC_BORDERS_URL, GEOCODING_API_BASE,
    IP_GEOLOCATION_URL, OPEN_METEO_API_BASE, REVERSE_GEOCODE_URL, USER_AGENT,
};
use crate::units::{PrecipitationUnit, PressureUnit, TemperatureUnit, UnitPreferences, WindUnit};

pub const SETTINGS_FILE: &str = "globe-weather.toml";
const ENV_PREFIX: &str = "GLOBE_WEATHER__";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    pub forecast_api_base: String,
    pub geocoding_api_base: String,
    pub air_quality_api_base: String,
    pub reverse_geocode_url: String,
    pub ip_geolocation_url: String,
    pub country_borders_url: String,
    pub domestic_borders_url: String,
    /// Per-request timeout for every API call.
    pub request_timeout_secs: u64,
    /// Upper bound on a geolocation lookup.
    pub geolocation_timeout_secs: u64,
    /// When false the host reports geolocation as unsupported.
    pub geolocation_enabled: bool,
    pub temperature_unit: TemperatureUnit,
    pub wind_unit: WindUnit,
    pub precipitation_unit: PrecipitationUnit,
    pub pressure_unit: PressureUnit,
    pub globe_style: String,
}

impl Default for Settings {
    fn default() -> Self {
        let units = UnitPreferences::default();
        Self {
            user_agent: USER_AGENT.into(),
            forecast_api_base: OPEN_METEO_API_BASE.into(),
            geocoding_api_base: GEOCODING_API_BASE.into(),
            air_quality_api_base: AIR_QUALITY_API_BASE.into(),
            reverse_geocode_url: REVERSE_GEOCODE_URL.into(),
            ip_geolocation_url: IP_GEOLOCATION_URL.into(),
            country_borders_url: COUNTRY_BORDERS_URL.into(),
            domestic_borders_url: DOMESTIC_BORDERS_URL.into(),
            request_timeout_secs: 30,
            geolocation_timeout_secs: 10,
            geolocation_enabled: true,
            temperature_unit: units.temperature,
            wind_unit: units.wind,
            precipitation_unit: units.precipitation,
            pressure_unit: units.pressure,
            globe_style: "topographic".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation_timeout_secs)
    }

    /// Unit preferences the dashboard starts with.
    pub fn units(&self) -> UnitPreferences {
        UnitPreferences {
            temperature: self.temperature_unit,
            wind: self.wind_unit,
            precipitation: self.precipitation_unit,
            pressure: self.pressure_unit,
        }
    }

    /// Parses settings from TOML text; missing keys keep their defaults.
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("invalid settings file")
    }

    /// Applies `GLOBE_WEATHER__<FIELD>` overrides from the given variables.
    pub fn apply_env<I>(&mut self, vars: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(field) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match field.to_ascii_lowercase().as_str() {
                "user_agent" => self.user_agent = value,
                "forecast_api_base" => self.forecast_api_base = value,
                "geocoding_api_base" => self.geocoding_api_base = value,
                "air_quality_api_base" => self.air_quality_api_base = value,
                "reverse_geocode_url" => self.reverse_geocode_url = value,
                "ip_geolocation_url" => self.ip_geolocation_url = value,
                "country_borders_url" => self.country_borders_url = value,
                "domestic_borders_url" => self.domestic_borders_url = value,
                "request_timeout_secs" => {
                    self.request_timeout_secs = value
                        .parse()
                        .with_context(|| format!("{key} must be a number of seconds"))?;
                }
                "geolocation_timeout_secs" => {
                    self.geolocation_timeout_secs = value
                        .parse()
                        .with_context(|| format!("{key} must be a number of seconds"))?;
                }
                "geolocation_enabled" => {
                    self.geolocation_enabled = value
                        .parse()
                        .with_context(|| format!("{key} must be true or false"))?;
                }
                "temperature_unit" => self.temperature_unit = value.parse()?,
                "wind_unit" => self.wind_unit = value.parse()?,
                "precipitation_unit" => self.precipitation_unit = value.parse()?,
                "pressure_unit" => self.pressure_unit = value.parse()?,
                "globe_style" => self.globe_style = value,
                _ => tracing::warn!("ignoring unknown setting {}", key),
            }
        }
        Ok(())
    }
}

/// Loads settings from `globe-weather.toml` (if present) and the environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = if Path::new(SETTINGS_FILE).exists() {
        let raw = fs::read_to_string(SETTINGS_FILE)
            .with_context(|| format!("failed to read {SETTINGS_FILE}"))?;
        Settings::from_toml(&raw)?
    } else {
        Settings::default()
    };
    settings.apply_env(std::env::vars())?;
    Ok(settings)
}
