use chrono::NaiveDateTime;

use super::{card, escape_html, number_or_dash};
use crate::models::{CurrentUnits, CurrentWeather, DailyData};
use crate::units::PressureUnit;

const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Converts WMO weather code to human-readable description
pub fn weather_code_to_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Formats current conditions into the eight summary cards
pub fn format_weather_summary(
    current: &CurrentWeather,
    units: &CurrentUnits,
    pressure_unit: PressureUnit,
) -> String {
    let pressure = match pressure_unit {
        PressureUnit::Hpa => format!("{} {}", current.surface_pressure, units.surface_pressure),
        PressureUnit::Inhg => format!(
            "{} {}",
            pressure_unit.convert_from_hpa(current.surface_pressure),
            pressure_unit.label()
        ),
    };

    let mut output = String::new();
    output.push_str(&card("Condition", weather_code_to_description(current.weather_code)));
    output.push_str(&card(
        "Temperature",
        &format!("{}{}", current.temperature, units.temperature),
    ));
    output.push_str(&card(
        "Feels Like",
        &format!("{}{}", current.apparent_temperature, units.apparent_temperature),
    ));
    output.push_str(&card(
        "Humidity",
        &format!("{}{}", current.relative_humidity, units.relative_humidity),
    ));
    output.push_str(&card(
        "Wind Speed",
        &format!("{} {}", current.wind_speed, units.wind_speed),
    ));
    output.push_str(&card("Pressure", &pressure));
    output.push_str(&card(
        "Precipitation",
        &format!("{} {}", current.precipitation, units.precipitation),
    ));
    output.push_str(&card(
        "Cloud Cover",
        &format!("{}{}", current.cloud_cover, units.cloud_cover),
    ));
    output
}

/// Sunrise, sunset and peak UV for today
pub fn format_sun_uv(daily: &DailyData) -> String {
    if daily.time.is_empty() {
        return "<p class=\"forecast-sub\">No sun or UV data available.</p>".to_string();
    }

    let clock = |value: Option<&String>| {
        value
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, API_TIME_FORMAT).ok())
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--".to_string())
    };

    let mut output = String::new();
    output.push_str(&card("Sunrise", &clock(daily.sunrise.first())));
    output.push_str(&card("Sunset", &clock(daily.sunset.first())));
    output.push_str(&card(
        "UV Index Max",
        &number_or_dash(daily.uv_index_max.first().copied().flatten()),
    ));
    output
}

/// "Updated: 2024-05-01 14:00 (Asia/Tokyo)"
pub fn format_updated_at(time: &str, timezone: &str) -> String {
    let when = NaiveDateTime::parse_from_str(time, API_TIME_FORMAT)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| time.to_string());
    format!("Updated: {} ({})", when, escape_html(timezone))
}
