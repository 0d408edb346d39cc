use super::escape_html;
use crate::models::{CurrentUnits, CurrentWeather, DailyData};

/// Wind speed, in whatever unit the payload reports, that raises an alert.
const HIGH_WIND_THRESHOLD: f64 = 45.0;
const THUNDERSTORM_CODES: [i32; 3] = [95, 96, 99];
const HIGH_UV_THRESHOLD: f64 = 8.0;
const UNHEALTHY_AQI_THRESHOLD: f64 = 151.0;

pub const NO_ALERTS_PLACEHOLDER: &str =
    "<li class=\"alert alert-info\">No active weather alerts.</li>";

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: &'static str,
    pub detail: String,
}

/// Applies every alert rule independently, in a fixed order.
pub fn collect_alerts(
    current: &CurrentWeather,
    units: &CurrentUnits,
    daily: &DailyData,
    us_aqi: Option<f64>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if current.wind_speed >= HIGH_WIND_THRESHOLD {
        alerts.push(Alert {
            title: "High wind",
            detail: format!("Sustained wind of {} {}.", current.wind_speed, units.wind_speed),
        });
    }

    if THUNDERSTORM_CODES.contains(&current.weather_code) {
        alerts.push(Alert {
            title: "Thunderstorm",
            detail: "Thunderstorm activity reported near this location.".to_string(),
        });
    }

    if let Some(uv) = daily.uv_index_max.first().copied().flatten() {
        if uv >= HIGH_UV_THRESHOLD {
            alerts.push(Alert {
                title: "Very high UV",
                detail: format!("UV index peaks at {} today.", uv),
            });
        }
    }

    if let Some(aqi) = us_aqi {
        if aqi >= UNHEALTHY_AQI_THRESHOLD {
            alerts.push(Alert {
                title: "Unhealthy air",
                detail: format!("US AQI is {}.", aqi),
            });
        }
    }

    alerts
}

/// Formats alerts as list items; an empty list still yields one item
pub fn format_alerts(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return NO_ALERTS_PLACEHOLDER.to_string();
    }

    let mut output = String::new();
    for alert in alerts {
        output.push_str(&format!(
            "<li class=\"alert alert-warning\"><strong>{}</strong> {}</li>\n",
            alert.title,
            escape_html(&alert.detail)
        ));
    }
    output
}
