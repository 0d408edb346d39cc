use super::{escape_html, number_or_dash};
use crate::models::AirQualityResponse;

pub const NO_AIR_QUALITY_PLACEHOLDER: &str =
    "<p class=\"forecast-sub\">Air quality data unavailable.</p>";

/// US AQI severity tiers, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AqiBand {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiBand {
    /// Thresholds are inclusive upper bounds: 50 is Good, 51 is Moderate.
    pub fn from_index(aqi: f64) -> Self {
        if aqi <= 50.0 {
            Self::Good
        } else if aqi <= 100.0 {
            Self::Moderate
        } else if aqi <= 150.0 {
            Self::UnhealthyForSensitiveGroups
        } else if aqi <= 200.0 {
            Self::Unhealthy
        } else if aqi <= 300.0 {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#22c55e",
            Self::Moderate => "#eab308",
            Self::UnhealthyForSensitiveGroups => "#f97316",
            Self::Unhealthy => "#ef4444",
            Self::VeryUnhealthy => "#a855f7",
            Self::Hazardous => "#7f1d1d",
        }
    }
}

fn pollutant_card(label: &str, value: Option<f64>, unit: &str) -> String {
    format!(
        "<article class=\"card\"><p class=\"card-label\">{}</p><p class=\"card-value\">{} {}</p></article>\n",
        label,
        number_or_dash(value),
        escape_html(unit)
    )
}

/// Formats the AQI card (coloured by band) followed by the pollutant cards
pub fn format_air_quality(air: Option<&AirQualityResponse>) -> String {
    let Some((current, units)) = air.and_then(|a| a.current.as_ref().map(|c| (c, &a.current_units)))
    else {
        return NO_AIR_QUALITY_PLACEHOLDER.to_string();
    };

    let mut output = match current.us_aqi {
        Some(aqi) => {
            let band = AqiBand::from_index(aqi);
            format!(
                "<article class=\"card\"><p class=\"card-label\">US AQI</p>\
                 <p class=\"card-value\" style=\"color: {}\">{} ({})</p></article>\n",
                band.color(),
                aqi,
                band.label()
            )
        }
        None => "<article class=\"card\"><p class=\"card-label\">US AQI</p><p class=\"card-value\">--</p></article>\n"
            .to_string(),
    };
    output.push_str(&pollutant_card("PM2.5", current.pm2_5, &units.pm2_5));
    output.push_str(&pollutant_card("PM10", current.pm10, &units.pm10));
    output.push_str(&pollutant_card("Ozone", current.ozone, &units.ozone));
    output
}
