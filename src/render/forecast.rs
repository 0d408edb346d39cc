use chrono::NaiveDate;

use super::{escape_html, number_or_dash, summary::weather_code_to_description};
use crate::models::{DailyData, DailyUnits};

pub const NO_FORECAST_PLACEHOLDER: &str = "<p class=\"forecast-sub\">No forecast data available.</p>";

/// "2024-05-01" -> "Wed, May 1"
fn format_day(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a, %b %-d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Formats the daily forecast into one card per day
pub fn format_forecast(daily: &DailyData, units: &DailyUnits) -> String {
    if daily.time.is_empty() {
        return NO_FORECAST_PLACEHOLDER.to_string();
    }

    let mut output = String::new();
    for (i, day) in daily.time.iter().enumerate() {
        let condition = daily
            .weather_code
            .get(i)
            .map(|code| weather_code_to_description(*code))
            .unwrap_or("Unknown");
        output.push_str(&format!(
            "<article class=\"forecast-card\">\
             <p class=\"forecast-day\">{}</p>\
             <p class=\"forecast-sub\">{}</p>\
             <p class=\"forecast-sub\">High: {}{}</p>\
             <p class=\"forecast-sub\">Low: {}{}</p>\
             <p class=\"forecast-sub\">Rain chance: {}{}</p>\
             </article>\n",
            escape_html(&format_day(day)),
            condition,
            number_or_dash(daily.temperature_max.get(i).copied()),
            escape_html(&units.temperature_max),
            number_or_dash(daily.temperature_min.get(i).copied()),
            escape_html(&units.temperature_min),
            number_or_dash(daily.precipitation_probability_max.get(i).copied().flatten()),
            escape_html(&units.precipitation_probability_max),
        ));
    }
    output
}
