//! Pure data-to-markup transforms.
//!
//! Nothing in here touches the page or the network; callers decide where
//! the returned markup goes.

pub mod air_quality;
pub mod alerts;
pub mod chart;
pub mod forecast;
pub mod results;
pub mod summary;

pub use air_quality::format_air_quality;
pub use alerts::{collect_alerts, format_alerts};
pub use chart::{format_hourly_chart, ChartGeometry};
pub use forecast::format_forecast;
pub use results::format_results;
pub use summary::{format_sun_uv, format_updated_at, format_weather_summary};

/// Escapes text for inclusion in element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One summary card.
fn card(label: &str, value: &str) -> String {
    format!(
        "<article class=\"card\"><p class=\"card-label\">{}</p><p class=\"card-value\">{}</p></article>\n",
        escape_html(label),
        escape_html(value)
    )
}

/// A number as the API reported it, or a dash when it did not.
fn number_or_dash(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "--".to_string(),
    }
}
