use super::escape_html;
use crate::models::{coordinate_summary, Place};

/// Formats geocoding matches as selectable list items. Each button carries
/// its index so a front end can hand it back to `select_location`.
pub fn format_results(places: &[Place]) -> String {
    let mut output = String::new();
    for (i, place) in places.iter().enumerate() {
        let mut subtitle = coordinate_summary(place.latitude, place.longitude);
        if let Some(timezone) = &place.timezone {
            subtitle.push_str(" | ");
            subtitle.push_str(timezone);
        }
        output.push_str(&format!(
            "<li><button class=\"result-btn\" type=\"button\" data-index=\"{}\">\
             <strong>{}</strong><div class=\"result-sub\">{}</div></button></li>\n",
            i,
            escape_html(&place.location_text()),
            escape_html(&subtitle)
        ));
    }
    output
}
