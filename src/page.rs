//! In-memory page: the designated output regions the dashboard writes to.

use std::collections::BTreeMap;

use serde::Serialize;

/// Named output regions. The serialized names match the element ids a
/// browser front end would use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    StatusMessage,
    ResultsList,
    SelectedLocation,
    WeatherGrid,
    ForecastGrid,
    SunUvGrid,
    AqiGrid,
    AlertsList,
    HourlyChart,
    UpdatedAt,
    PinnedCoords,
    GlobeStyleStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    regions: BTreeMap<Region, String>,
    weather_visible: bool,
    globe_style_error: bool,
}

impl Default for Page {
    fn default() -> Self {
        let mut page = Self {
            regions: BTreeMap::new(),
            weather_visible: false,
            globe_style_error: false,
        };
        page.set(Region::PinnedCoords, "Pinned location: none");
        page
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, region: Region, markup: impl Into<String>) {
        self.regions.insert(region, markup.into());
    }

    pub fn clear(&mut self, region: Region) {
        self.regions.remove(&region);
    }

    /// Current markup of `region`; empty when nothing was written.
    pub fn get(&self, region: Region) -> &str {
        self.regions.get(&region).map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    pub fn status(&self) -> &str {
        self.get(Region::StatusMessage)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.set(Region::StatusMessage, message);
    }

    /// Sets or clears the inline globe style message.
    pub fn set_globe_style_status(&mut self, message: &str, is_error: bool) {
        if message.is_empty() {
            self.clear(Region::GlobeStyleStatus);
            self.globe_style_error = false;
        } else {
            self.set(Region::GlobeStyleStatus, message);
            self.globe_style_error = is_error;
        }
    }

    #[cfg(test)]
    pub fn globe_style_error(&self) -> bool {
        self.globe_style_error
    }

    pub fn show_weather(&mut self) {
        self.weather_visible = true;
    }

    pub fn hide_weather(&mut self) {
        self.weather_visible = false;
    }

    #[cfg(test)]
    pub fn weather_visible(&self) -> bool {
        self.weather_visible
    }

    /// JSON view of the selected regions plus the visibility and error flags.
    pub fn snapshot(&self, regions: &[Region]) -> serde_json::Value {
        let selected: BTreeMap<Region, &str> = regions.iter().map(|r| (*r, self.get(*r))).collect();
        serde_json::json!({
            "weather_visible": self.weather_visible,
            "globe_style_error": self.globe_style_error,
            "regions": selected,
        })
    }
}
