//! The dashboard coordinator.
//!
//! Owns the request sequencer, the page, the current selection and the
//! collaborators, and implements every user action. Each action captures
//! its request ticket(s) up front and re-checks them immediately before
//! every write to the page or the globe, under the same lock as the write.

use std::sync::{Mutex, MutexGuard};

use crate::client::WeatherApi;
use crate::constants::{
    AUTO_ROTATE_SPEED, DEFAULT_VIEW_ALTITUDE, LABELS_ONLY_STATE_LIMIT, MAX_CAMERA_DISTANCE,
    MIN_CAMERA_DISTANCE, RESET_VIEW_DURATION_MS,
};
use crate::geolocation::{Geolocator, DETECTING_MESSAGE};
use crate::globe::{globe_style, pin_marker, Globe, OverlayMode, OverlayPaint, PointOfView};
use crate::models::{AirQualityResponse, ForecastResponse, Place};
use crate::overlay::{GlobeLabel, OverlayCache};
use crate::page::{Page, Region};
use crate::render::{
    collect_alerts, escape_html, format_air_quality, format_alerts, format_forecast,
    format_hourly_chart, format_results, format_sun_uv, format_updated_at, format_weather_summary,
    ChartGeometry,
};
use crate::sequencer::{Flow, RequestSequencer, RequestTicket};
use crate::units::{UnitChange, UnitPreferences};

const GLOBAL_VIEW: PointOfView = PointOfView {
    lat: 0.0,
    lng: 0.0,
    altitude: DEFAULT_VIEW_ALTITUDE,
};

struct DashboardState {
    page: Page,
    results: Vec<Place>,
    selection: Option<Place>,
    units: UnitPreferences,
    style: &'static str,
}

pub struct Dashboard<A, G, L> {
    api: A,
    globe: G,
    geolocator: L,
    sequencer: RequestSequencer,
    overlay: OverlayCache,
    chart: ChartGeometry,
    state: Mutex<DashboardState>,
}

impl<A, G, L> Dashboard<A, G, L>
where
    A: WeatherApi,
    G: Globe,
    L: Geolocator,
{
    pub fn new(api: A, globe: G, geolocator: L, units: UnitPreferences) -> Self {
        Self {
            api,
            globe,
            geolocator,
            sequencer: RequestSequencer::new(),
            overlay: OverlayCache::new(),
            chart: ChartGeometry::default(),
            state: Mutex::new(DashboardState {
                page: Page::new(),
                results: Vec::new(),
                selection: None,
                units,
                style: globe_style("").key,
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DashboardState> {
        // Every effect writes whole regions, so a poisoned state is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs `effect` only if every ticket is still the latest of its flow.
    /// The check and the effect happen under one lock.
    fn apply<F>(&self, tickets: &[RequestTicket], effect: F) -> bool
    where
        F: FnOnce(&mut DashboardState),
    {
        let mut state = self.lock_state();
        if let Some(stale) = tickets.iter().find(|t| !t.is_current(&self.sequencer)) {
            tracing::debug!("Dropping stale result for {}", stale);
            return false;
        }
        effect(&mut state);
        true
    }

    fn set_status(&self, message: impl Into<String>) {
        self.lock_state().page.set_status(message);
    }

    pub fn page(&self) -> Page {
        self.lock_state().page.clone()
    }

    pub fn units(&self) -> UnitPreferences {
        self.lock_state().units
    }

    pub fn selection(&self) -> Option<Place> {
        self.lock_state().selection.clone()
    }

    pub fn results(&self) -> Vec<Place> {
        self.lock_state().results.clone()
    }

    pub fn style(&self) -> &'static str {
        self.lock_state().style
    }

    pub fn globe(&self) -> &G {
        &self.globe
    }

    #[cfg(test)]
    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    /// Camera limits, a centred auto-rotating view and the starting style.
    pub async fn initialize(&self, style: &str) {
        self.globe
            .set_camera_limits(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE, AUTO_ROTATE_SPEED);
        self.globe.point_of_view(GLOBAL_VIEW, 0);
        self.globe.set_auto_rotate(true);
        self.apply_globe_style(style).await;
    }

    // ------------------------------------------------------------------
    // Search and selection
    // ------------------------------------------------------------------

    /// Geocodes `query` and lists the matches.
    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.set_status("Please enter a location name.");
            return;
        }

        tracing::info!("Searching locations for '{}'", query);
        let ticket = self.sequencer.issue(Flow::Search);
        self.apply(&[ticket], |s| {
            s.page.set_status("Searching locations...");
            s.page.hide_weather();
            s.page.clear(Region::ResultsList);
            s.results.clear();
        });

        match self.api.search_locations(query).await {
            Ok(places) => {
                self.apply(&[ticket], |s| {
                    if places.is_empty() {
                        s.page.set_status("No matching locations found. Try a broader name.");
                    } else {
                        s.page.set_status("Choose one of the matching locations.");
                        s.page.set(Region::ResultsList, format_results(&places));
                    }
                    s.results = places;
                });
            }
            Err(e) => {
                tracing::warn!("Location search failed: {}", e);
                self.apply(&[ticket], |s| {
                    let reason = escape_html(&e.to_string());
                    s.page.set_status(format!("Unable to search locations: {}", reason));
                });
            }
        }
    }

    /// Picks a search result. Returns the place, or `None` when `index` is
    /// out of range.
    pub async fn select_result(&self, index: usize) -> Option<Place> {
        let place = self.lock_state().results.get(index).cloned();
        let Some(place) = place else {
            self.set_status(format!("No search result at position {}.", index));
            return None;
        };

        tracing::info!("Selected {}", place.location_text());
        let ticket = self.sequencer.issue(Flow::Pin);
        self.apply(&[ticket], |s| {
            self.clear_globe_pin(s);
            s.selection = Some(place.clone());
        });
        self.fetch_weather(place.clone(), Some(ticket)).await;
        Some(place)
    }

    fn clear_globe_pin(&self, state: &mut DashboardState) {
        self.globe.set_points(&[]);
        self.globe.set_rings(&[]);
        state.page.set(Region::PinnedCoords, "Pinned location: none");
    }

    fn place_globe_pin(&self, state: &mut DashboardState, place: &Place) {
        let (point, rings) = pin_marker(place.latitude, place.longitude);
        self.globe.set_points(&[point]);
        self.globe.set_rings(&rings);
        self.globe.set_auto_rotate(false);
        set_pinned_label(&mut state.page, &place.country);
    }

    // ------------------------------------------------------------------
    // Weather
    // ------------------------------------------------------------------

    /// Fetches and renders weather for `place`.
    ///
    /// `selection` is the pin-flow ticket of the selection this fetch belongs
    /// to, if any; the render is dropped once that selection is superseded.
    pub async fn fetch_weather(&self, place: Place, selection: Option<RequestTicket>) {
        let ticket = self.sequencer.issue(Flow::Weather);
        let tickets: Vec<RequestTicket> = std::iter::once(ticket).chain(selection).collect();
        let units = self.units();

        tracing::info!(
            "Fetching weather for {:.4}, {:.4} ({})",
            place.latitude,
            place.longitude,
            units
        );
        self.apply(&tickets, |s| {
            s.page.set_status("Loading current weather and 7-day forecast...");
        });

        let (forecast, air) = tokio::join!(
            self.api.forecast(&place, units),
            self.api.air_quality(&place)
        );

        let forecast = match forecast {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("Weather fetch failed: {}", e);
                self.apply(&tickets, |s| {
                    let reason = escape_html(&e.to_string());
                    s.page.set_status(format!("Unable to load weather: {}", reason));
                });
                return;
            }
        };
        let air = match air {
            Ok(air) => Some(air),
            Err(e) => {
                tracing::warn!("Air quality fetch failed: {}", e);
                None
            }
        };

        self.apply(&tickets, |s| {
            let shown = s.selection.clone().unwrap_or(place);
            self.render_weather(s, &shown, &forecast, air.as_ref(), units);
        });
    }

    fn render_weather(
        &self,
        state: &mut DashboardState,
        place: &Place,
        forecast: &ForecastResponse,
        air: Option<&AirQualityResponse>,
        units: UnitPreferences,
    ) {
        let page = &mut state.page;
        page.set(Region::SelectedLocation, escape_html(&place.location_text()));

        let now = forecast.current.as_ref().map(|c| c.time.as_str());
        if let Some(current) = &forecast.current {
            page.set(
                Region::WeatherGrid,
                format_weather_summary(current, &forecast.current_units, units.pressure),
            );
            let aqi = air.and_then(|a| a.current.as_ref()).and_then(|c| c.us_aqi);
            let alerts = collect_alerts(current, &forecast.current_units, &forecast.daily, aqi);
            page.set(Region::AlertsList, format_alerts(&alerts));
            page.set(Region::UpdatedAt, format_updated_at(&current.time, &forecast.timezone));
        }
        page.set(
            Region::ForecastGrid,
            format_forecast(&forecast.daily, &forecast.daily_units),
        );
        page.set(Region::SunUvGrid, format_sun_uv(&forecast.daily));
        page.set(Region::AqiGrid, format_air_quality(air));
        page.set(
            Region::HourlyChart,
            format_hourly_chart(&forecast.hourly, &forecast.hourly_units, now, self.chart),
        );
        page.show_weather();
        page.set_status("Weather and 7-day forecast loaded successfully.");
    }

    /// Changes display units and refreshes the current selection.
    ///
    /// The refresh belongs to the selection's pin-flow request, so a newer
    /// pin, pick or geolocation drops it.
    pub async fn set_units(&self, change: UnitChange) -> UnitPreferences {
        let (units, selection) = {
            let mut state = self.lock_state();
            state.units = state.units.apply(change);
            let pin = RequestTicket {
                flow: Flow::Pin,
                id: self.sequencer.latest(Flow::Pin),
            };
            (state.units, state.selection.clone().map(|place| (place, pin)))
        };
        tracing::info!("Units changed to {}", units);

        if let Some((place, pin)) = selection {
            self.fetch_weather(place, Some(pin)).await;
        }
        units
    }

    // ------------------------------------------------------------------
    // Globe pin and geolocation
    // ------------------------------------------------------------------

    /// Drops a pin at raw coordinates: weather starts immediately for the
    /// synthetic place while the reverse geocode runs alongside it.
    ///
    /// Returns `false` for coordinates that are not on the globe.
    pub async fn pin_at(&self, latitude: f64, longitude: f64) -> bool {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return false;
        }

        let ticket = self.sequencer.issue(Flow::Pin);
        let pinned = Place::pinned(latitude, longitude);
        tracing::info!("Pin {} at {}", ticket, pinned.country);

        self.apply(&[ticket], |s| {
            self.place_globe_pin(s, &pinned);
            s.selection = Some(pinned.clone());
        });

        tokio::join!(
            self.fetch_weather(pinned.clone(), Some(ticket)),
            self.resolve_pin(&pinned, ticket)
        );
        true
    }

    async fn reverse_geocode(&self, place: &Place) -> Place {
        match self
            .api
            .reverse_geocode(place.latitude, place.longitude)
            .await
        {
            Ok(found) => place.resolved_with(&found),
            Err(e) => {
                tracing::debug!("Reverse geocode failed, keeping coordinates: {}", e);
                place.clone()
            }
        }
    }

    async fn resolve_pin(&self, pinned: &Place, ticket: RequestTicket) {
        let resolved = self.reverse_geocode(pinned).await;
        self.apply(&[ticket], |s| {
            let text = resolved.location_text();
            set_pinned_label(&mut s.page, &text);
            s.page.set(Region::SelectedLocation, escape_html(&text));
            s.selection = Some(resolved);
        });
    }

    /// Asks the host for the user's position and shows weather there.
    pub async fn use_my_location(&self) {
        let ticket = self.sequencer.issue(Flow::Pin);
        self.apply(&[ticket], |s| s.page.set_status(DETECTING_MESSAGE));

        let coords = match self.geolocator.locate().await {
            Ok(coords) => coords,
            Err(e) => {
                tracing::info!("Geolocation unavailable: {}", e);
                self.apply(&[ticket], |s| s.page.set_status(e.status_message()));
                return;
            }
        };

        let place = self
            .reverse_geocode(&Place::pinned(coords.latitude, coords.longitude))
            .await;
        let applied = self.apply(&[ticket], |s| {
            self.place_globe_pin(s, &place);
            set_pinned_label(&mut s.page, &place.location_text());
            s.selection = Some(place.clone());
        });
        if applied {
            self.fetch_weather(place, Some(ticket)).await;
        }
    }

    // ------------------------------------------------------------------
    // Globe style and view
    // ------------------------------------------------------------------

    /// Switches the globe style, loading border overlays when the style
    /// needs them. Unknown keys select the topographic style.
    pub async fn apply_globe_style(&self, key: &str) {
        let ticket = self.sequencer.issue(Flow::Style);
        let style = globe_style(key);
        tracing::info!("Applying globe style {}", style.key);

        self.apply(&[ticket], |s| {
            s.style = style.key;
            self.globe.apply_imagery(style);
            self.clear_overlays();
            if style.overlay_mode == OverlayMode::None {
                s.page.set_globe_style_status("", false);
            } else {
                s.page.set_globe_style_status("Loading borders...", false);
            }
        });
        if style.overlay_mode == OverlayMode::None {
            return;
        }

        let overlay = match self.overlay.get_or_load(|| self.api.border_overlay()).await {
            Ok(overlay) => overlay,
            Err(e) => {
                tracing::warn!("Border overlay unavailable: {}", e);
                self.apply(&[ticket], |s| {
                    s.page.set_globe_style_status("Borders unavailable right now.", true);
                });
                return;
            }
        };

        self.apply(&[ticket], |s| {
            if style.overlay_mode == OverlayMode::LabelsOnly {
                let labels: Vec<GlobeLabel> = overlay
                    .country_labels
                    .iter()
                    .chain(overlay.state_labels.iter().take(LABELS_ONLY_STATE_LIMIT))
                    .cloned()
                    .collect();
                self.globe.set_labels(&labels);
                s.page.set_globe_style_status("Labels loaded.", false);
                return;
            }

            let paint = OverlayPaint::for_mode(style.overlay_mode);
            let labels: Vec<GlobeLabel> = overlay
                .country_labels
                .iter()
                .chain(overlay.state_labels.iter())
                .map(|label| GlobeLabel {
                    color: paint.label_color.to_string(),
                    ..label.clone()
                })
                .collect();
            self.globe.set_polygons(&overlay.countries, Some(&paint));
            self.globe
                .set_paths(&overlay.domestic_paths, Some(paint.domestic_line_color));
            self.globe.set_labels(&labels);
            s.page.set_globe_style_status("Borders loaded.", false);
        });
    }

    fn clear_overlays(&self) {
        self.globe.set_polygons(&[], None);
        self.globe.set_paths(&[], None);
        self.globe.set_labels(&[]);
    }

    /// Recentres the camera and resumes auto-rotation.
    pub fn reset_view(&self) {
        self.globe.point_of_view(GLOBAL_VIEW, RESET_VIEW_DURATION_MS);
        self.globe.set_auto_rotate(true);
        self.set_status("Globe view reset. Auto-rotate resumed.");
    }
}

fn set_pinned_label(page: &mut Page, text: &str) {
    page.set(
        Region::PinnedCoords,
        format!("Pinned location: {}", escape_html(text)),
    );
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
