use super::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;

use crate::error::{FetchError, GeolocationError};
use crate::geolocation::Coordinates;
use crate::globe::{CapFill, SceneGlobe};
use crate::models::ReverseGeocodeResponse;
use crate::overlay::{color_from_name, BorderPath, CountryPolygon, LatLng, OverlayData};
use crate::render::forecast::NO_FORECAST_PLACEHOLDER;
use crate::units::{PrecipitationUnit, PressureUnit, TemperatureUnit, WindUnit};

const ALL_REGIONS: [Region; 12] = [
    Region::StatusMessage,
    Region::ResultsList,
    Region::SelectedLocation,
    Region::WeatherGrid,
    Region::ForecastGrid,
    Region::SunUvGrid,
    Region::AqiGrid,
    Region::AlertsList,
    Region::HourlyChart,
    Region::UpdatedAt,
    Region::PinnedCoords,
    Region::GlobeStyleStatus,
];

const DEFAULT_LATENCY: Duration = Duration::from_millis(10);

/// In-memory weather services with per-place latency and call counters.
#[derive(Default)]
struct FakeApi {
    /// Forecast latency keyed by whole-degree latitude.
    weather_latency: HashMap<i64, Duration>,
    /// Reverse-geocode latency keyed by whole-degree latitude.
    geocode_latency: HashMap<i64, Duration>,
    /// Reverse-geocoded city names keyed by whole-degree latitude.
    city_names: HashMap<i64, &'static str>,
    search_latency: HashMap<&'static str, Duration>,
    overlay_latency: Duration,
    forecast_days: Option<usize>,
    fail_forecast: AtomicBool,
    fail_overlay: AtomicBool,
    forecast_calls: AtomicUsize,
    overlay_loads: AtomicUsize,
    last_units: Mutex<Option<UnitPreferences>>,
}

impl FakeApi {
    fn latency(table: &HashMap<i64, Duration>, latitude: f64) -> Duration {
        table
            .get(&(latitude.round() as i64))
            .copied()
            .unwrap_or(DEFAULT_LATENCY)
    }
}

fn tokyo() -> Place {
    Place {
        name: "Tokyo".into(),
        admin1: "Tokyo".into(),
        country: "Japan".into(),
        latitude: 35.6895,
        longitude: 139.69171,
        timezone: Some("Asia/Tokyo".into()),
    }
}

/// A forecast whose current temperature is the place's whole-degree latitude.
fn forecast_for(place: &Place, units: UnitPreferences, days: usize) -> ForecastResponse {
    let temperature_unit = match units.temperature {
        TemperatureUnit::Celsius => "°C",
        TemperatureUnit::Fahrenheit => "°F",
    };
    let hours: Vec<String> = (0..48)
        .map(|h| format!("2026-10-{:02}T{:02}:00", 18 + h / 24, h % 24))
        .collect();
    let hourly_temps: Vec<f64> = (0..48).map(|h| 10.0 + (h % 24) as f64 * 0.5).collect();
    let days_list: Vec<String> = (0..days).map(|d| format!("2026-10-{:02}", 18 + d)).collect();
    let sunrise: Vec<String> = days_list.iter().map(|d| format!("{d}T05:51")).collect();
    let sunset: Vec<String> = days_list.iter().map(|d| format!("{d}T17:03")).collect();

    serde_json::from_value(json!({
        "latitude": place.latitude,
        "longitude": place.longitude,
        "timezone": "Asia/Tokyo",
        "current": {
            "time": "2026-10-18T09:00",
            "temperature_2m": place.latitude.round(),
            "relative_humidity_2m": 61,
            "apparent_temperature": 17.5,
            "precipitation": 0.0,
            "weather_code": 2,
            "cloud_cover": 40,
            "surface_pressure": 1013.0,
            "wind_speed_10m": 9.5
        },
        "current_units": {
            "temperature_2m": temperature_unit,
            "relative_humidity_2m": "%",
            "apparent_temperature": temperature_unit,
            "precipitation": units.precipitation.as_query(),
            "cloud_cover": "%",
            "surface_pressure": "hPa",
            "wind_speed_10m": units.wind.as_query()
        },
        "hourly": { "time": hours, "temperature_2m": hourly_temps },
        "hourly_units": { "temperature_2m": temperature_unit },
        "daily": {
            "time": days_list,
            "weather_code": vec![2; days],
            "temperature_2m_max": vec![21.0; days],
            "temperature_2m_min": vec![14.0; days],
            "precipitation_probability_max": vec![20.0; days],
            "sunrise": sunrise,
            "sunset": sunset,
            "uv_index_max": vec![5.5; days]
        },
        "daily_units": {
            "temperature_2m_max": temperature_unit,
            "temperature_2m_min": temperature_unit,
            "precipitation_probability_max": "%"
        }
    }))
    .expect("forecast fixture")
}

fn sample_overlay() -> OverlayData {
    let label = |text: String, color: &str| GlobeLabel {
        lat: 1.0,
        lng: 2.0,
        text,
        size: 0.5,
        color: color.to_string(),
    };
    let square = vec![
        LatLng { lat: 0.0, lng: 0.0 },
        LatLng { lat: 0.0, lng: 4.0 },
        LatLng { lat: 4.0, lng: 4.0 },
    ];
    OverlayData {
        countries: vec![CountryPolygon {
            name: "Squareland".into(),
            fill_color: color_from_name("Squareland"),
            parts: vec![vec![square.clone()]],
        }],
        domestic_paths: vec![BorderPath { coords: square }],
        country_labels: vec![
            label("Squareland".into(), "#fefce8"),
            label("Islands".into(), "#fefce8"),
        ],
        state_labels: (0..140)
            .map(|i| label(format!("State {i}"), "#c7d2fe"))
            .collect(),
    }
}

impl WeatherApi for FakeApi {
    async fn search_locations(&self, query: &str) -> Result<Vec<Place>, FetchError> {
        let latency = self
            .search_latency
            .get(query)
            .copied()
            .unwrap_or(DEFAULT_LATENCY);
        sleep(latency).await;
        match query {
            "Tokyo" => Ok(vec![tokyo()]),
            "offline" => Err(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)),
            "gateway" => Err(FetchError::MissingData("<html> error page")),
            _ => Ok(Vec::new()),
        }
    }

    async fn forecast(
        &self,
        place: &Place,
        units: UnitPreferences,
    ) -> Result<ForecastResponse, FetchError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_units.lock().unwrap() = Some(units);
        sleep(Self::latency(&self.weather_latency, place.latitude)).await;
        if self.fail_forecast.load(Ordering::SeqCst) {
            return Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY));
        }
        Ok(forecast_for(place, units, self.forecast_days.unwrap_or(7)))
    }

    async fn air_quality(&self, place: &Place) -> Result<AirQualityResponse, FetchError> {
        sleep(Self::latency(&self.weather_latency, place.latitude)).await;
        Ok(serde_json::from_value(json!({
            "current": { "us_aqi": 42.0, "pm2_5": 8.1, "pm10": 14.0, "ozone": 61.0 },
            "current_units": { "pm2_5": "μg/m³", "pm10": "μg/m³", "ozone": "μg/m³" }
        }))
        .expect("air quality fixture"))
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        _longitude: f64,
    ) -> Result<ReverseGeocodeResponse, FetchError> {
        sleep(Self::latency(&self.geocode_latency, latitude)).await;
        let key = latitude.round() as i64;
        let city = match self.city_names.get(&key) {
            Some(name) => name.to_string(),
            None => format!("City {}", key),
        };
        Ok(ReverseGeocodeResponse {
            city,
            locality: String::new(),
            principal_subdivision: "Region".into(),
            country_name: "Testland".into(),
        })
    }

    async fn border_overlay(&self) -> Result<OverlayData, FetchError> {
        self.overlay_loads.fetch_add(1, Ordering::SeqCst);
        sleep(self.overlay_latency).await;
        if self.fail_overlay.load(Ordering::SeqCst) {
            return Err(FetchError::MissingData("borders offline"));
        }
        Ok(sample_overlay())
    }
}

struct FakeGeolocator {
    result: Result<Coordinates, GeolocationError>,
    latency: Duration,
}

impl FakeGeolocator {
    fn unsupported() -> Self {
        Self {
            result: Err(GeolocationError::Unsupported),
            latency: Duration::ZERO,
        }
    }
}

impl Geolocator for FakeGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        sleep(self.latency).await;
        self.result.clone()
    }
}

type TestDashboard = Dashboard<FakeApi, SceneGlobe, FakeGeolocator>;

fn dashboard(api: FakeApi) -> TestDashboard {
    Dashboard::new(
        api,
        SceneGlobe::new(),
        FakeGeolocator::unsupported(),
        UnitPreferences::default(),
    )
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

// ----------------------------------------------------------------------------
// Search and selection
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn search_and_select_renders_every_region() {
    let dash = dashboard(FakeApi::default());

    dash.search("Tokyo").await;
    let page = dash.page();
    assert_eq!(page.status(), "Choose one of the matching locations.");
    assert!(page.get(Region::ResultsList).contains("Tokyo, Tokyo, Japan"));
    assert!(!page.weather_visible());

    let selected = dash.select_result(0).await.expect("result 0");
    assert_eq!(selected.name, "Tokyo");

    let page = dash.page();
    assert!(page.weather_visible());
    assert_eq!(
        page.status(),
        "Weather and 7-day forecast loaded successfully."
    );
    assert_eq!(page.get(Region::SelectedLocation), "Tokyo, Tokyo, Japan");
    assert_eq!(count(page.get(Region::WeatherGrid), "class=\"card\""), 8);
    assert_eq!(
        count(page.get(Region::ForecastGrid), "class=\"forecast-card\""),
        7
    );
    assert_eq!(count(page.get(Region::SunUvGrid), "class=\"card\""), 3);
    assert_eq!(count(page.get(Region::AqiGrid), "class=\"card\""), 4);
    assert!(page.get(Region::AqiGrid).contains("42 (Good)"));
    assert!(page
        .get(Region::AlertsList)
        .contains("No active weather alerts."));

    let chart = page.get(Region::HourlyChart);
    assert_eq!(count(chart, "<polyline"), 1);
    assert!(count(chart, "<circle") >= 1);
    assert_eq!(
        page.get(Region::UpdatedAt),
        "Updated: 2026-10-18 09:00 (Asia/Tokyo)"
    );
}

#[tokio::test(start_paused = true)]
async fn blank_query_prompts_without_searching() {
    let dash = dashboard(FakeApi::default());
    dash.search("   ").await;
    assert_eq!(dash.page().status(), "Please enter a location name.");
    assert_eq!(dash.sequencer().latest(Flow::Search), 0);
}

#[tokio::test(start_paused = true)]
async fn search_without_matches_suggests_broader_name() {
    let dash = dashboard(FakeApi::default());
    dash.search("Atlantis").await;
    let page = dash.page();
    assert_eq!(
        page.status(),
        "No matching locations found. Try a broader name."
    );
    assert_eq!(page.get(Region::ResultsList), "");
    assert!(dash.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn search_failure_is_reported() {
    let dash = dashboard(FakeApi::default());
    dash.search("offline").await;
    assert!(dash
        .page()
        .status()
        .starts_with("Unable to search locations: "));
}

#[tokio::test(start_paused = true)]
async fn search_failure_text_is_escaped() {
    let dash = dashboard(FakeApi::default());
    dash.search("gateway").await;
    assert_eq!(
        dash.page().status(),
        "Unable to search locations: &lt;html&gt; error page"
    );
}

#[tokio::test(start_paused = true)]
async fn newer_search_wins_over_slow_search() {
    let api = FakeApi {
        search_latency: HashMap::from([("Tokyo", Duration::from_millis(300))]),
        ..FakeApi::default()
    };
    let dash = dashboard(api);

    tokio::join!(dash.search("Tokyo"), async {
        sleep(Duration::from_millis(20)).await;
        dash.search("Atlantis").await;
    });

    assert_eq!(
        dash.page().status(),
        "No matching locations found. Try a broader name."
    );
    assert!(dash.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_selection_does_nothing() {
    let dash = dashboard(FakeApi::default());
    assert!(dash.select_result(3).await.is_none());
    assert_eq!(dash.api.forecast_calls.load(Ordering::SeqCst), 0);
    assert!(dash.selection().is_none());
}

#[tokio::test(start_paused = true)]
async fn selecting_a_result_clears_the_pin() {
    let dash = dashboard(FakeApi::default());
    assert!(dash.pin_at(48.0, 2.0).await);
    assert_eq!(dash.globe().scene().points.len(), 1);

    dash.search("Tokyo").await;
    dash.select_result(0).await.expect("result 0");

    let scene = dash.globe().scene();
    assert!(scene.points.is_empty());
    assert!(scene.rings.is_empty());
    assert_eq!(
        dash.page().get(Region::PinnedCoords),
        "Pinned location: none"
    );
    assert_eq!(dash.selection().map(|p| p.name), Some("Tokyo".to_string()));
}

// ----------------------------------------------------------------------------
// Pins
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn pin_resolves_name_and_renders_weather() {
    let dash = dashboard(FakeApi::default());
    assert!(dash.pin_at(30.0, 120.0).await);

    let page = dash.page();
    assert_eq!(
        page.get(Region::PinnedCoords),
        "Pinned location: City 30, Region, Testland"
    );
    assert_eq!(
        page.get(Region::SelectedLocation),
        "City 30, Region, Testland"
    );
    assert!(page.weather_visible());

    let scene = dash.globe().scene();
    assert_eq!(scene.points.len(), 1);
    assert_eq!(scene.rings.len(), 2);
    assert!(!scene.auto_rotate);
}

#[tokio::test(start_paused = true)]
async fn reverse_geocoded_markup_is_escaped() {
    let dash = dashboard(FakeApi {
        city_names: HashMap::from([(77, "<b>Evil</b>")]),
        ..FakeApi::default()
    });
    assert!(dash.pin_at(77.0, 10.0).await);

    let page = dash.page();
    assert_eq!(
        page.get(Region::PinnedCoords),
        "Pinned location: &lt;b&gt;Evil&lt;/b&gt;, Region, Testland"
    );
    assert_eq!(
        page.get(Region::SelectedLocation),
        "&lt;b&gt;Evil&lt;/b&gt;, Region, Testland"
    );
    assert!(!page.get(Region::PinnedCoords).contains("<b>"));
}

#[tokio::test(start_paused = true)]
async fn resolved_name_survives_a_slower_weather_render() {
    let api = FakeApi {
        weather_latency: HashMap::from([(30, Duration::from_millis(400))]),
        ..FakeApi::default()
    };
    let dash = dashboard(api);

    tokio::join!(dash.pin_at(30.0, 120.0), async {
        sleep(Duration::from_millis(50)).await;
        assert_eq!(
            dash.page().get(Region::SelectedLocation),
            "City 30, Region, Testland"
        );
        assert_eq!(
            dash.page().status(),
            "Loading current weather and 7-day forecast..."
        );
    });

    assert_eq!(
        dash.page().get(Region::SelectedLocation),
        "City 30, Region, Testland"
    );
    assert!(dash.page().weather_visible());
}

#[tokio::test(start_paused = true)]
async fn stale_pin_never_overwrites_newer_pin() {
    let api = FakeApi {
        weather_latency: HashMap::from([(10, Duration::from_millis(300))]),
        geocode_latency: HashMap::from([(10, Duration::from_millis(400))]),
        ..FakeApi::default()
    };
    let dash = dashboard(api);

    let (_, settled) = tokio::join!(dash.pin_at(10.0, 10.0), async {
        sleep(Duration::from_millis(50)).await;
        dash.pin_at(20.0, 20.0).await;
        dash.page().snapshot(&ALL_REGIONS)
    });

    // Nothing changed once the newer pin finished.
    assert_eq!(dash.page().snapshot(&ALL_REGIONS), settled);

    let page = dash.page();
    assert_eq!(
        page.get(Region::PinnedCoords),
        "Pinned location: City 20, Region, Testland"
    );
    assert_eq!(
        page.get(Region::SelectedLocation),
        "City 20, Region, Testland"
    );
    assert!(page.get(Region::WeatherGrid).contains("20°C"));
    assert!(!page.get(Region::WeatherGrid).contains("10°C"));
    assert_eq!(dash.selection().map(|p| p.name), Some("City 20".to_string()));

    let scene = dash.globe().scene();
    assert_eq!(scene.points.len(), 1);
    assert_eq!(scene.points[0].lat, 20.0);
}

#[tokio::test(start_paused = true)]
async fn off_globe_coordinates_are_ignored() {
    let dash = dashboard(FakeApi::default());
    assert!(!dash.pin_at(f64::NAN, 0.0).await);
    assert!(!dash.pin_at(91.0, 0.0).await);
    assert!(!dash.pin_at(0.0, f64::INFINITY).await);
    assert_eq!(dash.sequencer().latest(Flow::Pin), 0);
    assert!(dash.globe().scene().points.is_empty());
}

// ----------------------------------------------------------------------------
// Weather and units
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn empty_forecast_shows_one_placeholder() {
    let api = FakeApi {
        forecast_days: Some(0),
        ..FakeApi::default()
    };
    let dash = dashboard(api);
    dash.fetch_weather(tokyo(), None).await;

    let page = dash.page();
    assert_eq!(page.get(Region::ForecastGrid), NO_FORECAST_PLACEHOLDER);
    assert_eq!(count(page.get(Region::ForecastGrid), "forecast-card"), 0);
    assert!(page.weather_visible());
}

#[tokio::test(start_paused = true)]
async fn fahrenheit_refetches_with_imperial_units() {
    let dash = dashboard(FakeApi::default());
    dash.search("Tokyo").await;
    dash.select_result(0).await.expect("result 0");

    let units = dash
        .set_units(UnitChange {
            temperature: Some(TemperatureUnit::Fahrenheit),
            ..UnitChange::default()
        })
        .await;

    assert_eq!(units.wind, WindUnit::Mph);
    assert_eq!(units.precipitation, PrecipitationUnit::Inch);
    assert_eq!(dash.api.forecast_calls.load(Ordering::SeqCst), 2);
    assert_eq!(*dash.api.last_units.lock().unwrap(), Some(units));
    assert!(dash.page().get(Region::WeatherGrid).contains("°F"));
}

#[tokio::test(start_paused = true)]
async fn unit_change_without_selection_only_records_units() {
    let dash = dashboard(FakeApi::default());
    let units = dash
        .set_units(UnitChange {
            pressure: Some(PressureUnit::Inhg),
            ..UnitChange::default()
        })
        .await;
    assert_eq!(units.pressure, PressureUnit::Inhg);
    assert_eq!(dash.units(), units);
    assert_eq!(dash.api.forecast_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_render() {
    let dash = dashboard(FakeApi::default());
    dash.search("Tokyo").await;
    dash.select_result(0).await.expect("result 0");
    let before = dash.page().get(Region::WeatherGrid).to_string();

    dash.api.fail_forecast.store(true, Ordering::SeqCst);
    dash.set_units(UnitChange {
        pressure: Some(PressureUnit::Inhg),
        ..UnitChange::default()
    })
    .await;

    let page = dash.page();
    assert!(page.status().starts_with("Unable to load weather: "));
    assert_eq!(page.get(Region::WeatherGrid), before);
    assert!(page.weather_visible());
}

// ----------------------------------------------------------------------------
// Globe style
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn overlay_is_fetched_once_across_style_switches() {
    let dash = dashboard(FakeApi::default());

    dash.apply_globe_style("borders").await;
    let scene = dash.globe().scene();
    assert_eq!(dash.page().get(Region::GlobeStyleStatus), "Borders loaded.");
    assert_eq!(scene.polygons.len(), 1);
    assert_eq!(scene.paths.len(), 1);
    assert_eq!(scene.labels.len(), 142);
    assert_eq!(
        scene.polygon_paint.as_ref().map(|p| p.cap.clone()),
        Some(CapFill::PerCountry)
    );

    dash.apply_globe_style("satellite_labels").await;
    let scene = dash.globe().scene();
    assert_eq!(dash.page().get(Region::GlobeStyleStatus), "Labels loaded.");
    assert!(scene.polygons.is_empty());
    assert_eq!(scene.labels.len(), 2 + 130);
    assert_eq!(scene.labels[5].color, "#c7d2fe");

    dash.apply_globe_style("cartographic_dark").await;
    let scene = dash.globe().scene();
    assert!(scene.labels.iter().all(|l| l.color == "#f8fafc"));
    assert_eq!(scene.path_color, Some("rgba(248, 250, 252, 0.58)"));

    assert_eq!(dash.api.overlay_loads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn superseded_style_never_draws_borders() {
    let api = FakeApi {
        overlay_latency: Duration::from_millis(200),
        ..FakeApi::default()
    };
    let dash = dashboard(api);

    tokio::join!(dash.apply_globe_style("borders"), async {
        sleep(Duration::from_millis(20)).await;
        dash.apply_globe_style("night").await;
    });

    let scene = dash.globe().scene();
    assert_eq!(scene.style.map(|s| s.key), Some("night"));
    assert!(scene.polygons.is_empty());
    assert!(scene.paths.is_empty());
    assert!(scene.labels.is_empty());
    assert_eq!(dash.page().get(Region::GlobeStyleStatus), "");
    assert_eq!(dash.style(), "night");
}

#[tokio::test(start_paused = true)]
async fn overlapping_overlay_styles_share_one_load() {
    let api = FakeApi {
        overlay_latency: Duration::from_millis(200),
        ..FakeApi::default()
    };
    let dash = dashboard(api);

    tokio::join!(dash.apply_globe_style("borders"), async {
        sleep(Duration::from_millis(20)).await;
        dash.apply_globe_style("satellite_labels").await;
    });

    let scene = dash.globe().scene();
    assert!(scene.polygons.is_empty());
    assert_eq!(scene.labels.len(), 132);
    assert_eq!(dash.page().get(Region::GlobeStyleStatus), "Labels loaded.");
    assert_eq!(dash.api.overlay_loads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_overlay_is_reported_and_retried() {
    let dash = dashboard(FakeApi::default());
    dash.api.fail_overlay.store(true, Ordering::SeqCst);

    dash.apply_globe_style("borders").await;
    let page = dash.page();
    assert_eq!(
        page.get(Region::GlobeStyleStatus),
        "Borders unavailable right now."
    );
    assert!(page.globe_style_error());

    dash.api.fail_overlay.store(false, Ordering::SeqCst);
    dash.apply_globe_style("borders").await;
    let page = dash.page();
    assert_eq!(page.get(Region::GlobeStyleStatus), "Borders loaded.");
    assert!(!page.globe_style_error());
    assert_eq!(dash.api.overlay_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn initialize_sets_camera_and_style() {
    let dash = dashboard(FakeApi::default());
    dash.initialize("no-such-style").await;

    let scene = dash.globe().scene();
    assert!(scene.auto_rotate);
    assert_eq!(scene.min_distance, MIN_CAMERA_DISTANCE);
    assert_eq!(scene.max_distance, MAX_CAMERA_DISTANCE);
    assert_eq!(scene.point_of_view.map(|v| v.altitude), Some(2.1));
    assert_eq!(dash.style(), "topographic");
    assert_eq!(dash.api.overlay_loads.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn reset_view_resumes_rotation() {
    let dash = dashboard(FakeApi::default());
    dash.pin_at(10.0, 10.0).await;
    assert!(!dash.globe().scene().auto_rotate);

    dash.reset_view();
    let scene = dash.globe().scene();
    assert!(scene.auto_rotate);
    assert_eq!(scene.last_transition_ms, RESET_VIEW_DURATION_MS);
    assert_eq!(
        dash.page().status(),
        "Globe view reset. Auto-rotate resumed."
    );
}

// ----------------------------------------------------------------------------
// Geolocation
// ----------------------------------------------------------------------------

fn dashboard_with_geolocation(result: Result<Coordinates, GeolocationError>) -> TestDashboard {
    located_dashboard(FakeApi::default(), result)
}

fn located_dashboard(
    api: FakeApi,
    result: Result<Coordinates, GeolocationError>,
) -> TestDashboard {
    Dashboard::new(
        api,
        SceneGlobe::new(),
        FakeGeolocator {
            result,
            latency: Duration::from_millis(100),
        },
        UnitPreferences::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn unsupported_geolocation_says_so() {
    let dash = dashboard(FakeApi::default());
    dash.use_my_location().await;
    assert!(dash.page().status().contains("not supported"));
    assert!(dash.selection().is_none());
}

#[tokio::test(start_paused = true)]
async fn denied_geolocation_reports_access_failure() {
    let dash = dashboard_with_geolocation(Err(GeolocationError::Denied));

    tokio::join!(dash.use_my_location(), async {
        sleep(Duration::from_millis(10)).await;
        assert_eq!(dash.page().status(), DETECTING_MESSAGE);
    });

    assert_eq!(
        dash.page().status(),
        "Unable to access your location: permission denied."
    );
    assert_eq!(dash.api.forecast_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn located_user_gets_weather_for_their_position() {
    let dash = dashboard_with_geolocation(Ok(Coordinates {
        latitude: 48.2,
        longitude: 16.4,
    }));
    dash.use_my_location().await;

    let page = dash.page();
    assert_eq!(
        page.get(Region::PinnedCoords),
        "Pinned location: City 48, Region, Testland"
    );
    assert!(page.weather_visible());
    assert!(page.get(Region::WeatherGrid).contains("48°C"));
    assert_eq!(dash.globe().scene().points[0].lat, 48.2);
}

#[tokio::test(start_paused = true)]
async fn geolocated_markup_is_escaped() {
    let api = FakeApi {
        city_names: HashMap::from([(48, "<img src=x>")]),
        ..FakeApi::default()
    };
    let dash = located_dashboard(
        api,
        Ok(Coordinates {
            latitude: 48.2,
            longitude: 16.4,
        }),
    );
    dash.use_my_location().await;

    assert_eq!(
        dash.page().get(Region::PinnedCoords),
        "Pinned location: &lt;img src=x&gt;, Region, Testland"
    );
}

#[tokio::test(start_paused = true)]
async fn geolocation_supersedes_pending_unit_refresh() {
    let api = FakeApi {
        weather_latency: HashMap::from([(36, Duration::from_millis(50))]),
        ..FakeApi::default()
    };
    let dash = located_dashboard(
        api,
        Ok(Coordinates {
            latitude: 48.2,
            longitude: 16.4,
        }),
    );
    dash.search("Tokyo").await;
    dash.select_result(0).await.expect("result 0");

    tokio::join!(
        dash.set_units(UnitChange {
            temperature: Some(TemperatureUnit::Fahrenheit),
            ..UnitChange::default()
        }),
        async {
            sleep(Duration::from_millis(10)).await;
            dash.use_my_location().await;
        },
        async {
            sleep(Duration::from_millis(70)).await;
            let page = dash.page();
            assert_eq!(page.status(), DETECTING_MESSAGE);
            assert!(!page.get(Region::WeatherGrid).contains("°F"));
        },
    );

    assert_eq!(dash.selection().map(|p| p.name), Some("City 48".to_string()));
    assert_eq!(
        dash.page().get(Region::PinnedCoords),
        "Pinned location: City 48, Region, Testland"
    );
    assert!(dash.page().get(Region::WeatherGrid).contains("°F"));
    assert_eq!(dash.api.forecast_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn globe_pin_supersedes_pending_geolocation() {
    let dash = dashboard_with_geolocation(Ok(Coordinates {
        latitude: 48.2,
        longitude: 16.4,
    }));

    tokio::join!(dash.use_my_location(), async {
        sleep(Duration::from_millis(10)).await;
        dash.pin_at(20.0, 20.0).await;
    });

    assert_eq!(dash.selection().map(|p| p.name), Some("City 20".to_string()));
    assert_eq!(dash.globe().scene().points[0].lat, 20.0);
    assert_eq!(dash.api.forecast_calls.load(Ordering::SeqCst), 1);
}
