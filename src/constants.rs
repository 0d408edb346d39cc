/// User agent string for HTTP requests
pub const USER_AGENT: &str = "globe-weather/0.1.0";

/// Open-Meteo forecast API base URL
pub const OPEN_METEO_API_BASE: &str = "https://api.open-meteo.com/v1";

/// Open-Meteo geocoding API base URL
pub const GEOCODING_API_BASE: &str = "https://geocoding-api.open-meteo.com/v1";

/// Open-Meteo air quality API base URL
pub const AIR_QUALITY_API_BASE: &str = "https://air-quality-api.open-meteo.com/v1";

/// BigDataCloud client-side reverse geocoding endpoint
pub const REVERSE_GEOCODE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

/// IP based geolocation endpoint
pub const IP_GEOLOCATION_URL: &str = "https://ipapi.co/json/";

/// Natural Earth 1:110m country polygons
pub const COUNTRY_BORDERS_URL: &str =
    "https://unpkg.com/globe.gl/example/datasets/ne_110m_admin_0_countries.geojson";

/// Natural Earth 1:50m first-order administrative divisions
pub const DOMESTIC_BORDERS_URL: &str = "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_50m_admin_1_states_provinces.geojson";

/// Variables requested for the "current" block of the forecast
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,cloud_cover,surface_pressure,wind_speed_10m";

/// Variables requested for the "hourly" block of the forecast
pub const HOURLY_FIELDS: &str = "temperature_2m";

/// Variables requested for the "daily" block of the forecast
pub const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset,uv_index_max";

/// Variables requested from the air quality API
pub const AIR_QUALITY_FIELDS: &str = "us_aqi,pm2_5,pm10,ozone";

/// Maximum number of geocoding matches requested per search
pub const GEOCODING_RESULT_COUNT: u32 = 10;

/// Number of forecast days requested
pub const FORECAST_DAYS: u32 = 7;

/// Number of hourly samples drawn on the chart
pub const HOURLY_CHART_SAMPLES: usize = 24;

/// Number of state labels shown by the labels-only overlay
pub const LABELS_ONLY_STATE_LIMIT: usize = 130;

/// Camera altitude of the default global view
pub const DEFAULT_VIEW_ALTITUDE: f64 = 2.1;

/// Duration of the reset-view camera animation in milliseconds
pub const RESET_VIEW_DURATION_MS: u64 = 900;

/// Auto-rotate speed when the globe is idle
pub const AUTO_ROTATE_SPEED: f64 = 0.35;

/// Closest camera distance; keeps the camera from clipping into the globe
pub const MIN_CAMERA_DISTANCE: f64 = 120.0;

/// Farthest camera distance
pub const MAX_CAMERA_DISTANCE: f64 = 760.0;
