use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::client::OpenMeteoClient;
use crate::dashboard::Dashboard;
use crate::geolocation::HostGeolocator;
use crate::globe::{SceneGlobe, GLOBE_STYLES};
use crate::models::{
    PinLocationRequest, SearchLocationsRequest, SelectLocationRequest, SetGlobeStyleRequest,
    SetUnitsRequest,
};
use crate::page::Region;
use crate::units::UnitChange;

pub type AppDashboard = Dashboard<OpenMeteoClient, SceneGlobe, HostGeolocator>;

const WEATHER_REGIONS: [Region; 11] = [
    Region::StatusMessage,
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

/// MCP front end for the dashboard. Each tool is one user action; replies
/// carry the page regions the action writes.
#[derive(Clone)]
pub struct DashboardServer {
    dashboard: Arc<AppDashboard>,
    tool_router: ToolRouter<Self>,
}

impl DashboardServer {
    pub fn new(dashboard: Arc<AppDashboard>) -> Self {
        Self {
            dashboard,
            tool_router: Self::tool_router(),
        }
    }

    fn page_reply(&self, regions: &[Region], extra: Value) -> Result<CallToolResult, McpError> {
        let mut body = self.dashboard.page().snapshot(regions);
        if let (Value::Object(body), Value::Object(extra)) = (&mut body, extra) {
            body.extend(extra);
        }
        reply(&body)
    }
}

fn reply(body: &Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(body)
        .map_err(|e| McpError::internal_error(format!("Failed to encode reply: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_handler]
impl ServerHandler for DashboardServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "globe-weather".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "An interactive weather dashboard around a 3D globe. Search for a place and \
                select a result, or pin any point on the globe, to see current conditions, \
                a 7-day forecast, air quality and alerts powered by Open-Meteo."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl DashboardServer {
    #[tool(description = "Search for locations by name (e.g., 'Tokyo'). Returns the matching places; pass a result's index to select_location.")]
    async fn search_locations(
        &self,
        Parameters(request): Parameters<SearchLocationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dashboard.search(&request.query).await;
        let results = self.dashboard.results();
        self.page_reply(
            &[Region::StatusMessage, Region::ResultsList],
            json!({ "results": results }),
        )
    }

    #[tool(description = "Select one of the latest search results by zero-based index and load its current weather, 7-day forecast, air quality and alerts.")]
    async fn select_location(
        &self,
        Parameters(request): Parameters<SelectLocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        let place = self
            .dashboard
            .select_result(request.index)
            .await
            .ok_or_else(|| {
                McpError::invalid_params(
                    format!(
                        "No search result at index {}. Run search_locations first.",
                        request.index
                    ),
                    None,
                )
            })?;
        self.page_reply(&WEATHER_REGIONS, json!({ "selection": place }))
    }

    #[tool(description = "Drop a pin on the globe at a latitude/longitude (e.g., latitude: 48.85, longitude: 2.35) and load the weather there.")]
    async fn pin_location(
        &self,
        Parameters(request): Parameters<PinLocationRequest>,
    ) -> Result<CallToolResult, McpError> {
        if !self
            .dashboard
            .pin_at(request.latitude, request.longitude)
            .await
        {
            return Err(McpError::invalid_params(
                "Latitude must be within [-90, 90] and longitude within [-180, 180].",
                None,
            ));
        }
        self.page_reply(
            &WEATHER_REGIONS,
            json!({ "selection": self.dashboard.selection() }),
        )
    }

    #[tool(description = "Change display units. temperature: celsius|fahrenheit, wind: kmh|mph|ms|kn, precipitation: mm|inch, pressure: hpa|inhg. Switching temperature also moves metric wind and precipitation to imperial (and back). Reloads the selected location.")]
    async fn set_units(
        &self,
        Parameters(request): Parameters<SetUnitsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let units = self
            .dashboard
            .set_units(UnitChange {
                temperature: request.temperature,
                wind: request.wind,
                precipitation: request.precipitation,
                pressure: request.pressure,
            })
            .await;
        self.page_reply(&WEATHER_REGIONS, json!({ "units": units }))
    }

    #[tool(description = "Switch the globe style: satellite, satellite_labels, topographic, night, borders, cartographic_light or cartographic_dark.")]
    async fn set_globe_style(
        &self,
        Parameters(request): Parameters<SetGlobeStyleRequest>,
    ) -> Result<CallToolResult, McpError> {
        if !GLOBE_STYLES.iter().any(|s| s.key == request.style) {
            tracing::warn!("Unknown globe style '{}', using default", request.style);
        }
        self.dashboard.apply_globe_style(&request.style).await;
        self.page_reply(
            &[Region::GlobeStyleStatus],
            json!({
                "style": self.dashboard.style(),
                "scene": self.dashboard.globe().summary(),
            }),
        )
    }

    #[tool(description = "Recentre the globe camera and resume auto-rotation.")]
    async fn reset_globe_view(&self) -> Result<CallToolResult, McpError> {
        self.dashboard.reset_view();
        self.page_reply(&[Region::StatusMessage], json!({}))
    }

    #[tool(description = "Detect the user's approximate location and load the weather there.")]
    async fn use_my_location(&self) -> Result<CallToolResult, McpError> {
        self.dashboard.use_my_location().await;
        self.page_reply(
            &WEATHER_REGIONS,
            json!({ "selection": self.dashboard.selection() }),
        )
    }

    #[tool(description = "Read the whole dashboard: every page region, the current selection and units.")]
    async fn get_dashboard(&self) -> Result<CallToolResult, McpError> {
        self.page_reply(
            &ALL_REGIONS,
            json!({
                "selection": self.dashboard.selection(),
                "units": self.dashboard.units(),
                "style": self.dashboard.style(),
            }),
        )
    }

    #[tool(description = "Read the globe scene: style, pin, camera and overlay layer sizes.")]
    async fn get_globe_scene(&self) -> Result<CallToolResult, McpError> {
        let scene = serde_json::to_value(self.dashboard.globe().summary())
            .map_err(|e| McpError::internal_error(format!("Failed to encode scene: {}", e), None))?;
        reply(&scene)
    }
}
