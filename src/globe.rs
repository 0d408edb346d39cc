//! The 3D globe collaborator: visual styles, scene data and the trait the
//! dashboard drives.

use std::sync::Mutex;

use serde::Serialize;

use crate::overlay::{BorderPath, CountryPolygon, GlobeLabel};

const BLUE_MARBLE: &str = "https://unpkg.com/three-globe/example/img/earth-blue-marble.jpg";
const TOPOLOGY: &str = "https://unpkg.com/three-globe/example/img/earth-topology.png";
const NIGHT_LIGHTS: &str = "https://unpkg.com/three-globe/example/img/earth-night.jpg";
const NIGHT_SKY: &str = "https://unpkg.com/three-globe/example/img/night-sky.png";

pub const DEFAULT_STYLE: &str = "topographic";

/// Which border/label geometry a style draws over the imagery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    None,
    LabelsOnly,
    FullBorders,
    FullBordersLight,
    FullBordersDark,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobeStyle {
    pub key: &'static str,
    pub globe_image_url: &'static str,
    pub bump_image_url: &'static str,
    pub background_image_url: &'static str,
    pub background_color: &'static str,
    pub atmosphere_color: &'static str,
    pub atmosphere_altitude: f64,
    pub overlay_mode: OverlayMode,
}

pub static GLOBE_STYLES: [GlobeStyle; 7] = [
    GlobeStyle {
        key: "satellite",
        globe_image_url: BLUE_MARBLE,
        bump_image_url: "",
        background_image_url: "",
        background_color: "#081227",
        atmosphere_color: "#93c5fd",
        atmosphere_altitude: 0.2,
        overlay_mode: OverlayMode::None,
    },
    GlobeStyle {
        key: "satellite_labels",
        globe_image_url: BLUE_MARBLE,
        bump_image_url: "",
        background_image_url: "",
        background_color: "#081227",
        atmosphere_color: "#93c5fd",
        atmosphere_altitude: 0.2,
        overlay_mode: OverlayMode::LabelsOnly,
    },
    GlobeStyle {
        key: "topographic",
        globe_image_url: BLUE_MARBLE,
        bump_image_url: TOPOLOGY,
        background_image_url: "",
        background_color: "#060b1f",
        atmosphere_color: "#7dd3fc",
        atmosphere_altitude: 0.24,
        overlay_mode: OverlayMode::None,
    },
    GlobeStyle {
        key: "night",
        globe_image_url: NIGHT_LIGHTS,
        bump_image_url: "",
        background_image_url: NIGHT_SKY,
        background_color: "#020617",
        atmosphere_color: "#67e8f9",
        atmosphere_altitude: 0.18,
        overlay_mode: OverlayMode::None,
    },
    GlobeStyle {
        key: "borders",
        globe_image_url: BLUE_MARBLE,
        bump_image_url: TOPOLOGY,
        background_image_url: "",
        background_color: "#050d24",
        atmosphere_color: "#a5f3fc",
        atmosphere_altitude: 0.22,
        overlay_mode: OverlayMode::FullBorders,
    },
    GlobeStyle {
        key: "cartographic_light",
        globe_image_url: TOPOLOGY,
        bump_image_url: "",
        background_image_url: "",
        background_color: "#dbeafe",
        atmosphere_color: "#93c5fd",
        atmosphere_altitude: 0.16,
        overlay_mode: OverlayMode::FullBordersLight,
    },
    GlobeStyle {
        key: "cartographic_dark",
        globe_image_url: TOPOLOGY,
        bump_image_url: "",
        background_image_url: "",
        background_color: "#020617",
        atmosphere_color: "#60a5fa",
        atmosphere_altitude: 0.16,
        overlay_mode: OverlayMode::FullBordersDark,
    },
];

/// Looks up a style by key, falling back to the topographic style.
pub fn globe_style(key: &str) -> &'static GlobeStyle {
    GLOBE_STYLES
        .iter()
        .find(|s| s.key == key)
        .or_else(|| GLOBE_STYLES.iter().find(|s| s.key == DEFAULT_STYLE))
        .unwrap_or(&GLOBE_STYLES[2])
}

/// How polygon caps are filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapFill {
    /// Each country uses its own name-derived colour.
    PerCountry,
    Uniform(&'static str),
}

/// Colours for a bordered overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPaint {
    pub cap: CapFill,
    pub side_color: &'static str,
    pub stroke_color: &'static str,
    pub domestic_line_color: &'static str,
    pub label_color: &'static str,
}

impl OverlayPaint {
    pub fn for_mode(mode: OverlayMode) -> Self {
        let (cap, stroke_color, domestic_line_color, label_color) = match mode {
            OverlayMode::FullBordersLight => (
                CapFill::Uniform("rgba(59, 130, 246, 0.14)"),
                "rgba(37, 99, 235, 0.8)",
                "rgba(30, 64, 175, 0.45)",
                "#1e3a8a",
            ),
            OverlayMode::FullBordersDark => (
                CapFill::Uniform("rgba(96, 165, 250, 0.12)"),
                "rgba(147, 197, 253, 0.9)",
                "rgba(248, 250, 252, 0.58)",
                "#f8fafc",
            ),
            _ => (
                CapFill::PerCountry,
                "rgba(14, 165, 233, 0.95)",
                "rgba(251, 191, 36, 0.88)",
                "#f8fafc",
            ),
        };
        Self {
            cap,
            side_color: "rgba(0,0,0,0)",
            stroke_color,
            domestic_line_color,
            label_color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobePoint {
    pub lat: f64,
    pub lng: f64,
    pub size: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobeRing {
    pub lat: f64,
    pub lng: f64,
    pub color: &'static str,
    pub max_radius: f64,
    pub propagation_speed: f64,
    pub repeat_period_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointOfView {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
}

/// The pin marker: one point and two pulsing rings.
pub fn pin_marker(lat: f64, lng: f64) -> (GlobePoint, [GlobeRing; 2]) {
    (
        GlobePoint {
            lat,
            lng,
            size: 0.05,
            color: "#ff2d55",
        },
        [
            GlobeRing {
                lat,
                lng,
                color: "rgba(255, 255, 255, 0.9)",
                max_radius: 2.8,
                propagation_speed: 2.0,
                repeat_period_ms: 1200,
            },
            GlobeRing {
                lat,
                lng,
                color: "rgba(255, 45, 85, 0.72)",
                max_radius: 4.5,
                propagation_speed: 1.6,
                repeat_period_ms: 1650,
            },
        ],
    )
}

/// A 3D globe renderer.
///
/// Setters replace the whole data set of their layer.
pub trait Globe: Send + Sync {
    /// Imagery, background and atmosphere of a style. Overlays are untouched.
    fn apply_imagery(&self, style: &GlobeStyle);
    fn set_points(&self, points: &[GlobePoint]);
    fn set_rings(&self, rings: &[GlobeRing]);
    fn set_polygons(&self, polygons: &[CountryPolygon], paint: Option<&OverlayPaint>);
    fn set_paths(&self, paths: &[BorderPath], color: Option<&'static str>);
    fn set_labels(&self, labels: &[GlobeLabel]);
    fn set_auto_rotate(&self, enabled: bool);
    fn set_camera_limits(&self, min_distance: f64, max_distance: f64, auto_rotate_speed: f64);
    fn point_of_view(&self, view: PointOfView, transition_ms: u64);
}

/// Everything a globe is currently showing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    pub style: Option<GlobeStyle>,
    pub points: Vec<GlobePoint>,
    pub rings: Vec<GlobeRing>,
    #[serde(skip)]
    pub polygons: Vec<CountryPolygon>,
    pub polygon_paint: Option<OverlayPaint>,
    #[serde(skip)]
    pub paths: Vec<BorderPath>,
    pub path_color: Option<&'static str>,
    #[serde(skip)]
    pub labels: Vec<GlobeLabel>,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub point_of_view: Option<PointOfView>,
    pub last_transition_ms: u64,
}

/// Compact view of a scene, with overlay layers reduced to counts.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    #[serde(flatten)]
    pub scene: Scene,
    pub polygon_count: usize,
    pub path_count: usize,
    pub label_count: usize,
}

/// A globe that keeps its scene in memory. Front ends read it back with
/// [`SceneGlobe::scene`].
#[derive(Debug, Default)]
pub struct SceneGlobe {
    scene: Mutex<Scene>,
}

impl SceneGlobe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> Scene {
        self.lock().clone()
    }

    pub fn summary(&self) -> SceneSummary {
        let scene = self.scene();
        SceneSummary {
            polygon_count: scene.polygons.len(),
            path_count: scene.paths.len(),
            label_count: scene.labels.len(),
            scene,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Scene> {
        // Setters replace whole layers, so a poisoned scene is still consistent.
        self.scene.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Globe for SceneGlobe {
    fn apply_imagery(&self, style: &GlobeStyle) {
        self.lock().style = Some(style.clone());
    }

    fn set_points(&self, points: &[GlobePoint]) {
        self.lock().points = points.to_vec();
    }

    fn set_rings(&self, rings: &[GlobeRing]) {
        self.lock().rings = rings.to_vec();
    }

    fn set_polygons(&self, polygons: &[CountryPolygon], paint: Option<&OverlayPaint>) {
        let mut scene = self.lock();
        scene.polygons = polygons.to_vec();
        scene.polygon_paint = paint.cloned();
    }

    fn set_paths(&self, paths: &[BorderPath], color: Option<&'static str>) {
        let mut scene = self.lock();
        scene.paths = paths.to_vec();
        scene.path_color = color;
    }

    fn set_labels(&self, labels: &[GlobeLabel]) {
        self.lock().labels = labels.to_vec();
    }

    fn set_auto_rotate(&self, enabled: bool) {
        self.lock().auto_rotate = enabled;
    }

    fn set_camera_limits(&self, min_distance: f64, max_distance: f64, auto_rotate_speed: f64) {
        let mut scene = self.lock();
        scene.min_distance = min_distance;
        scene.max_distance = max_distance;
        scene.auto_rotate_speed = auto_rotate_speed;
    }

    fn point_of_view(&self, view: PointOfView, transition_ms: u64) {
        let mut scene = self.lock();
        scene.point_of_view = Some(view);
        scene.last_transition_ms = transition_ms;
    }
}
