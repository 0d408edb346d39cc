//! Border and label geometry drawn over the globe by the bordered styles.
//!
//! The two GeoJSON sources are fetched at most once successfully per process
//! and then shared read-only by every style switch.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::error::FetchError;
use crate::models::{Feature, FeatureCollection, Geometry, Position};

const COUNTRY_NAME_KEYS: [&str; 3] = ["NAME", "ADMIN", "SOVEREIGNT"];
const STATE_NAME_KEYS: [&str; 4] = ["name", "name_en", "name_local", "postal"];

const COUNTRY_PALETTE: [&str; 8] = [
    "rgba(14, 165, 233, 0.28)",
    "rgba(99, 102, 241, 0.25)",
    "rgba(16, 185, 129, 0.24)",
    "rgba(234, 179, 8, 0.22)",
    "rgba(249, 115, 22, 0.24)",
    "rgba(236, 72, 153, 0.22)",
    "rgba(168, 85, 247, 0.22)",
    "rgba(34, 197, 94, 0.22)",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    fn from_position(position: &Position) -> Option<Self> {
        match position.as_slice() {
            [lng, lat, ..] => Some(Self { lat: *lat, lng: *lng }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryPolygon {
    pub name: String,
    pub fill_color: &'static str,
    /// Outer ring first, then holes; one entry per polygon part.
    pub parts: Vec<Vec<Vec<LatLng>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderPath {
    pub coords: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobeLabel {
    pub lat: f64,
    pub lng: f64,
    pub text: String,
    pub size: f64,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayData {
    pub countries: Vec<CountryPolygon>,
    pub domestic_paths: Vec<BorderPath>,
    pub country_labels: Vec<GlobeLabel>,
    pub state_labels: Vec<GlobeLabel>,
}

impl OverlayData {
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.domestic_paths.is_empty()
    }

    /// Builds overlay geometry from the country and sub-national documents.
    pub fn from_geojson(countries: &FeatureCollection, domestic: &FeatureCollection) -> Self {
        let countries_out: Vec<CountryPolygon> = countries
            .features
            .iter()
            .filter_map(|feature| {
                let name = feature_name(feature, &COUNTRY_NAME_KEYS);
                let parts = polygon_parts(feature.geometry.as_ref()?);
                if parts.is_empty() {
                    return None;
                }
                Some(CountryPolygon {
                    fill_color: color_from_name(&name),
                    name,
                    parts,
                })
            })
            .collect();

        let country_labels = labels(&countries.features, &COUNTRY_NAME_KEYS, 0.75, "#fefce8");
        let state_labels = labels(&domestic.features, &STATE_NAME_KEYS, 0.52, "#c7d2fe");

        Self {
            countries: countries_out,
            domestic_paths: extract_domestic_paths(domestic),
            country_labels,
            state_labels,
        }
    }
}

fn to_line(positions: &[Position]) -> Vec<LatLng> {
    positions.iter().filter_map(LatLng::from_position).collect()
}

fn polygon_parts(geometry: &Geometry) -> Vec<Vec<Vec<LatLng>>> {
    match geometry {
        Geometry::Polygon { coordinates } => {
            vec![coordinates.iter().map(|ring| to_line(ring)).collect()]
        }
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|polygon| polygon.iter().map(|ring| to_line(ring)).collect())
            .collect(),
        _ => Vec::new(),
    }
}

/// First non-blank string property among `keys`.
fn feature_name(feature: &Feature, keys: &[&str]) -> String {
    let empty = Map::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);
    keys.iter()
        .filter_map(|key| match properties.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .next()
        .unwrap_or_default()
}

/// Stable palette colour for a name (31-based string hash over UTF-16 units).
pub fn color_from_name(name: &str) -> &'static str {
    let normalized = if name.is_empty() { "default" } else { name };
    let hash = normalized
        .encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as u32));
    COUNTRY_PALETTE[hash as usize % COUNTRY_PALETTE.len()]
}

fn ring_centroid(ring: &[Position]) -> Option<LatLng> {
    let points = to_line(ring);
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(LatLng {
        lat: lat / n,
        lng: lng / n,
    })
}

/// Vertex average of the first ring/line of a geometry.
pub fn geometry_centroid(geometry: &Geometry) -> Option<LatLng> {
    match geometry {
        Geometry::Polygon { coordinates } => ring_centroid(coordinates.first()?),
        Geometry::MultiPolygon { coordinates } => ring_centroid(coordinates.first()?.first()?),
        Geometry::LineString { coordinates } => ring_centroid(coordinates),
        Geometry::MultiLineString { coordinates } => ring_centroid(coordinates.first()?),
        Geometry::Unsupported => None,
    }
}

fn labels(features: &[Feature], keys: &[&str], size: f64, color: &str) -> Vec<GlobeLabel> {
    features
        .iter()
        .filter_map(|feature| {
            let centroid = geometry_centroid(feature.geometry.as_ref()?)?;
            let text = feature_name(feature, keys);
            if text.is_empty() {
                return None;
            }
            Some(GlobeLabel {
                lat: centroid.lat,
                lng: centroid.lng,
                text,
                size,
                color: color.to_string(),
            })
        })
        .collect()
}

/// Flattens every line and ring of the sub-national document into paths.
pub fn extract_domestic_paths(collection: &FeatureCollection) -> Vec<BorderPath> {
    let mut paths = Vec::new();
    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        match geometry {
            Geometry::LineString { coordinates } => paths.push(BorderPath {
                coords: to_line(coordinates),
            }),
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                paths.extend(coordinates.iter().map(|line| BorderPath {
                    coords: to_line(line),
                }));
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    paths.extend(polygon.iter().map(|ring| BorderPath {
                        coords: to_line(ring),
                    }));
                }
            }
            Geometry::Unsupported => {}
        }
    }
    paths
}

/// Process-wide, single-flight cache of the overlay geometry.
///
/// Concurrent callers share one in-flight load. Only a successful load is
/// kept; after a failure the next caller starts a fresh one.
#[derive(Debug, Default)]
pub struct OverlayCache {
    cell: OnceCell<Arc<OverlayData>>,
}

impl OverlayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached overlay or runs `load` to produce it.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<OverlayData>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OverlayData, FetchError>>,
    {
        self.cell
            .get_or_try_init(|| async move {
                let data = load().await?;
                if data.is_empty() {
                    return Err(FetchError::MissingData("border data was empty"));
                }
                tracing::info!(
                    "Border overlay loaded: {} countries, {} domestic paths",
                    data.countries.len(),
                    data.domestic_paths.len()
                );
                Ok(Arc::new(data))
            })
            .await
            .cloned()
    }

    #[cfg(test)]
    pub fn get(&self) -> Option<Arc<OverlayData>> {
        self.cell.get().cloned()
    }
}
