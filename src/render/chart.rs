use super::escape_html;
use crate::constants::HOURLY_CHART_SAMPLES;
use crate::models::{HourlyData, HourlyUnits};

/// Pixel box the hourly chart is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub pad_x: f64,
    pub pad_y: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 220.0,
            pad_x: 28.0,
            pad_y: 24.0,
        }
    }
}

impl ChartGeometry {
    /// Maps temperatures onto the plot area. The coldest sample sits on the
    /// bottom padding line and the warmest on the top one; the temperature
    /// range is floored at 1 so flat series stay finite.
    pub fn points(&self, temperatures: &[f64]) -> Vec<(f64, f64)> {
        if temperatures.is_empty() {
            return Vec::new();
        }

        let min = temperatures.iter().copied().fold(f64::INFINITY, f64::min);
        let max = temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = (max - min).max(1.0);
        let plot_w = self.width - 2.0 * self.pad_x;
        let plot_h = self.height - 2.0 * self.pad_y;
        let step = if temperatures.len() > 1 {
            plot_w / (temperatures.len() - 1) as f64
        } else {
            0.0
        };

        temperatures
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let x = self.pad_x + step * i as f64;
                let y = self.height - self.pad_y - (t - min) / range * plot_h;
                (x, y)
            })
            .collect()
    }
}

/// Index of the first hourly sample at or after `now` (both ISO local
/// times from the same response, so they compare lexicographically).
fn window_start(times: &[String], now: Option<&str>) -> usize {
    match now {
        Some(now) => times.iter().position(|t| t.as_str() >= now).unwrap_or(0),
        None => 0,
    }
}

/// Renders up to 24 hourly temperatures from `now` onward as an SVG line chart
pub fn format_hourly_chart(
    hourly: &HourlyData,
    units: &HourlyUnits,
    now: Option<&str>,
    geometry: ChartGeometry,
) -> String {
    let start = window_start(&hourly.time, now);
    let samples: Vec<f64> = hourly
        .temperature
        .iter()
        .skip(start)
        .take(HOURLY_CHART_SAMPLES)
        .copied()
        .collect();

    let mut output = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" role=\"img\" aria-label=\"Hourly temperature\">\n",
        geometry.width, geometry.height
    );

    if samples.is_empty() {
        output.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" class=\"chart-empty\">No hourly data</text>\n</svg>",
            geometry.width / 2.0,
            geometry.height / 2.0
        ));
        return output;
    }

    let points = geometry.points(&samples);
    let polyline = points
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ");
    output.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"#38bdf8\" stroke-width=\"2\" points=\"{}\" />\n",
        polyline
    ));

    let unit = escape_html(&units.temperature);
    for (i, ((x, y), temp)) in points.iter().zip(&samples).enumerate() {
        let hour = hourly
            .time
            .get(start + i)
            .and_then(|t| t.split('T').nth(1))
            .unwrap_or("");
        output.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#f8fafc\"><title>{} {}{}</title></circle>\n",
            x,
            y,
            escape_html(hour),
            temp,
            unit
        ));
    }
    output.push_str("</svg>");
    output
}
