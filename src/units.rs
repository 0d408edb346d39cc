//! Display unit preferences and the rules that couple them.

use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::UnknownUnit;

/// hPa to inHg.
const HPA_TO_INHG: f64 = 0.029_53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WindUnit {
    // Open-Meteo expects "kmh" rather than "km/h".
    #[default]
    Kmh,
    Mph,
    Ms,
    Kn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationUnit {
    #[default]
    Mm,
    Inch,
}

/// Surface pressure is always fetched in hPa and converted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Hpa,
    Inhg,
}

impl TemperatureUnit {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }
}

impl WindUnit {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Mph => "mph",
            Self::Ms => "ms",
            Self::Kn => "kn",
        }
    }

    fn is_metric(self) -> bool {
        matches!(self, Self::Kmh | Self::Ms)
    }
}

impl PrecipitationUnit {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Inch => "inch",
        }
    }
}

impl PressureUnit {
    /// Converts a value reported in hPa into this unit.
    pub fn convert_from_hpa(self, hpa: f64) -> f64 {
        match self {
            Self::Hpa => hpa,
            Self::Inhg => (hpa * HPA_TO_INHG * 100.0).round() / 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hpa => "hPa",
            Self::Inhg => "inHg",
        }
    }
}

macro_rules! unit_from_str {
    ($ty:ty, $kind:literal, { $($text:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = UnknownUnit;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    _ => Err(UnknownUnit { kind: $kind, value: s.to_string() }),
                }
            }
        }
    };
}

unit_from_str!(TemperatureUnit, "temperature", {
    "celsius" => TemperatureUnit::Celsius,
    "fahrenheit" => TemperatureUnit::Fahrenheit,
});
unit_from_str!(WindUnit, "wind speed", {
    "kmh" => WindUnit::Kmh,
    "km/h" => WindUnit::Kmh,
    "mph" => WindUnit::Mph,
    "ms" => WindUnit::Ms,
    "m/s" => WindUnit::Ms,
    "kn" => WindUnit::Kn,
});
unit_from_str!(PrecipitationUnit, "precipitation", {
    "mm" => PrecipitationUnit::Mm,
    "inch" => PrecipitationUnit::Inch,
});
unit_from_str!(PressureUnit, "pressure", {
    "hpa" => PressureUnit::Hpa,
    "inhg" => PressureUnit::Inhg,
});

/// The unit selections that drive forecast requests and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct UnitPreferences {
    pub temperature: TemperatureUnit,
    pub wind: WindUnit,
    pub precipitation: PrecipitationUnit,
    pub pressure: PressureUnit,
}

impl UnitPreferences {
    /// Switches the temperature unit, dragging metric wind and precipitation
    /// along to imperial when moving to fahrenheit (and back again).
    ///
    /// Only units still on the "other" system are touched, so an explicit
    /// knots or m/s choice survives a switch back to celsius.
    pub fn with_temperature(mut self, unit: TemperatureUnit) -> Self {
        if unit == self.temperature {
            return self;
        }
        self.temperature = unit;
        match unit {
            TemperatureUnit::Fahrenheit => {
                if self.wind.is_metric() {
                    self.wind = WindUnit::Mph;
                }
                if self.precipitation == PrecipitationUnit::Mm {
                    self.precipitation = PrecipitationUnit::Inch;
                }
            }
            TemperatureUnit::Celsius => {
                if self.wind == WindUnit::Mph {
                    self.wind = WindUnit::Kmh;
                }
                if self.precipitation == PrecipitationUnit::Inch {
                    self.precipitation = PrecipitationUnit::Mm;
                }
            }
        }
        self
    }

    /// Applies a partial change. The temperature coupling runs first so an
    /// explicit wind or precipitation choice in the same change wins.
    pub fn apply(self, change: UnitChange) -> Self {
        let mut next = match change.temperature {
            Some(unit) => self.with_temperature(unit),
            None => self,
        };
        if let Some(wind) = change.wind {
            next.wind = wind;
        }
        if let Some(precipitation) = change.precipitation {
            next.precipitation = precipitation;
        }
        if let Some(pressure) = change.pressure {
            next.pressure = pressure;
        }
        next
    }
}

/// A partial unit update; `None` leaves the current selection alone.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct UnitChange {
    pub temperature: Option<TemperatureUnit>,
    pub wind: Option<WindUnit>,
    pub precipitation: Option<PrecipitationUnit>,
    pub pressure: Option<PressureUnit>,
}

impl fmt::Display for UnitPreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.temperature.as_query(),
            self.wind.as_query(),
            self.precipitation.as_query(),
            self.pressure.label()
        )
    }
}
