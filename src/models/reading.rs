//! Current air-quality reading and PM2.5 quality classification

use serde::{Deserialize, Serialize};

use crate::{AirWatchError, Result};

/// Air quality category derived from a PM2.5 concentration, ordered by severity
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityLevel {
    /// pm25 <= 12
    Good,
    /// pm25 <= 35
    Moderate,
    /// pm25 <= 55
    UnhealthySensitive,
    /// pm25 <= 150
    Unhealthy,
    /// pm25 > 150
    Hazardous,
}

impl QualityLevel {
    /// Classify a PM2.5 concentration in μg/m³.
    ///
    /// Thresholds are closed at the upper bound: 12.0 is `Good`, 12.01 is `Moderate`.
    /// Anything that fails every bound (including NaN) lands in `Hazardous`.
    #[must_use]
    pub fn classify(pm25: f64) -> Self {
        if pm25 <= 12.0 {
            Self::Good
        } else if pm25 <= 35.0 {
            Self::Moderate
        } else if pm25 <= 55.0 {
            Self::UnhealthySensitive
        } else if pm25 <= 150.0 {
            Self::Unhealthy
        } else {
            Self::Hazardous
        }
    }

    /// Human readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for sensitive groups",
            Self::Unhealthy => "Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

/// Current measurements for a city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentReading {
    /// PM2.5 concentration in μg/m³
    pub pm25: f64,
    /// Air Quality Index
    pub aqi: u32,
    /// Always derived from `pm25`, never taken from the source
    pub quality_level: QualityLevel,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent (0-100)
    pub humidity: f64,
}

impl CurrentReading {
    #[must_use]
    pub fn new(pm25: f64, aqi: u32, temperature: f64, humidity: f64) -> Self {
        Self {
            pm25,
            aqi,
            quality_level: QualityLevel::classify(pm25),
            temperature,
            humidity,
        }
    }

    /// Check the numeric ranges a reading must satisfy before it reaches the view
    pub fn validate(&self) -> Result<()> {
        if !self.pm25.is_finite() || self.pm25 < 0.0 {
            return Err(AirWatchError::validation(format!(
                "pm25 must be a non-negative number, got: {}",
                self.pm25
            )));
        }
        if !self.temperature.is_finite() {
            return Err(AirWatchError::validation("temperature must be a finite number"));
        }
        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(AirWatchError::validation(format!(
                "humidity must be between 0 and 100, got: {}",
                self.humidity
            )));
        }
        Ok(())
    }

    /// Format PM2.5 with unit
    #[must_use]
    pub fn format_pm25(&self) -> String {
        format!("{:.1} μg/m³", self.pm25)
    }
}
