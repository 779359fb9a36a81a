//! Next-day PM2.5 prediction and the requests that produce one

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AirWatchError, Result};

/// Shortest history the model accepts, in days
pub const MIN_SEQUENCE_DAYS: usize = 10;
/// Longest history the model accepts, in days
pub const MAX_SEQUENCE_DAYS: usize = 12;
/// Values per day: [PM2.5, NO2]
pub const VALUES_PER_DAY: usize = 2;

/// Model output for the next day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted PM2.5 concentration in μg/m³
    pub predicted_pm25: f64,
    /// Day the prediction applies to
    pub prediction_date: NaiveDate,
    /// Model confidence (0.0-1.0)
    pub confidence: f64,
}

impl Prediction {
    #[must_use]
    pub fn new(predicted_pm25: f64, prediction_date: NaiveDate, confidence: f64) -> Self {
        Self {
            predicted_pm25,
            prediction_date,
            confidence,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.predicted_pm25.is_finite() || self.predicted_pm25 < 0.0 {
            return Err(AirWatchError::validation(format!(
                "predicted pm25 must be a non-negative number, got: {}",
                self.predicted_pm25
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AirWatchError::validation(format!(
                "confidence must be between 0 and 1, got: {}",
                self.confidence
            )));
        }
        Ok(())
    }

    /// Confidence as a whole percentage
    #[must_use]
    pub fn confidence_percent(&self) -> u8 {
        // validated range keeps this within 0..=100
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

/// Body of a `POST /api/predict` call
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PredictionRequest {
    /// Let the backend use its own history for the city
    City { city: String },
    /// Explicit daily history, oldest first, each day `[pm25, no2]`
    Sequence { sequence: Vec<[f64; VALUES_PER_DAY]> },
}

impl PredictionRequest {
    pub fn for_city(city: impl Into<String>) -> Self {
        Self::City { city: city.into() }
    }

    /// Build a sequence request from loosely shaped rows, checking length and shape
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut sequence = Vec::with_capacity(rows.len());
        for (day, row) in rows.into_iter().enumerate() {
            let values: [f64; VALUES_PER_DAY] = row.try_into().map_err(|row: Vec<f64>| {
                AirWatchError::validation(format!(
                    "day {} must have exactly {} values [PM2.5, NO2], got {}",
                    day + 1,
                    VALUES_PER_DAY,
                    row.len()
                ))
            })?;
            sequence.push(values);
        }
        let request = Self::Sequence { sequence };
        request.validate()?;
        Ok(request)
    }

    /// Reject malformed input before it is sent anywhere
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::City { city } => {
                if city.trim().is_empty() {
                    return Err(AirWatchError::validation("city cannot be empty"));
                }
            }
            Self::Sequence { sequence } => {
                if !(MIN_SEQUENCE_DAYS..=MAX_SEQUENCE_DAYS).contains(&sequence.len()) {
                    return Err(AirWatchError::validation(format!(
                        "sequence must have {} to {} days, got {}",
                        MIN_SEQUENCE_DAYS,
                        MAX_SEQUENCE_DAYS,
                        sequence.len()
                    )));
                }
                for (day, values) in sequence.iter().enumerate() {
                    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(AirWatchError::validation(format!(
                            "day {} must contain non-negative numbers only",
                            day + 1
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
