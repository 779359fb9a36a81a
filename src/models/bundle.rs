//! The unit handed to the view and its provenance

use serde::{Deserialize, Serialize};

use super::{CurrentReading, Prediction};
use crate::Result;

/// Current reading plus next-day prediction for one city; never partially filled
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityDataBundle {
    pub current: CurrentReading,
    pub prediction: Prediction,
}

impl CityDataBundle {
    #[must_use]
    pub fn new(current: CurrentReading, prediction: Prediction) -> Self {
        Self {
            current,
            prediction,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.current.validate()?;
        self.prediction.validate()
    }
}

/// Where a bundle came from
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    /// Fresh from the backend
    Live,
    /// Substituted from the static fallback table
    Fallback,
}

/// Outcome of resolving one city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolutionResult {
    pub bundle: CityDataBundle,
    pub source: DataSource,
    /// Why the live source was not used, if it was attempted and failed
    pub error_message: Option<String>,
}

impl ResolutionResult {
    #[must_use]
    pub fn live(bundle: CityDataBundle) -> Self {
        Self {
            bundle,
            source: DataSource::Live,
            error_message: None,
        }
    }

    #[must_use]
    pub fn fallback(bundle: CityDataBundle, error_message: Option<String>) -> Self {
        Self {
            bundle,
            source: DataSource::Fallback,
            error_message,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.source == DataSource::Fallback
    }
}
