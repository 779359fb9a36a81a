//! City reference record

use serde::{Deserialize, Serialize};

/// A selectable city, built from the backend list or the fallback table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CityRecord {
    /// Backend identifier
    pub id: String,
    /// Display name, also the lookup key for city data
    pub name: String,
    /// Country name
    pub country: Option<String>,
}

impl CityRecord {
    /// Create a new city record
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: None,
        }
    }

    /// Create city record with country
    #[must_use]
    pub fn with_country(
        id: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: Some(country.into()),
        }
    }

    /// Label used by selectors, e.g. "Mendoza, Argentina"
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.name, country),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        let city = CityRecord::with_country("6", "Mendoza", "Argentina");
        assert_eq!(city.display_label(), "Mendoza, Argentina");

        let city = CityRecord::new("7", "Aksu");
        assert_eq!(city.display_label(), "Aksu");
    }
}
