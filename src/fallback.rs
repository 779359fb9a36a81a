//! Static last-known readings used when the backend cannot answer
//!
//! One canonical dataset for every city the widget offers. Lookups are exact and
//! case-sensitive.

use chrono::{Days, NaiveDate, Utc};

use crate::models::{CityDataBundle, CityRecord, CurrentReading, Prediction};

/// One row of the fallback table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    pub pm25: f64,
    pub aqi: u32,
    pub temperature: f64,
    pub humidity: f64,
    pub predicted_pm25: f64,
    pub confidence: f64,
}

impl FallbackEntry {
    /// Build a complete bundle whose prediction applies to the day after `today`
    #[must_use]
    pub fn to_bundle(&self, today: NaiveDate) -> CityDataBundle {
        let prediction_date = today.checked_add_days(Days::new(1)).unwrap_or(today);
        CityDataBundle::new(
            CurrentReading::new(self.pm25, self.aqi, self.temperature, self.humidity),
            Prediction::new(self.predicted_pm25, prediction_date, self.confidence),
        )
    }

    #[must_use]
    pub fn to_city_record(&self) -> CityRecord {
        CityRecord::with_country(self.id, self.name, self.country)
    }
}

const ENTRIES: &[FallbackEntry] = &[
    FallbackEntry {
        id: "1",
        name: "Ciudad de México",
        country: "Mexico",
        pm25: 38.4,
        aqi: 108,
        temperature: 22.1,
        humidity: 48.0,
        predicted_pm25: 35.9,
        confidence: 0.82,
    },
    FallbackEntry {
        id: "2",
        name: "Nueva York",
        country: "USA",
        pm25: 14.2,
        aqi: 55,
        temperature: 18.5,
        humidity: 62.0,
        predicted_pm25: 15.1,
        confidence: 0.85,
    },
    FallbackEntry {
        id: "3",
        name: "Los Ángeles",
        country: "USA",
        pm25: 27.6,
        aqi: 84,
        temperature: 24.3,
        humidity: 55.0,
        predicted_pm25: 26.2,
        confidence: 0.84,
    },
    FallbackEntry {
        id: "4",
        name: "Madrid",
        country: "Spain",
        pm25: 11.8,
        aqi: 49,
        temperature: 20.7,
        humidity: 41.0,
        predicted_pm25: 12.4,
        confidence: 0.87,
    },
    FallbackEntry {
        id: "5",
        name: "Londres",
        country: "UK",
        pm25: 9.6,
        aqi: 40,
        temperature: 13.2,
        humidity: 76.0,
        predicted_pm25: 10.3,
        confidence: 0.86,
    },
    FallbackEntry {
        id: "6",
        name: "Mendoza",
        country: "Argentina",
        pm25: 22.3,
        aqi: 72,
        temperature: 17.8,
        humidity: 38.0,
        predicted_pm25: 21.5,
        confidence: 0.83,
    },
    FallbackEntry {
        id: "7",
        name: "Aksu",
        country: "China",
        pm25: 167.3,
        aqi: 217,
        temperature: 9.4,
        humidity: 29.0,
        predicted_pm25: 159.7,
        confidence: 0.78,
    },
];

/// Read-only view over the canonical fallback dataset
#[derive(Debug, Clone, Copy)]
pub struct FallbackTable {
    entries: &'static [FallbackEntry],
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self { entries: ENTRIES }
    }
}

impl FallbackTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact, case-sensitive lookup
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static FallbackEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Complete bundle for `name`, with the prediction dated tomorrow
    #[must_use]
    pub fn bundle_for(&self, name: &str) -> Option<CityDataBundle> {
        self.lookup(name)
            .map(|entry| entry.to_bundle(Utc::now().date_naive()))
    }

    /// City list in table order
    #[must_use]
    pub fn cities(&self) -> Vec<CityRecord> {
        self.entries.iter().map(FallbackEntry::to_city_record).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
