//! Synthetic PM2.5/NO2 history
//!
//! Generates a deterministic daily series per city: a linear downward trend from
//! 110% to 90% of the city's base level, a 30-day seasonal wave on PM2.5 and
//! bounded daily noise. The same city always produces the same series.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::debug;

use crate::models::PredictionRequest;
use crate::models::forecast::{MIN_SEQUENCE_DAYS, VALUES_PER_DAY};
use crate::{AirWatchError, Result};

/// Days generated per city
pub const SERIES_DAYS: usize = MIN_SEQUENCE_DAYS + 50;

const PM25_RANGE: (f64, f64) = (5.0, 100.0);
const NO2_RANGE: (f64, f64) = (5.0, 80.0);
const SEASON_DAYS: f64 = 30.0;

/// Typical pollution levels for a city
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CityProfile {
    pub pm25_base: f64,
    pub pm25_std: f64,
    pub no2_base: f64,
    pub no2_std: f64,
}

const GENERIC_PROFILE: CityProfile = CityProfile {
    pm25_base: 25.0,
    pm25_std: 10.0,
    no2_base: 30.0,
    no2_std: 6.0,
};

const PROFILES: &[(&str, CityProfile)] = &[
    (
        "Ciudad de México",
        CityProfile {
            pm25_base: 35.0,
            pm25_std: 12.0,
            no2_base: 45.0,
            no2_std: 8.0,
        },
    ),
    (
        "Nueva York",
        CityProfile {
            pm25_base: 20.0,
            pm25_std: 8.0,
            no2_base: 30.0,
            no2_std: 6.0,
        },
    ),
    (
        "Los Ángeles",
        CityProfile {
            pm25_base: 28.0,
            pm25_std: 10.0,
            no2_base: 38.0,
            no2_std: 7.0,
        },
    ),
    (
        "Madrid",
        CityProfile {
            pm25_base: 18.0,
            pm25_std: 7.0,
            no2_base: 28.0,
            no2_std: 5.0,
        },
    ),
    (
        "Londres",
        CityProfile {
            pm25_base: 15.0,
            pm25_std: 6.0,
            no2_base: 25.0,
            no2_std: 4.0,
        },
    ),
    (
        "Mendoza",
        CityProfile {
            pm25_base: 22.0,
            pm25_std: 8.0,
            no2_base: 28.0,
            no2_std: 5.0,
        },
    ),
];

impl CityProfile {
    /// Profile for `city`, or a generic one for unknown cities
    #[must_use]
    pub fn for_city(city: &str) -> Self {
        PROFILES
            .iter()
            .find(|(name, _)| *name == city)
            .map_or(GENERIC_PROFILE, |(_, profile)| *profile)
    }
}

/// FNV-1a, stable across platforms and releases
fn city_seed(city: &str) -> u64 {
    city.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Symmetric noise with the given standard deviation
fn noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    // uniform on [-a, a] has std a / sqrt(3)
    let half_width = std_dev * 3f64.sqrt();
    if half_width <= 0.0 {
        return 0.0;
    }
    rng.random_range(-half_width..half_width)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HistorySimulator;

impl HistorySimulator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Full synthetic series for `city`, oldest day first, each day `[pm25, no2]`
    #[must_use]
    pub fn series(&self, city: &str) -> Vec<[f64; VALUES_PER_DAY]> {
        let profile = CityProfile::for_city(city);
        let mut rng = StdRng::seed_from_u64(city_seed(city));
        let last = (SERIES_DAYS - 1) as f64;

        (0..SERIES_DAYS)
            .map(|day| {
                let t = day as f64;
                let progress = t / last;

                let pm25_trend = profile.pm25_base * (1.1 - 0.2 * progress);
                let pm25_season = profile.pm25_std
                    * 0.5
                    * (2.0 * std::f64::consts::PI * t / SEASON_DAYS).sin();
                let pm25 = (pm25_trend + pm25_season + noise(&mut rng, profile.pm25_std * 0.3))
                    .clamp(PM25_RANGE.0, PM25_RANGE.1);

                let no2_trend = profile.no2_base * (1.1 - 0.2 * progress);
                let no2 = (no2_trend + noise(&mut rng, profile.no2_std * 0.4))
                    .clamp(NO2_RANGE.0, NO2_RANGE.1);

                [pm25, no2]
            })
            .collect()
    }

    /// The most recent `days` of the series
    #[must_use]
    pub fn history_sequence(&self, city: &str, days: usize) -> Vec<[f64; VALUES_PER_DAY]> {
        let series = self.series(city);
        let start = series.len().saturating_sub(days);
        series[start..].to_vec()
    }

    /// Sequence-based prediction request built from the city's synthetic history
    pub fn prediction_request(&self, city: &str) -> Result<PredictionRequest> {
        if city.trim().is_empty() {
            return Err(AirWatchError::validation("city cannot be empty"));
        }
        let sequence = self.history_sequence(city, MIN_SEQUENCE_DAYS);
        debug!(
            "Synthetic history for {}: last pm25 {:.1}",
            city,
            sequence.last().map_or(0.0, |day| day[0])
        );
        let request = PredictionRequest::Sequence { sequence };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_is_deterministic_per_city() {
        let simulator = HistorySimulator::new();
        assert_eq!(simulator.series("Madrid"), simulator.series("Madrid"));
        assert_ne!(simulator.series("Madrid"), simulator.series("Londres"));
    }

    #[test]
    fn test_series_stays_in_range() {
        let simulator = HistorySimulator::new();
        for city in ["Ciudad de México", "Londres", "Aksu", "Quito"] {
            let series = simulator.series(city);
            assert_eq!(series.len(), SERIES_DAYS);
            for [pm25, no2] in series {
                assert!((5.0..=100.0).contains(&pm25), "{city} pm25 {pm25}");
                assert!((5.0..=80.0).contains(&no2), "{city} no2 {no2}");
            }
        }
    }

    #[test]
    fn test_series_trends_downward() {
        let series = HistorySimulator::new().series("Ciudad de México");
        let mean = |days: &[[f64; 2]]| days.iter().map(|d| d[1]).sum::<f64>() / days.len() as f64;
        assert!(mean(&series[..10]) > mean(&series[SERIES_DAYS - 10..]));
    }

    #[test]
    fn test_unknown_city_uses_generic_profile() {
        assert_eq!(CityProfile::for_city("Quito"), GENERIC_PROFILE);
        assert_eq!(CityProfile::for_city("Madrid").pm25_base, 18.0);
    }

    #[test]
    fn test_prediction_request_has_minimum_history() {
        let request = HistorySimulator::new().prediction_request("Mendoza").unwrap();
        match request {
            PredictionRequest::Sequence { sequence } => {
                assert_eq!(sequence.len(), MIN_SEQUENCE_DAYS);
            }
            PredictionRequest::City { .. } => panic!("expected a sequence request"),
        }
    }

    #[test]
    fn test_history_sequence_is_series_tail() {
        let simulator = HistorySimulator::new();
        let series = simulator.series("Madrid");
        let tail = simulator.history_sequence("Madrid", 12);
        assert_eq!(tail.as_slice(), &series[SERIES_DAYS - 12..]);
    }
}
