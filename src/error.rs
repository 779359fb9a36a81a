//! Error types and handling for `AirWatch`

use thiserror::Error;

/// Main error type for the `AirWatch` widget core
#[derive(Error, Debug)]
pub enum AirWatchError {
    /// Backend unreachable, timed out or answered with a non-success status
    #[error("Network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },

    /// The backend does not know the requested city
    #[error("City not found on backend: {city}")]
    NotFound { city: String },

    /// Neither the backend nor the fallback table can provide data
    #[error("No data available for {city}: {reason}")]
    DataUnavailable { city: String, reason: String },

    /// Malformed input or backend payload
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AirWatchError {
    /// Create a network error without an HTTP status (unreachable, timeout, decode)
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Create a network error for a non-success HTTP status
    pub fn http_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn not_found<S: Into<String>>(city: S) -> Self {
        Self::NotFound { city: city.into() }
    }

    pub fn data_unavailable<C: Into<String>, R: Into<String>>(city: C, reason: R) -> Self {
        Self::DataUnavailable {
            city: city.into(),
            reason: reason.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirWatchError::Network { .. } => {
                "Unable to reach the air quality service. Please try again.".to_string()
            }
            AirWatchError::NotFound { city } => {
                format!("No air quality station is known for {city}.")
            }
            AirWatchError::DataUnavailable { city, .. } => {
                format!("No air quality data is available for {city}. Please retry later.")
            }
            AirWatchError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AirWatchError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            AirWatchError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
