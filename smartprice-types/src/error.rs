//! Error types for location detection and rate lookup.

use std::time::Duration;

/// Failures reported by an outbound provider (geolocation, geocoding, rates).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream returned HTTP {0}")]
    Http(u16),

    #[error("Upstream rate limit exceeded")]
    RateLimited,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Detection failures that are surfaced instead of silently replaced.
///
/// Only produced when the browser strategy fails and falling back to IP is
/// disabled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectionError {
    #[error("Location permission required")]
    PermissionDenied,

    #[error("Geolocation is not supported on this device")]
    Unsupported,

    #[error("No coordinates available for browser geolocation")]
    MissingCoordinates,

    #[error("Invalid coordinates: lat {lat}, lon {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Reverse geocoding failed: {0}")]
    Provider(#[from] ProviderError),
}

impl DetectionError {
    /// True for the "user said no" branch, as opposed to a technical failure.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            DetectionError::PermissionDenied | DetectionError::Unsupported
        )
    }
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Location unavailable: {0}")]
    Detection(#[from] DetectionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_errors() {
        assert!(DetectionError::PermissionDenied.is_permission_error());
        assert!(DetectionError::Unsupported.is_permission_error());
        assert!(!DetectionError::Provider(ProviderError::Http(503)).is_permission_error());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DetectionError::PermissionDenied.to_string(),
            "Location permission required"
        );
        assert_eq!(
            DetectionError::from(ProviderError::RateLimited).to_string(),
            "Reverse geocoding failed: Upstream rate limit exceeded"
        );
    }
}
