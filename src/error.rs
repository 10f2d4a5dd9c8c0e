//! Unified error handling for the farm-analysis library.
//!
//! Every failure the host UI can see is one of these variants. All of them are
//! recoverable by user action; none is fatal to the session.

use std::fmt;

/// Unified error type for farm-analysis operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FarmAnalysisError {
    /// Device positioning is unavailable or permission was denied
    GeolocationUnavailable { reason: String },
    /// Boundary has too few vertices to be submitted
    InvalidSelection {
        vertex_count: usize,
        minimum_required: usize,
    },
    /// Circle parameters cannot produce a boundary
    InvalidCircle { message: String },
    /// An analysis is already outstanding for this session
    AnalysisInProgress { request_id: u64 },
    /// Network failure, timeout, or non-success response from the service
    AnalysisRequestFailed {
        message: String,
        status_code: Option<u16>,
    },
    /// Configuration error
    ConfigError { message: String },
}

impl fmt::Display for FarmAnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FarmAnalysisError::GeolocationUnavailable { reason } => {
                write!(f, "Location unavailable: {}", reason)
            }
            FarmAnalysisError::InvalidSelection {
                vertex_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "Boundary has {} points, minimum {} required",
                    vertex_count, minimum_required
                )
            }
            FarmAnalysisError::InvalidCircle { message } => {
                write!(f, "Invalid circle: {}", message)
            }
            FarmAnalysisError::AnalysisInProgress { request_id } => {
                write!(f, "Analysis {} is still running", request_id)
            }
            FarmAnalysisError::AnalysisRequestFailed {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Analysis failed ({}): {}", code, message)
                } else {
                    write!(f, "Analysis failed: {}", message)
                }
            }
            FarmAnalysisError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for FarmAnalysisError {}

/// Result type alias for farm-analysis operations.
pub type Result<T> = std::result::Result<T, FarmAnalysisError>;

/// Extension trait for converting Option to FarmAnalysisError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a geolocation error.
    fn ok_or_geolocation_unavailable(self, reason: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_geolocation_unavailable(self, reason: &str) -> Result<T> {
        self.ok_or_else(|| FarmAnalysisError::GeolocationUnavailable {
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FarmAnalysisError::InvalidSelection {
            vertex_count: 2,
            minimum_required: 3,
        };
        assert!(err.to_string().contains("2 points"));
        assert!(err.to_string().contains("minimum 3"));

        let err = FarmAnalysisError::AnalysisRequestFailed {
            message: "Earth Engine quota exceeded".to_string(),
            status_code: Some(500),
        };
        assert_eq!(
            err.to_string(),
            "Analysis failed (500): Earth Engine quota exceeded"
        );
    }

    #[test]
    fn test_option_ext() {
        let located: Option<i32> = None;
        assert!(matches!(
            located.ok_or_geolocation_unavailable("permission denied"),
            Err(FarmAnalysisError::GeolocationUnavailable { .. })
        ));
    }
}
