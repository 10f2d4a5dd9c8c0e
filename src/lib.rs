//! # Farm Analysis
//!
//! Farm boundary selection and agronomic report classification.
//!
//! This library provides:
//! - An area selector turning map clicks into one closed GeoJSON polygon
//! - A pure classifier turning the analysis service's raw result into report statuses
//! - A session object that correlates responses with requests
//!
//! ## Features
//!
//! - **`http`** - Enable the async client for the analysis service
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use farm_analysis::{AnalysisResult, FarmSession, GeoPoint, MapEvent};
//!
//! let mut session = FarmSession::new();
//! session.selector_mut().start_circle_mode(500.0).unwrap();
//! session.handle_map_event(MapEvent::Click(GeoPoint::new(18.5204, 73.8567))).unwrap();
//!
//! let pending = session.begin_analysis().unwrap();
//! let ring = pending.request.outer_ring();
//! assert_eq!(ring.first(), ring.last());
//!
//! // ... send pending.request, then hand the response back:
//! let result = AnalysisResult::from_json(r#"{"ndvi": 0.45}"#).unwrap();
//! session.complete_analysis(pending.id, Ok(result));
//! println!("{:?}", session.summary().map(|s| s.vegetation_status));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{FarmAnalysisError, OptionExt, Result};

// Geographic utilities (distance, degree conversion, polygon measures)
pub mod geo_utils;

// Outbound GeoJSON request body
pub mod wire;
pub use wire::AnalysisRequest;

// Area selection (circle / freehand polygon)
pub mod selector;
pub use selector::{AreaSelector, BoundaryPolygon, OverlayShape, Selection, SelectionMode};

// Inbound analysis result
pub mod result;
pub use result::{AnalysisResult, LandCoverHistogram};

// Land cover legend
pub mod landcover;
pub use landcover::LandCoverClass;

// Result classification
pub mod classify;
pub use classify::{
    classify, DerivedSummary, DroughtAssessment, DroughtStatus, LandCoverEntry, RainfallTotal,
    VegetationStatus,
};

// Session: selector + request correlation + current report
pub mod session;
pub use session::{AnalysisReport, Completion, FarmSession, MapEvent, PendingAnalysis, RequestId};

// HTTP module for the analysis service
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{run_analysis, AnalysisClient, ServiceHealth};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("FarmAnalysisRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use farm_analysis::GeoPoint;
/// let point = GeoPoint::new(18.5204, 73.8567); // Pune
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box, used to fit the map viewport to a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Environment variable overriding [`ClientConfig::base_url`].
pub const ENV_API_URL: &str = "FARM_ANALYSIS_API_URL";

/// Environment variable overriding [`ClientConfig::timeout_ms`].
pub const ENV_TIMEOUT_MS: &str = "FARM_ANALYSIS_TIMEOUT_MS";

/// Configuration for talking to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct ClientConfig {
    /// Service root; `/analyze` is resolved against it.
    /// Default: "http://localhost:5000"
    pub base_url: String,

    /// Whole-request timeout. Exceeding it is a failure, not a retry.
    /// Default: 120000 ms
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 120_000,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `FARM_ANALYSIS_API_URL` / `FARM_ANALYSIS_TIMEOUT_MS`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout_ms = ms,
                _ => log::warn!("[ClientConfig] Ignoring {}={:?}", ENV_TIMEOUT_MS, raw),
            }
        }

        config
    }
}

// ============================================================================
// Tests
// ============================================================================
