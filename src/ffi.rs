//! FFI bindings for mobile platforms (iOS/Android).
//!
//! The host holds no Rust objects: one global [`FarmSession`] lives behind a
//! mutex, and richer values cross the boundary as JSON strings. All exports
//! are prefixed with `farm_`.

use std::sync::Mutex;

use log::{info, warn};
use once_cell::sync::Lazy;

use crate::http::analyze_sync;
use crate::session::{Completion, FarmSession, MapEvent};
use crate::{classify, init_logging, AnalysisResult, Bounds, ClientConfig, GeoPoint};

// ============================================================================
// Global Session
// ============================================================================

/// Session shared by every FFI call.
pub static SESSION: Lazy<Mutex<FarmSession>> = Lazy::new(|| Mutex::new(FarmSession::new()));

/// Get a lock on the global session.
pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&mut FarmSession) -> R,
{
    let mut session = SESSION.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut session)
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

// ============================================================================
// Life Cycle
// ============================================================================

/// Initialize logging (call once at app startup).
#[uniffi::export]
pub fn farm_init() {
    init_logging();
    info!("[FarmSession] Initialized");
}

/// Configuration from the environment, falling back to defaults.
#[uniffi::export]
pub fn farm_default_config() -> ClientConfig {
    ClientConfig::from_env()
}

/// Drop the boundary and the current report.
#[uniffi::export]
pub fn farm_clear() {
    with_session(|s| s.clear());
}

#[uniffi::export]
pub fn farm_dismiss_error() {
    with_session(|s| s.dismiss_error());
}

// ============================================================================
// Selection
// ============================================================================

/// Enter circle mode. Returns false for a non-positive radius.
#[uniffi::export]
pub fn farm_start_circle_mode(radius_meters: f64) -> bool {
    with_session(|s| s.selector_mut().start_circle_mode(radius_meters)).is_ok()
}

/// Change the radius for the next placed circle.
#[uniffi::export]
pub fn farm_set_radius(radius_meters: f64) -> bool {
    with_session(|s| s.selector_mut().set_radius(radius_meters)).is_ok()
}

#[uniffi::export]
pub fn farm_start_polygon_mode() {
    with_session(|s| s.selector_mut().start_polygon_mode());
}

/// Forward a map click. Returns false if the click was rejected.
#[uniffi::export]
pub fn farm_pick_point(point: GeoPoint) -> bool {
    match with_session(|s| s.handle_map_event(MapEvent::Click(point))) {
        Ok(()) => true,
        Err(e) => {
            warn!("[FarmSession] Click rejected: {}", e);
            false
        }
    }
}

/// Commit a freehand polygon from the drawing tool.
/// Returns the committed vertex count.
#[uniffi::export]
pub fn farm_complete_polygon(vertices: Vec<GeoPoint>) -> u32 {
    with_session(|s| {
        s.handle_map_event(MapEvent::PolygonCompleted(vertices))
            .map(|_| s.boundary().map(|b| b.len() as u32).unwrap_or(0))
            .unwrap_or(0)
    })
}

/// Report a device position fix.
#[uniffi::export]
pub fn farm_location_found(point: GeoPoint) -> bool {
    with_session(|s| s.handle_map_event(MapEvent::GeolocationSucceeded(point))).is_ok()
}

/// Report a positioning failure; it becomes the current error.
#[uniffi::export]
pub fn farm_location_failed(reason: String) {
    let _ = with_session(|s| s.handle_map_event(MapEvent::GeolocationFailed(reason)));
}

/// Leave the current mode without touching the committed boundary.
#[uniffi::export]
pub fn farm_cancel() {
    with_session(|s| s.selector_mut().cancel());
}

// ============================================================================
// Queries
// ============================================================================

#[uniffi::export]
pub fn farm_can_start_analysis() -> bool {
    with_session(|s| s.can_start_analysis())
}

#[uniffi::export]
pub fn farm_is_analysis_in_flight() -> bool {
    with_session(|s| s.is_analysis_in_flight())
}

/// Committed boundary vertices (open ring).
#[uniffi::export]
pub fn farm_get_boundary() -> Vec<GeoPoint> {
    with_session(|s| s.boundary().map(|b| b.vertices().to_vec()).unwrap_or_default())
}

/// Viewport to fit the committed boundary.
#[uniffi::export]
pub fn farm_get_boundary_bounds() -> Option<Bounds> {
    with_session(|s| s.boundary().and_then(|b| b.bounds()))
}

/// Request body for the committed boundary, or empty if none is ready.
#[uniffi::export]
pub fn farm_get_request_json() -> String {
    with_session(|s| {
        s.selector()
            .to_analysis_request()
            .map(|r| r.to_json())
            .unwrap_or_default()
    })
}

/// Shapes the map should draw.
#[uniffi::export]
pub fn farm_get_overlays_json() -> String {
    with_session(|s| to_json(&s.selector().overlays(), "[]"))
}

/// Current report (result + summary), or empty if none.
#[uniffi::export]
pub fn farm_get_report_json() -> String {
    with_session(|s| s.report().map(|r| to_json(r, "{}")).unwrap_or_default())
}

#[uniffi::export]
pub fn farm_get_summary_json() -> String {
    with_session(|s| s.summary().map(|r| to_json(r, "{}")).unwrap_or_default())
}

/// User-visible message for the latest error.
#[uniffi::export]
pub fn farm_get_last_error() -> Option<String> {
    with_session(|s| s.last_error().map(|e| e.to_string()))
}

// ============================================================================
// Analysis
// ============================================================================

/// Classify a raw service response without touching the session.
#[uniffi::export]
pub fn farm_classify_result_json(json: String) -> String {
    match AnalysisResult::from_json(&json) {
        Ok(result) => to_json(&classify(&result), "{}"),
        Err(e) => {
            warn!("[FarmSession] Unreadable result: {}", e);
            String::new()
        }
    }
}

/// Run one analysis for the committed boundary, blocking until it settles.
///
/// Returns true only when a new report was stored. The session stays usable
/// from other threads while the request is in flight.
#[uniffi::export]
pub fn farm_run_analysis(config: ClientConfig) -> bool {
    init_logging();

    let pending = match with_session(|s| s.begin_analysis()) {
        Ok(pending) => pending,
        Err(e) => {
            warn!("[FarmSession] Cannot start analysis: {}", e);
            return false;
        }
    };

    let outcome = analyze_sync(&config, &pending.request);
    with_session(|s| s.complete_analysis(pending.id, outcome)) == Completion::Applied
}
