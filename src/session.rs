//! # Farm Session
//!
//! Explicit per-user context tying the Area Selector to the analysis cycle.
//!
//! ## Architecture
//!
//! The session owns:
//! - The area selector (committed boundary + in-progress drawing)
//! - The outstanding request, if any, tagged with a `RequestId`
//! - The latest report: result and derived summary, always replaced together
//! - The latest user-visible error
//!
//! The network call happens outside the session. A host calls
//! [`FarmSession::begin_analysis`], sends the returned request, and hands the
//! outcome back with [`FarmSession::complete_analysis`]. Responses whose id
//! no longer matches, or whose boundary has since changed, are dropped.

use log::{debug, info, warn};
use serde::Serialize;

use crate::classify::{classify, DerivedSummary};
use crate::error::{FarmAnalysisError, OptionExt, Result};
use crate::result::AnalysisResult;
use crate::selector::{AreaSelector, BoundaryPolygon, SelectionMode};
use crate::wire::AnalysisRequest;
use crate::GeoPoint;

// ============================================================================
// Core Types
// ============================================================================

/// Identifier correlating a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestId(pub u64);

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    pub id: RequestId,
    pub request: AnalysisRequest,
}

/// Bookkeeping for the request currently in flight.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: RequestId,
    boundary_revision: u64,
}

/// A completed analysis: raw result and its summary, never split.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub request_id: RequestId,
    pub result: AnalysisResult,
    pub summary: DerivedSummary,
}

/// What `complete_analysis` did with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// New report stored
    Applied,
    /// Error recorded; previous report kept
    Failed,
    /// Response no longer relevant; nothing changed
    Stale,
}

/// Events emitted by the map widget.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click(GeoPoint),
    PolygonCompleted(Vec<GeoPoint>),
    GeolocationSucceeded(GeoPoint),
    GeolocationFailed(String),
}

// ============================================================================
// Farm Session
// ============================================================================

pub struct FarmSession {
    selector: AreaSelector,
    next_request_id: u64,
    in_flight: Option<InFlight>,
    report: Option<AnalysisReport>,
    last_error: Option<FarmAnalysisError>,
    /// Last known device position, for centering the map
    view_center: Option<GeoPoint>,
}

impl FarmSession {
    pub fn new() -> Self {
        Self {
            selector: AreaSelector::new(),
            next_request_id: 1,
            in_flight: None,
            report: None,
            last_error: None,
            view_center: None,
        }
    }

    pub fn selector(&self) -> &AreaSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut AreaSelector {
        &mut self.selector
    }

    pub fn boundary(&self) -> Option<&BoundaryPolygon> {
        self.selector.boundary()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn summary(&self) -> Option<&DerivedSummary> {
        self.report.as_ref().map(|r| &r.summary)
    }

    pub fn last_error(&self) -> Option<&FarmAnalysisError> {
        self.last_error.as_ref()
    }

    pub fn view_center(&self) -> Option<GeoPoint> {
        self.view_center
    }

    pub fn is_analysis_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the host should enable its "analyze" trigger.
    pub fn can_start_analysis(&self) -> bool {
        self.in_flight.is_none() && self.selector.is_ready_for_analysis()
    }

    // ========================================================================
    // Map Events
    // ========================================================================

    /// Apply one map widget event.
    pub fn handle_map_event(&mut self, event: MapEvent) -> Result<()> {
        match event {
            MapEvent::Click(point) => {
                self.selector.pick_point(point)?;
            }
            MapEvent::PolygonCompleted(vertices) => {
                self.selector.complete_polygon(vertices);
            }
            MapEvent::GeolocationSucceeded(point) => {
                self.handle_geolocation(Some(point), "")?;
            }
            MapEvent::GeolocationFailed(reason) => {
                self.handle_geolocation(None, &reason)?;
            }
        }
        Ok(())
    }

    /// Record a positioning outcome.
    ///
    /// A fix recenters the map, and places the circle there when a center
    /// pick is pending. A failure is recorded as the current error and
    /// returned; selection continues manually.
    pub fn handle_geolocation(&mut self, position: Option<GeoPoint>, reason: &str) -> Result<()> {
        let position = match position.ok_or_geolocation_unavailable(reason) {
            Ok(position) => position,
            Err(err) => {
                warn!("[FarmSession] {}", err);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        debug!(
            "[FarmSession] Located at ({:.5}, {:.5})",
            position.latitude, position.longitude
        );
        self.view_center = Some(position);
        let awaiting_center = matches!(self.selector.mode(), SelectionMode::PickingCircle { .. });
        if awaiting_center {
            self.selector.pick_point(position)?;
        }
        Ok(())
    }

    // ========================================================================
    // Analysis Cycle
    // ========================================================================

    /// Allocate a request for the committed boundary.
    ///
    /// Fails while another request is outstanding, or when the boundary has
    /// fewer than 3 vertices.
    pub fn begin_analysis(&mut self) -> Result<PendingAnalysis> {
        if let Some(in_flight) = self.in_flight {
            return Err(FarmAnalysisError::AnalysisInProgress {
                request_id: in_flight.id.0,
            });
        }

        let request = match self.selector.to_analysis_request() {
            Ok(request) => request,
            Err(err) => {
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        self.in_flight = Some(InFlight {
            id,
            boundary_revision: self.selector.revision(),
        });
        self.last_error = None;

        info!(
            "[FarmSession] Analysis {} started ({} ring positions)",
            id.0,
            request.outer_ring().len()
        );

        Ok(PendingAnalysis { id, request })
    }

    /// Apply the outcome of a request.
    pub fn complete_analysis(
        &mut self,
        id: RequestId,
        outcome: Result<AnalysisResult>,
    ) -> Completion {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.id == id => in_flight,
            _ => {
                debug!("[FarmSession] Dropping response for abandoned analysis {}", id.0);
                return Completion::Stale;
            }
        };
        self.in_flight = None;

        if in_flight.boundary_revision != self.selector.revision() {
            info!(
                "[FarmSession] Boundary changed during analysis {}, discarding response",
                id.0
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                let summary = classify(&result);
                info!(
                    "[FarmSession] Analysis {} applied: vegetation {:?}, drought {:?}",
                    id.0, summary.vegetation_status, summary.drought.status
                );
                self.report = Some(AnalysisReport {
                    request_id: id,
                    result,
                    summary,
                });
                self.last_error = None;
                Completion::Applied
            }
            Err(err) => {
                warn!("[FarmSession] Analysis {} failed: {}", id.0, err);
                self.last_error = Some(err);
                Completion::Failed
            }
        }
    }

    // ========================================================================
    // Life Cycle
    // ========================================================================

    /// Drop the boundary and the report describing it.
    ///
    /// An outstanding request is abandoned; its response will be discarded.
    pub fn clear(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            info!("[FarmSession] Abandoning analysis {}", in_flight.id.0);
        }
        self.selector.clear();
        self.report = None;
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}

impl Default for FarmSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
