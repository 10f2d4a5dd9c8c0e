//! # Area Selector
//!
//! Turns map interaction into one committed farm boundary.
//!
//! Two ways to select:
//! - **Circle**: pick a center, the selector samples a 32-gon of the chosen radius
//! - **Polygon**: pick vertices one by one, the map's drawing overlay signals completion
//!
//! The committed [`BoundaryPolygon`] survives entering a new mode and is only
//! replaced when a new shape completes. `cancel()` drops in-progress drawing,
//! `clear()` drops the committed boundary.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{FarmAnalysisError, Result};
use crate::geo_utils::{
    meters_to_lat_degrees, meters_to_lng_degrees, polygon_area_m2, polygon_centroid,
};
use crate::wire::AnalysisRequest;
use crate::{Bounds, GeoPoint};

/// Number of vertices sampled around a circle selection.
pub const CIRCLE_SAMPLES: usize = 32;

/// Minimum vertex count for a boundary to be submitted.
pub const MIN_BOUNDARY_VERTICES: usize = 3;

// ============================================================================
// Core Types
// ============================================================================

/// The user's area-picking intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    Circle { center: GeoPoint, radius_meters: f64 },
    Polygon { vertices: Vec<GeoPoint> },
}

/// Canonical committed farm boundary.
///
/// Stored open (first vertex not repeated); closed only when exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPolygon {
    vertices: Vec<GeoPoint>,
}

impl BoundaryPolygon {
    /// Wrap an ordered vertex list verbatim.
    pub fn new(vertices: Vec<GeoPoint>) -> Self {
        Self { vertices }
    }

    /// Sample a circle into a 32-vertex polygon.
    ///
    /// Uses a fixed equirectangular offset (111 320 m per degree), not a true
    /// geodesic. Longitude spacing diverges near the poles.
    pub fn from_circle(center: GeoPoint, radius_meters: f64) -> Result<Self> {
        validate_circle(center, radius_meters)?;

        let dlat = meters_to_lat_degrees(radius_meters);
        let dlng = meters_to_lng_degrees(radius_meters, center.latitude);

        let vertices = (0..CIRCLE_SAMPLES)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / CIRCLE_SAMPLES as f64;
                GeoPoint::new(
                    center.latitude + dlat * angle.cos(),
                    center.longitude + dlng * angle.sin(),
                )
            })
            .collect();

        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// True when the boundary has enough vertices to be submitted.
    pub fn is_ready_for_analysis(&self) -> bool {
        self.vertices.len() >= MIN_BOUNDARY_VERTICES
    }

    /// Bounding box, for fitting the map viewport.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.vertices)
    }

    /// Area-weighted centroid.
    pub fn centroid(&self) -> Option<GeoPoint> {
        polygon_centroid(&self.vertices)
    }

    /// Geodesic area in hectares.
    pub fn area_hectares(&self) -> f64 {
        polygon_area_m2(&self.vertices) / 10_000.0
    }

    /// Build the wire request, closing the ring.
    pub fn to_analysis_request(&self) -> Result<AnalysisRequest> {
        if !self.is_ready_for_analysis() {
            return Err(FarmAnalysisError::InvalidSelection {
                vertex_count: self.vertices.len(),
                minimum_required: MIN_BOUNDARY_VERTICES,
            });
        }
        Ok(AnalysisRequest::from_vertices(&self.vertices))
    }
}

fn validate_circle(center: GeoPoint, radius_meters: f64) -> Result<()> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(FarmAnalysisError::InvalidCircle {
            message: format!("radius must be positive, got {}", radius_meters),
        });
    }
    if !center.is_valid() {
        return Err(FarmAnalysisError::InvalidCircle {
            message: format!(
                "center ({}, {}) is out of range",
                center.latitude, center.longitude
            ),
        });
    }
    Ok(())
}

/// What the next map click means.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionMode {
    /// Clicks are ignored.
    Idle,
    /// The next click places a circle of this radius.
    PickingCircle { radius_meters: f64 },
    /// Clicks append vertices to the working list.
    DrawingPolygon { vertices: Vec<GeoPoint> },
}

/// Draw request handed to the map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum OverlayShape {
    Circle { center: GeoPoint, radius_meters: f64 },
    Polygon { vertices: Vec<GeoPoint> },
    Marker { position: GeoPoint },
}

// ============================================================================
// Area Selector
// ============================================================================

/// Holds at most one committed selection plus any in-progress drawing.
#[derive(Debug, Clone)]
pub struct AreaSelector {
    mode: SelectionMode,
    selection: Option<Selection>,
    boundary: Option<BoundaryPolygon>,
    /// Bumped whenever the committed boundary changes.
    revision: u64,
}

impl AreaSelector {
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::Idle,
            selection: None,
            boundary: None,
            revision: 0,
        }
    }

    pub fn mode(&self) -> &SelectionMode {
        &self.mode
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn boundary(&self) -> Option<&BoundaryPolygon> {
        self.boundary.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ========================================================================
    // Circle Mode
    // ========================================================================

    /// Wait for a single center pick. Any committed boundary stays in place.
    pub fn start_circle_mode(&mut self, radius_meters: f64) -> Result<()> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(FarmAnalysisError::InvalidCircle {
                message: format!("radius must be positive, got {}", radius_meters),
            });
        }
        debug!("[AreaSelector] Circle mode, radius {:.0}m", radius_meters);
        self.mode = SelectionMode::PickingCircle { radius_meters };
        Ok(())
    }

    /// Change the radius used for the next placed circle.
    ///
    /// An already-placed circle keeps its radius. Ignored outside circle mode.
    pub fn set_radius(&mut self, radius_meters: f64) -> Result<()> {
        if let SelectionMode::PickingCircle { .. } = self.mode {
            self.start_circle_mode(radius_meters)?;
        }
        Ok(())
    }

    /// Sample a circle and commit it as the boundary.
    pub fn place_circle(
        &mut self,
        center: GeoPoint,
        radius_meters: f64,
    ) -> Result<&BoundaryPolygon> {
        let polygon = BoundaryPolygon::from_circle(center, radius_meters)?;
        info!(
            "[AreaSelector] Placed circle at ({:.5}, {:.5}), radius {:.0}m",
            center.latitude, center.longitude, radius_meters
        );
        self.mode = SelectionMode::Idle;
        Ok(self.commit(
            Selection::Circle {
                center,
                radius_meters,
            },
            polygon,
        ))
    }

    // ========================================================================
    // Polygon Mode
    // ========================================================================

    /// Start accumulating vertices. Any committed boundary stays in place.
    pub fn start_polygon_mode(&mut self) {
        debug!("[AreaSelector] Polygon mode");
        self.mode = SelectionMode::DrawingPolygon {
            vertices: Vec::new(),
        };
    }

    /// Vertices picked so far in the current drawing.
    pub fn working_vertices(&self) -> &[GeoPoint] {
        match &self.mode {
            SelectionMode::DrawingPolygon { vertices } => vertices,
            _ => &[],
        }
    }

    /// Commit the overlay's completed shape verbatim.
    ///
    /// The drawing overlay guarantees at least 3 vertices; the count is only
    /// checked when a request is built.
    pub fn complete_polygon(&mut self, vertices: Vec<GeoPoint>) -> &BoundaryPolygon {
        info!("[AreaSelector] Polygon completed with {} vertices", vertices.len());
        self.mode = SelectionMode::Idle;
        self.commit(
            Selection::Polygon {
                vertices: vertices.clone(),
            },
            BoundaryPolygon::new(vertices),
        )
    }

    // ========================================================================
    // Map Input
    // ========================================================================

    /// Route a map click according to the current mode.
    ///
    /// Returns the new boundary when the click completed a circle.
    pub fn pick_point(&mut self, point: GeoPoint) -> Result<Option<&BoundaryPolygon>> {
        if let SelectionMode::PickingCircle { radius_meters } = self.mode {
            return self.place_circle(point, radius_meters).map(Some);
        }
        if let SelectionMode::DrawingPolygon { vertices } = &mut self.mode {
            vertices.push(point);
        }
        Ok(None)
    }

    // ========================================================================
    // Life Cycle
    // ========================================================================

    /// Drop in-progress drawing; the committed boundary is untouched.
    pub fn cancel(&mut self) {
        if self.mode != SelectionMode::Idle {
            debug!("[AreaSelector] Cancelled drawing");
        }
        self.mode = SelectionMode::Idle;
    }

    /// Drop the committed boundary and any drawing.
    pub fn clear(&mut self) {
        self.mode = SelectionMode::Idle;
        if self.boundary.is_some() {
            self.revision += 1;
            info!("[AreaSelector] Cleared boundary");
        }
        self.selection = None;
        self.boundary = None;
    }

    pub fn is_ready_for_analysis(&self) -> bool {
        self.boundary
            .as_ref()
            .is_some_and(|b| b.is_ready_for_analysis())
    }

    /// Build the wire request for the committed boundary.
    pub fn to_analysis_request(&self) -> Result<AnalysisRequest> {
        match &self.boundary {
            Some(boundary) => boundary.to_analysis_request(),
            None => Err(FarmAnalysisError::InvalidSelection {
                vertex_count: 0,
                minimum_required: MIN_BOUNDARY_VERTICES,
            }),
        }
    }

    /// Shapes for the map widget to draw.
    pub fn overlays(&self) -> Vec<OverlayShape> {
        let mut shapes = Vec::new();

        match &self.selection {
            Some(Selection::Circle {
                center,
                radius_meters,
            }) => {
                shapes.push(OverlayShape::Circle {
                    center: *center,
                    radius_meters: *radius_meters,
                });
                shapes.push(OverlayShape::Marker { position: *center });
            }
            Some(Selection::Polygon { vertices }) => {
                shapes.push(OverlayShape::Polygon {
                    vertices: vertices.clone(),
                });
            }
            None => {}
        }

        shapes.extend(
            self.working_vertices()
                .iter()
                .map(|&position| OverlayShape::Marker { position }),
        );

        shapes
    }

    fn commit(&mut self, selection: Selection, polygon: BoundaryPolygon) -> &BoundaryPolygon {
        self.selection = Some(selection);
        self.revision += 1;
        self.boundary.insert(polygon)
    }
}

impl Default for AreaSelector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
