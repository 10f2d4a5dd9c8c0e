//! Outbound request body for the analysis service.
//!
//! The service expects a GeoJSON polygon whose positions are `[longitude, latitude]`.
//! Everything else in this crate is latitude-first; `closed_ring` is the only
//! place the order is swapped.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// GeoJSON geometry type sent to the service.
pub const GEOMETRY_TYPE_POLYGON: &str = "Polygon";

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub geometry: PolygonGeometry,
}

/// GeoJSON polygon with a single outer ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// Rings of `[lng, lat]` positions; only the outer ring is ever present.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl AnalysisRequest {
    /// Build the request body from an ordered vertex list.
    ///
    /// The caller is responsible for checking the vertex count.
    pub(crate) fn from_vertices(vertices: &[GeoPoint]) -> Self {
        Self {
            geometry: PolygonGeometry {
                geometry_type: GEOMETRY_TYPE_POLYGON.to_string(),
                coordinates: vec![closed_ring(vertices)],
            },
        }
    }

    /// The outer ring as sent on the wire.
    pub fn outer_ring(&self) -> &[[f64; 2]] {
        self.geometry
            .coordinates
            .first()
            .map(|ring| ring.as_slice())
            .unwrap_or(&[])
    }

    /// Serialize to the JSON body.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Convert lat/lng vertices into a closed `[lng, lat]` ring.
fn closed_ring(vertices: &[GeoPoint]) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = vertices
        .iter()
        .map(|p| [p.longitude, p.latitude])
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}
