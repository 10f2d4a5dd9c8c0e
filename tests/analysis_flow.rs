//! End-to-end: select a boundary, build the request, apply a service response.

use farm_analysis::{
    AnalysisResult, Completion, DroughtStatus, FarmAnalysisError, FarmSession, GeoPoint, MapEvent,
    RainfallTotal, VegetationStatus,
};

const SERVICE_RESPONSE: &str = r#"{
    "ndvi": 0.47,
    "ndvi_details": {"ndvi": 0.47, "tile_url": "https://tiles.example/ndvi/{z}/{x}/{y}"},
    "rainfall": {
        "features": [
            {"date": "2024-06-01", "rain": 12.4},
            {"date": "2024-06-02", "rain": 0.0},
            {"date": "2024-06-03", "rain": 3.1}
        ],
        "statistics": {
            "total_rainfall": 15.5,
            "average_daily": 5.17,
            "rain_days": 2,
            "dry_days": 1,
            "data_days": 3
        }
    },
    "landcover": {"40": 5200, "10": 1800, "30": 700.5, "80": 120},
    "yield_prediction": 3.8,
    "drought": {"status": "Mild Drought", "severity": 1, "deviation_percent": -22.5},
    "location": {"lat": 18.5217, "lng": 73.8591},
    "analysis_complete": true
}"#;

fn parse_response() -> AnalysisResult {
    AnalysisResult::from_json(SERVICE_RESPONSE).unwrap()
}

#[test]
fn test_polygon_selection_to_report() {
    let mut session = FarmSession::new();
    session.selector_mut().start_polygon_mode();
    for point in [
        GeoPoint::new(18.5204, 73.8567),
        GeoPoint::new(18.5231, 73.8589),
        GeoPoint::new(18.5215, 73.8622),
        GeoPoint::new(18.5190, 73.8601),
    ] {
        session.handle_map_event(MapEvent::Click(point)).unwrap();
    }
    assert_eq!(session.selector().working_vertices().len(), 4);
    assert!(!session.can_start_analysis());

    let drawn = session.selector().working_vertices().to_vec();
    session
        .handle_map_event(MapEvent::PolygonCompleted(drawn))
        .unwrap();
    assert!(session.can_start_analysis());

    let pending = session.begin_analysis().unwrap();
    let body: serde_json::Value = serde_json::from_str(&pending.request.to_json()).unwrap();
    let ring = body["geometry"]["coordinates"][0].as_array().unwrap();
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[0], ring[4]);
    // Longitude first on the wire
    assert_eq!(ring[0][0], 73.8567);
    assert_eq!(ring[0][1], 18.5204);

    assert_eq!(
        session.complete_analysis(pending.id, Ok(parse_response())),
        Completion::Applied
    );

    let summary = session.summary().unwrap();
    assert_eq!(summary.vegetation_status, VegetationStatus::Good);
    assert_eq!(summary.drought.status, DroughtStatus::MildDrought);
    assert_eq!(summary.drought.label, "Mild Drought");
    assert_eq!(summary.total_rainfall_mm, RainfallTotal::Measured(15.5));
    assert_eq!(summary.yield_tons_per_hectare, Some(3.8));

    let report = serde_json::to_value(session.report().unwrap()).unwrap();
    assert_eq!(
        report["result"]["ndvi_details"]["tile_url"],
        "https://tiles.example/ndvi/{z}/{x}/{y}"
    );

    let dominant = summary.dominant_land_cover.as_ref().unwrap();
    assert_eq!(dominant.class_code, 40);
    assert_eq!(dominant.label, "Cropland");
    assert_eq!(summary.land_cover_breakdown.len(), 4);
    assert_eq!(summary.land_cover_breakdown[0].class_code, 40);
}

#[test]
fn test_circle_selection_request_shape() {
    let mut session = FarmSession::new();
    session.selector_mut().start_circle_mode(750.0).unwrap();
    session
        .handle_map_event(MapEvent::GeolocationSucceeded(GeoPoint::new(18.5204, 73.8567)))
        .unwrap();

    let boundary = session.boundary().unwrap();
    assert_eq!(boundary.len(), 32);
    let centroid = boundary.centroid().unwrap();
    assert!((centroid.latitude - 18.5204).abs() < 1e-4);
    assert!((centroid.longitude - 73.8567).abs() < 1e-4);

    let pending = session.begin_analysis().unwrap();
    assert_eq!(pending.request.outer_ring().len(), 33);
}

#[test]
fn test_empty_result_degrades_gracefully() {
    let mut session = FarmSession::new();
    session
        .selector_mut()
        .place_circle(GeoPoint::new(-1.2921, 36.8219), 300.0)
        .unwrap();

    let pending = session.begin_analysis().unwrap();
    let result = AnalysisResult::from_json("{}").unwrap();
    session.complete_analysis(pending.id, Ok(result));

    let summary = session.summary().unwrap();
    assert_eq!(summary.vegetation_status, VegetationStatus::Poor);
    assert_eq!(summary.drought.status, DroughtStatus::Unknown);
    assert_eq!(summary.total_rainfall_mm, RainfallTotal::Unavailable);
    assert!(summary.land_cover_breakdown.is_empty());
    assert_eq!(summary.cropland_percent, 0.0);
}

#[test]
fn test_stale_responses_never_overwrite() {
    let mut session = FarmSession::new();
    session
        .selector_mut()
        .place_circle(GeoPoint::new(18.52, 73.85), 500.0)
        .unwrap();
    let first = session.begin_analysis().unwrap();

    assert!(matches!(
        session.begin_analysis(),
        Err(FarmAnalysisError::AnalysisInProgress { .. })
    ));

    // User redraws while the first request is out
    session.clear();
    session
        .selector_mut()
        .place_circle(GeoPoint::new(18.60, 73.95), 500.0)
        .unwrap();
    let second = session.begin_analysis().unwrap();
    assert_ne!(first.id, second.id);

    assert_eq!(
        session.complete_analysis(first.id, Ok(parse_response())),
        Completion::Stale
    );
    assert!(session.report().is_none());
    assert!(session.is_analysis_in_flight());

    let failure = FarmAnalysisError::AnalysisRequestFailed {
        message: "Analysis timed out after 120s".to_string(),
        status_code: None,
    };
    assert_eq!(
        session.complete_analysis(second.id, Err(failure.clone())),
        Completion::Failed
    );
    assert_eq!(session.last_error(), Some(&failure));
    assert!(session.can_start_analysis());
}
