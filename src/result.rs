//! Inbound analysis result from the remote service.
//!
//! Every section is optional. The service emits snake_case keys; camelCase
//! aliases are accepted for the multi-word fields. The opaque sections
//! (detail blocks, crop recommendations, weather, pollen, solar) are kept as
//! raw JSON and handed to presentation untouched.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw, partially populated result of `POST /analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub ndvi: Option<f64>,
    /// NDVI metadata, including the map `tile_url`
    #[serde(default, alias = "ndviDetails")]
    pub ndvi_details: Option<serde_json::Value>,
    #[serde(default)]
    pub rainfall: Option<RainfallSection>,
    #[serde(default)]
    pub drought: Option<DroughtSection>,
    #[serde(default)]
    pub landcover: Option<LandCoverHistogram>,
    #[serde(default, alias = "landcoverDetails")]
    pub landcover_details: Option<serde_json::Value>,
    #[serde(default, alias = "yieldPrediction")]
    pub yield_prediction: Option<f64>,
    /// Yield range, unit and confidence behind the prediction
    #[serde(default, alias = "yieldDetails")]
    pub yield_details: Option<serde_json::Value>,
    #[serde(default, alias = "cropRecommendations")]
    pub crop_recommendations: Option<serde_json::Value>,
    #[serde(default)]
    pub weather: Option<serde_json::Value>,
    #[serde(default)]
    pub pollen: Option<serde_json::Value>,
    #[serde(default)]
    pub solar: Option<serde_json::Value>,
    /// Point the service used for weather, pollen and solar lookups
    #[serde(default)]
    pub location: Option<ResultLocation>,
    #[serde(default, alias = "analysisComplete")]
    pub analysis_complete: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Parse a response body.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}

/// Rainfall time series and its service-side statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainfallSection {
    /// Daily samples, oldest first. The service calls this `features`.
    #[serde(default, alias = "features")]
    pub series: Option<Vec<RainfallSample>>,
    #[serde(default)]
    pub statistics: Option<RainfallStatistics>,
}

/// One day of rainfall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainfallSample {
    #[serde(default)]
    pub date: String,
    /// Millimetres; `None` when the service had no value for the day
    #[serde(default)]
    pub rain: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainfallStatistics {
    #[serde(default, alias = "totalRainfall")]
    pub total_rainfall: Option<f64>,
    #[serde(default, alias = "averageDaily")]
    pub average_daily: Option<f64>,
    #[serde(default, alias = "rainDays")]
    pub rain_days: Option<u32>,
    #[serde(default, alias = "dryDays")]
    pub dry_days: Option<u32>,
    #[serde(default, alias = "dataDays")]
    pub data_days: Option<u32>,
}

/// Service-side drought assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DroughtSection {
    /// e.g. "Normal", "Mild Drought", "Severe Drought"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<i32>,
    #[serde(default, alias = "deviationPercent")]
    pub deviation_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultLocation {
    pub lat: f64,
    pub lng: f64,
}

// ============================================================================
// Land Cover Histogram
// ============================================================================

/// Pixel counts per land cover class code, in document order.
///
/// On the wire this is a JSON object keyed by the numeric class code as a
/// string (`{"40": 812, "10": 95}`). Counts may be fractional because the
/// service weights edge pixels. Keys that are not integers are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandCoverHistogram {
    entries: Vec<(i32, f64)>,
}

impl LandCoverHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a class count. A repeated code replaces the earlier count in place.
    pub fn insert(&mut self, class_code: i32, pixel_count: f64) {
        match self.entries.iter_mut().find(|(code, _)| *code == class_code) {
            Some(entry) => entry.1 = pixel_count,
            None => self.entries.push((class_code, pixel_count)),
        }
    }

    pub fn entries(&self) -> &[(i32, f64)] {
        &self.entries
    }

    pub fn get(&self, class_code: i32) -> Option<f64> {
        self.entries
            .iter()
            .find(|(code, _)| *code == class_code)
            .map(|(_, count)| *count)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

impl FromIterator<(i32, f64)> for LandCoverHistogram {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (code, count) in iter {
            histogram.insert(code, count);
        }
        histogram
    }
}

impl Serialize for LandCoverHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, count) in &self.entries {
            map.serialize_entry(&code.to_string(), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LandCoverHistogram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HistogramVisitor;

        impl<'de> Visitor<'de> for HistogramVisitor {
            type Value = LandCoverHistogram;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of land cover class code to pixel count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut histogram = LandCoverHistogram::new();
                while let Some((key, count)) = access.next_entry::<String, Option<f64>>()? {
                    if let Ok(code) = key.trim().parse::<i32>() {
                        histogram.insert(code, count.unwrap_or(0.0));
                    }
                }
                Ok(histogram)
            }
        }

        deserializer.deserialize_map(HistogramVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_response() {
        let body = r#"{
            "ndvi": 0.47,
            "rainfall": {
                "features": [
                    {"date": "2024-06-01", "rain": 4.2},
                    {"date": "2024-06-02", "rain": null}
                ],
                "statistics": {"total_rainfall": 4.2, "rain_days": 1, "data_days": 2}
            },
            "landcover": {"40": 812, "10": 95.5, "80": 3},
            "yield_prediction": 3.6,
            "drought": {"status": "Mild Drought", "severity": 1},
            "weather": {"temperature": 31},
            "location": {"lat": 18.52, "lng": 73.85},
            "analysis_complete": true
        }"#;

        let result = AnalysisResult::from_json(body).unwrap();
        assert_eq!(result.ndvi, Some(0.47));
        let series = result.rainfall.as_ref().unwrap().series.as_ref().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].rain, None);
        assert_eq!(
            result.drought.as_ref().unwrap().status.as_deref(),
            Some("Mild Drought")
        );
        assert_eq!(result.yield_prediction, Some(3.6));
        assert_eq!(result.location.unwrap().lng, 73.85);
        assert!(result.pollen.is_none());
    }

    #[test]
    fn test_detail_sections_pass_through() {
        let body = r#"{
            "ndvi": 0.5,
            "ndvi_details": {"ndvi": 0.5, "tile_url": "https://tiles.example/ndvi/{z}/{x}/{y}"},
            "yield_details": {
                "yield_range": [2.9, 3.7],
                "unit": "tons/hectare",
                "confidence": "medium"
            },
            "landcover_details": {"dominant_class": "Cropland", "cropland_percent": 64.2}
        }"#;

        let result = AnalysisResult::from_json(body).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value["ndvi_details"]["tile_url"],
            "https://tiles.example/ndvi/{z}/{x}/{y}"
        );
        assert_eq!(value["yield_details"]["yield_range"][1], 3.7);
        assert_eq!(value["yield_details"]["unit"], "tons/hectare");
        assert_eq!(value["landcover_details"]["dominant_class"], "Cropland");
    }

    #[test]
    fn test_histogram_keeps_document_order() {
        let body = r#"{"landcover": {"80": 20, "40": 80, "10": 5}}"#;
        let result = AnalysisResult::from_json(body).unwrap();
        let codes: Vec<i32> = result
            .landcover
            .unwrap()
            .entries()
            .iter()
            .map(|(code, _)| *code)
            .collect();
        assert_eq!(codes, vec![80, 40, 10]);
    }

    #[test]
    fn test_histogram_skips_bad_keys() {
        let histogram: LandCoverHistogram =
            serde_json::from_str(r#"{"40": 10, "Map": 3, "50": null}"#).unwrap();
        assert_eq!(histogram.entries(), &[(40, 10.0), (50, 0.0)]);
        assert_eq!(histogram.total(), 10.0);
    }

    #[test]
    fn test_empty_and_null_sections() {
        let result = AnalysisResult::from_json(r#"{"rainfall": null, "landcover": {}}"#).unwrap();
        assert!(result.rainfall.is_none());
        assert!(result.landcover.unwrap().is_empty());

        let result = AnalysisResult::from_json("{}").unwrap();
        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn test_camel_case_aliases() {
        let body = r#"{
            "yieldPrediction": 2.1,
            "rainfall": {"series": [], "statistics": {"totalRainfall": 42.5}}
        }"#;
        let result = AnalysisResult::from_json(body).unwrap();
        assert_eq!(result.yield_prediction, Some(2.1));
        let rainfall = result.rainfall.unwrap();
        assert_eq!(rainfall.statistics.unwrap().total_rainfall, Some(42.5));
        assert_eq!(rainfall.series, Some(vec![]));
    }

    #[test]
    fn test_histogram_serializes_as_object() {
        let histogram: LandCoverHistogram = vec![(40, 80.0), (80, 20.0)].into_iter().collect();
        let json = serde_json::to_value(&histogram).unwrap();
        assert_eq!(json["40"], 80.0);
        assert_eq!(json["80"], 20.0);
    }
}
