//! Result classification: raw analysis result to display-ready summary.
//!
//! Every function here is pure and total. A missing section never fails; it
//! maps to a documented fallback (NDVI 0, `Unknown` drought, empty breakdown,
//! `Unavailable` rainfall).
//!
//! ## Example
//! ```rust
//! use farm_analysis::classify::{classify, VegetationStatus};
//! use farm_analysis::AnalysisResult;
//!
//! let result = AnalysisResult::from_json(r#"{"ndvi": 0.65}"#).unwrap();
//! let summary = classify(&result);
//! assert_eq!(summary.vegetation_status, VegetationStatus::Excellent);
//! ```

use std::cmp::Ordering;

use serde::{Serialize, Serializer};

use crate::landcover::{LandCoverClass, CROPLAND_CODE};
use crate::result::{AnalysisResult, DroughtSection, LandCoverHistogram, RainfallSection};

/// Number of land cover classes kept in the breakdown.
pub const MAX_LAND_COVER_ENTRIES: usize = 5;

// Inclusive lower bounds on NDVI
const NDVI_EXCELLENT: f64 = 0.6;
const NDVI_GOOD: f64 = 0.4;
const NDVI_MODERATE: f64 = 0.2;

// Inclusive lower bounds on mean daily rainfall (mm) for the fallback drought path
const RAIN_NO_DROUGHT_MM: f64 = 5.0;
const RAIN_MILD_DROUGHT_MM: f64 = 2.0;

/// A day counts as rainy above this many millimetres.
const RAIN_DAY_THRESHOLD_MM: f64 = 0.1;

// ============================================================================
// Output Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VegetationStatus {
    Excellent,
    Good,
    Moderate,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DroughtStatus {
    NoDrought,
    MildDrought,
    Moderate,
    SevereOrWorse,
    Unknown,
}

impl DroughtStatus {
    /// Label used when the service gave no status text of its own.
    pub fn default_label(&self) -> &'static str {
        match self {
            DroughtStatus::NoDrought => "Normal",
            DroughtStatus::MildDrought => "Mild Drought",
            DroughtStatus::Moderate => "Moderate Drought",
            DroughtStatus::SevereOrWorse => "Severe Drought",
            DroughtStatus::Unknown => "Unknown",
        }
    }
}

/// Where a drought verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DroughtSource {
    /// The service's own drought index
    Service,
    /// Derived from mean daily rainfall
    RainfallFallback,
    /// No usable input
    Missing,
}

/// Drought severity plus the text to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroughtAssessment {
    pub status: DroughtStatus,
    /// Service label verbatim when present, otherwise the status default
    pub label: String,
    pub source: DroughtSource,
}

/// One row of the land cover breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandCoverEntry {
    pub class_code: i32,
    pub label: String,
    pub color_token: String,
    /// Share of all pixels, rounded to one decimal
    pub percent_of_total: f64,
    pub pixel_count: f64,
}

/// Total rainfall over the analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RainfallTotal {
    Measured(f64),
    Unavailable,
}

impl RainfallTotal {
    pub fn millimetres(&self) -> Option<f64> {
        match self {
            RainfallTotal::Measured(mm) => Some(*mm),
            RainfallTotal::Unavailable => None,
        }
    }
}

impl Serialize for RainfallTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RainfallTotal::Measured(mm) => serializer.serialize_f64(*mm),
            RainfallTotal::Unavailable => serializer.serialize_str("unavailable"),
        }
    }
}

/// Everything the report shows that is computed rather than passed through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSummary {
    /// NDVI used for classification (0 when absent)
    pub ndvi: f64,
    pub vegetation_status: VegetationStatus,
    pub drought: DroughtAssessment,
    pub land_cover_breakdown: Vec<LandCoverEntry>,
    pub dominant_land_cover: Option<LandCoverEntry>,
    /// Cropland share of all pixels, rounded to two decimals
    pub cropland_percent: f64,
    pub total_rainfall_mm: RainfallTotal,
    pub average_daily_rainfall_mm: Option<f64>,
    pub rain_days: Option<u32>,
    pub yield_tons_per_hectare: Option<f64>,
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a full analysis result.
pub fn classify(result: &AnalysisResult) -> DerivedSummary {
    let rainfall = result.rainfall.as_ref();
    let landcover = result.landcover.as_ref();
    let ndvi = result.ndvi.unwrap_or(0.0);

    DerivedSummary {
        ndvi,
        vegetation_status: classify_vegetation(ndvi),
        drought: classify_drought(result.drought.as_ref(), rainfall),
        land_cover_breakdown: land_cover_breakdown(landcover),
        dominant_land_cover: dominant_land_cover(landcover),
        cropland_percent: cropland_percent(landcover),
        total_rainfall_mm: total_rainfall(rainfall),
        average_daily_rainfall_mm: average_daily_rainfall(rainfall),
        rain_days: rain_days(rainfall),
        yield_tons_per_hectare: result.yield_prediction,
    }
}

/// Vegetation health from NDVI.
pub fn classify_vegetation(ndvi: f64) -> VegetationStatus {
    if ndvi >= NDVI_EXCELLENT {
        VegetationStatus::Excellent
    } else if ndvi >= NDVI_GOOD {
        VegetationStatus::Good
    } else if ndvi >= NDVI_MODERATE {
        VegetationStatus::Moderate
    } else {
        VegetationStatus::Poor
    }
}

/// Drought severity from the service's status, else from rainfall.
///
/// The rainfall fallback never yields `Moderate`.
pub fn classify_drought(
    drought: Option<&DroughtSection>,
    rainfall: Option<&RainfallSection>,
) -> DroughtAssessment {
    let service_status = drought
        .and_then(|d| d.status.as_deref())
        .filter(|s| !s.is_empty());

    if let Some(label) = service_status {
        let status = match label {
            "Normal" => DroughtStatus::NoDrought,
            "Mild Drought" => DroughtStatus::MildDrought,
            "Moderate Drought" => DroughtStatus::Moderate,
            _ => DroughtStatus::SevereOrWorse,
        };
        return DroughtAssessment {
            status,
            label: label.to_string(),
            source: DroughtSource::Service,
        };
    }

    let status = match average_daily_rainfall(rainfall) {
        Some(avg) if avg >= RAIN_NO_DROUGHT_MM => DroughtStatus::NoDrought,
        Some(avg) if avg >= RAIN_MILD_DROUGHT_MM => DroughtStatus::MildDrought,
        Some(_) => DroughtStatus::SevereOrWorse,
        None => {
            return DroughtAssessment {
                status: DroughtStatus::Unknown,
                label: DroughtStatus::Unknown.default_label().to_string(),
                source: DroughtSource::Missing,
            }
        }
    };

    DroughtAssessment {
        status,
        label: status.default_label().to_string(),
        source: DroughtSource::RainfallFallback,
    }
}

/// Top land cover classes by share of pixels.
///
/// Stable sort, so equal percentages keep histogram order. Classes beyond
/// the top five are dropped.
pub fn land_cover_breakdown(histogram: Option<&LandCoverHistogram>) -> Vec<LandCoverEntry> {
    let Some(histogram) = histogram else {
        return Vec::new();
    };
    let total = histogram.total();

    let mut entries: Vec<LandCoverEntry> = histogram
        .entries()
        .iter()
        .map(|&(code, count)| land_cover_entry(code, count, total))
        .collect();

    entries.sort_by(|a, b| {
        b.percent_of_total
            .partial_cmp(&a.percent_of_total)
            .unwrap_or(Ordering::Equal)
    });
    entries.truncate(MAX_LAND_COVER_ENTRIES);
    entries
}

/// Class with the most pixels; the first one wins a tie.
pub fn dominant_land_cover(histogram: Option<&LandCoverHistogram>) -> Option<LandCoverEntry> {
    let histogram = histogram?;
    let total = histogram.total();

    let mut best: Option<(i32, f64)> = None;
    for &(code, count) in histogram.entries() {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((code, count));
        }
    }

    best.map(|(code, count)| land_cover_entry(code, count, total))
}

/// Cropland pixels as a percentage of all pixels.
pub fn cropland_percent(histogram: Option<&LandCoverHistogram>) -> f64 {
    let Some(histogram) = histogram else {
        return 0.0;
    };
    let total = histogram.total();
    if total <= 0.0 {
        return 0.0;
    }
    let cropland = histogram.get(CROPLAND_CODE).unwrap_or(0.0);
    round_to(cropland / total * 100.0, 2)
}

/// Service total if present, else the series sum, else unavailable.
pub fn total_rainfall(rainfall: Option<&RainfallSection>) -> RainfallTotal {
    let Some(rainfall) = rainfall else {
        return RainfallTotal::Unavailable;
    };

    if let Some(total) = rainfall.statistics.as_ref().and_then(|s| s.total_rainfall) {
        return RainfallTotal::Measured(total);
    }

    match &rainfall.series {
        Some(series) => RainfallTotal::Measured(series.iter().map(|s| s.rain.unwrap_or(0.0)).sum()),
        None => RainfallTotal::Unavailable,
    }
}

/// Mean daily rain over all samples, missing values counted as 0.
pub fn average_daily_rainfall(rainfall: Option<&RainfallSection>) -> Option<f64> {
    let series = rainfall?.series.as_ref()?;
    if series.is_empty() {
        return None;
    }
    let sum: f64 = series.iter().map(|s| s.rain.unwrap_or(0.0)).sum();
    Some(sum / series.len() as f64)
}

/// Number of samples with measurable rain.
pub fn rain_days(rainfall: Option<&RainfallSection>) -> Option<u32> {
    let series = rainfall?.series.as_ref()?;
    Some(
        series
            .iter()
            .filter(|s| s.rain.is_some_and(|mm| mm > RAIN_DAY_THRESHOLD_MM))
            .count() as u32,
    )
}

fn land_cover_entry(code: i32, count: f64, total: f64) -> LandCoverEntry {
    let class = LandCoverClass::from_code(code);
    let percent = if total > 0.0 {
        round_to(count / total * 100.0, 1)
    } else {
        0.0
    };
    LandCoverEntry {
        class_code: code,
        label: class.label(),
        color_token: class.color_token().to_string(),
        percent_of_total: percent,
        pixel_count: count,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============================================================================
// Tests
// ============================================================================
