//! Land cover classes reported by the analysis service (ESA WorldCover v200).
//!
//! Each known class code maps to a display label and a color token; any other
//! code falls through to [`LandCoverClass::Other`], which carries a generic
//! label and a neutral color.

use serde::{Deserialize, Serialize};

/// Color used for codes outside the WorldCover legend.
pub const NEUTRAL_COLOR: &str = "#9e9e9e";

/// Cropland class code.
pub const CROPLAND_CODE: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandCoverClass {
    TreeCover,
    Shrubland,
    Grassland,
    Cropland,
    BuiltUp,
    BareSparseVegetation,
    SnowAndIce,
    PermanentWater,
    HerbaceousWetland,
    Mangroves,
    MossAndLichen,
    Other(i32),
}

impl LandCoverClass {
    /// All legend classes, in code order.
    pub const KNOWN: [LandCoverClass; 11] = [
        LandCoverClass::TreeCover,
        LandCoverClass::Shrubland,
        LandCoverClass::Grassland,
        LandCoverClass::Cropland,
        LandCoverClass::BuiltUp,
        LandCoverClass::BareSparseVegetation,
        LandCoverClass::SnowAndIce,
        LandCoverClass::PermanentWater,
        LandCoverClass::HerbaceousWetland,
        LandCoverClass::Mangroves,
        LandCoverClass::MossAndLichen,
    ];

    pub fn from_code(code: i32) -> Self {
        match code {
            10 => LandCoverClass::TreeCover,
            20 => LandCoverClass::Shrubland,
            30 => LandCoverClass::Grassland,
            40 => LandCoverClass::Cropland,
            50 => LandCoverClass::BuiltUp,
            60 => LandCoverClass::BareSparseVegetation,
            70 => LandCoverClass::SnowAndIce,
            80 => LandCoverClass::PermanentWater,
            90 => LandCoverClass::HerbaceousWetland,
            95 => LandCoverClass::Mangroves,
            100 => LandCoverClass::MossAndLichen,
            other => LandCoverClass::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            LandCoverClass::TreeCover => 10,
            LandCoverClass::Shrubland => 20,
            LandCoverClass::Grassland => 30,
            LandCoverClass::Cropland => 40,
            LandCoverClass::BuiltUp => 50,
            LandCoverClass::BareSparseVegetation => 60,
            LandCoverClass::SnowAndIce => 70,
            LandCoverClass::PermanentWater => 80,
            LandCoverClass::HerbaceousWetland => 90,
            LandCoverClass::Mangroves => 95,
            LandCoverClass::MossAndLichen => 100,
            LandCoverClass::Other(code) => *code,
        }
    }

    pub fn label(&self) -> String {
        let label = match self {
            LandCoverClass::TreeCover => "Tree Cover",
            LandCoverClass::Shrubland => "Shrubland",
            LandCoverClass::Grassland => "Grassland",
            LandCoverClass::Cropland => "Cropland",
            LandCoverClass::BuiltUp => "Built-up",
            LandCoverClass::BareSparseVegetation => "Bare / Sparse Vegetation",
            LandCoverClass::SnowAndIce => "Snow and Ice",
            LandCoverClass::PermanentWater => "Permanent Water Bodies",
            LandCoverClass::HerbaceousWetland => "Herbaceous Wetland",
            LandCoverClass::Mangroves => "Mangroves",
            LandCoverClass::MossAndLichen => "Moss and Lichen",
            LandCoverClass::Other(code) => return format!("Class {}", code),
        };
        label.to_string()
    }

    /// Hex color from the WorldCover legend.
    pub fn color_token(&self) -> &'static str {
        match self {
            LandCoverClass::TreeCover => "#006400",
            LandCoverClass::Shrubland => "#ffbb22",
            LandCoverClass::Grassland => "#ffff4c",
            LandCoverClass::Cropland => "#f096ff",
            LandCoverClass::BuiltUp => "#fa0000",
            LandCoverClass::BareSparseVegetation => "#b4b4b4",
            LandCoverClass::SnowAndIce => "#f0f0f0",
            LandCoverClass::PermanentWater => "#0064c8",
            LandCoverClass::HerbaceousWetland => "#0096a0",
            LandCoverClass::Mangroves => "#00cf75",
            LandCoverClass::MossAndLichen => "#fae6a0",
            LandCoverClass::Other(_) => NEUTRAL_COLOR,
        }
    }
}
