//! Coordinate classifier.
//!
//! Maps a geolocation fix to a land-characteristics report by bucketing the
//! absolute latitude into one of four climate bands. The mapping is pure and
//! deterministic: the same coordinate always yields the same report.
//!
//! Longitude and image content are part of the submission but do not affect
//! the output. This is a known simplification carried over from the original
//! system, where the band tables stand in for a real inference backend, and
//! the surrounding contract (stored reports, displayed results) depends on it
//! staying latitude-only.

use crate::api::{Coordinate, LandReport};

/// Recommendations appended to every report regardless of band, in this order.
const UNIVERSAL_RECOMMENDATIONS: [&str; 3] = [
    "Conduct soil testing",
    "Monitor water table levels",
    "Assess local climate patterns",
];

/// The four disjoint absolute-latitude bands.
///
/// Bands are tested high-to-low, so each boundary is exclusive on the lower
/// band: 60 is still temperate, 60.0001 is tundra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatitudeBand {
    /// |lat| > 60
    Polar,
    /// 45 < |lat| <= 60
    Temperate,
    /// 23.5 < |lat| <= 45
    Subtropical,
    /// |lat| <= 23.5
    Tropical,
}

impl LatitudeBand {
    /// Select the band for a latitude in degrees.
    pub fn for_latitude(latitude: f64) -> Self {
        let abs = latitude.abs();
        if abs > 60.0 {
            Self::Polar
        } else if abs > 45.0 {
            Self::Temperate
        } else if abs > 23.5 {
            Self::Subtropical
        } else {
            Self::Tropical
        }
    }
}

/// Derive a land-characteristics report from a coordinate.
///
/// Pure and total: no failure conditions, no side effects. Every band yields
/// non-empty `features` and `recommendations`, and `recommendations` always
/// ends with the three universal entries.
pub fn classify(coordinate: &Coordinate) -> LandReport {
    let band = LatitudeBand::for_latitude(coordinate.latitude);

    let (terrain, vegetation, soil_type, land_use, features, recommendations): (
        &str,
        &str,
        &str,
        &str,
        &[&str],
        &[&str],
    ) = match band {
        LatitudeBand::Polar => (
            "Tundra",
            "Low shrubs and mosses",
            "Permafrost",
            "Conservation",
            &["Cold climate", "Limited growing season"],
            &["Consider cold-resistant crops", "Implement greenhouse farming"],
        ),
        LatitudeBand::Temperate => (
            "Temperate hills",
            "Mixed forest",
            "Clay-loam",
            "Mixed use",
            &["Four seasons", "Moderate rainfall", "Good drainage"],
            &[
                "Suitable for diverse crops",
                "Consider fruit orchards",
                "Good for livestock",
            ],
        ),
        LatitudeBand::Subtropical => (
            "Subtropical plains",
            "Dense vegetation",
            "Rich organic soil",
            "High-yield agriculture",
            &["Long growing season", "High rainfall", "Fertile land"],
            &[
                "Ideal for cash crops",
                "Multiple harvests possible",
                "Consider irrigation systems",
            ],
        ),
        LatitudeBand::Tropical => (
            "Tropical",
            "Tropical plants",
            "Laterite soil",
            "Specialized agriculture",
            &["Year-round growing", "High temperatures", "Heavy rainfall"],
            &[
                "Focus on tropical crops",
                "Implement water management",
                "Consider agroforestry",
            ],
        ),
    };

    let mut all_recommendations: Vec<String> =
        recommendations.iter().map(|s| s.to_string()).collect();
    all_recommendations.extend(UNIVERSAL_RECOMMENDATIONS.iter().map(|s| s.to_string()));

    LandReport {
        terrain: terrain.to_string(),
        vegetation: vegetation.to_string(),
        soil_type: soil_type.to_string(),
        land_use: land_use.to_string(),
        features: features.iter().map(|s| s.to_string()).collect(),
        recommendations: all_recommendations,
    }
}
