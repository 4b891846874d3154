//! Agronomic profiles of the crops the forest knows about
//!
//! The optimal value of each range doubles as the class centroid used when
//! synthesising training data.

use serde::Serialize;

use crate::features::{FeatureVector, NumericFeature, SoilType};

/// Acceptable and optimal value of one numeric feature for a crop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalRange {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

const fn range(min: f64, max: f64, optimal: f64) -> OptimalRange {
    OptimalRange { min, max, optimal }
}

/// Growing conditions for one crop class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProfile {
    /// Class label used by the classifier
    pub key: &'static str,
    /// Display name
    pub label: &'static str,
    /// Ranges in [`NumericFeature::ALL`] order
    pub conditions: [OptimalRange; NumericFeature::COUNT],
    pub preferred_soils: &'static [SoilType],
    pub seasons: &'static [&'static str],
    pub duration: &'static str,
}

impl CropProfile {
    pub fn condition(&self, feature: NumericFeature) -> &OptimalRange {
        &self.conditions[feature.ordinal()]
    }

    /// Feature vector at the optimal value of every range
    pub fn centroid(&self, soil_type: SoilType) -> FeatureVector {
        let mut vector = FeatureVector {
            soil_ph: 0.0,
            nitrogen: 0.0,
            phosphorus: 0.0,
            potassium: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            rainfall: 0.0,
            soil_type,
        };
        for feature in NumericFeature::ALL {
            vector.set(feature, self.condition(feature).optimal);
        }
        vector
    }

    pub fn prefers_soil(&self, soil_type: SoilType) -> bool {
        self.preferred_soils.contains(&soil_type)
    }
}

pub static CROP_PROFILES: [CropProfile; 8] = [
    CropProfile {
        key: "rice",
        label: "Rice (Paddy)",
        conditions: [
            range(5.5, 7.5, 6.5),
            range(60.0, 100.0, 80.0),
            range(30.0, 50.0, 40.0),
            range(30.0, 50.0, 40.0),
            range(20.0, 35.0, 25.0),
            range(70.0, 90.0, 80.0),
            range(100.0, 200.0, 150.0),
        ],
        preferred_soils: &[SoilType::Loamy, SoilType::Clay, SoilType::Alluvial],
        seasons: &["Kharif", "Rabi"],
        duration: "120-150 days",
    },
    CropProfile {
        key: "wheat",
        label: "Wheat",
        conditions: [
            range(6.0, 7.5, 6.8),
            range(80.0, 120.0, 100.0),
            range(40.0, 60.0, 50.0),
            range(20.0, 40.0, 30.0),
            range(10.0, 25.0, 22.0),
            range(50.0, 70.0, 60.0),
            range(50.0, 100.0, 80.0),
        ],
        preferred_soils: &[SoilType::Loamy, SoilType::Black, SoilType::Alluvial],
        seasons: &["Rabi"],
        duration: "110-130 days",
    },
    CropProfile {
        key: "maize",
        label: "Maize (Corn)",
        conditions: [
            range(5.5, 7.5, 6.5),
            range(70.0, 110.0, 90.0),
            range(35.0, 55.0, 45.0),
            range(35.0, 55.0, 45.0),
            range(18.0, 32.0, 26.0),
            range(60.0, 80.0, 70.0),
            range(65.0, 115.0, 90.0),
        ],
        preferred_soils: &[SoilType::Loamy, SoilType::Sandy, SoilType::Black],
        seasons: &["Kharif", "Rabi"],
        duration: "80-110 days",
    },
    CropProfile {
        key: "cotton",
        label: "Cotton",
        conditions: [
            range(6.0, 7.5, 6.5),
            range(100.0, 140.0, 120.0),
            range(50.0, 70.0, 60.0),
            range(40.0, 60.0, 50.0),
            range(21.0, 35.0, 28.0),
            range(50.0, 80.0, 65.0),
            range(75.0, 125.0, 100.0),
        ],
        preferred_soils: &[SoilType::Black, SoilType::Red, SoilType::Alluvial],
        seasons: &["Kharif"],
        duration: "180-210 days",
    },
    CropProfile {
        key: "sugarcane",
        label: "Sugarcane",
        conditions: [
            range(6.0, 7.5, 6.5),
            range(90.0, 130.0, 110.0),
            range(45.0, 65.0, 55.0),
            range(50.0, 70.0, 60.0),
            range(20.0, 40.0, 30.0),
            range(65.0, 85.0, 75.0),
            range(100.0, 180.0, 140.0),
        ],
        preferred_soils: &[SoilType::Loamy, SoilType::Black, SoilType::Alluvial],
        seasons: &["Year-round"],
        duration: "300-365 days",
    },
    CropProfile {
        key: "pulses",
        label: "Pulses (Lentils, Gram)",
        conditions: [
            range(6.0, 8.0, 7.0),
            range(20.0, 60.0, 40.0),
            range(40.0, 60.0, 50.0),
            range(30.0, 50.0, 40.0),
            range(15.0, 30.0, 24.0),
            range(50.0, 75.0, 65.0),
            range(50.0, 90.0, 70.0),
        ],
        preferred_soils: &[SoilType::Red, SoilType::Black, SoilType::Loamy],
        seasons: &["Rabi", "Kharif"],
        duration: "90-120 days",
    },
    CropProfile {
        key: "vegetables",
        label: "Vegetables",
        conditions: [
            range(6.0, 7.5, 6.5),
            range(80.0, 120.0, 100.0),
            range(60.0, 80.0, 70.0),
            range(70.0, 90.0, 80.0),
            range(15.0, 35.0, 25.0),
            range(60.0, 85.0, 75.0),
            range(80.0, 140.0, 110.0),
        ],
        preferred_soils: &[SoilType::Loamy, SoilType::Sandy, SoilType::Alluvial],
        seasons: &["Year-round"],
        duration: "60-120 days",
    },
    CropProfile {
        key: "oilseeds",
        label: "Oilseeds (Groundnut, Mustard)",
        conditions: [
            range(6.0, 7.5, 6.8),
            range(50.0, 90.0, 70.0),
            range(50.0, 70.0, 60.0),
            range(40.0, 60.0, 50.0),
            range(20.0, 35.0, 27.0),
            range(50.0, 70.0, 60.0),
            range(60.0, 110.0, 85.0),
        ],
        preferred_soils: &[SoilType::Sandy, SoilType::Red, SoilType::Loamy],
        seasons: &["Kharif", "Rabi"],
        duration: "100-140 days",
    },
];

/// Look up a crop profile by class label (case-insensitive)
pub fn crop_profile(key: &str) -> Option<&'static CropProfile> {
    CROP_PROFILES
        .iter()
        .find(|profile| profile.key.eq_ignore_ascii_case(key.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let rice = crop_profile("Rice").unwrap();
        assert_eq!(rice.label, "Rice (Paddy)");
        assert!(rice.prefers_soil(SoilType::Clay));
        assert!(!rice.prefers_soil(SoilType::Sandy));
        assert!(crop_profile("quinoa").is_none());
    }

    #[test]
    fn test_rice_centroid() {
        let centroid = crop_profile("rice").unwrap().centroid(SoilType::Loamy);
        assert_eq!(centroid.soil_ph, 6.5);
        assert_eq!(centroid.nitrogen, 80.0);
        assert_eq!(centroid.phosphorus, 40.0);
        assert_eq!(centroid.potassium, 40.0);
        assert_eq!(centroid.temperature, 25.0);
        assert_eq!(centroid.humidity, 80.0);
        assert_eq!(centroid.rainfall, 150.0);
    }

    #[test]
    fn test_profiles_are_consistent() {
        let mut keys: Vec<_> = CROP_PROFILES.iter().map(|p| p.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CROP_PROFILES.len());

        for profile in &CROP_PROFILES {
            for r in &profile.conditions {
                assert!(r.min <= r.optimal && r.optimal <= r.max, "{}", profile.key);
            }
        }
    }
}
