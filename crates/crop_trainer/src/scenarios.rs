//! Reference land descriptions with hand-measured features
//!
//! Used by the CLI smoke check and the integration tests.

use cropforest_core::{FeatureVector, SoilType};

/// A described plot with its measured features
#[derive(Debug, Clone)]
pub struct Scenario {
    pub description: &'static str,
    pub features: FeatureVector,
}

#[allow(clippy::too_many_arguments)]
const fn features(
    soil_ph: f64,
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    temperature: f64,
    humidity: f64,
    rainfall: f64,
    soil_type: SoilType,
) -> FeatureVector {
    FeatureVector {
        soil_ph,
        nitrogen,
        phosphorus,
        potassium,
        temperature,
        humidity,
        rainfall,
        soil_type,
    }
}

pub const REFERENCE_SCENARIOS: [Scenario; 4] = [
    Scenario {
        description: "Loamy soil with good water retention, pH 6.5, high rainfall area",
        features: features(6.5, 80.0, 40.0, 40.0, 25.0, 80.0, 150.0, SoilType::Loamy),
    },
    Scenario {
        description: "Sandy soil, low rainfall, hot climate",
        features: features(7.2, 50.0, 30.0, 35.0, 32.0, 50.0, 60.0, SoilType::Sandy),
    },
    Scenario {
        description: "Black cotton soil, moderate rainfall, ideal for commercial crops",
        features: features(6.8, 120.0, 60.0, 50.0, 28.0, 65.0, 100.0, SoilType::Black),
    },
    Scenario {
        description: "Red soil with low nitrogen, needs fertilization",
        features: features(6.0, 40.0, 50.0, 40.0, 24.0, 65.0, 70.0, SoilType::Red),
    },
];
