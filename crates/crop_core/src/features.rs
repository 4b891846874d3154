//! Soil and climate features consumed by the classifier
//!
//! A [`FeatureVector`] carries seven numeric measurements and a categorical
//! soil class. Only the numeric fields participate in tree splits; the soil
//! class is metadata for downstream consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ForestError, Result};

/// Categorical soil class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoilType {
    Sandy,
    Loamy,
    Clay,
    Red,
    Black,
    Alluvial,
}

impl SoilType {
    /// All soil classes in canonical order
    pub const ALL: [SoilType; 6] = [
        SoilType::Sandy,
        SoilType::Loamy,
        SoilType::Clay,
        SoilType::Red,
        SoilType::Black,
        SoilType::Alluvial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Sandy => "Sandy",
            SoilType::Loamy => "Loamy",
            SoilType::Clay => "Clay",
            SoilType::Red => "Red",
            SoilType::Black => "Black",
            SoilType::Alluvial => "Alluvial",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        SoilType::ALL
            .iter()
            .copied()
            .find(|soil| soil.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                ForestError::invalid_feature("soil_type", format!("unknown soil type `{needle}`"))
            })
    }
}

/// The numeric fields a tree may split on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    SoilPh,
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Rainfall,
}

impl NumericFeature {
    /// Split candidates in canonical (ordinal) order
    pub const ALL: [NumericFeature; 7] = [
        NumericFeature::SoilPh,
        NumericFeature::Nitrogen,
        NumericFeature::Phosphorus,
        NumericFeature::Potassium,
        NumericFeature::Temperature,
        NumericFeature::Humidity,
        NumericFeature::Rainfall,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn name(&self) -> &'static str {
        match self {
            NumericFeature::SoilPh => "soil_ph",
            NumericFeature::Nitrogen => "nitrogen",
            NumericFeature::Phosphorus => "phosphorus",
            NumericFeature::Potassium => "potassium",
            NumericFeature::Temperature => "temperature",
            NumericFeature::Humidity => "humidity",
            NumericFeature::Rainfall => "rainfall",
        }
    }

    /// Position in [`NumericFeature::ALL`]
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for NumericFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One sample's soil and climate attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Soil pH (≈ 4.5–8.5)
    pub soil_ph: f64,
    /// Nitrogen, kg/ha
    pub nitrogen: f64,
    /// Phosphorus, kg/ha
    pub phosphorus: f64,
    /// Potassium, kg/ha
    pub potassium: f64,
    /// Temperature, °C
    pub temperature: f64,
    /// Relative humidity, %
    pub humidity: f64,
    /// Rainfall, cm
    pub rainfall: f64,
    pub soil_type: SoilType,
}

impl FeatureVector {
    /// Read a numeric field
    pub fn get(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::SoilPh => self.soil_ph,
            NumericFeature::Nitrogen => self.nitrogen,
            NumericFeature::Phosphorus => self.phosphorus,
            NumericFeature::Potassium => self.potassium,
            NumericFeature::Temperature => self.temperature,
            NumericFeature::Humidity => self.humidity,
            NumericFeature::Rainfall => self.rainfall,
        }
    }

    /// Overwrite a numeric field
    pub fn set(&mut self, feature: NumericFeature, value: f64) {
        match feature {
            NumericFeature::SoilPh => self.soil_ph = value,
            NumericFeature::Nitrogen => self.nitrogen = value,
            NumericFeature::Phosphorus => self.phosphorus = value,
            NumericFeature::Potassium => self.potassium = value,
            NumericFeature::Temperature => self.temperature = value,
            NumericFeature::Humidity => self.humidity = value,
            NumericFeature::Rainfall => self.rainfall = value,
        }
    }

    /// Ensure every numeric field is finite
    pub fn validate(&self) -> Result<()> {
        for feature in NumericFeature::ALL {
            let value = self.get(feature);
            if !value.is_finite() {
                return Err(ForestError::invalid_feature(
                    feature.name(),
                    format!("value {value} is not finite"),
                ));
            }
        }
        Ok(())
    }
}

/// Raw request payload as submitted by a form or API client
///
/// Every field is optional so that missing values surface as
/// [`ForestError::InvalidFeature`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureInput {
    pub soil_ph: Option<f64>,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub rainfall: Option<f64>,
    pub soil_type: Option<String>,
}

impl FeatureInput {
    fn field(&self, feature: NumericFeature) -> Option<f64> {
        match feature {
            NumericFeature::SoilPh => self.soil_ph,
            NumericFeature::Nitrogen => self.nitrogen,
            NumericFeature::Phosphorus => self.phosphorus,
            NumericFeature::Potassium => self.potassium,
            NumericFeature::Temperature => self.temperature,
            NumericFeature::Humidity => self.humidity,
            NumericFeature::Rainfall => self.rainfall,
        }
    }
}

impl TryFrom<FeatureInput> for FeatureVector {
    type Error = ForestError;

    fn try_from(input: FeatureInput) -> Result<Self> {
        let soil_type = input
            .soil_type
            .as_deref()
            .ok_or_else(|| ForestError::invalid_feature("soil_type", "missing"))?
            .parse::<SoilType>()?;

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
            let value = input
                .field(feature)
                .ok_or_else(|| ForestError::invalid_feature(feature.name(), "missing"))?;
            vector.set(feature, value);
        }

        vector.validate()?;
        Ok(vector)
    }
}

/// A feature vector with its crop class label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub label: String,
}

impl LabeledSample {
    pub fn new(features: FeatureVector, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }
}
