//! Forest configuration management
//!
//! Defaults mirror the production constants; a TOML file may override any
//! subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, Level};

use crate::errors::{ForestError, Result};
use crate::features::{FeatureVector, NumericFeature};

/// How many numeric features are drawn as split candidates at each node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSubset {
    /// `ceil(sqrt(total))`
    #[default]
    Sqrt,
    /// Every feature at every node
    All,
    /// A fixed count, clamped to `1..=total`
    Fixed(usize),
}

impl FeatureSubset {
    pub fn candidate_count(&self, total: usize) -> usize {
        let count = match self {
            FeatureSubset::Sqrt => (total as f64).sqrt().ceil() as usize,
            FeatureSubset::All => total,
            FeatureSubset::Fixed(n) => *n,
        };
        count.clamp(1, total.max(1))
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub num_trees: usize,
    pub max_depth: usize,
    /// Nodes with fewer samples than this become leaves
    pub min_samples_split: usize,
    pub feature_subset: FeatureSubset,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            num_trees: 15,
            max_depth: 12,
            min_samples_split: 5,
            feature_subset: FeatureSubset::Sqrt,
        }
    }
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(ForestError::InvalidParameters(
                "num_trees must be at least 1".to_string(),
            ));
        }
        if let FeatureSubset::Fixed(n) = self.feature_subset {
            if n == 0 || n > NumericFeature::COUNT {
                return Err(ForestError::InvalidParameters(format!(
                    "feature_subset must be within 1..={}, got {n}",
                    NumericFeature::COUNT
                )));
            }
        }
        Ok(())
    }
}

/// Training data and evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub samples_per_crop: usize,
    /// Fraction of the shuffled corpus used for training during evaluation
    pub train_test_split: f64,
    /// `None` seeds from OS entropy
    pub random_seed: Option<u64>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            samples_per_crop: 50,
            train_test_split: 0.8,
            random_seed: None,
        }
    }
}

/// Filtering applied to ranked predictions before they are shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionParams {
    pub min_confidence: f64,
    pub top_n: usize,
}

impl Default for PredictionParams {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            top_n: 3,
        }
    }
}

/// Plausible domain of one numeric feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FeatureRange {
    fn new(min: f64, max: f64, unit: Option<&str>) -> Self {
        Self {
            min,
            max,
            unit: unit.map(str::to_string),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Plausible domains for all numeric features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRanges {
    pub soil_ph: FeatureRange,
    pub nitrogen: FeatureRange,
    pub phosphorus: FeatureRange,
    pub potassium: FeatureRange,
    pub temperature: FeatureRange,
    pub humidity: FeatureRange,
    pub rainfall: FeatureRange,
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self {
            soil_ph: FeatureRange::new(4.5, 8.5, None),
            nitrogen: FeatureRange::new(20.0, 140.0, Some("kg/ha")),
            phosphorus: FeatureRange::new(5.0, 145.0, Some("kg/ha")),
            potassium: FeatureRange::new(5.0, 205.0, Some("kg/ha")),
            temperature: FeatureRange::new(15.0, 40.0, Some("°C")),
            humidity: FeatureRange::new(30.0, 95.0, Some("%")),
            rainfall: FeatureRange::new(40.0, 250.0, Some("cm")),
        }
    }
}

impl FeatureRanges {
    pub fn get(&self, feature: NumericFeature) -> &FeatureRange {
        match feature {
            NumericFeature::SoilPh => &self.soil_ph,
            NumericFeature::Nitrogen => &self.nitrogen,
            NumericFeature::Phosphorus => &self.phosphorus,
            NumericFeature::Potassium => &self.potassium,
            NumericFeature::Temperature => &self.temperature,
            NumericFeature::Humidity => &self.humidity,
            NumericFeature::Rainfall => &self.rainfall,
        }
    }

    /// Features whose value lies outside the plausible domain
    pub fn out_of_range(&self, features: &FeatureVector) -> Vec<NumericFeature> {
        NumericFeature::ALL
            .into_iter()
            .filter(|f| !self.get(*f).contains(features.get(*f)))
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn tracing_level(&self) -> Result<Level> {
        self.level
            .parse::<Level>()
            .map_err(|_| ForestError::Config(format!("unknown log level `{}`", self.level)))
    }
}

/// Complete crop forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ForestConfig {
    pub model: ModelParams,
    pub training: TrainingParams,
    pub prediction: PredictionParams,
    pub feature_ranges: FeatureRanges,
    pub logging: LoggingConfig,
}

impl ForestConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ForestConfig =
            toml::from_str(content).map_err(|e| ForestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ForestError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;

        if self.model.max_depth < 1 {
            return Err(ForestError::Config("max_depth must be at least 1".to_string()));
        }
        if self.training.samples_per_crop == 0 {
            return Err(ForestError::Config(
                "samples_per_crop must be at least 1".to_string(),
            ));
        }
        let split = self.training.train_test_split;
        if !(split > 0.0 && split < 1.0) {
            return Err(ForestError::Config(format!(
                "train_test_split must be between 0 and 1, got {split}"
            )));
        }
        let min_confidence = self.prediction.min_confidence;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(ForestError::Config(format!(
                "min_confidence must be within [0, 1], got {min_confidence}"
            )));
        }
        for feature in NumericFeature::ALL {
            let range = self.feature_ranges.get(feature);
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(ForestError::Config(format!(
                    "feature range for {feature} is invalid: [{}, {}]",
                    range.min, range.max
                )));
            }
        }
        self.logging.tracing_level()?;
        Ok(())
    }
}
