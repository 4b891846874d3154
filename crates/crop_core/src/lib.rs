//! Crop recommendation forest core
//!
//! Data model and read-only inference for a random forest that ranks
//! candidate crops from soil and climate measurements.
//!
//! Modules:
//! - `features`: Feature vectors, soil classes and request validation
//! - `tree`: Decision tree nodes and traversal
//! - `forest`: Trained ensemble, vote aggregation and model fingerprints
//! - `profiles`: Agronomic profiles of the known crop classes
//! - `extraction`: Feature extraction from free-text land descriptions
//! - `config`: Hyperparameters, prediction filters and TOML loading
//! - `canonical`: Canonical JSON for deterministic hashing
//! - `errors`: Error taxonomy

pub mod canonical;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod features;
pub mod forest;
pub mod profiles;
pub mod tree;

pub use config::{FeatureSubset, ForestConfig, ModelParams, PredictionParams, TrainingParams};
pub use errors::{ForestError, Result};
pub use extraction::extract_features_from_description;
pub use features::{FeatureInput, FeatureVector, LabeledSample, NumericFeature, SoilType};
pub use forest::{CropPrediction, Forest, ForestMetadata, FOREST_FORMAT_VERSION};
pub use profiles::{crop_profile, CropProfile, CROP_PROFILES};
pub use tree::TreeNode;
