//! Synthetic training corpus generation
//!
//! Each crop class contributes a fixed number of samples scattered uniformly
//! around its profile centroid. Output is class-major and unshuffled.

use cropforest_core::{FeatureVector, LabeledSample, NumericFeature, SoilType, CROP_PROFILES};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Default number of samples drawn per crop class
pub const SAMPLES_PER_CROP: usize = 50;

/// Half-width of the uniform noise band, in [`NumericFeature::ALL`] order
pub const NOISE_HALF_WIDTHS: [f64; NumericFeature::COUNT] =
    [0.75, 20.0, 15.0, 15.0, 4.0, 12.5, 30.0];

/// Generates labeled samples around the built-in crop centroids
#[derive(Debug, Clone)]
pub struct CorpusGenerator {
    samples_per_crop: usize,
}

impl Default for CorpusGenerator {
    fn default() -> Self {
        Self::new(SAMPLES_PER_CROP)
    }
}

impl CorpusGenerator {
    pub fn new(samples_per_crop: usize) -> Self {
        Self { samples_per_crop }
    }

    pub fn expected_len(&self) -> usize {
        CROP_PROFILES.len() * self.samples_per_crop
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<LabeledSample> {
        let mut corpus = Vec::with_capacity(self.expected_len());

        for profile in &CROP_PROFILES {
            for _ in 0..self.samples_per_crop {
                let soil_type = *SoilType::ALL.choose(rng).unwrap_or(&SoilType::Loamy);
                let mut features = profile.centroid(soil_type);
                for (feature, half_width) in NumericFeature::ALL.into_iter().zip(NOISE_HALF_WIDTHS) {
                    let noisy = features.get(feature) + rng.gen_range(-half_width..half_width);
                    features.set(feature, noisy);
                }
                corpus.push(LabeledSample::new(features, profile.key));
            }
        }

        corpus
    }
}

/// 8 classes × 50 samples around the built-in crop profiles
pub fn generate_training_data<R: Rng + ?Sized>(rng: &mut R) -> Vec<LabeledSample> {
    CorpusGenerator::default().generate(rng)
}

/// Per-crop sample count and feature means
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropSummary {
    pub count: usize,
    pub mean: FeatureVector,
}

/// Summary of a corpus keyed by crop label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub total: usize,
    pub crops: BTreeMap<String, CropSummary>,
}

impl CorpusSummary {
    pub fn from_samples(samples: &[LabeledSample]) -> Self {
        let mut sums: BTreeMap<&str, (usize, [f64; NumericFeature::COUNT], SoilType)> =
            BTreeMap::new();

        for sample in samples {
            let entry = sums
                .entry(sample.label.as_str())
                .or_insert((0, [0.0; NumericFeature::COUNT], sample.features.soil_type));
            entry.0 += 1;
            for feature in NumericFeature::ALL {
                entry.1[feature.ordinal()] += sample.features.get(feature);
            }
        }

        let crops = sums
            .into_iter()
            .map(|(label, (count, totals, soil_type))| {
                // soil_type of the mean is the first sample's; it is not averaged
                let mut mean = FeatureVector {
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
                    mean.set(feature, totals[feature.ordinal()] / count as f64);
                }
                (label.to_string(), CropSummary { count, mean })
            })
            .collect();

        Self {
            total: samples.len(),
            crops,
        }
    }
}
