//! Trained random forest with majority-vote inference
//!
//! A [`Forest`] is immutable: it is produced once by a trainer (or loaded and
//! validated from JSON) and then shared read-only across any number of
//! concurrent callers.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

use crate::canonical::{hash_canonical_hex, to_canonical_json};
use crate::config::{ModelParams, PredictionParams};
use crate::errors::{ForestError, Result};
use crate::features::FeatureVector;
use crate::tree::TreeNode;

/// Current serialized forest format
pub const FOREST_FORMAT_VERSION: u32 = 1;

/// One ranked crop with the share of trees that voted for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPrediction {
    pub crop: String,
    /// `votes / tree_count`, in `[0, 1]`
    pub confidence: f64,
    pub votes: usize,
}

/// Provenance of a trained forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestMetadata {
    pub version: u32,
    pub params: ModelParams,
    pub tree_count: usize,
    /// Size of the corpus each bootstrap resample was drawn from
    pub training_samples: usize,
    /// Distinct labels in the training corpus, sorted
    pub classes: Vec<String>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

/// Hash input: everything except the creation timestamp
#[derive(Serialize)]
struct Fingerprint<'a> {
    version: u32,
    params: &'a ModelParams,
    classes: &'a [String],
    training_samples: usize,
    trees: &'a [TreeNode],
}

/// An ensemble of independently trained decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    trees: Vec<TreeNode>,
    metadata: ForestMetadata,
}

impl Forest {
    /// Assemble a forest from trained trees
    ///
    /// Fails with [`ForestError::NotTrained`] when `trees` is empty.
    pub fn new(trees: Vec<TreeNode>, metadata: ForestMetadata) -> Result<Self> {
        let forest = Self { trees, metadata };
        forest.validate()?;
        Ok(forest)
    }

    /// Validate forest structure
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ForestError::NotTrained);
        }
        if self.metadata.version != FOREST_FORMAT_VERSION {
            return Err(ForestError::InvalidModel(format!(
                "Unsupported forest version: {}",
                self.metadata.version
            )));
        }
        if self.metadata.tree_count != self.trees.len() {
            return Err(ForestError::InvalidModel(format!(
                "metadata declares {} trees, forest holds {}",
                self.metadata.tree_count,
                self.trees.len()
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestError::InvalidModel(format!("Tree {i} validation failed: {e}")))?;
        }
        Ok(())
    }

    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    pub fn metadata(&self) -> &ForestMetadata {
        &self.metadata
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Rank crops by the fraction of trees voting for them
    ///
    /// Sorted by vote count descending; equal counts keep discovery order,
    /// i.e. the crop first voted for by an earlier tree ranks higher.
    pub fn predict(&self, features: &FeatureVector) -> Result<Vec<CropPrediction>> {
        if self.trees.is_empty() {
            return Err(ForestError::NotTrained);
        }
        features.validate()?;

        let mut tallies: Vec<(&str, usize)> = Vec::new();
        for tree in &self.trees {
            let crop = tree.predict(features);
            match tallies.iter_mut().find(|(seen, _)| *seen == crop) {
                Some((_, votes)) => *votes += 1,
                None => tallies.push((crop, 1)),
            }
        }

        // stable: preserves discovery order within equal counts
        tallies.sort_by_key(|&(_, votes)| Reverse(votes));

        let total = self.trees.len() as f64;
        let predictions: Vec<CropPrediction> = tallies
            .into_iter()
            .map(|(crop, votes)| CropPrediction {
                crop: crop.to_string(),
                confidence: votes as f64 / total,
                votes,
            })
            .collect();

        debug!(
            top = predictions.first().map(|p| p.crop.as_str()).unwrap_or_default(),
            candidates = predictions.len(),
            "forest prediction"
        );
        Ok(predictions)
    }

    /// Ranked predictions truncated to `top_n` entries at or above `min_confidence`
    pub fn top_predictions(
        &self,
        features: &FeatureVector,
        params: &PredictionParams,
    ) -> Result<Vec<CropPrediction>> {
        Ok(self
            .predict(features)?
            .into_iter()
            .filter(|p| p.confidence >= params.min_confidence)
            .take(params.top_n)
            .collect())
    }

    /// Serialize forest to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Parse and validate a forest from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let forest: Forest = serde_json::from_str(json)?;
        forest.validate()?;
        Ok(forest)
    }

    /// Blake3 fingerprint of the trees and hyperparameters, hex encoded
    ///
    /// Independent of `created_at`, so identically trained forests match.
    pub fn model_hash(&self) -> Result<String> {
        hash_canonical_hex(&Fingerprint {
            version: self.metadata.version,
            params: &self.metadata.params,
            classes: &self.metadata.classes,
            training_samples: self.metadata.training_samples,
            trees: &self.trees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{NumericFeature, SoilType};

    fn metadata(tree_count: usize) -> ForestMetadata {
        ForestMetadata {
            version: FOREST_FORMAT_VERSION,
            params: ModelParams::default(),
            tree_count,
            training_samples: 10,
            classes: vec!["maize".into(), "rice".into(), "wheat".into()],
            created_at: 0,
        }
    }

    fn stump(threshold: f64, left: &str, right: &str) -> TreeNode {
        TreeNode::internal(
            NumericFeature::Rainfall,
            threshold,
            TreeNode::leaf(left, 5),
            TreeNode::leaf(right, 5),
            10,
        )
    }

    fn features(rainfall: f64) -> FeatureVector {
        FeatureVector {
            soil_ph: 6.5,
            nitrogen: 80.0,
            phosphorus: 40.0,
            potassium: 40.0,
            temperature: 25.0,
            humidity: 80.0,
            rainfall,
            soil_type: SoilType::Loamy,
        }
    }

    #[test]
    fn test_empty_forest_is_not_trained() {
        assert!(matches!(
            Forest::new(Vec::new(), metadata(0)),
            Err(ForestError::NotTrained)
        ));
    }

    #[test]
    fn test_tree_count_mismatch() {
        assert!(matches!(
            Forest::new(vec![TreeNode::leaf("rice", 1)], metadata(2)),
            Err(ForestError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_vote_tally() {
        let forest = Forest::new(
            vec![
                stump(100.0, "wheat", "rice"),
                stump(120.0, "wheat", "rice"),
                stump(200.0, "maize", "rice"),
                TreeNode::leaf("rice", 10),
            ],
            metadata(4),
        )
        .unwrap();

        let predictions = forest.predict(&features(150.0)).unwrap();
        assert_eq!(predictions[0].crop, "rice");
        assert_eq!(predictions[0].votes, 3);
        assert!((predictions[0].confidence - 0.75).abs() < 1e-12);
        assert_eq!(predictions[1].crop, "maize");
        assert!((predictions[1].confidence - 0.25).abs() < 1e-12);

        let sum: f64 = predictions.iter().map(|p| p.confidence).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        // "wheat" is discovered by tree 0, "maize" by tree 1
        let forest = Forest::new(
            vec![
                TreeNode::leaf("wheat", 1),
                TreeNode::leaf("maize", 1),
                TreeNode::leaf("maize", 1),
                TreeNode::leaf("wheat", 1),
            ],
            metadata(4),
        )
        .unwrap();
        let crops: Vec<_> = forest
            .predict(&features(100.0))
            .unwrap()
            .into_iter()
            .map(|p| p.crop)
            .collect();
        assert_eq!(crops, vec!["wheat", "maize"]);
    }

    #[test]
    fn test_invalid_features_rejected() {
        let forest = Forest::new(vec![TreeNode::leaf("rice", 1)], metadata(1)).unwrap();
        assert!(matches!(
            forest.predict(&features(f64::NAN)),
            Err(ForestError::InvalidFeature { .. })
        ));
    }

    #[test]
    fn test_top_predictions_filtering() {
        let forest = Forest::new(
            vec![
                TreeNode::leaf("rice", 1),
                TreeNode::leaf("rice", 1),
                TreeNode::leaf("rice", 1),
                TreeNode::leaf("wheat", 1),
                TreeNode::leaf("maize", 1),
            ],
            metadata(5),
        )
        .unwrap();

        let params = PredictionParams {
            min_confidence: 0.3,
            top_n: 3,
        };
        let top = forest.top_predictions(&features(100.0), &params).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].crop, "rice");

        let params = PredictionParams {
            min_confidence: 0.0,
            top_n: 2,
        };
        assert_eq!(forest.top_predictions(&features(100.0), &params).unwrap().len(), 2);
    }

    #[test]
    fn test_json_roundtrip_and_hash() {
        let forest = Forest::new(vec![stump(120.0, "wheat", "rice")], metadata(1)).unwrap();
        let json = forest.to_canonical_json().unwrap();
        let restored = Forest::from_json(&json).unwrap();
        assert_eq!(restored, forest);
        assert_eq!(restored.model_hash().unwrap(), forest.model_hash().unwrap());

        let mut later = metadata(1);
        later.created_at = 1_700_000_000;
        let same_trees = Forest::new(vec![stump(120.0, "wheat", "rice")], later).unwrap();
        assert_eq!(same_trees.model_hash().unwrap(), forest.model_hash().unwrap());

        let other = Forest::new(vec![stump(121.0, "wheat", "rice")], metadata(1)).unwrap();
        assert_ne!(other.model_hash().unwrap(), forest.model_hash().unwrap());
    }

    #[test]
    fn test_from_json_rejects_empty_forest() {
        let json = serde_json::json!({
            "trees": [],
            "metadata": metadata(0),
        })
        .to_string();
        assert!(matches!(Forest::from_json(&json), Err(ForestError::NotTrained)));
    }
}
