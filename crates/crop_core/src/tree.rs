//! Decision tree structures for forest inference
//!
//! A tree is a recursive union of split and leaf nodes, so every path from
//! the root ends at exactly one leaf by construction.

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, NumericFeature};

/// A decision tree node (internal split or leaf)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Binary split: `value <= threshold` goes left, `value > threshold` right
    Internal {
        feature: NumericFeature,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        /// Training samples that reached this node
        sample_count: usize,
    },
    /// Majority-vote crop label
    Leaf {
        prediction: String,
        sample_count: usize,
    },
}

impl TreeNode {
    /// Create a new leaf node
    pub fn leaf(prediction: impl Into<String>, sample_count: usize) -> Self {
        TreeNode::Leaf {
            prediction: prediction.into(),
            sample_count,
        }
    }

    /// Create a new internal (split) node
    pub fn internal(
        feature: NumericFeature,
        threshold: f64,
        left: TreeNode,
        right: TreeNode,
        sample_count: usize,
    ) -> Self {
        TreeNode::Internal {
            feature,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
            sample_count,
        }
    }

    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn sample_count(&self) -> usize {
        match self {
            TreeNode::Internal { sample_count, .. } | TreeNode::Leaf { sample_count, .. } => {
                *sample_count
            }
        }
    }

    /// Descend to the leaf reached by `features`
    pub fn route(&self, features: &FeatureVector) -> &TreeNode {
        let mut node = self;
        while let TreeNode::Internal {
            feature,
            threshold,
            left,
            right,
            ..
        } = node
        {
            node = if features.get(*feature) <= *threshold {
                left
            } else {
                right
            };
        }
        node
    }

    /// Crop label predicted by this tree
    pub fn predict(&self, features: &FeatureVector) -> &str {
        match self.route(features) {
            TreeNode::Leaf { prediction, .. } => prediction,
            // route() only stops at leaves
            TreeNode::Internal { .. } => unreachable!("route terminated at an internal node"),
        }
    }

    /// Length of the longest root-to-leaf path (a lone leaf has depth 0)
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), String> {
        match self {
            TreeNode::Leaf { prediction, .. } => {
                if prediction.is_empty() {
                    return Err("Leaf node has an empty prediction".to_string());
                }
                Ok(())
            }
            TreeNode::Internal {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if !threshold.is_finite() {
                    return Err(format!(
                        "Split on {feature} has non-finite threshold {threshold}"
                    ));
                }
                left.validate()?;
                right.validate()
            }
        }
    }
}
