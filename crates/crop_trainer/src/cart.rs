//! CART (Classification and Regression Tree) builder
//!
//! Grows a classification tree by recursive binary partitioning, choosing at
//! each node the split that minimises weighted Gini impurity over a random
//! subset of the numeric features.

use cropforest_core::{FeatureSubset, LabeledSample, ModelParams, NumericFeature, TreeNode};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use tracing::trace;

use crate::errors::TrainerError;

/// Training parameters for a single tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub feature_subset: FeatureSubset,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::from(&ModelParams::default())
    }
}

impl From<&ModelParams> for TreeConfig {
    fn from(params: &ModelParams) -> Self {
        Self {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            feature_subset: params.feature_subset,
        }
    }
}

/// Split candidate with its weighted impurity
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: NumericFeature,
    threshold: f64,
    impurity: f64,
}

impl SplitCandidate {
    /// Lower impurity wins; ties go to the lower (feature ordinal, threshold)
    fn beats(&self, other: &SplitCandidate) -> bool {
        self.impurity
            .total_cmp(&other.impurity)
            .then_with(|| self.feature.ordinal().cmp(&other.feature.ordinal()))
            .then_with(|| self.threshold.total_cmp(&other.threshold))
            == Ordering::Less
    }
}

/// Gini impurity `1 - Σ p²` of a class histogram
pub fn gini_impurity(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Build a classification tree over a borrowed corpus
///
/// Samples are addressed by index, so a bootstrap resample is simply an index
/// list with repeats.
pub struct CartBuilder<'a> {
    config: TreeConfig,
    samples: &'a [LabeledSample],
    /// Distinct labels, sorted
    classes: Vec<&'a str>,
    /// Class id of each sample
    label_ids: Vec<usize>,
}

impl<'a> CartBuilder<'a> {
    pub fn new(samples: &'a [LabeledSample], config: TreeConfig) -> Self {
        let mut classes: Vec<&str> = samples.iter().map(|s| s.label.as_str()).collect();
        classes.sort_unstable();
        classes.dedup();

        let label_ids = samples
            .iter()
            .map(|s| classes.binary_search(&s.label.as_str()).unwrap_or_default())
            .collect();

        Self {
            config,
            samples,
            classes,
            label_ids,
        }
    }

    pub fn classes(&self) -> &[&'a str] {
        &self.classes
    }

    /// Build a tree over every sample in the corpus
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<TreeNode, TrainerError> {
        let indices: Vec<usize> = (0..self.samples.len()).collect();
        self.build_tree(&indices, 0, rng)
    }

    /// Build a (sub)tree over the samples at `indices`, starting at `depth`
    pub fn build_tree<R: Rng + ?Sized>(
        &self,
        indices: &[usize],
        depth: usize,
        rng: &mut R,
    ) -> Result<TreeNode, TrainerError> {
        if indices.is_empty() {
            return Err(TrainerError::EmptyCorpus);
        }
        Ok(self.grow(indices, depth, rng))
    }

    /// Recursively build tree nodes
    fn grow<R: Rng + ?Sized>(&self, indices: &[usize], depth: usize, rng: &mut R) -> TreeNode {
        let counts = self.class_counts(indices);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || counts.iter().filter(|&&c| c > 0).count() <= 1
        {
            return self.leaf(&counts, indices.len());
        }

        let split = match self.find_best_split(indices, &counts, rng) {
            Some(s) => s,
            None => return self.leaf(&counts, indices.len()),
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&idx| self.value(idx, split.feature) <= split.threshold);

        trace!(
            depth,
            feature = %split.feature,
            threshold = split.threshold,
            impurity = split.impurity,
            left = left.len(),
            right = right.len(),
            "split node"
        );

        TreeNode::internal(
            split.feature,
            split.threshold,
            self.grow(&left, depth + 1, rng),
            self.grow(&right, depth + 1, rng),
            indices.len(),
        )
    }

    /// Find the impurity-minimising split over a fresh random feature subset
    fn find_best_split<R: Rng + ?Sized>(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let k = self.config.feature_subset.candidate_count(NumericFeature::COUNT);
        let candidates: Vec<NumericFeature> =
            NumericFeature::ALL.choose_multiple(rng, k).copied().collect();

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in candidates {
            order.sort_by(|&a, &b| self.value(a, feature).total_cmp(&self.value(b, feature)));

            let mut left = vec![0usize; self.classes.len()];
            let mut right = parent_counts.to_vec();

            for i in 0..n - 1 {
                let class = self.label_ids[order[i]];
                left[class] += 1;
                right[class] -= 1;

                let lo = self.value(order[i], feature);
                let hi = self.value(order[i + 1], feature);
                if lo == hi {
                    continue;
                }

                let mut threshold = (lo + hi) / 2.0;
                // adjacent floats: keep `hi` strictly on the right
                if threshold >= hi {
                    threshold = lo;
                }

                let n_left = i + 1;
                let n_right = n - n_left;
                let impurity = (n_left as f64 / n as f64) * gini_impurity(&left, n_left)
                    + (n_right as f64 / n as f64) * gini_impurity(&right, n_right);

                let candidate = SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                };
                best = match best {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best
    }

    fn value(&self, idx: usize, feature: NumericFeature) -> f64 {
        self.samples[idx].features.get(feature)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &idx in indices {
            counts[self.label_ids[idx]] += 1;
        }
        counts
    }

    /// Majority label; ties go to the lexicographically smallest crop name
    fn leaf(&self, counts: &[usize], sample_count: usize) -> TreeNode {
        let mut majority = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[majority] {
                majority = class;
            }
        }
        TreeNode::leaf(self.classes[majority], sample_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropforest_core::{FeatureVector, SoilType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn sample(nitrogen: f64, rainfall: f64, label: &str) -> LabeledSample {
        LabeledSample::new(
            FeatureVector {
                soil_ph: 6.5,
                nitrogen,
                phosphorus: 40.0,
                potassium: 40.0,
                temperature: 25.0,
                humidity: 70.0,
                rainfall,
                soil_type: SoilType::Loamy,
            },
            label,
        )
    }

    fn all_features(max_depth: usize, min_samples_split: usize) -> TreeConfig {
        TreeConfig {
            max_depth,
            min_samples_split,
            feature_subset: FeatureSubset::All,
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini_impurity(&[4, 0], 4), 0.0);
        assert!((gini_impurity(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini_impurity(&[], 0), 0.0);
    }

    #[test]
    fn test_depth_zero_is_majority_leaf() {
        let samples = vec![
            sample(10.0, 50.0, "wheat"),
            sample(20.0, 60.0, "rice"),
            sample(30.0, 70.0, "rice"),
        ];
        let builder = CartBuilder::new(&samples, all_features(0, 2));
        let tree = builder.build(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(tree, TreeNode::leaf("rice", 3));
    }

    #[test]
    fn test_majority_tie_breaks_lexicographically() {
        let samples = vec![sample(10.0, 50.0, "wheat"), sample(20.0, 60.0, "maize")];
        let builder = CartBuilder::new(&samples, all_features(0, 2));
        let tree = builder.build(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(tree, TreeNode::leaf("maize", 2));
    }

    #[test]
    fn test_separable_split_at_midpoint() {
        let samples = vec![
            sample(10.0, 100.0, "pulses"),
            sample(20.0, 100.0, "pulses"),
            sample(80.0, 100.0, "rice"),
            sample(90.0, 100.0, "rice"),
        ];
        let builder = CartBuilder::new(&samples, all_features(5, 2));
        let tree = builder.build(&mut StdRng::seed_from_u64(7)).unwrap();

        match tree {
            TreeNode::Internal {
                feature,
                threshold,
                left,
                right,
                sample_count,
            } => {
                assert_eq!(feature, NumericFeature::Nitrogen);
                assert_eq!(threshold, 50.0);
                assert_eq!(*left, TreeNode::leaf("pulses", 2));
                assert_eq!(*right, TreeNode::leaf("rice", 2));
                assert_eq!(sample_count, 4);
            }
            leaf => panic!("expected a split, got {leaf:?}"),
        }
    }

    #[test]
    fn test_constant_features_give_leaf() {
        let samples = vec![
            sample(50.0, 100.0, "rice"),
            sample(50.0, 100.0, "wheat"),
            sample(50.0, 100.0, "rice"),
        ];
        let builder = CartBuilder::new(&samples, all_features(5, 2));
        let tree = builder.build(&mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(tree, TreeNode::leaf("rice", 3));
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let samples = vec![sample(10.0, 100.0, "rice"), sample(90.0, 200.0, "rice")];
        let builder = CartBuilder::new(&samples, all_features(5, 2));
        let tree = builder.build(&mut StdRng::seed_from_u64(2)).unwrap();
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_min_samples_split() {
        let samples = vec![
            sample(10.0, 100.0, "pulses"),
            sample(90.0, 100.0, "rice"),
            sample(95.0, 100.0, "rice"),
        ];
        let builder = CartBuilder::new(&samples, all_features(5, 4));
        let tree = builder.build(&mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(tree, TreeNode::leaf("rice", 3));
    }

    #[test]
    fn test_repeated_indices_are_weighted() {
        let samples = vec![sample(10.0, 100.0, "pulses"), sample(90.0, 100.0, "rice")];
        let builder = CartBuilder::new(&samples, all_features(0, 2));
        let tree = builder
            .build_tree(&[0, 0, 0, 1], 0, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(tree, TreeNode::leaf("pulses", 4));
    }

    #[test]
    fn test_empty_indices_rejected() {
        let samples = vec![sample(10.0, 100.0, "rice")];
        let builder = CartBuilder::new(&samples, TreeConfig::default());
        assert!(matches!(
            builder.build_tree(&[], 0, &mut StdRng::seed_from_u64(0)),
            Err(TrainerError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_depth_bound_respected() {
        let samples: Vec<LabeledSample> = (0..64)
            .map(|i| sample(i as f64, (i * 7 % 13) as f64, if i % 3 == 0 { "rice" } else { "wheat" }))
            .collect();
        let builder = CartBuilder::new(&samples, all_features(3, 2));
        let tree = builder.build(&mut StdRng::seed_from_u64(4)).unwrap();
        assert!(tree.depth() <= 3);
    }

    fn split_features(node: &TreeNode, out: &mut BTreeSet<NumericFeature>) {
        if let TreeNode::Internal {
            feature,
            left,
            right,
            ..
        } = node
        {
            out.insert(*feature);
            split_features(left, out);
            split_features(right, out);
        }
    }

    #[test]
    fn test_feature_subset_redrawn_per_split() {
        // every feature varies, the label depends on nitrogen and rainfall jointly
        let samples: Vec<LabeledSample> = (0..96usize)
            .map(|i| {
                let features = FeatureVector {
                    soil_ph: 5.0 + (i * 11 % 31) as f64 / 10.0,
                    nitrogen: (i * 37 % 101) as f64,
                    phosphorus: (i * 13 % 59) as f64,
                    potassium: (i * 17 % 61) as f64,
                    temperature: 15.0 + (i * 7 % 23) as f64,
                    humidity: 40.0 + (i * 19 % 53) as f64,
                    rainfall: (i * 53 % 197) as f64,
                    soil_type: SoilType::Loamy,
                };
                let label = match (features.nitrogen < 50.0, features.rainfall < 100.0) {
                    (true, true) => "pulses",
                    (true, false) => "rice",
                    (false, true) => "cotton",
                    (false, false) => "sugarcane",
                };
                LabeledSample::new(features, label)
            })
            .collect();

        let config = TreeConfig {
            max_depth: 10,
            min_samples_split: 2,
            feature_subset: FeatureSubset::Fixed(1),
        };
        let builder = CartBuilder::new(&samples, config);

        for seed in 0..5 {
            let tree = builder.build(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(tree.node_count() > 3, "seed {seed}: tree too shallow");

            let mut used = BTreeSet::new();
            split_features(&tree, &mut used);
            // one candidate per node: a single draw per tree would pin every split to it
            assert!(used.len() > 1, "seed {seed}: every split used {used:?}");
        }
    }

    #[test]
    fn test_seeded_build_is_deterministic() {
        let samples: Vec<LabeledSample> = (0..40)
            .map(|i| {
                let label = ["rice", "wheat", "maize"][i % 3];
                sample((i * 37 % 101) as f64, (i * 53 % 97) as f64, label)
            })
            .collect();
        let config = TreeConfig {
            max_depth: 8,
            min_samples_split: 2,
            feature_subset: FeatureSubset::Fixed(1),
        };
        let builder = CartBuilder::new(&samples, config);
        let a = builder.build(&mut StdRng::seed_from_u64(99)).unwrap();
        let b = builder.build(&mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }
}
