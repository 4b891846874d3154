//! Random forest trainer
//!
//! Grows each tree on an independent bootstrap resample of the corpus. The
//! builder is one-shot: it trains once and is consumed into an immutable
//! [`Forest`].

use cropforest_core::{
    Forest, ForestError, ForestMetadata, LabeledSample, ModelParams, TreeNode,
    FOREST_FORMAT_VERSION,
};
use rand::Rng;
use tracing::info;

use crate::cart::{CartBuilder, TreeConfig};
use crate::errors::TrainerError;

/// Draw `len` indices uniformly with replacement from `0..len`
pub fn bootstrap_indices<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    (0..len).map(|_| rng.gen_range(0..len)).collect()
}

/// Accumulates trees and yields a [`Forest`] via [`ClassifierBuilder::finish`]
#[derive(Debug)]
pub struct ClassifierBuilder<R> {
    params: ModelParams,
    rng: R,
    trees: Vec<TreeNode>,
    training_samples: usize,
    classes: Vec<String>,
}

impl<R: Rng> ClassifierBuilder<R> {
    pub fn new(params: ModelParams, rng: R) -> Result<Self, TrainerError> {
        params.validate()?;
        Ok(Self {
            params,
            rng,
            trees: Vec::new(),
            training_samples: 0,
            classes: Vec::new(),
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Train `num_trees` trees on bootstrap resamples of `corpus`
    ///
    /// Fails with [`ForestError::Retrain`] if this builder already trained;
    /// on any error the builder is left untouched.
    pub fn train(&mut self, corpus: &[LabeledSample]) -> Result<(), TrainerError> {
        if self.is_trained() {
            return Err(ForestError::Retrain.into());
        }
        if corpus.is_empty() {
            return Err(TrainerError::EmptyCorpus);
        }
        for sample in corpus {
            sample.features.validate()?;
            if sample.label.is_empty() {
                return Err(ForestError::InvalidFeature {
                    field: "label".to_string(),
                    reason: "empty crop label".to_string(),
                }
                .into());
            }
        }

        let builder = CartBuilder::new(corpus, TreeConfig::from(&self.params));
        info!(
            "Training random forest with {} trees on {} samples ({} classes)",
            self.params.num_trees,
            corpus.len(),
            builder.classes().len()
        );

        let mut trees = Vec::with_capacity(self.params.num_trees);
        for tree_idx in 0..self.params.num_trees {
            let resample = bootstrap_indices(corpus.len(), &mut self.rng);
            let tree = builder.build_tree(&resample, 0, &mut self.rng)?;
            info!(
                "Tree {}/{}: depth {}, {} nodes, {} leaves",
                tree_idx + 1,
                self.params.num_trees,
                tree.depth(),
                tree.node_count(),
                tree.leaf_count()
            );
            trees.push(tree);
        }

        self.classes = builder.classes().iter().map(|c| c.to_string()).collect();
        self.training_samples = corpus.len();
        self.trees = trees;
        info!("Random forest training complete");
        Ok(())
    }

    /// Freeze the trained trees into an immutable forest
    pub fn finish(self) -> Result<Forest, TrainerError> {
        if self.trees.is_empty() {
            return Err(ForestError::NotTrained.into());
        }
        let metadata = ForestMetadata {
            version: FOREST_FORMAT_VERSION,
            params: self.params,
            tree_count: self.trees.len(),
            training_samples: self.training_samples,
            classes: self.classes,
            created_at: chrono::Utc::now().timestamp(),
        };
        Ok(Forest::new(self.trees, metadata)?)
    }
}

/// Train a forest in one step
pub fn train_forest<R: Rng>(
    params: ModelParams,
    corpus: &[LabeledSample],
    rng: R,
) -> Result<Forest, TrainerError> {
    let mut builder = ClassifierBuilder::new(params, rng)?;
    builder.train(corpus)?;
    builder.finish()
}
