//! Lazily trained, process-lifetime forest
//!
//! [`ModelLifecycle`] is an explicit handle owned by the host (web layer,
//! CLI, tests) rather than an ambient global. The first caller trains the
//! forest; concurrent first callers block on that single in-flight training
//! run and then share the result without further locking.

use cropforest_core::config::FeatureRanges;
use cropforest_core::{
    CropPrediction, FeatureVector, Forest, ForestConfig, ModelParams, PredictionParams,
    TrainingParams,
};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::corpus::CorpusGenerator;
use crate::errors::TrainerError;
use crate::trainer::train_forest;

/// Owner of the single shared forest instance
#[derive(Debug)]
pub struct ModelLifecycle {
    params: ModelParams,
    training: TrainingParams,
    prediction: PredictionParams,
    feature_ranges: FeatureRanges,
    forest: OnceCell<Arc<Forest>>,
    training_runs: AtomicUsize,
}

impl Default for ModelLifecycle {
    fn default() -> Self {
        Self::new(&ForestConfig::default())
    }
}

impl ModelLifecycle {
    pub fn new(config: &ForestConfig) -> Self {
        Self {
            params: config.model.clone(),
            training: config.training.clone(),
            prediction: config.prediction.clone(),
            feature_ranges: config.feature_ranges.clone(),
            forest: OnceCell::new(),
            training_runs: AtomicUsize::new(0),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.forest.get().is_some()
    }

    /// Number of training runs started, successful or not
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::SeqCst)
    }

    /// The trained forest, training it on first use
    ///
    /// A failed initialisation is not cached; the next call retries.
    pub fn classifier(&self) -> Result<&Forest, TrainerError> {
        self.forest
            .get_or_try_init(|| self.train_model())
            .map(|forest| forest.as_ref())
    }

    /// Shared handle to the trained forest
    pub fn shared(&self) -> Result<Arc<Forest>, TrainerError> {
        self.forest.get_or_try_init(|| self.train_model()).cloned()
    }

    /// Full ranked prediction list for `features`
    pub fn get_ml_predictions(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<CropPrediction>, TrainerError> {
        Ok(self.checked_classifier(features)?.predict(features)?)
    }

    /// Ranked predictions filtered by the configured confidence floor and count
    pub fn recommend(&self, features: &FeatureVector) -> Result<Vec<CropPrediction>, TrainerError> {
        Ok(self
            .checked_classifier(features)?
            .top_predictions(features, &self.prediction)?)
    }

    /// Validate `features` before touching the model; training never starts
    /// for a rejected request
    fn checked_classifier(&self, features: &FeatureVector) -> Result<&Forest, TrainerError> {
        features.validate()?;

        let outliers = self.feature_ranges.out_of_range(features);
        if !outliers.is_empty() {
            let names: Vec<&str> = outliers.iter().map(|f| f.name()).collect();
            warn!(fields = ?names, "features outside the plausible domain");
        }

        self.classifier()
    }

    fn train_model(&self) -> Result<Arc<Forest>, TrainerError> {
        let run = self.training_runs.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Initializing random forest model (run {})", run);

        let mut rng = match self.training.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let corpus = CorpusGenerator::new(self.training.samples_per_crop).generate(&mut rng);
        let forest = train_forest(self.params.clone(), &corpus, rng)?;
        let model_hash = forest.model_hash()?;

        info!(
            trees = forest.num_trees(),
            model_hash = %model_hash,
            "Random forest model ready"
        );
        Ok(Arc::new(forest))
    }
}
