//! Held-out evaluation of the random forest
//!
//! Shuffles a corpus, trains a fresh forest on the leading split and scores
//! top-1 predictions on the remainder.

use cropforest_core::{LabeledSample, ModelParams, TrainingParams};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::corpus::CorpusGenerator;
use crate::errors::TrainerError;
use crate::trainer::ClassifierBuilder;

/// Accuracy figures from one held-out evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// Accuracy restricted to test samples of each true label
    pub per_class_accuracy: BTreeMap<String, f64>,
    /// true label → predicted label → count
    pub confusion_matrix: BTreeMap<String, BTreeMap<String, usize>>,
    pub train_size: usize,
    pub test_size: usize,
}

/// Train/test evaluator, independent of any shared model instance
#[derive(Debug, Clone)]
pub struct Evaluator {
    params: ModelParams,
    train_fraction: f64,
    samples_per_crop: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(ModelParams::default(), &TrainingParams::default())
    }
}

impl Evaluator {
    pub fn new(params: ModelParams, training: &TrainingParams) -> Self {
        Self {
            params,
            train_fraction: training.train_test_split,
            samples_per_crop: training.samples_per_crop,
        }
    }

    /// Evaluate on a freshly generated corpus
    pub fn evaluate<R: Rng>(&self, rng: &mut R) -> Result<EvaluationReport, TrainerError> {
        let corpus = CorpusGenerator::new(self.samples_per_crop).generate(rng);
        self.evaluate_corpus(corpus, rng)
    }

    /// Evaluate on a caller-supplied corpus
    pub fn evaluate_corpus<R: Rng>(
        &self,
        mut corpus: Vec<LabeledSample>,
        rng: &mut R,
    ) -> Result<EvaluationReport, TrainerError> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(TrainerError::Evaluation(format!(
                "train fraction must be between 0 and 1, got {}",
                self.train_fraction
            )));
        }

        corpus.shuffle(rng);
        let train_size = (corpus.len() as f64 * self.train_fraction).floor() as usize;
        let (train, test) = corpus.split_at(train_size);
        if train.is_empty() || test.is_empty() {
            return Err(TrainerError::Evaluation(format!(
                "corpus of {} samples is too small for a {:.0}% split",
                corpus.len(),
                self.train_fraction * 100.0
            )));
        }

        info!(
            "Evaluating random forest: {} train / {} test samples",
            train.len(),
            test.len()
        );

        let mut builder = ClassifierBuilder::new(self.params.clone(), &mut *rng)?;
        builder.train(train)?;
        let forest = builder.finish()?;

        let mut correct = 0usize;
        let mut per_class: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        let mut confusion_matrix: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

        for sample in test {
            let ranked = forest.predict(&sample.features)?;
            let predicted = ranked
                .first()
                .map(|p| p.crop.clone())
                .ok_or_else(|| TrainerError::Evaluation("forest returned no votes".to_string()))?;

            *confusion_matrix
                .entry(sample.label.clone())
                .or_default()
                .entry(predicted.clone())
                .or_default() += 1;

            let entry = per_class.entry(sample.label.clone()).or_default();
            entry.1 += 1;
            if predicted == sample.label {
                correct += 1;
                entry.0 += 1;
            }
        }

        let accuracy = correct as f64 / test.len() as f64;
        let per_class_accuracy: BTreeMap<String, f64> = per_class
            .into_iter()
            .map(|(crop, (hits, total))| (crop, hits as f64 / total as f64))
            .collect();

        info!("Model accuracy: {:.2}%", accuracy * 100.0);
        for (crop, acc) in &per_class_accuracy {
            info!("  {}: {:.2}%", crop, acc * 100.0);
        }

        Ok(EvaluationReport {
            accuracy,
            per_class_accuracy,
            confusion_matrix,
            train_size: train.len(),
            test_size: test.len(),
        })
    }
}
