use cropforest_core::ForestError;
use thiserror::Error;

/// Errors returned by the forest trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Forest(#[from] ForestError),
}
