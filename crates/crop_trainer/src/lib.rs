//! Crop forest trainer
//!
//! Synthesises the training corpus, grows the random forest, evaluates it on
//! held-out data and owns the lazily trained model shared by request
//! handlers.

pub mod cart;
pub mod corpus;
pub mod errors;
pub mod evaluation;
pub mod lifecycle;
pub mod scenarios;
pub mod trainer;

pub use cart::{CartBuilder, TreeConfig};
pub use corpus::{generate_training_data, CorpusGenerator, CorpusSummary};
pub use errors::TrainerError;
pub use evaluation::{EvaluationReport, Evaluator};
pub use lifecycle::ModelLifecycle;
pub use scenarios::{Scenario, REFERENCE_SCENARIOS};
pub use trainer::{bootstrap_indices, train_forest, ClassifierBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
