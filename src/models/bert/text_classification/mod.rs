/// BERT for Text Classification Configuration
pub mod config;

/// BERT for Text Classification
pub mod model;

/// Training routine
pub mod train;

/// Saving and reloading trained models
pub mod artifacts;

/// The end-to-end fine-tuning run
pub mod fine_tune;

pub use artifacts::{load_predictor, Loaded};
pub use config::Config;
pub use fine_tune::{fine_tune, fit, FineTuned};
pub use model::{Model, ModelRecord};
