/// Hyperparameters and artifact metadata
pub mod config;

/// Fixed-length tokenization
pub mod tokenizer;

/// Tensor batches
pub mod batcher;

/// Shuffling, splitting and data loading
pub mod dataset;

/// Common model trait for text classification
pub mod model;

/// Epoch loop
pub mod training;

/// Held-out evaluation
pub mod evaluation;

/// Single-text inference
pub mod predictor;

pub use batcher::Batcher;
pub use config::{Metadata, TrainingConfig};
pub use dataset::{Example, Splits};
pub use evaluation::{evaluate, Evaluation};
pub use model::Model;
pub use predictor::{predict_label, Prediction, Predictor, Sentiment};
pub use tokenizer::{Encoding, TextTokenizer};
pub use training::{train, History, Trained};
