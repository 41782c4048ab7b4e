use burn::LearningRate;
use rand::{rngs::StdRng, SeedableRng};

use crate::pipelines::PipelineError;

/// Hyperparameters for fine-tuning
#[derive(burn::config::Config)]
pub struct TrainingConfig {
    /// Fraction of the corpus held out for testing
    #[config(default = 0.2)]
    pub test_split: f64,

    /// Fraction of the corpus, counted against the whole, used for validation
    #[config(default = 0.2)]
    pub val_split: f64,

    /// Batch size
    #[config(default = 32)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 10)]
    pub num_epochs: usize,

    /// Constant learning rate
    #[config(default = 3e-5)]
    pub learning_rate: LearningRate,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Number of token positions per encoding, for training and inference alike
    #[config(default = 50)]
    pub max_seq_len: usize,

    /// Model name (e.g., "bert-base-uncased")
    #[config(default = "\"bert-base-uncased\".to_string()")]
    pub model_name: String,

    /// Seed for balancing and shuffling; unseeded runs differ in partition membership
    pub seed: Option<u64>,
}

impl TrainingConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fraction = |value: f64| (0.0..1.0).contains(&value);

        if !fraction(self.test_split)
            || !fraction(self.val_split)
            || self.test_split + self.val_split >= 1.0
        {
            return Err(PipelineError::InvalidSplit {
                test_split: self.test_split,
                val_split: self.val_split,
            });
        }

        if self.batch_size == 0 {
            return Err(PipelineError::InvalidBatchSize);
        }

        if self.max_seq_len == 0 {
            return Err(PipelineError::InvalidMaxSeqLen);
        }

        Ok(())
    }

    /// The random source for balancing and shuffling
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// What a predictor needs besides the weights: which tokenizer, and how long its encodings are
#[derive(burn::config::Config)]
pub struct Metadata {
    /// Model name the tokenizer is loaded for
    pub model_name: String,

    /// Number of token positions per encoding
    pub max_seq_len: usize,
}

#[cfg(test)]
mod tests {
    use burn::config::Config as _;
    use pretty_assertions::assert_eq;
    use rand::Rng;

    use super::*;

    #[test]
    fn defaults() {
        let config = TrainingConfig::new();

        assert_eq!(config.test_split, 0.2);
        assert_eq!(config.val_split, 0.2);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.num_epochs, 10);
        assert_eq!(config.learning_rate, 3e-5);
        assert_eq!(config.max_seq_len, 50);
        assert_eq!(config.model_name, "bert-base-uncased");
        assert_eq!(config.seed, None);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_unusable_values() {
        for (test_split, val_split) in [(1.0, 0.0), (-0.1, 0.2), (0.5, 0.5), (0.2, 1.2)] {
            let config = TrainingConfig::new()
                .with_test_split(test_split)
                .with_val_split(val_split);

            assert_eq!(
                config.validate(),
                Err(PipelineError::InvalidSplit {
                    test_split,
                    val_split
                })
            );
        }

        assert_eq!(
            TrainingConfig::new().with_batch_size(0).validate(),
            Err(PipelineError::InvalidBatchSize)
        );
        assert_eq!(
            TrainingConfig::new().with_max_seq_len(0).validate(),
            Err(PipelineError::InvalidMaxSeqLen)
        );
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = TrainingConfig::new().with_seed(Some(42));

        let (mut first, mut second) = (config.rng(), config.rng());

        let a: Vec<u32> = (0..4).map(|_| first.gen()).collect();
        let b: Vec<u32> = (0..4).map(|_| second.gen()).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("training.json");

        let config = TrainingConfig::new()
            .with_num_epochs(3)
            .with_max_seq_len(64)
            .with_seed(Some(9));
        config.save(&path).unwrap();

        let loaded = TrainingConfig::load(&path).unwrap();

        assert_eq!(loaded.num_epochs, 3);
        assert_eq!(loaded.max_seq_len, 64);
        assert_eq!(loaded.seed, Some(9));
        assert_eq!(loaded.model_name, "bert-base-uncased");
    }
}
