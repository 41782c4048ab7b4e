//! Configure BERT for binary sentiment classification

use std::path::PathBuf;

use bert_burn::model::BertModelConfig;
use burn::{config::Config as _, nn::LinearConfig, tensor::backend::Backend};

use crate::pipelines::PipelineError;

use super::Model;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// The base BERT config
    pub bert: BertModelConfig,

    /// The model name the pretrained weights were loaded for (e.g., "bert-base-uncased")
    pub model_name: String,

    /// Total number of classes
    #[config(default = 2)]
    pub n_classes: usize,
}

impl Config {
    /// Load a Hugging Face `config.json` for a pretrained model
    pub fn load_pretrained(config_file: PathBuf, model_name: &str) -> anyhow::Result<Self> {
        let mut bert = BertModelConfig::load(&config_file)
            .map_err(|e| anyhow!("Unable to load Hugging Face Config file: {}", e))?;

        // Enable the pooling layer for sequence classification
        bert.with_pooling_layer = Some(true);

        Ok(Config::new(bert, model_name.to_string()))
    }

    /// Initialize the model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let bert = self.bert.init(device);
        let output = LinearConfig::new(self.bert.hidden_size, self.n_classes).init(device);

        Model {
            bert,
            output,
            n_classes: self.n_classes,
        }
    }

    /// Check that encodings of `max_seq_len` positions over a vocabulary of `vocab_size` ids fit
    /// this model's embeddings
    pub fn check_encodings(
        &self,
        vocab_size: usize,
        max_seq_len: usize,
    ) -> Result<(), PipelineError> {
        if vocab_size > self.bert.vocab_size {
            return Err(PipelineError::VocabularyMismatch {
                tokenizer: vocab_size,
                model: self.bert.vocab_size,
            });
        }

        if max_seq_len > self.bert.max_position_embeddings {
            return Err(PipelineError::SequenceTooLong {
                max_seq_len,
                max_position_embeddings: self.bert.max_position_embeddings,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// A BERT small enough to train in a unit test
    pub(crate) fn tiny(vocab_size: usize) -> Config {
        let bert = BertModelConfig::new(
            2,
            1,
            1e-12,
            16,
            32,
            vocab_size,
            32,
            2,
            0.0,
            "bert".to_string(),
            0,
        )
        .with_max_seq_len(Some(32))
        .with_with_pooling_layer(Some(true));

        Config::new(bert, "tiny-bert".to_string())
    }

    #[test]
    fn two_classes_by_default() {
        assert_eq!(tiny(10).n_classes, 2);
    }

    #[test]
    fn encodings_must_fit_the_embeddings() {
        let config = tiny(10);

        assert_eq!(config.check_encodings(10, 32), Ok(()));
        assert_eq!(
            config.check_encodings(11, 8),
            Err(PipelineError::VocabularyMismatch {
                tokenizer: 11,
                model: 10
            })
        );
        assert_eq!(
            config.check_encodings(10, 33),
            Err(PipelineError::SequenceTooLong {
                max_seq_len: 33,
                max_position_embeddings: 32
            })
        );
    }
}
