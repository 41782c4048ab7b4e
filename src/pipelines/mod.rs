/// Text Classification
pub mod text_classification;

/// Pipeline Error
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The tokenizer could not be loaded or failed to encode a text
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Encodings and labels do not line up one to one
    #[error("{encodings} encodings but {labels} labels")]
    LengthMismatch {
        /// Number of encodings
        encodings: usize,
        /// Number of labels
        labels: usize,
    },

    /// Split fractions must each be in [0, 1) and sum to less than 1
    #[error("invalid split fractions: test {test_split}, validation {val_split}")]
    InvalidSplit {
        /// Fraction reserved for testing
        test_split: f64,
        /// Fraction reserved for validation
        val_split: f64,
    },

    /// A batch must hold at least one example
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    /// Encodings must hold at least one token position
    #[error("max sequence length must be at least 1")]
    InvalidMaxSeqLen,

    /// The metadata refers to a different model than the saved weights
    #[error("metadata names model {metadata} but the weights were trained from {weights}")]
    ModelMismatch {
        /// Model name in the metadata file
        metadata: String,
        /// Model name in the model configuration
        weights: String,
    },

    /// The tokenizer produces ids the model has no embeddings for
    #[error("tokenizer vocabulary ({tokenizer}) exceeds the model vocabulary ({model})")]
    VocabularyMismatch {
        /// Tokenizer vocabulary size
        tokenizer: usize,
        /// Model vocabulary size
        model: usize,
    },

    /// Encodings are longer than the model has position embeddings for
    #[error("max sequence length {max_seq_len} exceeds the model's {max_position_embeddings} positions")]
    SequenceTooLong {
        /// Configured max sequence length
        max_seq_len: usize,
        /// Model position embeddings
        max_position_embeddings: usize,
    },
}
