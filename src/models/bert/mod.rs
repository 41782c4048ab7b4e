/// BERT for Text Classification (such as sentiment analysis)
pub mod text_classification;

/// bert-base-uncased
pub static BASE_UNCASED: &str = "bert-base-uncased";

/// bert-base-cased
pub static BASE_CASED: &str = "bert-base-cased";

/// Pretrained BERT checkpoints known to load for text classification
pub static TEXT_CLASSIFICATION_MODELS: &[&str; 2] = &[BASE_UNCASED, BASE_CASED];
