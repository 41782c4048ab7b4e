use std::fmt::Display;

use burn::{
    data::dataloader::batcher::Batcher as _,
    tensor::{activation::softmax, backend::Backend, ElementConversion},
};
use derive_new::new;

use crate::{datasets::Feedback, pipelines::PipelineError};

use super::{batcher::Infer, Batcher, Model, TextTokenizer};

/// Probabilities at or above this map to [`Sentiment::Positive`]
pub const POSITIVE_THRESHOLD: f64 = 0.75;

/// Probabilities at or below this map to [`Sentiment::Negative`]
pub const NEGATIVE_THRESHOLD: f64 = 0.25;

/// A three-way reading of the positive-class probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// Probability of at most 0.25
    Negative,

    /// Probability strictly between 0.25 and 0.75
    Neutral,

    /// Probability of at least 0.75
    Positive,
}

impl Sentiment {
    /// Map a positive-class probability onto a label
    pub fn from_probability(probability: f64) -> Self {
        if probability >= POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if probability > NEGATIVE_THRESHOLD {
            Sentiment::Neutral
        } else {
            Sentiment::Negative
        }
    }

    /// The label name
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a positive-class probability onto a label
pub fn predict_label(probability: f64) -> Sentiment {
    Sentiment::from_probability(probability)
}

/// A probability together with its label
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Prediction {
    /// Probability of the positive class
    pub probability: f64,

    /// Three-way label for the probability
    pub sentiment: Sentiment,
}

/// Owns a trained model and the tokenizer it was trained with, and scores one text at a time
pub struct Predictor<B: Backend, M> {
    model: M,
    tokenizer: TextTokenizer,
    batcher: Batcher<B>,
}

impl<B: Backend, M: Model<B>> Predictor<B, M> {
    /// Build a predictor, loading the tokenizer published for `model_name`
    pub fn new(
        model: M,
        model_name: &str,
        max_seq_len: usize,
        device: B::Device,
    ) -> Result<Self, PipelineError> {
        let tokenizer = TextTokenizer::from_pretrained(model_name, max_seq_len)?;

        Ok(Self::with_tokenizer(model, tokenizer, device))
    }

    /// Build a predictor around an already configured tokenizer
    pub fn with_tokenizer(model: M, tokenizer: TextTokenizer, device: B::Device) -> Self {
        Self {
            model,
            tokenizer,
            batcher: Batcher::new(device),
        }
    }

    /// Probability that `text` is positive
    pub fn predict_proba(&self, text: &str) -> Result<f64, PipelineError> {
        let encoding = self.tokenizer.encode(text)?;
        let input: Infer<B> = self.batcher.batch(vec![encoding]);

        let logits = self.model.logits(input);
        let positive = Feedback::Positive.class_id();

        let probability = softmax(logits, 1)
            .slice([0..1, positive..positive + 1])
            .into_scalar()
            .elem::<f64>();

        Ok(probability)
    }

    /// Probability that `text` is positive, with its three-way label
    pub fn predict(&self, text: &str) -> Result<Prediction, PipelineError> {
        let probability = self.predict_proba(text)?;

        Ok(Prediction::new(probability, predict_label(probability)))
    }

    /// The wrapped model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The tokenizer used for every prediction
    pub fn tokenizer(&self) -> &TextTokenizer {
        &self.tokenizer
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        nn::loss::CrossEntropyLossConfig,
        tensor::Tensor,
        train::ClassificationOutput,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::pipelines::text_classification::{batcher::Train, tokenizer::tests::word_level_json};

    /// Scores the positive class by how many content tokens a text has
    struct LengthScorer {
        scale: f32,
    }

    impl Model<NdArray> for LengthScorer {
        fn forward(&self, item: Train<NdArray>) -> ClassificationOutput<NdArray> {
            let output = self.logits(item.input);
            let loss = CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output.clone(), item.targets.clone());

            ClassificationOutput {
                loss,
                output,
                targets: item.targets,
            }
        }

        fn logits(&self, input: Infer<NdArray>) -> Tensor<NdArray, 2> {
            let [batch_size, seq_length] = input.tokens.dims();
            let device = input.tokens.device();

            let padding = input.mask_pad.int().sum_dim(1).float();
            let content = padding.neg().add_scalar(seq_length as f32);
            let negative = Tensor::zeros([batch_size, 1], &device);

            Tensor::cat(vec![negative, content.mul_scalar(self.scale)], 1)
        }
    }

    fn predictor(scale: f32) -> Predictor<NdArray, LengthScorer> {
        let tokenizer =
            TextTokenizer::from_bytes(word_level_json(&["love", "my", "echo"]), 8).unwrap();

        Predictor::with_tokenizer(LengthScorer { scale }, tokenizer, Default::default())
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    #[test]
    fn unknown_models_have_no_tokenizer() {
        let predictor = Predictor::<NdArray, _>::new(
            LengthScorer { scale: 1.0 },
            "no-such-org/no-such-model",
            8,
            Default::default(),
        );

        assert!(matches!(predictor.err(), Some(PipelineError::Tokenizer(_))));
    }

    #[test]
    fn thresholds() {
        assert_eq!(predict_label(0.10), Sentiment::Negative);
        assert_eq!(predict_label(0.25), Sentiment::Negative);
        assert_eq!(predict_label(0.2501), Sentiment::Neutral);
        assert_eq!(predict_label(0.50), Sentiment::Neutral);
        assert_eq!(predict_label(0.7499), Sentiment::Neutral);
        assert_eq!(predict_label(0.75), Sentiment::Positive);
        assert_eq!(predict_label(0.90), Sentiment::Positive);
    }

    #[test]
    fn label_names() {
        assert_eq!(Sentiment::Negative.to_string(), "Negative");
        assert_eq!(Sentiment::Neutral.to_string(), "Neutral");
        assert_eq!(Sentiment::Positive.to_string(), "Positive");
    }

    #[test]
    fn softmax_mass_on_the_positive_class() {
        let predictor = predictor(1.0);

        let probability = predictor.predict_proba("Love my Echo").unwrap();
        assert!((probability - sigmoid(3.0)).abs() < 1e-5);

        let probability = predictor.predict_proba("").unwrap();
        assert!((probability - 0.5).abs() < 1e-6);
    }

    #[test]
    fn prediction_carries_its_label() {
        let prediction = predictor(-1.0).predict("love my echo").unwrap();

        assert!(prediction.probability < 0.25);
        assert_eq!(prediction.sentiment, Sentiment::Negative);
    }

    #[test]
    fn predictions_are_stable() {
        let first = predictor(0.3);
        let second = predictor(0.3);

        let text = "love my echo, love it";
        let a = first.predict_proba(text).unwrap();

        assert_eq!(a, first.predict_proba(text).unwrap());
        assert_eq!(a, second.predict_proba(text).unwrap());
    }

    #[test]
    fn texts_longer_than_max_seq_len_are_truncated() {
        let predictor = predictor(1.0);

        let probability = predictor
            .predict_proba("love my echo love my echo love my echo love my echo")
            .unwrap();

        assert!((probability - sigmoid(8.0)).abs() < 1e-5);
    }
}
