use burn::{
    tensor::{backend::Backend, Tensor},
    train::ClassificationOutput,
};

use super::batcher::{Infer, Train};

/// A trait for models that can be used for Text Classification
pub trait Model<B: Backend> {
    /// Perform a forward pass, scoring the output against the batch targets
    fn forward(&self, item: Train<B>) -> ClassificationOutput<B>;

    /// Raw, unnormalized class scores: [batch_size, n_classes]
    fn logits(&self, input: Infer<B>) -> Tensor<B, 2>;
}
