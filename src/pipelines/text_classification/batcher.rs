use burn::{
    data::dataloader,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;

use crate::utils::tensors::int_tensor;

use super::{dataset::Example, Encoding};

/// An inference batch for text classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Token ids as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the token ids, true at padding positions
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Turns fixed-length encodings into tensors on a device
#[derive(Clone, new)]
pub struct Batcher<B: Backend> {
    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<Encoding, Infer<B>> for Batcher<B> {
    /// Stacks encodings of equal length into an inference batch
    fn batch(&self, items: Vec<Encoding>) -> Infer<B> {
        let batch_size = items.len();
        let seq_length = items.first().map(Encoding::len).unwrap_or_default();

        let mut token_ids = Vec::with_capacity(batch_size * seq_length);
        let mut attention_mask = Vec::with_capacity(batch_size * seq_length);

        for encoding in items {
            debug_assert_eq!(encoding.len(), seq_length, "encodings differ in length");

            token_ids.extend(encoding.input_ids.into_iter().map(i64::from));
            attention_mask.extend(encoding.attention_mask.into_iter().map(i64::from));
        }

        let tokens = int_tensor::<B, 2>(token_ids, [batch_size, seq_length], &self.device);
        let mask_pad = int_tensor::<B, 2>(attention_mask, [batch_size, seq_length], &self.device)
            .equal_elem(0);

        Infer { tokens, mask_pad }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<Example, Train<B>> for Batcher<B> {
    /// Stacks labeled examples into a training batch
    fn batch(&self, items: Vec<Example>) -> Train<B> {
        let batch_size = items.len();

        let class_ids = items
            .iter()
            .map(|item| item.feedback.class_id() as i64)
            .collect();
        let targets = int_tensor::<B, 1>(class_ids, [batch_size], &self.device);

        let input: Infer<B> = self.batch(items.into_iter().map(|item| item.encoding).collect());

        Train { input, targets }
    }
}

#[cfg(test)]
mod tests {
    use burn::{backend::NdArray, data::dataloader::batcher::Batcher as _};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::datasets::Feedback;

    fn encoding(ids: &[u32]) -> Encoding {
        Encoding::new(
            ids.to_vec(),
            ids.iter().map(|id| u32::from(*id != 0)).collect(),
        )
    }

    #[test]
    fn mask_marks_padding_positions() {
        let batcher = Batcher::<NdArray>::new(Default::default());

        let batch: Infer<NdArray> = batcher.batch(vec![encoding(&[5, 6, 0]), encoding(&[7, 0, 0])]);

        assert_eq!(batch.tokens.dims(), [2, 3]);
        assert_eq!(
            batch.tokens.into_data().convert::<i64>().value,
            vec![5, 6, 0, 7, 0, 0]
        );
        assert_eq!(
            batch.mask_pad.into_data().value,
            vec![false, false, true, false, true, true]
        );
    }

    #[test]
    fn targets_follow_class_ids() {
        let batcher = Batcher::<NdArray>::new(Default::default());

        let batch: Train<NdArray> = batcher.batch(vec![
            Example::new(encoding(&[5, 0]), Feedback::Positive),
            Example::new(encoding(&[6, 0]), Feedback::Negative),
            Example::new(encoding(&[7, 8]), Feedback::Positive),
        ]);

        assert_eq!(batch.input.tokens.dims(), [3, 2]);
        assert_eq!(batch.targets.into_data().convert::<i64>().value, vec![1, 0, 1]);
    }
}
