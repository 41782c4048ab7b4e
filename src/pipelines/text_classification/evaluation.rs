use std::{collections::BTreeMap, fmt::Display};

use burn::{
    data::dataloader::{DataLoader, Progress},
    tensor::backend::Backend,
    train::{
        metric::{AccuracyMetric, Adaptor, LossMetric, Metric, MetricMetadata, Numeric},
        ClassificationOutput, ValidStep,
    },
};

use super::batcher::Train;

/// Aggregate loss and accuracy over a partition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Mean cross-entropy per example
    pub loss: f64,

    /// Fraction of examples whose highest-scoring class is the target, in [0, 1]
    pub accuracy: f64,

    /// Number of examples scored
    pub num_examples: usize,
}

impl Evaluation {
    /// Metric names mapped to their values
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("accuracy".to_string(), self.accuracy),
            ("loss".to_string(), self.loss),
        ])
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "loss: {:.4} - accuracy: {:.4} ({} examples)",
            self.loss, self.accuracy, self.num_examples
        )
    }
}

/// Score a model once over every batch of a held-out partition, with the same loss and accuracy
/// metrics the learner reports during training.
///
/// Both metrics are averaged over examples, so a short final batch counts for its size. An empty
/// partition scores NaN.
pub fn evaluate<B, M>(model: &M, dataloader: &dyn DataLoader<Train<B>>) -> Evaluation
where
    B: Backend,
    M: ValidStep<Train<B>, ClassificationOutput<B>>,
{
    let mut loss = LossMetric::<B>::new();
    let mut accuracy = AccuracyMetric::<B>::new();
    let mut num_examples = 0;

    for (iteration, batch) in dataloader.iter().enumerate() {
        let output = ValidStep::step(model, batch);
        let [batch_size, _n_classes] = output.output.dims();

        num_examples += batch_size;

        let metadata = MetricMetadata {
            progress: Progress {
                items_processed: num_examples,
                items_total: num_examples,
            },
            epoch: 1,
            epoch_total: 1,
            iteration: iteration + 1,
            lr: None,
        };

        loss.update(&output.adapt(), &metadata);
        accuracy.update(&output.adapt(), &metadata);
    }

    if num_examples == 0 {
        log::warn!("Evaluated an empty partition");

        return Evaluation {
            loss: f64::NAN,
            accuracy: f64::NAN,
            num_examples,
        };
    }

    Evaluation {
        loss: loss.value(),
        accuracy: accuracy.value() / 100.0,
        num_examples,
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        nn::loss::CrossEntropyLossConfig,
        tensor::{Data, Tensor},
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        datasets::Feedback,
        pipelines::text_classification::{
            dataset::{dataloader, Example},
            Encoding,
        },
    };

    /// Always puts more weight on the positive class
    struct AlwaysPositive;

    impl ValidStep<Train<NdArray>, ClassificationOutput<NdArray>> for AlwaysPositive {
        fn step(&self, item: Train<NdArray>) -> ClassificationOutput<NdArray> {
            let [batch_size] = item.targets.dims();
            let device = item.targets.device();

            let output = Tensor::<NdArray, 2>::from_data(Data::from([[0.0f32, 1.0]]), &device)
                .repeat(0, batch_size);
            let loss = CrossEntropyLossConfig::new()
                .init(&device)
                .forward(output.clone(), item.targets.clone());

            ClassificationOutput {
                loss,
                output,
                targets: item.targets,
            }
        }
    }

    fn example(feedback: Feedback) -> Example {
        Example::new(Encoding::new(vec![2, 0], vec![1, 0]), feedback)
    }

    #[test]
    fn averages_over_every_batch() {
        let examples = vec![
            example(Feedback::Positive),
            example(Feedback::Negative),
            example(Feedback::Positive),
            example(Feedback::Negative),
        ];
        let dataloader = dataloader::<NdArray>(examples, 2, Default::default());

        let evaluation = evaluate(&AlwaysPositive, dataloader.as_ref());

        // Logits [0, 1] cost ln(1 + e^-1) when right and ln(1 + e) when wrong
        let expected_loss = ((1.0 + (-1.0f64).exp()).ln() + (1.0 + 1.0f64.exp()).ln()) / 2.0;

        assert_eq!(evaluation.num_examples, 4);
        assert!((evaluation.loss - expected_loss).abs() < 1e-4);
        assert!((evaluation.accuracy - 0.5).abs() < 1e-6);

        let map = evaluation.to_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["accuracy", "loss"]);
    }

    #[test]
    fn empty_partition_is_nan() {
        let dataloader = dataloader::<NdArray>(Vec::new(), 2, Default::default());

        let evaluation = evaluate(&AlwaysPositive, dataloader.as_ref());

        assert_eq!(evaluation.num_examples, 0);
        assert!(evaluation.loss.is_nan());
        assert!(evaluation.accuracy.is_nan());
    }
}
