use std::fmt::Display;

use burn::{
    module::AutodiffModule,
    optim::AdamConfig,
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LossMetric},
        ClassificationOutput, LearnerBuilder, LearnerSummary, MetricSummary, SummaryMetrics,
        TrainStep, ValidStep,
    },
};

use crate::utils::renderer::Logged;

use super::{
    batcher::Train,
    dataset::{dataloader, Example},
    Evaluation, TrainingConfig,
};

/// Name the learner logs the loss under
static LOSS: &str = "Loss";

/// Name the learner logs the accuracy under, as a percentage
static ACCURACY: &str = "Accuracy";

/// Training and validation scores after one epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,

    /// Scores over the epoch's training batches
    pub train: Evaluation,

    /// Scores over the validation partition at the end of the epoch
    pub valid: Evaluation,
}

/// Per-epoch metrics, in epoch order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    /// One entry per completed epoch
    pub epochs: Vec<EpochMetrics>,
}

impl History {
    /// Values of one metric across epochs: `loss`, `accuracy`, `val_loss` or `val_accuracy`
    pub fn metric(&self, name: &str) -> Option<Vec<f64>> {
        let pick: fn(&EpochMetrics) -> f64 = match name {
            "loss" => |m| m.train.loss,
            "accuracy" => |m| m.train.accuracy,
            "val_loss" => |m| m.valid.loss,
            "val_accuracy" => |m| m.valid.accuracy,
            _ => return None,
        };

        Some(self.epochs.iter().map(pick).collect())
    }

    /// Read the first `num_epochs` epochs out of the learner's metric summaries. Metrics the
    /// learner did not record for an epoch are NaN.
    fn from_metrics(
        metrics: &SummaryMetrics,
        num_epochs: usize,
        train_size: usize,
        valid_size: usize,
    ) -> Self {
        let epochs = (1..=num_epochs)
            .map(|epoch| EpochMetrics {
                epoch,
                train: summarize(&metrics.train, epoch, train_size),
                valid: summarize(&metrics.valid, epoch, valid_size),
            })
            .collect();

        Self { epochs }
    }
}

fn summarize(summaries: &[MetricSummary], epoch: usize, num_examples: usize) -> Evaluation {
    let value = |name: &str| {
        summaries
            .iter()
            .find(|summary| summary.name == name)
            .and_then(|summary| summary.entries.iter().find(|entry| entry.step == epoch))
            .map(|entry| entry.value)
            .unwrap_or(f64::NAN)
    };

    Evaluation {
        loss: value(LOSS),
        accuracy: value(ACCURACY) / 100.0,
        num_examples,
    }
}

/// A fine-tuned model, ready for inference, with its training history
pub struct Trained<M> {
    /// The model on the inner (non-autodiff) backend
    pub model: M,

    /// Metrics recorded after every epoch
    pub history: History,
}

/// Fit a model with burn's learner for a fixed number of epochs, using Adam at a constant
/// learning rate.
///
/// The learner scores loss and accuracy on both partitions every epoch and logs them under
/// `artifact_dir`, where they are read back into the returned [`History`].
pub fn train<B, M>(
    model: M,
    train: Vec<Example>,
    valid: Vec<Example>,
    config: &TrainingConfig,
    artifact_dir: &str,
    device: B::Device,
) -> anyhow::Result<Trained<M::InnerModule>>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + TrainStep<Train<B>, ClassificationOutput<B>> + Display + 'static,
    M::InnerModule: ValidStep<Train<B::InnerBackend>, ClassificationOutput<B::InnerBackend>>,
{
    let (train_size, valid_size) = (train.len(), valid.len());

    let dataloader_train = dataloader::<B>(train, config.batch_size, device.clone());
    let dataloader_valid = dataloader::<B::InnerBackend>(valid, config.batch_size, device.clone());

    let optimizer = AdamConfig::new().with_epsilon(config.adam_epsilon).init();

    let learner = LearnerBuilder::new(artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .renderer(Logged::new())
        .devices(vec![device])
        .num_epochs(config.num_epochs)
        .build(model, optimizer, config.learning_rate);

    let model = learner.fit(dataloader_train, dataloader_valid);

    let history = if config.num_epochs == 0 {
        History::default()
    } else {
        let summary = LearnerSummary::new(artifact_dir, &[LOSS, ACCURACY])
            .map_err(|e| anyhow!("Unable to read training metrics: {}", e))?;

        History::from_metrics(&summary.metrics, config.num_epochs, train_size, valid_size)
    };

    for metrics in &history.epochs {
        log::info!(
            "Epoch {}/{} - loss: {:.4} - accuracy: {:.4} - val_loss: {:.4} - val_accuracy: {:.4}",
            metrics.epoch,
            config.num_epochs,
            metrics.train.loss,
            metrics.train.accuracy,
            metrics.valid.loss,
            metrics.valid.accuracy
        );
    }

    Ok(Trained {
        model: model.valid(),
        history,
    })
}
