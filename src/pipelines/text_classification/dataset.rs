use std::sync::Arc;

use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::InMemDataset,
    },
    tensor::backend::Backend,
};
use derive_new::new;
use rand::{seq::SliceRandom, Rng};

use crate::{
    datasets::{
        self,
        reviews::{ClassCounts, LengthStats},
        Feedback, Review,
    },
    pipelines::PipelineError,
};

use super::{
    batcher::{Batcher, Train},
    Encoding, TextTokenizer, TrainingConfig,
};

/// An encoded review paired with its label
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct Example {
    /// The fixed-length encoding of the review text
    pub encoding: Encoding,

    /// The ground-truth label
    pub feedback: Feedback,
}

/// Pair encodings with labels, position by position
pub fn zip_examples(
    encodings: Vec<Encoding>,
    labels: &[Feedback],
) -> Result<Vec<Example>, PipelineError> {
    if encodings.len() != labels.len() {
        return Err(PipelineError::LengthMismatch {
            encodings: encodings.len(),
            labels: labels.len(),
        });
    }

    Ok(encodings
        .into_iter()
        .zip(labels.iter().copied())
        .map(|(encoding, feedback)| Example::new(encoding, feedback))
        .collect())
}

/// Train, validation and test partitions of a shuffled corpus
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splits<T> {
    /// Examples to fit on
    pub train: Vec<T>,

    /// Examples scored after every epoch
    pub valid: Vec<T>,

    /// Examples held out for the final evaluation
    pub test: Vec<T>,
}

impl<T> Splits<T> {
    /// Total number of items across all partitions
    pub fn len(&self) -> usize {
        self.train.len() + self.valid.len() + self.test.len()
    }

    /// Whether all partitions are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shuffle the whole corpus, then cut it by index into train, validation and test partitions.
///
/// With `N` items, the first `floor(N * (1 - test_split))` form the training remainder and the
/// rest are the test partition. The first `floor(N * val_split)` items of the remainder are the
/// validation partition and the others are for training. Items carry no label requirement, so
/// bare encodings split the same way as labeled examples.
pub fn shuffle_split<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    test_split: f64,
    val_split: f64,
    rng: &mut R,
) -> Result<Splits<T>, PipelineError> {
    let fraction = |value: f64| (0.0..1.0).contains(&value);
    if !fraction(test_split) || !fraction(val_split) || test_split + val_split >= 1.0 {
        return Err(PipelineError::InvalidSplit {
            test_split,
            val_split,
        });
    }

    let n = items.len();
    let train_size = (n as f64 * (1.0 - test_split)).floor() as usize;
    let val_size = ((n as f64 * val_split).floor() as usize).min(train_size);

    items.shuffle(rng);

    let test = items.split_off(train_size);
    let train = items.split_off(val_size);
    let valid = items;

    Ok(Splits { train, valid, test })
}

/// Number of batches a partition of `len` items is grouped into; the last one may be short
pub fn num_batches(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size)
}

/// Group examples, in order, into batches of tensors on a device
pub fn dataloader<B: Backend>(
    examples: Vec<Example>,
    batch_size: usize,
    device: B::Device,
) -> Arc<dyn DataLoader<Train<B>>> {
    DataLoaderBuilder::<Example, Train<B>>::new(Batcher::<B>::new(device))
        .batch_size(batch_size)
        .build(InMemDataset::new(examples))
}

/// Balance, tokenize and split reviews into labeled partitions
pub fn prepare<R: Rng + ?Sized>(
    reviews: Vec<Review>,
    tokenizer: &TextTokenizer,
    config: &TrainingConfig,
    rng: &mut R,
) -> anyhow::Result<Splits<Example>> {
    config.validate()?;

    log::info!("Class counts: {}", ClassCounts::of(&reviews));

    let balanced = datasets::balance(reviews, rng)?;

    log::info!("Balanced class counts: {}", ClassCounts::of(&balanced));
    if let Some(stats) = LengthStats::of(&balanced) {
        log::info!(
            "Review length: min {}, mean {:.1}, max {}",
            stats.min,
            stats.mean,
            stats.max
        );
    }

    let (texts, labels): (Vec<_>, Vec<_>) = balanced
        .into_iter()
        .map(|review| (review.text, review.feedback))
        .unzip();

    let encodings = tokenizer.encode_all(&texts)?;
    let examples = zip_examples(encodings, &labels)?;

    let splits = shuffle_split(examples, config.test_split, config.val_split, rng)?;

    for (name, partition) in [
        ("Train", &splits.train),
        ("Validation", &splits.valid),
        ("Test", &splits.test),
    ] {
        log::info!(
            "{} size: {} ({} batches of up to {})",
            name,
            partition.len(),
            num_batches(partition.len(), config.batch_size),
            config.batch_size
        );
    }

    Ok(splits)
}
