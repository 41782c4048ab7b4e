use std::path::Path;

use burn::{
    module::Module,
    tensor::backend::{AutodiffBackend, Backend},
};

use crate::{
    datasets::reviews,
    pipelines::text_classification::{
        self,
        dataset::{dataloader, prepare, Example},
        evaluate, Evaluation, History, Metadata, Predictor, Splits, TextTokenizer,
        TrainingConfig,
    },
    utils::hugging_face::download_hf_model,
};

use super::{artifacts, Config, Model};

/// Everything a fine-tuning run produces
pub struct FineTuned<B: Backend> {
    /// The trained model wrapped with its tokenizer
    pub predictor: Predictor<B, Model<B>>,

    /// The model configuration
    pub config: Config,

    /// Per-epoch training and validation metrics
    pub history: History,

    /// Scores on the held-out test partition
    pub evaluation: Evaluation,
}

impl<B: Backend> FineTuned<B> {
    /// Save the model, tokenizer and metadata to an artifact directory
    pub fn save(&self, artifact_dir: impl AsRef<Path>) -> anyhow::Result<Metadata> {
        artifacts::save(
            artifact_dir,
            self.predictor.model(),
            &self.config,
            self.predictor.tokenizer(),
        )
    }
}

/// Run the whole pipeline on a review file: load, balance, tokenize, split, download the
/// pretrained model, train, and evaluate on the test partition.
///
/// The learner's metric logs are written under `artifact_dir`.
pub async fn fine_tune<B: AutodiffBackend>(
    data_file: impl AsRef<Path>,
    config: &TrainingConfig,
    artifact_dir: &str,
    device: B::Device,
) -> anyhow::Result<FineTuned<B::InnerBackend>> {
    config.validate()?;

    let mut rng = config.rng();

    let reviews = reviews::load(data_file).await?;

    let tokenizer = TextTokenizer::from_pretrained(&config.model_name, config.max_seq_len)?;
    let splits = prepare(reviews, &tokenizer, config, &mut rng)?;

    let (config_file, model_file) = download_hf_model(&config.model_name).await?;

    let model_config = Config::load_pretrained(config_file, &config.model_name)?;
    model_config.check_encodings(tokenizer.vocab_size(), config.max_seq_len)?;

    let model = Model::<B>::load_from_safetensors(&device, model_file, &model_config);

    fit(model, model_config, tokenizer, splits, config, artifact_dir, device)
}

/// Train an initialized model on prepared splits, then evaluate it on the test partition
pub fn fit<B: AutodiffBackend>(
    model: Model<B>,
    model_config: Config,
    tokenizer: TextTokenizer,
    splits: Splits<Example>,
    config: &TrainingConfig,
    artifact_dir: &str,
    device: B::Device,
) -> anyhow::Result<FineTuned<B::InnerBackend>> {
    log::info!(
        "Training {} ({} parameters) for {} epochs",
        model_config.model_name,
        model.num_params(),
        config.num_epochs
    );

    let Splits { train, valid, test } = splits;

    let trained = text_classification::train::<B, Model<B>>(
        model,
        train,
        valid,
        config,
        artifact_dir,
        device.clone(),
    )?;

    let dataloader_test = dataloader::<B::InnerBackend>(test, config.batch_size, device.clone());
    let evaluation = evaluate(&trained.model, dataloader_test.as_ref());

    log::info!("Test {}", evaluation);

    Ok(FineTuned {
        predictor: Predictor::with_tokenizer(trained.model, tokenizer, device),
        config: model_config,
        history: trained.history,
        evaluation,
    })
}
