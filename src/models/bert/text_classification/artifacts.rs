use std::path::{Path, PathBuf};

use burn::{
    config::Config as _,
    module::Module,
    record::{DefaultRecorder, Recorder},
    tensor::backend::Backend,
};

use crate::pipelines::{
    text_classification::{Metadata, Predictor, TextTokenizer},
    PipelineError,
};

use super::{Config, Model};

/// Model configuration file name
pub static CONFIG_FILE: &str = "config.json";

/// Weights file name; the recorder adds its own extension
pub static WEIGHTS_FILE: &str = "model";

/// Metadata file name
pub static METADATA_FILE: &str = "info.json";

/// Tokenizer file name
pub static TOKENIZER_FILE: &str = "tokenizer.json";

/// A model read back from an artifact directory
pub struct Loaded<B: Backend> {
    /// The model with its trained weights
    pub model: Model<B>,

    /// The model configuration
    pub config: Config,

    /// Tokenizer name and max sequence length for predictions
    pub metadata: Metadata,
}

/// Save the config, full-precision weights, tokenizer and metadata needed to rebuild a predictor.
///
/// Layout of `artifact_dir`: `config.json`, `model.mpk`, `tokenizer.json` and `info.json`.
pub fn save<B: Backend>(
    artifact_dir: impl AsRef<Path>,
    model: &Model<B>,
    config: &Config,
    tokenizer: &TextTokenizer,
) -> anyhow::Result<Metadata> {
    let artifact_dir = artifact_dir.as_ref();

    std::fs::create_dir_all(artifact_dir)
        .map_err(|e| anyhow!("Unable to create {}: {}", artifact_dir.display(), e))?;

    config
        .save(artifact_dir.join(CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;

    DefaultRecorder::new()
        .record(model.clone().into_record(), artifact_dir.join(WEIGHTS_FILE))
        .map_err(|e| anyhow!("Unable to save trained model weights: {}", e))?;

    tokenizer.save(artifact_dir.join(TOKENIZER_FILE))?;

    let metadata = Metadata::new(config.model_name.clone(), tokenizer.max_seq_len());
    metadata
        .save(artifact_dir.join(METADATA_FILE))
        .map_err(|e| anyhow!("Unable to save metadata: {}", e))?;

    log::info!("Saved model artifacts to {}", artifact_dir.display());

    Ok(metadata)
}

/// Load a model and its metadata, failing if the two name different models
pub fn load<B: Backend>(
    artifact_dir: impl AsRef<Path>,
    device: &B::Device,
) -> anyhow::Result<Loaded<B>> {
    let artifact_dir = artifact_dir.as_ref();

    let config = Config::load(artifact_dir.join(CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    let metadata = Metadata::load(artifact_dir.join(METADATA_FILE))
        .map_err(|e| anyhow!("Unable to load metadata file: {}", e))?;

    if metadata.model_name != config.model_name {
        return Err(PipelineError::ModelMismatch {
            metadata: metadata.model_name,
            weights: config.model_name,
        }
        .into());
    }

    log::info!("Loading weights from {}", artifact_dir.display());

    let record = DefaultRecorder::new()
        .load(artifact_dir.join(WEIGHTS_FILE), device)
        .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

    let model = config.init::<B>(device).load_record(record);

    Ok(Loaded {
        model,
        config,
        metadata,
    })
}

/// Rebuild the predictor saved in an artifact directory.
///
/// The saved tokenizer is used when present; otherwise the one published for the metadata's model
/// name is loaded. Either way its encodings must fit the model's embeddings.
pub fn load_predictor<B: Backend>(
    artifact_dir: impl AsRef<Path>,
    device: B::Device,
) -> anyhow::Result<Predictor<B, Model<B>>> {
    let artifact_dir = artifact_dir.as_ref();

    let Loaded {
        model,
        config,
        metadata,
    } = load::<B>(artifact_dir, &device)?;

    let tokenizer_file: PathBuf = artifact_dir.join(TOKENIZER_FILE);
    let predictor = if tokenizer_file.exists() {
        let tokenizer = TextTokenizer::from_file(&tokenizer_file, metadata.max_seq_len)?;

        Predictor::with_tokenizer(model, tokenizer, device)
    } else {
        Predictor::new(model, &metadata.model_name, metadata.max_seq_len, device)?
    };

    let tokenizer = predictor.tokenizer();
    config.check_encodings(tokenizer.vocab_size(), tokenizer.max_seq_len())?;

    Ok(predictor)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        models::bert::text_classification::config::tests::tiny,
        pipelines::text_classification::tokenizer::tests::word_level_json,
    };

    fn tokenizer() -> TextTokenizer {
        TextTokenizer::from_bytes(word_level_json(&["love", "my", "echo", "broke"]), 8).unwrap()
    }

    #[test]
    fn reloaded_model_predicts_identically() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();

        let config = tiny(6);
        let model = config.init::<NdArray>(&device);
        let tokenizer = tokenizer();

        let metadata = save(dir.path(), &model, &config, &tokenizer).unwrap();
        assert_eq!(metadata.model_name, "tiny-bert");
        assert_eq!(metadata.max_seq_len, 8);

        for file in ["config.json", "model.mpk", "info.json", "tokenizer.json"] {
            assert!(dir.path().join(file).exists(), "missing {file}");
        }

        let original = Predictor::<NdArray, _>::with_tokenizer(model, tokenizer, device);
        let reloaded = load_predictor::<NdArray>(dir.path(), device).unwrap();

        for text in ["Love my Echo!", "echo broke", ""] {
            assert_eq!(
                original.predict_proba(text).unwrap(),
                reloaded.predict_proba(text).unwrap()
            );
        }
    }

    #[test]
    fn metadata_must_name_the_saved_model() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();

        let config = tiny(6);
        let model = config.init::<NdArray>(&device);
        save(dir.path(), &model, &config, &tokenizer()).unwrap();

        Metadata::new("bert-base-cased".to_string(), 8)
            .save(dir.path().join(METADATA_FILE))
            .unwrap();

        let error = load::<NdArray>(dir.path(), &device).err().unwrap();

        assert_eq!(
            error.downcast_ref::<PipelineError>(),
            Some(&PipelineError::ModelMismatch {
                metadata: "bert-base-cased".to_string(),
                weights: "tiny-bert".to_string(),
            })
        );
    }

    #[test]
    fn falls_back_to_the_published_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();

        let config = tiny(6);
        let model = config.init::<NdArray>(&device);
        save(dir.path(), &model, &config, &tokenizer()).unwrap();
        std::fs::remove_file(dir.path().join(TOKENIZER_FILE)).unwrap();

        // The hub has no usable tokenizer for the tiny test model
        assert!(load_predictor::<NdArray>(dir.path(), device).is_err());
    }

    #[test]
    fn missing_artifacts_are_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_predictor::<NdArray>(dir.path(), Default::default()).is_err());
    }
}
