//! Command line tool to fine-tune a sentiment classifier on a review file

use anyhow::anyhow;
use burn::{
    backend::{libtorch::LibTorchDevice, Autodiff, LibTorch},
    config::Config as _,
};
use pico_args::Arguments;
use review_sentiment::{
    models::bert::{
        text_classification::{self, FineTuned},
        TEXT_CLASSIFICATION_MODELS,
    },
    pipelines::text_classification::TrainingConfig,
};

const HELP: &str = "\
Usage: train DATA_FILE [OPTIONS]

Arguments:
  DATA_FILE            Tab-separated review file with 'verified_reviews' and 'feedback' columns

Options:
  -h, --help           Print help
  -c, --config         A JSON training config to start from
  -m, --model          The model to use (defaults to 'bert-base-uncased')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Batch size
  -l, --learning-rate  Learning rate
  --max-seq-len        Number of token positions per encoding
  --seed               Seed for balancing and shuffling
  -o, --artifact-dir   Where to save the trained model (defaults to 'model')
  --cuda               Train on the given CUDA device instead of the CPU
";

/// Reviews printed with their predictions once training finishes
const SAMPLES: &[&str] = &[
    "Love my Echo!",
    "Alexa doesn't get connected well to my laptop's bluetooth, however it's very useful and answers correctly to my questions",
    "Gets disconnected again and again, I'll not recommend it to others",
    "This is not a good product",
];

#[derive(Debug)]
struct Args {
    data_file: String,
    config: Option<String>,
    model: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rate: Option<f64>,
    max_seq_len: Option<usize>,
    seed: Option<u64>,
    artifact_dir: String,
    cuda: Option<usize>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        Self::parse_from(Arguments::from_env())
    }

    fn parse_from(mut pargs: Arguments) -> anyhow::Result<Option<Self>> {
        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            learning_rate: pargs.opt_value_from_str(["-l", "--learning-rate"])?,
            max_seq_len: pargs.opt_value_from_str("--max-seq-len")?,
            seed: pargs.opt_value_from_str("--seed")?,
            artifact_dir: pargs
                .opt_value_from_str(["-o", "--artifact-dir"])?
                .unwrap_or_else(|| "model".to_string()),
            cuda: pargs.opt_value_from_str("--cuda")?,
            data_file: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => {
                    anyhow!("Missing required argument: DATA_FILE")
                }
                _ => anyhow!("{}", e),
            })?,
        };

        let unused = pargs.finish();
        if !unused.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", unused));
        }

        Ok(Some(args))
    }

    fn training_config(&self) -> anyhow::Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load(path)
                .map_err(|e| anyhow!("Unable to load training config {}: {}", path, e))?,
            None => TrainingConfig::new(),
        };

        if let Some(model) = &self.model {
            config.model_name = model.clone();
        }

        if let Some(num_epochs) = self.num_epochs {
            config.num_epochs = num_epochs;
        }

        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }

        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }

        if let Some(max_seq_len) = self.max_seq_len {
            config.max_seq_len = max_seq_len;
        }

        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let config = args.training_config()?;

    if !TEXT_CLASSIFICATION_MODELS.contains(&config.model_name.as_str()) {
        log::warn!(
            "{} is not one of the tested models: {}",
            config.model_name,
            TEXT_CLASSIFICATION_MODELS.join(", ")
        );
    }

    let device = match args.cuda {
        Some(index) => LibTorchDevice::Cuda(index),
        None => LibTorchDevice::Cpu,
    };

    let fine_tuned: FineTuned<LibTorch> = text_classification::fine_tune::<Autodiff<LibTorch>>(
        &args.data_file,
        &config,
        &args.artifact_dir,
        device,
    )
    .await?;

    for epoch in &fine_tuned.history.epochs {
        println!(
            "Epoch {}: train {} | valid {}",
            epoch.epoch, epoch.train, epoch.valid
        );
    }

    println!("Test {}", fine_tuned.evaluation);

    fine_tuned.save(&args.artifact_dir)?;

    for text in SAMPLES {
        let prediction = fine_tuned.predictor.predict(text)?;

        println!(
            "\n- Text: {text}\
             \n- Probability: {:.4}\
             \n- Sentiment: {}",
            prediction.probability, prediction.sentiment
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Option<Args>> {
        Args::parse_from(Arguments::from_vec(args.iter().map(OsString::from).collect()))
    }

    #[test]
    fn options_override_the_defaults() {
        let args = parse(&["--num-epochs", "3", "--seed", "7", "reviews.tsv"])
            .unwrap()
            .unwrap();

        assert_eq!(args.data_file, "reviews.tsv");
        assert_eq!(args.artifact_dir, "model");
        assert_eq!(args.cuda, None);

        let config = args.training_config().unwrap();
        assert_eq!(config.num_epochs, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.batch_size, 32);
    }

    #[test]
    fn rejects_unexpected_arguments() {
        assert!(parse(&["reviews.tsv", "--epochs", "3"]).is_err());
        assert!(parse(&["reviews.tsv", "more.tsv"]).is_err());
    }

    #[test]
    fn requires_a_data_file() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--help"]).unwrap().is_none());
    }
}
