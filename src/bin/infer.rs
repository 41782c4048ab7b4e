//! Command line tool to classify reviews with a saved model

use anyhow::anyhow;
use burn::backend::{libtorch::LibTorchDevice, LibTorch};
use pico_args::Arguments;
use review_sentiment::models::bert::text_classification::load_predictor;

const HELP: &str = "\
Usage: infer [OPTIONS] TEXT...

Arguments:
  TEXT                 One or more reviews to classify

Options:
  -h, --help           Print help
  -o, --artifact-dir   Where the trained model was saved (defaults to 'model')
  --cuda               Run on the given CUDA device instead of the CPU
";

#[derive(Debug)]
struct Args {
    artifact_dir: String,
    cuda: Option<usize>,
    texts: Vec<String>,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let artifact_dir = pargs
        .opt_value_from_str(["-o", "--artifact-dir"])?
        .unwrap_or_else(|| "model".to_string());
    let cuda = pargs.opt_value_from_str("--cuda")?;

    let texts = pargs
        .finish()
        .into_iter()
        .map(|text| {
            text.into_string()
                .map_err(|text| anyhow!("Input is not valid UTF-8: {:?}", text))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if texts.is_empty() {
        return Err(anyhow!("Missing required argument: TEXT"));
    }

    Ok(Some(Args {
        artifact_dir,
        cuda,
        texts,
    }))
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = parse_args()? else {
        println!("{}", HELP);

        return Ok(());
    };

    let device = match args.cuda {
        Some(index) => LibTorchDevice::Cuda(index),
        None => LibTorchDevice::Cpu,
    };

    let predictor = load_predictor::<LibTorch>(&args.artifact_dir, device)?;

    for text in &args.texts {
        let prediction = predictor.predict(text)?;

        println!(
            "{}\t{:.4}\t{}",
            prediction.sentiment, prediction.probability, text
        );
    }

    Ok(())
}
