use std::path::PathBuf;

use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::Module,
    nn::{loss::CrossEntropyLossConfig, Linear},
    tensor::{backend::Backend, Int, Tensor},
    train::ClassificationOutput,
};
use derive_new::new;

use crate::pipelines::text_classification::{
    self,
    batcher::{Infer, Train},
};

use super::Config;

/// BERT for text Classification
#[derive(Module, Debug, new)]
pub struct Model<B: Backend> {
    /// The base BERT model
    pub bert: BertModel<B>,

    /// Linear layer for text classification
    pub output: Linear<B>,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Load pretrained BERT weights from a safetensors file, with a freshly initialized head
    pub fn load_from_safetensors(device: &B::Device, model_file: PathBuf, config: &Config) -> Self {
        let model = config.init(device);
        let record = BertModel::from_safetensors(model_file, device, config.bert.clone());

        Model {
            bert: model.bert.load_record(record),
            ..model
        }
    }

    /// Class scores from the pooled first token: [batch_size, n_classes]
    pub fn logits(&self, input: BertInferenceBatch<B>) -> Tensor<B, 2> {
        let [batch_size, _seq_length] = input.tokens.dims();

        let BertModelOutput {
            pooled_output,
            hidden_states,
        } = self.bert.forward(input);

        self.output
            .forward(pooled_output.unwrap_or(hidden_states))
            .slice([0..batch_size, 0..1])
            .reshape([batch_size, self.n_classes])
    }

    /// Defines forward pass for training
    pub fn forward(
        &self,
        input: BertInferenceBatch<B>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.logits(input);
        let targets = targets.to_device(&output.device());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }
}

impl<B: Backend> text_classification::Model<B> for Model<B> {
    fn forward(&self, item: Train<B>) -> ClassificationOutput<B> {
        self.forward(
            BertInferenceBatch {
                tokens: item.input.tokens,
                mask_pad: item.input.mask_pad,
            },
            item.targets,
        )
    }

    fn logits(&self, input: Infer<B>) -> Tensor<B, 2> {
        self.logits(BertInferenceBatch {
            tokens: input.tokens,
            mask_pad: input.mask_pad,
        })
    }
}
