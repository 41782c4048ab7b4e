use std::path::Path;

use derive_new::new;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::pipelines::PipelineError;

/// The padding token used by BERT vocabularies
pub static PAD_TOKEN: &str = "[PAD]";

/// A fixed-length encoding of one text
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct Encoding {
    /// Token ids, padded or truncated to the max sequence length
    pub input_ids: Vec<u32>,

    /// 1 for content tokens, 0 for padding
    pub attention_mask: Vec<u32>,
}

impl Encoding {
    /// Number of token positions
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Whether the encoding has no token positions
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Wraps a pretrained tokenizer so every encoding has exactly `max_seq_len` positions.
///
/// Longer texts are truncated and shorter ones are padded with the vocabulary's padding token,
/// which the attention mask marks with 0.
#[derive(Clone)]
pub struct TextTokenizer {
    tokenizer: Tokenizer,
    max_seq_len: usize,
}

impl TextTokenizer {
    /// Configure fixed-length truncation and padding on an existing tokenizer
    pub fn new(mut tokenizer: Tokenizer, max_seq_len: usize) -> Result<Self, PipelineError> {
        if max_seq_len == 0 {
            return Err(PipelineError::InvalidMaxSeqLen);
        }

        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);
        let pad_token = tokenizer
            .id_to_token(pad_id)
            .unwrap_or_else(|| PAD_TOKEN.to_string());

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_seq_len,
                ..Default::default()
            }))
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_seq_len),
            pad_id,
            pad_token,
            ..Default::default()
        }));

        Ok(Self {
            tokenizer,
            max_seq_len,
        })
    }

    /// Load the tokenizer published with a model on the Hugging Face Hub
    pub fn from_pretrained(model_name: &str, max_seq_len: usize) -> Result<Self, PipelineError> {
        let tokenizer = Tokenizer::from_pretrained(model_name, None)
            .map_err(|e| PipelineError::Tokenizer(format!("{model_name}: {e}")))?;

        Self::new(tokenizer, max_seq_len)
    }

    /// Load a tokenizer from a `tokenizer.json` file
    pub fn from_file<P: AsRef<Path>>(path: P, max_seq_len: usize) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| PipelineError::Tokenizer(format!("{}: {e}", path.display())))?;

        Self::new(tokenizer, max_seq_len)
    }

    /// Load a tokenizer from its serialized JSON form
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T, max_seq_len: usize) -> Result<Self, PipelineError> {
        let tokenizer =
            Tokenizer::from_bytes(bytes).map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        Self::new(tokenizer, max_seq_len)
    }

    /// Write the tokenizer as `tokenizer.json`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        self.tokenizer
            .save(path, false)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))
    }

    /// Number of token positions in every encoding
    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    /// Vocabulary size, including added tokens
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Encode one text, with special tokens, to exactly `max_seq_len` positions
    pub fn encode(&self, text: &str) -> Result<Encoding, PipelineError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        Ok(Encoding {
            input_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
        })
    }

    /// Encode a list of texts in order
    pub fn encode_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Encoding>, PipelineError> {
        texts.iter().map(|text| self.encode(text.as_ref())).collect()
    }
}
