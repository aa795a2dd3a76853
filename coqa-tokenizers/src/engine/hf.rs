use std::path::Path;

use tokenizers::{AddedToken, Tokenizer};

#[cfg(feature = "huggingface")]
use hf_hub::api::sync::Api;

use super::BpeEngine;
use crate::error::{Result, TokenizerError};

///
/// A [BpeEngine] backed by a HuggingFace `tokenizers` pipeline.
///
/// Only the model, pre-tokenizer and decoder of the pipeline are used. The
/// post-processor, padding and truncation are left out: sequence framing is
/// done with textual markers by the [QaTokenizer](crate::QaTokenizer) instead,
/// and every field encoding must keep its natural length.
///
#[derive(Debug, Clone)]
pub struct HfEngine {
    inner: Tokenizer,
}

impl HfEngine {
    pub fn new(mut inner: Tokenizer) -> Result<Self> {
        inner.with_padding(None);
        inner
            .with_truncation(None)
            .map_err(|err| TokenizerError::EngineLoad(err.to_string()))?;
        Ok(Self { inner })
    }

    ///
    /// Load an engine from a serialized `tokenizer.json` file.
    ///
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Tokenizer::from_file(path.as_ref()).map_err(|err| {
            TokenizerError::EngineLoad(format!("{}: {}", path.as_ref().display(), err))
        })?;
        Self::new(inner)
    }

    ///
    /// Load an engine from the raw bytes of a `tokenizer.json`.
    ///
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self> {
        let inner = Tokenizer::from_bytes(bytes)
            .map_err(|err| TokenizerError::EngineLoad(err.to_string()))?;
        Self::new(inner)
    }

    ///
    /// Fetch the `tokenizer.json` of a HuggingFace hub repository and load it.
    ///
    #[cfg(feature = "huggingface")]
    pub fn from_pretrained(repo_id: &str) -> Result<Self> {
        let api = Api::new()
            .map_err(|err| TokenizerError::EngineLoad(format!("{}: {}", repo_id, err)))?;
        let engine_file = api
            .model(repo_id.to_string())
            .get(super::DEFAULT_ENGINE_FILENAME)
            .map_err(|err| TokenizerError::EngineLoad(format!("{}: {}", repo_id, err)))?;
        Self::from_file(engine_file)
    }
}

impl BpeEngine for HfEngine {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|err| TokenizerError::Encoding(err.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, false)
            .map_err(|err| TokenizerError::Encoding(err.to_string()))
    }

    fn add_atomic_tokens(&mut self, tokens: &[String]) -> usize {
        let added: Vec<AddedToken> = tokens
            .iter()
            .map(|token| AddedToken::from(token.clone(), true))
            .collect();
        self.inner.add_special_tokens(&added)
    }

    fn vocab_size(&self, with_added_tokens: bool) -> usize {
        self.inner.get_vocab_size(with_added_tokens)
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.inner.token_to_id(token)
    }

    fn id_to_token(&self, id: u32) -> Option<String> {
        self.inner.id_to_token(id)
    }
}
