//!
//! The external byte-pair-encoding engine that does the actual encoding and decoding.
//!
//! Everything in this crate talks to the engine through the [BpeEngine] trait, so the
//! special token handling and the structured encoders stay engine-agnostic. Two
//! implementations ship with the crate: [HfEngine], backed by a HuggingFace
//! `tokenizer.json`, and [TiktokenEngine], for the named OpenAI encodings.
//!
pub mod hf;
pub mod tiktoken;

use std::path::Path;

use log::info;

use crate::error::Result;

pub use hf::HfEngine;
pub use tiktoken::{NAMED_ENCODINGS, TiktokenEngine};

pub const DEFAULT_ENGINE_FILENAME: &str = "tokenizer.json";

///
/// The minimal contract an encoding engine must expose.
///
pub trait BpeEngine: Send + Sync {
    ///
    /// Encode raw text into token ids. Atomic tokens that were added through
    /// [BpeEngine::add_atomic_tokens] must come out as a single id each.
    ///
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    ///
    /// Decode token ids back into text.
    ///
    fn decode(&self, ids: &[u32]) -> Result<String>;

    ///
    /// Add tokens that must never be split by the engine.
    ///
    /// # Returns:
    /// - the number of tokens that were actually new to the vocabulary
    ///
    fn add_atomic_tokens(&mut self, tokens: &[String]) -> usize;

    ///
    /// Size of the vocabulary, optionally counting the tokens added at runtime.
    ///
    fn vocab_size(&self, with_added_tokens: bool) -> usize;

    fn token_to_id(&self, token: &str) -> Option<u32>;

    fn id_to_token(&self, id: u32) -> Option<String>;
}

///
/// Load a base encoding by name.
///
/// The name is resolved in order as:
/// 1. a path to a serialized engine file (`tokenizer.json`)
/// 2. a directory holding a `tokenizer.json`
/// 3. a named `tiktoken` encoding (`cl100k_base`, `o200k_base`, `p50k_base`, `r50k_base`)
/// 4. a HuggingFace hub repository id (only with the `huggingface` feature)
///
/// # Arguments:
/// - name: the name of the base encoding
///
pub fn load_base_encoding(name: &str) -> Result<Box<dyn BpeEngine>> {
    let path = Path::new(name);

    if path.is_file() {
        info!("Loading base encoding from {}", path.display());
        return Ok(Box::new(HfEngine::from_file(path)?));
    }

    if path.is_dir() {
        let engine_file = path.join(DEFAULT_ENGINE_FILENAME);
        if engine_file.is_file() {
            info!("Loading base encoding from {}", engine_file.display());
            return Ok(Box::new(HfEngine::from_file(engine_file)?));
        }
    }

    if tiktoken::is_named_encoding(name) {
        info!("Loading named base encoding {}", name);
        return Ok(Box::new(TiktokenEngine::from_name(name)?));
    }

    load_from_hub(name)
}

#[cfg(feature = "huggingface")]
fn load_from_hub(name: &str) -> Result<Box<dyn BpeEngine>> {
    info!("Fetching base encoding {} from the HuggingFace hub", name);
    Ok(Box::new(HfEngine::from_pretrained(name)?))
}

#[cfg(not(feature = "huggingface"))]
fn load_from_hub(name: &str) -> Result<Box<dyn BpeEngine>> {
    Err(crate::error::TokenizerError::EngineLoad(name.to_string()))
}
