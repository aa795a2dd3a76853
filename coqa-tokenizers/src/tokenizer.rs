use std::path::Path;

use fxhash::FxHashSet as HashSet;
use log::info;

use super::config::{TokenizerConfig, TokenizerInputFileType};
use super::encoding::OnLengthMismatch;
use super::engine::{BpeEngine, HfEngine, load_base_encoding};
use super::error::Result;
use super::utils::special_tokens::SpecialTokens;
use super::vocab::VocabularyHandle;

///
/// A byte-pair-encoding tokenizer extended with the markers needed to flatten
/// conversational question answering examples.
///
pub struct QaTokenizer {
    vocab: VocabularyHandle,
    special_tokens: SpecialTokens,
    length_policy: OnLengthMismatch,
}

impl QaTokenizer {
    ///
    /// Create a new tokenizer on top of a named base encoding, using the default markers.
    ///
    /// See [load_base_encoding] for how the name is resolved.
    ///
    pub fn new(base_encoding: &str) -> Result<Self> {
        let engine = load_base_encoding(base_encoding)?;
        Self::from_engine(engine, SpecialTokens::default())
    }

    ///
    /// Create a new tokenizer from an already loaded engine. Every marker gets
    /// registered as an atomic token of the engine.
    ///
    pub fn from_engine(engine: Box<dyn BpeEngine>, special_tokens: SpecialTokens) -> Result<Self> {
        special_tokens.validate()?;

        let markers: Vec<String> = (&special_tokens).into();
        let vocab = VocabularyHandle::new(engine).register_atomic_tokens(&markers)?;

        Ok(QaTokenizer {
            vocab,
            special_tokens,
            length_policy: OnLengthMismatch::default(),
        })
    }

    ///
    /// Create a new tokenizer from a config file
    ///
    pub fn from_config<P: AsRef<Path>>(cfg_path: P) -> Result<Self> {
        let config = TokenizerConfig::try_from(cfg_path.as_ref())?;

        // a base encoding that names a file is relative to the config
        let config_dir = cfg_path.as_ref().parent().unwrap_or(Path::new(""));
        let local_path = config_dir.join(&config.base_encoding);
        let engine = if local_path.exists() {
            load_base_encoding(&local_path.to_string_lossy())?
        } else {
            load_base_encoding(&config.base_encoding)?
        };

        let special_tokens = match config.special_tokens {
            Some(tokens) => SpecialTokens::from(tokens),
            None => SpecialTokens::default(),
        };

        info!(
            "Creating tokenizer from {} with base encoding {}",
            cfg_path.as_ref().display(),
            config.base_encoding
        );

        let tokenizer = Self::from_engine(engine, special_tokens)?;
        Ok(tokenizer.with_length_policy(config.on_length_mismatch.unwrap_or_default()))
    }

    ///
    /// Create a new tokenizer from a file, automatically detecting the type
    ///
    pub fn from_auto<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_type = TokenizerInputFileType::from_path(path.as_ref())?;
        match file_type {
            TokenizerInputFileType::Toml => QaTokenizer::from_config(path),
            TokenizerInputFileType::Json => QaTokenizer::from_engine(
                Box::new(HfEngine::from_file(path)?),
                SpecialTokens::default(),
            ),
        }
    }

    ///
    /// Set how the structured encoders treat questions, answers and rationales of different lengths.
    ///
    pub fn with_length_policy(mut self, policy: OnLengthMismatch) -> Self {
        self.length_policy = policy;
        self
    }

    pub fn length_policy(&self) -> OnLengthMismatch {
        self.length_policy
    }

    ///
    /// Encode text into token ids.
    ///
    /// # Arguments:
    /// - `text`: the text to encode
    /// - `add_special_tokens`: wrap the text as `"{bos} {text} {eos}"` first
    ///
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>> {
        if add_special_tokens {
            let wrapped = format!(
                "{} {} {}",
                self.special_tokens.bos, text, self.special_tokens.eos
            );
            return self.vocab.encode(&wrapped);
        }
        self.vocab.encode(text)
    }

    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.vocab.decode(ids)
    }

    ///
    /// The vocab size of the base encoding, recorded before the markers were registered.
    ///
    pub fn get_vocab_size(&self) -> usize {
        self.vocab.base_vocab_size()
    }

    ///
    /// The vocab size including the registered markers.
    ///
    pub fn get_full_vocab_size(&self) -> usize {
        self.vocab.len()
    }

    ///
    /// Encode the padding marker on its own and return its id.
    ///
    pub fn get_padding_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.pad)
    }

    pub fn convert_token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab.convert_token_to_id(token)
    }

    pub fn convert_id_to_token(&self, id: u32) -> Option<String> {
        self.vocab.convert_id_to_token(id)
    }

    pub fn get_bos_token(&self) -> String {
        self.special_tokens.bos.clone()
    }

    pub fn get_eos_token(&self) -> String {
        self.special_tokens.eos.clone()
    }

    pub fn get_pad_token(&self) -> String {
        self.special_tokens.pad.clone()
    }

    pub fn get_context_token(&self) -> String {
        self.special_tokens.context.clone()
    }

    pub fn get_question_token(&self) -> String {
        self.special_tokens.question.clone()
    }

    pub fn get_answer_token(&self) -> String {
        self.special_tokens.answer.clone()
    }

    pub fn get_rationale_start_token(&self) -> String {
        self.special_tokens.rationale_start.clone()
    }

    pub fn get_rationale_end_token(&self) -> String {
        self.special_tokens.rationale_end.clone()
    }

    // ids
    pub fn get_bos_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.bos)
    }

    pub fn get_eos_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.eos)
    }

    pub fn get_context_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.context)
    }

    pub fn get_question_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.question)
    }

    pub fn get_answer_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.answer)
    }

    pub fn get_rationale_start_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.rationale_start)
    }

    pub fn get_rationale_end_token_id(&self) -> Result<u32> {
        self.vocab.atomic_id(&self.special_tokens.rationale_end)
    }

    ///
    /// Flag every id that belongs to one of the markers.
    ///
    pub fn get_special_tokens_mask(&self, ids: &[u32]) -> Result<Vec<bool>> {
        let special_ids = self
            .special_tokens
            .iter()
            .map(|marker| self.vocab.atomic_id(marker))
            .collect::<Result<HashSet<u32>>>()?;

        Ok(ids.iter().map(|id| special_ids.contains(id)).collect())
    }

    pub fn get_special_tokens(&self) -> &SpecialTokens {
        &self.special_tokens
    }

    pub fn get_vocabulary(&self) -> &VocabularyHandle {
        &self.vocab
    }
}
