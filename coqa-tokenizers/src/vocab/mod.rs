//!
//! This module defines the `VocabularyHandle` struct, which owns the vocabulary of one tokenizer.
//!
//! The handle wraps a single engine instance and is the only place the vocabulary is ever
//! mutated. Registering tokens consumes the handle and hands back the updated one, so two
//! tokenizers built with different special tokens never see each other's additions.
//!
use log::debug;

use crate::engine::BpeEngine;
use crate::error::{Result, TokenizerError};

pub struct VocabularyHandle {
    engine: Box<dyn BpeEngine>,
    base_vocab_size: usize,
    registered: Vec<String>,
}

impl VocabularyHandle {
    ///
    /// Take ownership of an engine. The vocab size is recorded here, before
    /// anything gets registered.
    ///
    pub fn new(engine: Box<dyn BpeEngine>) -> Self {
        let base_vocab_size = engine.vocab_size(true);
        Self {
            engine,
            base_vocab_size,
            registered: vec![],
        }
    }

    ///
    /// Register tokens as atomic units of the vocabulary. Tokens that the engine
    /// already maps to a single id of their own are left alone.
    ///
    /// # Arguments:
    /// - `tokens`: the tokens to register
    ///
    /// # Returns:
    /// - the updated handle
    ///
    pub fn register_atomic_tokens(mut self, tokens: &[String]) -> Result<Self> {
        let mut missing = vec![];
        for token in tokens {
            if self.is_atomic(token)? {
                debug!("{} is already a single token, skipping registration", token);
            } else {
                missing.push(token.to_owned());
            }
        }

        if !missing.is_empty() {
            let added = self.engine.add_atomic_tokens(&missing);
            debug!("Registered {} atomic tokens: {:?}", added, missing);
            self.registered.extend(missing);
        }

        Ok(self)
    }

    ///
    /// Check whether the engine encodes a token as exactly one id that decodes
    /// back to the token itself. An unknown word collapsing into a single
    /// `[UNK]` id does not count.
    ///
    pub fn is_atomic(&self, token: &str) -> Result<bool> {
        let ids = self.engine.encode(token)?;
        match ids.as_slice() {
            [id] => Ok(self.engine.id_to_token(*id).as_deref() == Some(token)),
            _ => Ok(false),
        }
    }

    ///
    /// Look up the single id of an atomic token.
    ///
    pub fn atomic_id(&self, token: &str) -> Result<u32> {
        let ids = self.engine.encode(token)?;
        match ids.as_slice() {
            [id] => Ok(*id),
            _ => Err(TokenizerError::Encoding(format!(
                "{} is expected to be a single token but encodes to {} ids",
                token,
                ids.len()
            ))),
        }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.engine.encode(text)
    }

    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.engine.decode(ids)
    }

    ///
    /// The vocab size as it was when the handle was created.
    ///
    pub fn base_vocab_size(&self) -> usize {
        self.base_vocab_size
    }

    ///
    /// The current vocab size, including every registered token.
    ///
    pub fn len(&self) -> usize {
        self.engine.vocab_size(true)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    ///
    /// The tokens this handle had to add to the engine, in registration order.
    ///
    pub fn registered_tokens(&self) -> &[String] {
        &self.registered
    }

    pub fn convert_token_to_id(&self, token: &str) -> Option<u32> {
        self.engine.token_to_id(token)
    }

    pub fn convert_id_to_token(&self, id: u32) -> Option<String> {
        self.engine.id_to_token(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HfEngine;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn handle() -> VocabularyHandle {
        let engine = HfEngine::from_file("../tests/data/tokenizers/wordlevel.json").unwrap();
        VocabularyHandle::new(Box::new(engine))
    }

    #[rstest]
    fn test_register_snapshots_size_first(handle: VocabularyHandle) {
        let handle = handle
            .register_atomic_tokens(&["<A>".to_string(), "<B>".to_string()])
            .unwrap();

        assert_eq!(handle.base_vocab_size(), 20);
        assert_eq!(handle.len(), 22);
        assert_eq!(handle.registered_tokens(), &["<A>", "<B>"]);
    }

    #[rstest]
    fn test_existing_words_are_not_registered(handle: VocabularyHandle) {
        let handle = handle
            .register_atomic_tokens(&["cat".to_string(), "<A>".to_string()])
            .unwrap();

        assert_eq!(handle.registered_tokens(), &["<A>"]);
        assert_eq!(handle.atomic_id("cat").unwrap(), 3);
    }

    #[rstest]
    fn test_unknown_word_is_not_atomic(handle: VocabularyHandle) {
        // a single [UNK] id
        assert_eq!(handle.encode("zebra").unwrap(), vec![0]);
        assert_eq!(handle.is_atomic("zebra").unwrap(), false);
    }

    #[rstest]
    fn test_atomic_id_rejects_split_tokens(handle: VocabularyHandle) {
        let result = handle.atomic_id("<A>");
        assert!(matches!(result, Err(TokenizerError::Encoding(_))));
    }

    #[rstest]
    fn test_handles_are_independent() {
        let first = handle().register_atomic_tokens(&["<A>".to_string()]).unwrap();
        let second = handle();

        assert_eq!(first.is_atomic("<A>").unwrap(), true);
        assert_eq!(second.is_atomic("<A>").unwrap(), false);
    }
}
