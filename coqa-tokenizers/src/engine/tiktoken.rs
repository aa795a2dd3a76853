use fxhash::FxHashMap;
use tiktoken_rs::{CoreBPE, cl100k_base, o200k_base, p50k_base, r50k_base};

use super::BpeEngine;
use crate::error::{Result, TokenizerError};

///
/// The named encodings shipped with `tiktoken-rs`, with the size of each
/// vocabulary (ordinary ranks plus the encoding's own special tokens).
///
pub const NAMED_ENCODINGS: [(&str, usize); 4] = [
    ("cl100k_base", 100_277),
    ("o200k_base", 200_019),
    ("p50k_base", 50_281),
    ("r50k_base", 50_257),
];

pub fn is_named_encoding(name: &str) -> bool {
    NAMED_ENCODINGS.iter().any(|(known, _)| *known == name)
}

///
/// A [BpeEngine] backed by one of the OpenAI encodings bundled with `tiktoken-rs`.
///
/// `CoreBPE` cannot grow its vocabulary, so atomic tokens live on this side: the
/// text is split on them before the ordinary pieces go through the encoding, and
/// they are given ids right after the end of the base vocabulary.
///
pub struct TiktokenEngine {
    name: String,
    bpe: CoreBPE,
    base_vocab_size: usize,
    // longest first, so overlapping tokens match greedily
    atomic: Vec<(String, u32)>,
    atomic_by_id: FxHashMap<u32, String>,
}

impl TiktokenEngine {
    ///
    /// Load a named encoding, such as `cl100k_base`.
    ///
    pub fn from_name(name: &str) -> Result<Self> {
        let (loaded, base_vocab_size) = match name {
            "cl100k_base" => (cl100k_base(), NAMED_ENCODINGS[0].1),
            "o200k_base" => (o200k_base(), NAMED_ENCODINGS[1].1),
            "p50k_base" => (p50k_base(), NAMED_ENCODINGS[2].1),
            "r50k_base" => (r50k_base(), NAMED_ENCODINGS[3].1),
            _ => return Err(TokenizerError::EngineLoad(name.to_string())),
        };
        let bpe = loaded.map_err(|err| TokenizerError::EngineLoad(format!("{}: {}", name, err)))?;

        Ok(Self {
            name: name.to_string(),
            bpe,
            base_vocab_size,
            atomic: vec![],
            atomic_by_id: FxHashMap::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn decode_ordinary(&self, ids: Vec<u32>) -> Result<String> {
        if let Some(id) = ids.iter().find(|id| **id as usize >= self.base_vocab_size) {
            return Err(TokenizerError::Encoding(format!(
                "{} is not a valid id for {}",
                id, self.name
            )));
        }
        self.bpe
            .decode(ids)
            .map_err(|err| TokenizerError::Encoding(err.to_string()))
    }
}

impl BpeEngine for TiktokenEngine {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut ids = vec![];
        let mut plain_start = 0;
        let mut cursor = 0;

        while cursor < text.len() {
            let rest = &text[cursor..];
            match self
                .atomic
                .iter()
                .find(|(token, _)| rest.starts_with(token.as_str()))
            {
                Some((token, id)) => {
                    if plain_start < cursor {
                        ids.extend(self.bpe.encode_ordinary(&text[plain_start..cursor]));
                    }
                    ids.push(*id);
                    cursor += token.len();
                    plain_start = cursor;
                }
                None => {
                    cursor += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }

        if plain_start < text.len() {
            ids.extend(self.bpe.encode_ordinary(&text[plain_start..]));
        }
        Ok(ids)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let mut text = String::new();
        let mut run = vec![];

        for id in ids {
            match self.atomic_by_id.get(id) {
                Some(token) => {
                    if !run.is_empty() {
                        text.push_str(&self.decode_ordinary(std::mem::take(&mut run))?);
                    }
                    text.push_str(token);
                }
                None => run.push(*id),
            }
        }

        if !run.is_empty() {
            text.push_str(&self.decode_ordinary(run)?);
        }
        Ok(text)
    }

    fn add_atomic_tokens(&mut self, tokens: &[String]) -> usize {
        let mut added = 0;
        for token in tokens {
            if token.is_empty() || self.atomic.iter().any(|(known, _)| known == token) {
                continue;
            }
            let id = (self.base_vocab_size + self.atomic.len()) as u32;
            self.atomic.push((token.clone(), id));
            self.atomic_by_id.insert(id, token.clone());
            added += 1;
        }
        self.atomic.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        added
    }

    fn vocab_size(&self, with_added_tokens: bool) -> usize {
        if with_added_tokens {
            self.base_vocab_size + self.atomic.len()
        } else {
            self.base_vocab_size
        }
    }

    fn token_to_id(&self, token: &str) -> Option<u32> {
        if let Some((_, id)) = self.atomic.iter().find(|(known, _)| known == token) {
            return Some(*id);
        }
        match self.bpe.encode_ordinary(token).as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    fn id_to_token(&self, id: u32) -> Option<String> {
        match self.atomic_by_id.get(&id) {
            Some(token) => Some(token.clone()),
            None => self.decode_ordinary(vec![id]).ok(),
        }
    }
}
