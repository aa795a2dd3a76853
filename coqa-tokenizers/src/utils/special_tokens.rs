use std::collections::HashMap;

use fxhash::FxHashSet as HashSet;

use crate::config::{SpecialToken, SpecialTokenAssignment};
use crate::error::TokenizerError;

///
/// The marker strings used to delimit the regions of a flattened
/// question-answering example. Every marker is registered as an atomic
/// token in the vocabulary of the tokenizer that owns it.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialTokens {
    pub bos: String,
    pub eos: String,
    pub pad: String,
    pub context: String,
    pub question: String,
    pub answer: String,
    pub rationale_start: String,
    pub rationale_end: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        SpecialTokens {
            bos: "<BOS>".to_string(),
            eos: "<EOS>".to_string(),
            pad: "<PAD>".to_string(),
            context: "<CONTEXT>".to_string(),
            question: "<QUESTION>".to_string(),
            answer: "<ANSWER>".to_string(),
            rationale_start: "<RATIONALE_START>".to_string(),
            rationale_end: "<RATIONALE_END>".to_string(),
        }
    }
}

impl SpecialTokens {
    ///
    /// Get the marker assigned to a role.
    ///
    pub fn get(&self, role: &SpecialToken) -> &str {
        match role {
            SpecialToken::Bos => &self.bos,
            SpecialToken::Eos => &self.eos,
            SpecialToken::Pad => &self.pad,
            SpecialToken::Context => &self.context,
            SpecialToken::Question => &self.question,
            SpecialToken::Answer => &self.answer,
            SpecialToken::RationaleStart => &self.rationale_start,
            SpecialToken::RationaleEnd => &self.rationale_end,
        }
    }

    ///
    /// Iterate over the markers in registration order.
    ///
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            &self.bos,
            &self.eos,
            &self.pad,
            &self.context,
            &self.question,
            &self.answer,
            &self.rationale_start,
            &self.rationale_end,
        ]
        .into_iter()
        .map(String::as_str)
    }

    ///
    /// Check whether a string is one of the markers.
    ///
    pub fn contains(&self, token: &str) -> bool {
        self.iter().any(|marker| marker == token)
    }

    ///
    /// Make sure every marker is non-empty and that no two roles share a marker.
    /// Two roles mapping to the same string would collapse into a single id.
    ///
    pub fn validate(&self) -> Result<(), TokenizerError> {
        let mut seen = HashSet::default();
        for marker in self.iter() {
            if marker.trim().is_empty() || !seen.insert(marker) {
                return Err(TokenizerError::InvalidSpecialTokenConfig);
            }
        }
        Ok(())
    }
}

impl From<Vec<SpecialTokenAssignment>> for SpecialTokens {
    fn from(value: Vec<SpecialTokenAssignment>) -> Self {
        let mut special_tokens = SpecialTokens::default();

        for token in value {
            match token.name {
                SpecialToken::Bos => special_tokens.bos = token.token,
                SpecialToken::Eos => special_tokens.eos = token.token,
                SpecialToken::Pad => special_tokens.pad = token.token,
                SpecialToken::Context => special_tokens.context = token.token,
                SpecialToken::Question => special_tokens.question = token.token,
                SpecialToken::Answer => special_tokens.answer = token.token,
                SpecialToken::RationaleStart => special_tokens.rationale_start = token.token,
                SpecialToken::RationaleEnd => special_tokens.rationale_end = token.token,
            }
        }

        special_tokens
    }
}

impl From<&SpecialTokens> for Vec<String> {
    fn from(val: &SpecialTokens) -> Self {
        val.iter().map(str::to_string).collect()
    }
}

impl From<SpecialTokens> for Vec<String> {
    fn from(val: SpecialTokens) -> Self {
        (&val).into()
    }
}

impl From<&SpecialTokens> for HashMap<String, String> {
    fn from(val: &SpecialTokens) -> Self {
        let mut map = HashMap::new();
        map.insert("bos".to_string(), val.bos.clone());
        map.insert("eos".to_string(), val.eos.clone());
        map.insert("pad".to_string(), val.pad.clone());
        map.insert("context".to_string(), val.context.clone());
        map.insert("question".to_string(), val.question.clone());
        map.insert("answer".to_string(), val.answer.clone());
        map.insert("rationale_start".to_string(), val.rationale_start.clone());
        map.insert("rationale_end".to_string(), val.rationale_end.clone());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_default_markers_are_valid() {
        let special_tokens = SpecialTokens::default();
        assert!(special_tokens.validate().is_ok());
        assert_eq!(special_tokens.iter().count(), 8);
    }

    #[rstest]
    fn test_registration_order() {
        let tokens: Vec<String> = SpecialTokens::default().into();
        assert_eq!(
            tokens,
            vec![
                "<BOS>",
                "<EOS>",
                "<PAD>",
                "<CONTEXT>",
                "<QUESTION>",
                "<ANSWER>",
                "<RATIONALE_START>",
                "<RATIONALE_END>",
            ]
        );
    }

    #[rstest]
    fn test_override_from_assignments() {
        let special_tokens = SpecialTokens::from(vec![SpecialTokenAssignment {
            name: SpecialToken::Context,
            token: "[CTX]".to_string(),
        }]);

        assert_eq!(special_tokens.context, "[CTX]");
        assert_eq!(special_tokens.get(&SpecialToken::Context), "[CTX]");
        // untouched roles keep their defaults
        assert_eq!(special_tokens.question, "<QUESTION>");
    }

    #[rstest]
    #[case(SpecialToken::Eos, "<BOS>")]
    #[case(SpecialToken::Answer, "<QUESTION>")]
    #[case(SpecialToken::Pad, "  ")]
    fn test_invalid_markers_are_rejected(#[case] role: SpecialToken, #[case] token: &str) {
        let special_tokens = SpecialTokens::from(vec![SpecialTokenAssignment {
            name: role,
            token: token.to_string(),
        }]);

        assert!(matches!(
            special_tokens.validate(),
            Err(TokenizerError::InvalidSpecialTokenConfig)
        ));
    }

    #[rstest]
    fn test_contains_and_map() {
        let special_tokens = SpecialTokens::default();
        assert!(special_tokens.contains("<RATIONALE_END>"));
        assert!(!special_tokens.contains("RATIONALE_END"));

        let map: HashMap<String, String> = (&special_tokens).into();
        assert_eq!(map.len(), 8);
        assert_eq!(map["pad"], "<PAD>");
    }
}
