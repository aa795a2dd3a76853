//!
//! Structured encoders that flatten a conversational question answering example
//! (a context followed by question/answer/rationale turns) into one id sequence.
//!
//! Every field is encoded on its own, so each one carries its own BOS/EOS pair.
//!
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenizerError};
use crate::tokenizer::QaTokenizer;
use crate::utils::span::{RationaleSpan, find_rationale_span};

///
/// What to do when an example has a different number of questions, answers and rationales.
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnLengthMismatch {
    /// keep only as many turns as the shortest list has
    #[default]
    Truncate,
    Error,
    /// fill the shorter lists with empty strings up to the longest
    PadWithEmpty,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QaTurn {
    pub question: String,
    pub answer: String,
    pub rationale: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QaExample {
    pub context: String,
    pub turns: Vec<QaTurn>,
}

impl QaExample {
    ///
    /// Build an example from parallel lists of questions, answers and rationales.
    ///
    /// # Arguments:
    /// - `context`: the passage
    /// - `questions`, `answers`, `rationales`: the turns, position by position
    /// - `policy`: how to handle lists of different lengths
    ///
    pub fn from_parallel<S: AsRef<str>>(
        context: &str,
        questions: &[S],
        answers: &[S],
        rationales: &[S],
        policy: OnLengthMismatch,
    ) -> Result<Self> {
        let lengths = [questions.len(), answers.len(), rationales.len()];
        let shortest = lengths.iter().copied().min().unwrap_or(0);
        let longest = lengths.iter().copied().max().unwrap_or(0);

        let num_turns = if shortest == longest {
            shortest
        } else {
            match policy {
                OnLengthMismatch::Truncate => {
                    warn!(
                        "Mismatched example lengths ({} questions, {} answers, {} rationales), keeping the first {} turns",
                        questions.len(),
                        answers.len(),
                        rationales.len(),
                        shortest
                    );
                    shortest
                }
                OnLengthMismatch::Error => {
                    return Err(TokenizerError::MismatchedLengths {
                        questions: questions.len(),
                        answers: answers.len(),
                        rationales: rationales.len(),
                    });
                }
                OnLengthMismatch::PadWithEmpty => longest,
            }
        };

        let field = |values: &[S], i: usize| {
            values
                .get(i)
                .map(|value| value.as_ref().to_string())
                .unwrap_or_default()
        };

        let turns = (0..num_turns)
            .map(|i| QaTurn {
                question: field(questions, i),
                answer: field(answers, i),
                rationale: field(rationales, i),
            })
            .collect();

        Ok(QaExample {
            context: context.to_string(),
            turns,
        })
    }
}

///
/// The flattened context/question/answer sequence together with where the
/// rationale sits in the context.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationaleEncoding {
    pub input_ids: Vec<u32>,
    /// relative to the standalone context encoding, not to `input_ids`
    pub rationale_span: RationaleSpan,
    /// number of ids in `input_ids` before the context encoding starts
    pub context_offset: usize,
}

impl RationaleEncoding {
    ///
    /// The rationale span shifted to index into `input_ids`.
    ///
    pub fn composite_span(&self) -> RationaleSpan {
        self.rationale_span.offset(self.context_offset)
    }
}

impl QaTokenizer {
    ///
    /// Encode a full example: the context followed by every question, answer and rationale.
    /// Lists of different lengths are handled with the tokenizer's [OnLengthMismatch] policy.
    ///
    pub fn encode_example<S: AsRef<str>>(
        &self,
        context: &str,
        questions: &[S],
        answers: &[S],
        rationales: &[S],
    ) -> Result<Vec<u32>> {
        let example =
            QaExample::from_parallel(context, questions, answers, rationales, self.length_policy())?;
        self.encode_qa_example(&example)
    }

    pub fn encode_qa_example(&self, example: &QaExample) -> Result<Vec<u32>> {
        let specials = self.get_special_tokens();

        let mut encoded = self.encode(&format!("{} {}", specials.context, example.context), true)?;

        for turn in example.turns.iter() {
            encoded.extend(self.encode(&format!("{} {}", specials.question, turn.question), true)?);
            encoded.extend(self.encode(&format!("{} {}", specials.answer, turn.answer), true)?);
            encoded.extend(self.encode(
                &format!(
                    "{} {} {}",
                    specials.rationale_start, turn.rationale, specials.rationale_end
                ),
                true,
            )?);
        }

        Ok(encoded)
    }

    ///
    /// Encode a single turn as `context, question, answer` and locate the rationale
    /// inside the context.
    ///
    /// The rationale is looked up in the standalone context encoding. Use
    /// [RationaleEncoding::composite_span] for indices into the flattened sequence.
    ///
    pub fn encode_with_rationale_positions(
        &self,
        context: &str,
        question: &str,
        answer: &str,
        rationale: &str,
    ) -> Result<RationaleEncoding> {
        let specials = self.get_special_tokens();

        let context_tokens = self.encode(context, true)?;
        let question_tokens = self.encode(question, true)?;
        let answer_tokens = self.encode(answer, true)?;
        let rationale_tokens = self.encode(rationale, true)?;

        let rationale_span = find_rationale_span(&context_tokens, &rationale_tokens);

        let mut input_ids = self.encode(&specials.context, true)?;
        let context_offset = input_ids.len();
        input_ids.extend(context_tokens);
        input_ids.extend(self.encode(&specials.question, true)?);
        input_ids.extend(question_tokens);
        input_ids.extend(self.encode(&specials.answer, true)?);
        input_ids.extend(answer_tokens);

        Ok(RationaleEncoding {
            input_ids,
            rationale_span,
            context_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    struct Ids {
        bos: u32,
        eos: u32,
        context: u32,
        question: u32,
        answer: u32,
        rationale_start: u32,
        rationale_end: u32,
    }

    #[fixture]
    fn tokenizer() -> QaTokenizer {
        QaTokenizer::new("../tests/data/tokenizers/wordlevel.json").unwrap()
    }

    fn ids(tokenizer: &QaTokenizer) -> Ids {
        Ids {
            bos: tokenizer.get_bos_token_id().unwrap(),
            eos: tokenizer.get_eos_token_id().unwrap(),
            context: tokenizer.get_context_token_id().unwrap(),
            question: tokenizer.get_question_token_id().unwrap(),
            answer: tokenizer.get_answer_token_id().unwrap(),
            rationale_start: tokenizer.get_rationale_start_token_id().unwrap(),
            rationale_end: tokenizer.get_rationale_end_token_id().unwrap(),
        }
    }

    #[rstest]
    fn test_context_marker_prefix(tokenizer: QaTokenizer) {
        let context_tokens = tokenizer.encode("The cat sat.", false).unwrap();
        let mut encoded = tokenizer.encode("<CONTEXT>", false).unwrap();
        encoded.extend(context_tokens.iter());

        assert_eq!(encoded[0], ids(&tokenizer).context);
        assert_eq!(&encoded[1..], context_tokens.as_slice());
    }

    #[rstest]
    fn test_encode_example_truncates_to_shortest(tokenizer: QaTokenizer) {
        let i = ids(&tokenizer);
        let encoded = tokenizer
            .encode_example("Hi", &["Q1", "Q2"], &["A1"], &["R1"])
            .unwrap();

        #[rustfmt::skip]
        let expected = vec![
            i.bos, i.context, 11, i.eos,
            i.bos, i.question, 12, i.eos,
            i.bos, i.answer, 14, i.eos,
            i.bos, i.rationale_start, 15, i.rationale_end, i.eos,
        ];
        assert_eq!(encoded, expected);
    }

    #[rstest]
    fn test_encode_example_error_policy(tokenizer: QaTokenizer) {
        let tokenizer = tokenizer.with_length_policy(OnLengthMismatch::Error);
        let result = tokenizer.encode_example("Hi", &["Q1", "Q2"], &["A1"], &["R1"]);

        assert!(matches!(
            result,
            Err(TokenizerError::MismatchedLengths {
                questions: 2,
                answers: 1,
                rationales: 1
            })
        ));
    }

    #[rstest]
    fn test_encode_example_pad_with_empty(tokenizer: QaTokenizer) {
        let i = ids(&tokenizer);
        let tokenizer = tokenizer.with_length_policy(OnLengthMismatch::PadWithEmpty);
        let encoded = tokenizer
            .encode_example("Hi", &["Q1", "Q2"], &["A1"], &["R1"])
            .unwrap();

        #[rustfmt::skip]
        let expected = vec![
            i.bos, i.context, 11, i.eos,
            i.bos, i.question, 12, i.eos,
            i.bos, i.answer, 14, i.eos,
            i.bos, i.rationale_start, 15, i.rationale_end, i.eos,
            i.bos, i.question, 13, i.eos,
            i.bos, i.answer, i.eos,
            i.bos, i.rationale_start, i.rationale_end, i.eos,
        ];
        assert_eq!(encoded, expected);
    }

    #[rstest]
    fn test_equal_lengths_ignore_policy() {
        let example = QaExample::from_parallel(
            "Hi",
            &["Q1".to_string()],
            &["A1".to_string()],
            &["R1".to_string()],
            OnLengthMismatch::Error,
        )
        .unwrap();

        assert_eq!(
            example.turns,
            vec![QaTurn {
                question: "Q1".to_string(),
                answer: "A1".to_string(),
                rationale: "R1".to_string(),
            }]
        );
    }

    #[rstest]
    fn test_no_turns(tokenizer: QaTokenizer) {
        let empty: [&str; 0] = [];
        let encoded = tokenizer.encode_example("Hi", &empty, &empty, &empty).unwrap();
        assert_eq!(encoded, tokenizer.encode("<CONTEXT> Hi", true).unwrap());
    }

    #[rstest]
    fn test_wrapped_rationale_is_not_found(tokenizer: QaTokenizer) {
        let i = ids(&tokenizer);
        let encoding = tokenizer
            .encode_with_rationale_positions(
                "The cat sat on the mat.",
                "Where did the cat sat?",
                "on the mat",
                "on the mat",
            )
            .unwrap();

        // the rationale carries its own BOS/EOS, which never occur inside the context run
        assert_eq!(encoding.rationale_span, RationaleSpan::NOT_FOUND);
        assert_eq!(encoding.composite_span(), RationaleSpan::NOT_FOUND);

        #[rustfmt::skip]
        let expected = vec![
            i.bos, i.context, i.eos,
            i.bos, 1, 3, 4, 5, 2, 6, 9, i.eos,
            i.bos, i.question, i.eos,
            i.bos, 7, 8, 2, 3, 4, 10, i.eos,
            i.bos, i.answer, i.eos,
            i.bos, 5, 2, 6, i.eos,
        ];
        assert_eq!(encoding.input_ids, expected);
        assert_eq!(encoding.context_offset, 3);
    }

    #[rstest]
    fn test_whole_context_rationale_is_found(tokenizer: QaTokenizer) {
        let encoding = tokenizer
            .encode_with_rationale_positions("a dog ran", "Who ran?", "a dog", "a dog ran")
            .unwrap();

        assert_eq!(encoding.rationale_span, RationaleSpan::new(0, 5));

        // indices are relative to the context encoding on its own
        let context_tokens = tokenizer.encode("a dog ran", true).unwrap();
        let range = encoding.composite_span().as_range().unwrap();
        assert_eq!(range, 3..8);
        assert_eq!(&encoding.input_ids[range], context_tokens.as_slice());
    }

    #[rstest]
    fn test_length_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: OnLengthMismatch,
        }

        let wrapper: Wrapper = toml::from_str(r#"policy = "pad_with_empty""#).unwrap();
        assert_eq!(wrapper.policy, OnLengthMismatch::PadWithEmpty);
    }
}
