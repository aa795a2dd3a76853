//! # coqa-tokenizers
//!
//! Wrapper around a byte-pair-encoding engine for producing tokens for conversational
//! question answering models.
//!
//! ## Purpose
//!
//! A CoQA style example is a passage (the context) followed by a series of turns, each made
//! of a question, an answer and a rationale: the piece of the context that justifies the
//! answer. This crate flattens such examples into a single token sequence, delimiting every
//! region with dedicated marker tokens, and recovers where a rationale sits inside the
//! encoded context.
//!
//! ## Design Philosophy
//!
//! All subword encoding is delegated to an external engine (a HuggingFace `tokenizer.json`
//! by default). This crate focuses on:
//! - Registering the markers as atomic, never-split tokens
//! - Encoding whole examples field by field
//! - Locating rationale spans by token id
//!
//! ## Main Components
//!
//! - **`QaTokenizer`**: owns the engine and the markers, encodes and decodes text
//! - **`VocabularyHandle`**: the vocabulary of one tokenizer, the only thing ever mutated
//! - **`SpecialTokens`**: the marker strings
//! - **`find_rationale_span`**: exact id-for-id rationale lookup
//!
//! ## Example
//!
//! ```rust
//! use coqa_tokenizers::QaTokenizer;
//!
//! let tokenizer = QaTokenizer::new("../tests/data/tokenizers/wordlevel.json").unwrap();
//!
//! let ids = tokenizer
//!     .encode_example("The cat sat.", &["Who sat?"], &["The cat"], &["The cat sat."])
//!     .unwrap();
//! assert_eq!(ids.len(), 26);
//!
//! let encoding = tokenizer
//!     .encode_with_rationale_positions("The cat sat.", "Who sat?", "The cat", "The cat sat.")
//!     .unwrap();
//! assert!(encoding.rationale_span.is_found());
//! ```
//!
pub mod config;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod tokenizer;
pub mod utils;
pub mod vocab;

// re-export things
pub use encoding::*;
pub use engine::{BpeEngine, HfEngine, TiktokenEngine, load_base_encoding};
pub use error::*;
pub use tokenizer::*;
pub use utils::*;
pub use vocab::*;
