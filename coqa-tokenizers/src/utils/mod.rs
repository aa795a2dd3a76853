//!
//! This module contains utility functions for tokenizers. The marker
//! registry and rationale span lookup live here.
//!
pub mod span;
pub mod special_tokens;

pub use span::{RationaleSpan, find_rationale_span};
pub use special_tokens::SpecialTokens;
