use thiserror::Error;

use super::config::TokenizerConfigError;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] TokenizerConfigError),
    #[error("Could not load base encoding: {0}")]
    EngineLoad(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error(
        "Mismatched example lengths: {questions} questions, {answers} answers, {rationales} rationales"
    )]
    MismatchedLengths {
        questions: usize,
        answers: usize,
        rationales: usize,
    },
    #[error("Invalid special token configuration")]
    InvalidSpecialTokenConfig,
}

pub type Result<T> = std::result::Result<T, TokenizerError>;
