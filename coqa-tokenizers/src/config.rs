use std::fs::read_to_string;
use std::path::Path;

use thiserror::Error;

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;

use crate::encoding::OnLengthMismatch;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpecialToken {
    Bos,
    Eos,
    Pad,
    Context,
    Question,
    Answer,
    RationaleStart,
    RationaleEnd,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct SpecialTokenAssignment {
    pub name: SpecialToken,
    pub token: String,
}

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct TokenizerConfig {
    pub base_encoding: String,
    pub special_tokens: Option<Vec<SpecialTokenAssignment>>,
    pub on_length_mismatch: Option<OnLengthMismatch>,
}

#[derive(Debug)]
pub enum TokenizerInputFileType {
    Toml,
    Json,
}

#[derive(Error, Debug)]
pub enum TokenizerConfigError {
    #[error(
        "Missing or invalid file extension in tokenizer config file. It must be `toml` or `json`"
    )]
    InvalidFileType,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type TokenizerConfigResult<T> = std::result::Result<T, TokenizerConfigError>;

impl TokenizerInputFileType {
    ///
    /// Determine the type of the tokenizer input file based on its extension.
    /// # Arguments
    /// * `path` - A reference to a `Path` object representing the file path.
    /// # Returns
    /// * `TokenizerInputFileType` - `Toml` for a tokenizer config, `Json` for a serialized engine.
    ///
    pub fn from_path(path: &Path) -> TokenizerConfigResult<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("toml") => Ok(TokenizerInputFileType::Toml),
            Some("json") => Ok(TokenizerInputFileType::Json),
            _ => Err(TokenizerConfigError::InvalidFileType),
        }
    }
}

impl TryFrom<&Path> for TokenizerConfig {
    type Error = TokenizerConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
