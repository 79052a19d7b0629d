//! Errors returned by training and generation.

use std::fmt;
use std::str::Utf8Error;

use crate::config::ConfigError;

/// Errors produced by [`LanguageModel::train`](super::language_model::LanguageModel::train)
/// and [`LanguageModel::train_bytes`](super::language_model::LanguageModel::train_bytes).
///
/// The model is left exactly as it was before the failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingError {
	/// The input is not valid UTF-8 text.
	NotText(Utf8Error),
}

impl fmt::Display for TrainingError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TrainingError::NotText(e) => write!(f, "training: input is not UTF-8 text: {e}"),
		}
	}
}

impl std::error::Error for TrainingError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			TrainingError::NotText(e) => Some(e),
		}
	}
}

/// Errors produced by [`LanguageModel::generate`](super::language_model::LanguageModel::generate)
/// and [`LanguageModel::next_tokens`](super::language_model::LanguageModel::next_tokens).
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
	/// `max_length` or `temperature` is out of range.
	InvalidConfig(ConfigError),

	/// Nothing can be sampled: the model is untrained or was trained on text
	/// too short to observe a single continuation.
	EmptyVocabulary,
}

impl fmt::Display for GenerationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GenerationError::InvalidConfig(e) => write!(f, "generation: {e}"),
			GenerationError::EmptyVocabulary => {
				write!(f, "generation: empty vocabulary, train the model first")
			}
		}
	}
}

impl std::error::Error for GenerationError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			GenerationError::InvalidConfig(e) => Some(e),
			GenerationError::EmptyVocabulary => None,
		}
	}
}

impl From<ConfigError> for GenerationError {
	fn from(e: ConfigError) -> Self {
		GenerationError::InvalidConfig(e)
	}
}
