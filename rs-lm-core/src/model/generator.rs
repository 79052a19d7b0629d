use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use super::error::GenerationError;
use super::estimator::Candidate;
use super::language_model::LanguageModel;
use super::sampler;
use super::temperature::Temperature;

/// Tokens that end a generation early (they are kept in the output).
pub const TERMINAL_TOKENS: [&str; 3] = [".", "!", "?"];

/// Outcome of [`LanguageModel::generate`].
///
/// `tokens`, `explanations` and `options` are index-aligned: entry `i` of
/// each describes the `i`-th generated token.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeneratedResult {
	/// Prompt followed by the continuation, detokenized.
	pub text: String,
	/// Generated tokens only.
	pub tokens: Vec<String>,
	/// One line per step, e.g. `Selected "cat" (probability: 52.38%)`.
	pub explanations: Vec<String>,
	/// Candidates the token of each step was drawn from.
	pub options: Vec<Vec<Candidate>>,
}

impl GeneratedResult {
	/// Number of generated tokens.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

/// Whether `token` stops generation.
pub fn is_terminal(token: &str) -> bool {
	TERMINAL_TOKENS.contains(&token)
}

/// Human-readable trace line of one sampling step.
pub fn explain(token: &str, probability: f64) -> String {
	format!("Selected \"{token}\" (probability: {:.2}%)", probability * 100.0)
}

impl<R: Rng> LanguageModel<R> {
	/// Continues `prompt` token by token.
	///
	/// Each step takes the last `max_order` tokens of prompt + output as
	/// context, queries the (memoized) distribution, samples one token and
	/// records why. Stops after `max_length` tokens or right after a
	/// terminal token (`.`, `!`, `?`).
	///
	/// # Errors
	/// - [`GenerationError::InvalidConfig`] if `max_length == 0` or `temperature`
	///   is not a finite value `> 0`.
	/// - [`GenerationError::EmptyVocabulary`] if there is nothing to sample from.
	pub fn generate(
		&mut self,
		prompt: &str,
		max_length: usize,
		temperature: f64,
	) -> Result<GeneratedResult, GenerationError> {
		if max_length == 0 {
			return Err(ConfigError::invalid("max_length", "must be > 0").into());
		}
		let temperature = Temperature::new(temperature)?;

		let prompt_tokens = self.tokenizer().tokenize(prompt);
		let max_order = self.table().max_order();

		let mut generated: Vec<String> = Vec::new();
		let mut explanations = Vec::new();
		let mut options = Vec::new();

		while generated.len() < max_length {
			let history = prompt_tokens.len() + generated.len();
			let context = prompt_tokens
				.iter()
				.chain(generated.iter())
				.skip(history.saturating_sub(max_order))
				.map(String::as_str)
				.collect::<Vec<_>>()
				.join(" ");

			let candidates = self.distribution(&context, temperature);
			let (token, probability) = match sampler::select(&candidates, &mut self.rng) {
				Some(choice) => (choice.token.clone(), choice.probability),
				None => return Err(GenerationError::EmptyVocabulary),
			};

			log::trace!("generate: {context:?} -> {token:?} ({probability:.4})");
			explanations.push(explain(&token, probability));
			options.push(candidates);

			let stop = is_terminal(&token);
			generated.push(token);
			if stop {
				break;
			}
		}

		let text = self.tokenizer().detokenize(&[prompt_tokens, generated.clone()].concat());

		Ok(GeneratedResult { text, tokens: generated, explanations, options })
	}
}
