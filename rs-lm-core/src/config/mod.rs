//! Model configuration.
//!
//! Build with [`Config::default`], from the environment via [`from_env`], or
//! by merging partial [`ConfigOptions`] with [`Config::with_options`].
//! Every constructor path ends in [`Config::validate`].

mod builder;
mod constants;
mod error;

use std::fmt;

use serde::{Deserialize, Serialize};

use constants::{DEFAULT_ALPHA, DEFAULT_CACHE_MAX_SIZE, DEFAULT_NGRAM_SIZE, MIN_MAX_ORDER};

pub use builder::{env_key, env_parsed, env_string, from_env};
pub use error::ConfigError;

/// Smoothing scheme applied to observed counts.
///
/// Only additive smoothing is implemented. Unknown names fall back to it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMethod {
	/// Additive smoothing with a configurable `alpha`.
	#[default]
	Laplace,
}

impl SmoothingMethod {
	pub fn name(&self) -> &'static str {
		match self {
			SmoothingMethod::Laplace => "laplace",
		}
	}
}

impl From<&str> for SmoothingMethod {
	fn from(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"laplace" => SmoothingMethod::Laplace,
			other => {
				log::warn!("unknown smoothing method {other:?}, using laplace");
				SmoothingMethod::Laplace
			}
		}
	}
}

impl fmt::Display for SmoothingMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Configuration of a [`LanguageModel`](crate::model::language_model::LanguageModel).
///
/// # Invariants (checked by [`Config::validate`])
/// - `ngram_size >= 1`
/// - `alpha` is finite and `> 0`
/// - `cache_max_size >= 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
	/// Requested n-gram size. The table order actually used is [`Config::max_order`].
	pub ngram_size: usize,
	/// Smoothing scheme.
	pub smoothing_method: SmoothingMethod,
	/// Additive smoothing constant.
	pub alpha: f64,
	/// Capacity of the distribution cache.
	pub cache_max_size: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			ngram_size: DEFAULT_NGRAM_SIZE,
			smoothing_method: SmoothingMethod::default(),
			alpha: DEFAULT_ALPHA,
			cache_max_size: DEFAULT_CACHE_MAX_SIZE,
		}
	}
}

impl Config {
	/// Highest gram order stored in the table: `max(3, ngram_size)`.
	pub fn max_order(&self) -> usize {
		self.ngram_size.max(MIN_MAX_ORDER)
	}

	/// Checks every invariant.
	///
	/// # Errors
	/// Returns [`ConfigError::Invalid`] naming the first field that fails.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.ngram_size < 1 {
			return Err(ConfigError::invalid("ngram_size", "must be >= 1"));
		}
		if !self.alpha.is_finite() || self.alpha <= 0.0 {
			return Err(ConfigError::invalid(
				"alpha",
				format!("must be a finite value > 0, got {}", self.alpha),
			));
		}
		if self.cache_max_size < 1 {
			return Err(ConfigError::invalid("cache_max_size", "must be >= 1"));
		}
		Ok(())
	}

	/// Returns a copy of `self` with every provided option applied, validated.
	///
	/// Missing options keep their current value.
	pub fn with_options(&self, options: &ConfigOptions) -> Result<Self, ConfigError> {
		let config = Self {
			ngram_size: options.ngram_size.unwrap_or(self.ngram_size),
			smoothing_method: options
				.smoothing_method
				.as_deref()
				.map(SmoothingMethod::from)
				.unwrap_or(self.smoothing_method),
			alpha: options.alpha.unwrap_or(self.alpha),
			cache_max_size: options.cache_max_size.unwrap_or(self.cache_max_size),
		};
		config.validate()?;
		Ok(config)
	}
}

/// Partial configuration, as received from a caller.
///
/// Every field is optional; see [`Config::with_options`].
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct ConfigOptions {
	pub ngram_size: Option<usize>,
	pub smoothing_method: Option<String>,
	pub alpha: Option<f64>,
	pub cache_max_size: Option<usize>,
}
