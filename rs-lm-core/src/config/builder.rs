//! Build [`Config`] from environment variables.
//!
//! Unset variables fall back to [`Config::default`]. Key names live in the
//! `constants` submodule and are prefixed with `RS_LM_`.

use super::constants::{
	ENV_ALPHA, ENV_CACHE_MAX_SIZE, ENV_NGRAM_SIZE, ENV_PREFIX, ENV_SMOOTHING_METHOD,
};
use super::{Config, ConfigError, SmoothingMethod};

/// Returns the full environment variable key for a suffix (`ALPHA` → `RS_LM_ALPHA`).
#[must_use]
pub fn env_key(suffix: &str) -> String {
	format!("{ENV_PREFIX}{suffix}")
}

/// Reads an environment variable as a string.
///
/// Returns `Ok(None)` if unset and `Err(ConfigError::EnvVar)` if set but not valid Unicode.
pub fn env_string(key: &str) -> Result<Option<String>, ConfigError> {
	match std::env::var(key) {
		Ok(s) => Ok(Some(s)),
		Err(std::env::VarError::NotPresent) => Ok(None),
		Err(e) => Err(ConfigError::EnvVar {
			key: key.to_owned(),
			message: e.to_string(),
		}),
	}
}

/// Reads an environment variable and parses it into `T`.
///
/// Returns `Ok(None)` if unset and `Err(ConfigError::Parse)` if parsing fails.
pub fn env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	let Some(s) = env_string(key)? else {
		return Ok(None);
	};
	match s.trim().parse() {
		Ok(t) => Ok(Some(t)),
		Err(e) => Err(ConfigError::Parse {
			key: key.to_owned(),
			message: e.to_string(),
			value: s,
		}),
	}
}

/// Builds a validated [`Config`] from `RS_LM_*` environment variables.
///
/// # Errors
/// Returns [`ConfigError`] if a set variable fails to parse or the resulting
/// configuration does not validate.
pub fn from_env() -> Result<Config, ConfigError> {
	let default = Config::default();

	let ngram_size = env_parsed::<usize>(&env_key(ENV_NGRAM_SIZE))?.unwrap_or(default.ngram_size);
	let smoothing_method = env_string(&env_key(ENV_SMOOTHING_METHOD))?
		.map(|name| SmoothingMethod::from(name.as_str()))
		.unwrap_or(default.smoothing_method);
	let alpha = env_parsed::<f64>(&env_key(ENV_ALPHA))?.unwrap_or(default.alpha);
	let cache_max_size =
		env_parsed::<usize>(&env_key(ENV_CACHE_MAX_SIZE))?.unwrap_or(default.cache_max_size);

	let config = Config { ngram_size, smoothing_method, alpha, cache_max_size };
	config.validate()?;
	Ok(config)
}
