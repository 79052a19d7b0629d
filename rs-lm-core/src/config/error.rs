use std::fmt;

/// Errors produced when building, validating or applying configuration.
///
/// # Variants
///
/// - **Invalid**: a value is out of range (e.g. `alpha <= 0`, `temperature <= 0`).
///   Raised by [`Config::validate`](super::Config::validate), by
///   [`Temperature::new`](crate::model::temperature::Temperature::new) and by
///   generation parameter checks.
///
/// - **EnvVar**: an environment variable could not be read (e.g. invalid Unicode).
///
/// - **Parse**: an environment variable was set but could not be parsed into
///   the expected type (e.g. `RS_LM_ALPHA=abc`).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
	/// A value failed validation.
	Invalid {
		/// Name of the offending field or parameter.
		field: &'static str,
		/// Human-readable rule that failed.
		message: String,
	},

	/// Failed to read an environment variable.
	EnvVar {
		key: String,
		message: String,
	},

	/// Environment variable was set but could not be parsed.
	Parse {
		key: String,
		value: String,
		message: String,
	},
}

impl ConfigError {
	/// Shorthand for [`ConfigError::Invalid`].
	pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
		ConfigError::Invalid { field, message: message.into() }
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Invalid { field, message } => write!(f, "invalid config {field}: {message}"),
			ConfigError::EnvVar { key, message } => write!(f, "env var {key}: {message}"),
			ConfigError::Parse { key, value, message } => {
				write!(f, "env var {key}={value:?}: {message}")
			}
		}
	}
}

impl std::error::Error for ConfigError {}
