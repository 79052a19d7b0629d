use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Sampling temperature.
///
/// Each probability is raised to `1 / temperature` before renormalizing:
/// below 1 sharpens the distribution toward its mode, above 1 flattens it.
///
/// # Invariants
/// - The value is finite and strictly positive, so `0` (an infinite exponent)
///   is rejected rather than special-cased.
/// - Equality and hashing use the bit pattern, which is sound because NaN
///   and `-0.0` can never be stored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
	/// Neutral temperature: probabilities are left unchanged.
	pub const NEUTRAL: Temperature = Temperature(1.0);

	/// Validates and wraps a temperature.
	///
	/// # Errors
	/// Returns [`ConfigError::Invalid`] if `value` is not finite or `<= 0`.
	pub fn new(value: f64) -> Result<Self, ConfigError> {
		if !value.is_finite() || value <= 0.0 {
			return Err(ConfigError::invalid(
				"temperature",
				format!("must be a finite value > 0, got {value}"),
			));
		}
		Ok(Self(value))
	}

	/// Rescales `probabilities` in place to `p^(1/T)`, normalized to sum to 1.
	///
	/// Works relative to the largest probability in log space, which keeps the
	/// result well defined when `1/T` is huge. Zero or negative inputs get
	/// weight zero. Does nothing on an empty slice or if every input is zero.
	pub fn apply(&self, probabilities: &mut [f64]) {
		let max = probabilities.iter().copied().fold(0.0_f64, f64::max);
		if max <= 0.0 {
			return;
		}

		let ln_max = max.ln();
		for p in probabilities.iter_mut() {
			*p = if *p <= 0.0 {
				0.0
			} else if *p == max {
				1.0
			} else {
				((p.ln() - ln_max) / self.0).exp()
			};
		}

		let sum: f64 = probabilities.iter().sum();
		for p in probabilities.iter_mut() {
			*p /= sum;
		}
	}
}

impl Default for Temperature {
	fn default() -> Self {
		Self::NEUTRAL
	}
}

impl Eq for Temperature {}

impl Hash for Temperature {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.to_bits().hash(state);
	}
}

impl TryFrom<f64> for Temperature {
	type Error = ConfigError;

	fn try_from(value: f64) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl From<Temperature> for f64 {
	fn from(temperature: Temperature) -> Self {
		temperature.0
	}
}

impl fmt::Display for Temperature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
