//! Default values and environment variable names.

/// Default n-gram size.
pub const DEFAULT_NGRAM_SIZE: usize = 3;
/// Default additive smoothing constant.
pub const DEFAULT_ALPHA: f64 = 0.1;
/// Default capacity of the distribution cache.
pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;

/// Lowest order the table is ever built with, whatever `ngram_size` says.
pub const MIN_MAX_ORDER: usize = 3;

/// Prefix shared by every environment variable read by this crate.
pub const ENV_PREFIX: &str = "RS_LM_";

pub const ENV_NGRAM_SIZE: &str = "NGRAM_SIZE";
pub const ENV_SMOOTHING_METHOD: &str = "SMOOTHING_METHOD";
pub const ENV_ALPHA: &str = "ALPHA";
pub const ENV_CACHE_MAX_SIZE: &str = "CACHE_MAX_SIZE";
