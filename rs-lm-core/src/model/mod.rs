//! Top-level module for the n-gram language model.
//!
//! This module provides:
//! - A flat multi-order n-gram count table (`NGramTable`, `State`)
//! - A smoothed, backoff, temperature-adjusted next-token estimator (`Estimator`)
//! - Cumulative-distribution sampling (`sampler`)
//! - A bounded LRU memo of estimator results (`DistributionCache`)
//! - The single-owner model tying everything together (`LanguageModel`)
//! - Token-by-token generation with a step trace (`generator`)

/// Bounded least-recently-used memo of next-token distributions.
pub mod cache;

/// Training and generation errors.
pub mod error;

/// Backoff search, additive smoothing, exploration and top-K ranking.
pub mod estimator;

/// Generation loop and its result type.
pub mod generator;

/// The model object: configuration, training, memoized queries, stats.
pub mod language_model;

/// Flat n-gram table builder.
pub mod ngram_table;

/// Draws one candidate from a ranked distribution.
pub mod sampler;

/// Continuation counts of a single gram.
pub mod state;

/// Counters derived from the last training pass.
pub mod stats;

/// Validated sampling temperature.
pub mod temperature;
