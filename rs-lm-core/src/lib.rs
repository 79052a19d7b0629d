//! Word-level n-gram language model.
//!
//! This crate provides:
//! - A tokenizer turning raw text into word and punctuation tokens, and back
//! - A multi-order n-gram table built from a corpus
//! - A smoothed, backoff, temperature-adjustable next-token distribution
//! - Sampling and generation with a step-by-step rationale
//! - Bounded memoization and training statistics
//!
//! The entry point is [`LanguageModel`]: `train` it on text, then `generate`.
//! Each model owns all its state; callers serialize access through `&mut`.

/// Model configuration, defaults and environment loading.
pub mod config;

/// Core n-gram model, estimation and generation logic.
pub mod model;

/// Text ⇄ token conversion.
pub mod tokenizer;

pub use config::{Config, ConfigError, ConfigOptions, SmoothingMethod};
pub use model::error::{GenerationError, TrainingError};
pub use model::estimator::Candidate;
pub use model::generator::GeneratedResult;
pub use model::language_model::{LanguageModel, ModelState};
pub use model::stats::Stats;
pub use model::temperature::Temperature;
pub use tokenizer::Tokenizer;
