use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, ConfigError, ConfigOptions};
use crate::tokenizer::Tokenizer;
use super::cache::{CacheKey, DistributionCache};
use super::error::{GenerationError, TrainingError};
use super::estimator::{Candidate, Estimator};
use super::ngram_table::NGramTable;
use super::stats::Stats;
use super::temperature::Temperature;

/// Lifecycle of a [`LanguageModel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelState {
	/// No successful training pass yet: every query is a cold start.
	Untrained,
	/// At least one training pass committed.
	Trained,
}

/// Word-level n-gram language model.
///
/// Single owner of everything derived from training: corpus, table (with
/// vocabulary), distribution cache and stats. All mutation goes through
/// `&mut self`, so a training pass can never run under an in-flight
/// generation on the same model.
///
/// The random source is injected (`R`), which makes exploration, cold-start
/// picks and sampling reproducible with [`LanguageModel::seeded`].
///
/// # Responsibilities
/// - Rebuild the table from scratch on every [`train`](Self::train)
/// - Serve memoized next-token distributions ([`next_tokens`](Self::next_tokens))
/// - Generate continuations with a step trace (see [`generate`](Self::generate))
/// - Report [`Stats`]
#[derive(Debug)]
pub struct LanguageModel<R: Rng = StdRng> {
	config: Config,
	tokenizer: Tokenizer,
	corpus: Vec<String>,
	table: NGramTable,
	cache: DistributionCache,
	stats: Stats,
	state: ModelState,
	pub(super) rng: R,
}

impl LanguageModel<StdRng> {
	/// Creates an untrained model with an OS-seeded random source.
	///
	/// # Errors
	/// Returns [`ConfigError`] if `config` does not validate.
	pub fn new(config: Config) -> Result<Self, ConfigError> {
		Self::with_rng(config, StdRng::from_os_rng())
	}

	/// Creates an untrained model whose random draws are fully determined by `seed`.
	pub fn seeded(config: Config, seed: u64) -> Result<Self, ConfigError> {
		Self::with_rng(config, StdRng::seed_from_u64(seed))
	}
}

impl Default for LanguageModel<StdRng> {
	fn default() -> Self {
		Self::untrained(Config::default(), StdRng::from_os_rng())
	}
}

impl<R: Rng> LanguageModel<R> {
	/// Creates an untrained model drawing randomness from `rng`.
	pub fn with_rng(config: Config, rng: R) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::untrained(config, rng))
	}

	/// `config` must already be valid.
	fn untrained(config: Config, rng: R) -> Self {
		Self {
			table: NGramTable::new(config.max_order()),
			cache: DistributionCache::new(config.cache_max_size),
			stats: Stats { ngram_size: config.ngram_size, max_order: config.max_order(), ..Stats::default() },
			config,
			tokenizer: Tokenizer::new(),
			corpus: Vec::new(),
			state: ModelState::Untrained,
			rng,
		}
	}

	/// Applies partial options on top of the current configuration.
	///
	/// The cache is resized and cleared. A new `ngram_size` only shapes the
	/// table at the next training pass.
	///
	/// # Errors
	/// Returns [`ConfigError::Invalid`] and leaves the configuration unchanged
	/// if the merged configuration does not validate.
	pub fn configure(&mut self, options: &ConfigOptions) -> Result<&Config, ConfigError> {
		let config = self.config.with_options(options)?;

		if config.max_order() != self.table.max_order() && self.state == ModelState::Trained {
			log::info!(
				"configure: max order {} applies from the next training pass (table built with {})",
				config.max_order(),
				self.table.max_order()
			);
		}

		if self.state == ModelState::Untrained {
			self.stats.ngram_size = config.ngram_size;
			self.stats.max_order = config.max_order();
		}

		self.cache.resize(config.cache_max_size);
		self.cache.clear();
		self.config = config;
		Ok(&self.config)
	}

	/// Trains the model on `text`, replacing everything learned before.
	///
	/// Tokenizes, builds a fresh n-gram table of order
	/// [`Config::max_order`], then commits corpus, table and stats together
	/// and clears the cache.
	pub fn train(&mut self, text: &str) -> Result<&Stats, TrainingError> {
		let corpus = self.tokenizer.tokenize(text);
		let table = NGramTable::build(&corpus, self.config.max_order());

		self.stats = Stats::compute(self.config.ngram_size, &table, corpus.len());
		self.cache.clear();
		self.table = table;
		self.corpus = corpus;
		self.state = ModelState::Trained;

		log::info!(
			"train: {} tokens, {} unique n-grams (max order {}), vocabulary {}",
			self.stats.total_tokens,
			self.stats.unique_ngrams,
			self.stats.max_order,
			self.stats.vocabulary_size
		);

		Ok(&self.stats)
	}

	/// Trains from raw bytes, which must be UTF-8 text.
	///
	/// # Errors
	/// Returns [`TrainingError::NotText`] without touching the model if
	/// `bytes` is not valid UTF-8.
	pub fn train_bytes(&mut self, bytes: &[u8]) -> Result<&Stats, TrainingError> {
		let text = std::str::from_utf8(bytes).map_err(TrainingError::NotText)?;
		self.train(text)
	}

	/// Ranked next-token candidates for `context` (space-separated tokens).
	///
	/// # Errors
	/// Returns [`GenerationError::InvalidConfig`] if `temperature` is not a finite value `> 0`.
	pub fn next_tokens(&mut self, context: &str, temperature: f64) -> Result<Vec<Candidate>, GenerationError> {
		let temperature = Temperature::new(temperature)?;
		Ok(self.distribution(context, temperature))
	}

	/// Memoized estimator query.
	pub(super) fn distribution(&mut self, context: &str, temperature: Temperature) -> Vec<Candidate> {
		let key = CacheKey::new(context, temperature);
		if let Some(candidates) = self.cache.get(&key) {
			log::trace!("cache: hit {context:?} @ {temperature}");
			return candidates.to_vec();
		}

		let candidates = Estimator::new(&self.table, &self.config).next_tokens(context, temperature, &mut self.rng);
		self.cache.put(key, candidates.clone());
		candidates
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn tokenizer(&self) -> &Tokenizer {
		&self.tokenizer
	}

	/// Counters of the most recent training pass.
	pub fn stats(&self) -> &Stats {
		&self.stats
	}

	pub fn state(&self) -> ModelState {
		self.state
	}

	/// Tokens of the most recent training text.
	pub fn corpus(&self) -> &[String] {
		&self.corpus
	}

	pub fn table(&self) -> &NGramTable {
		&self.table
	}

	/// Number of memoized distributions.
	pub fn cache_len(&self) -> usize {
		self.cache.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SEED: u64 = 42;
	const TEXT: &str = "the cat sat. the dog sat.";

	fn model() -> LanguageModel {
		LanguageModel::seeded(Config { ngram_size: 2, ..Config::default() }, SEED).unwrap()
	}

	#[test]
	fn starts_untrained() {
		let model = model();
		assert_eq!(model.state(), ModelState::Untrained);
		assert!(model.table().is_empty());
		assert_eq!(model.stats().total_tokens, 0);
		assert_eq!(model.stats().max_order, 3);
	}

	#[test]
	fn rejects_invalid_config() {
		let config = Config { alpha: 0.0, ..Config::default() };
		assert!(LanguageModel::seeded(config, SEED).is_err());
	}

	#[test]
	fn train_builds_table_and_stats() {
		let mut model = model();
		let stats = *model.train(TEXT).unwrap();

		assert_eq!(model.state(), ModelState::Trained);
		assert_eq!(stats.total_tokens, 8);
		assert_eq!(stats.vocabulary_size, 5);
		assert_eq!(stats.unique_ngrams, model.table().len());
		assert_eq!(stats.ngram_size, 2);
		assert_eq!(stats.max_order, 3);

		let the = model.table().get("the").unwrap();
		assert_eq!(the.transitions().collect::<Vec<_>>(), vec![("cat", 1), ("dog", 1)]);
	}

	#[test]
	fn retraining_replaces_everything() {
		let mut model = model();
		model.train(TEXT).unwrap();
		model.next_tokens("the", 1.0).unwrap();
		assert_eq!(model.cache_len(), 1);

		model.train("a bird flew.").unwrap();
		assert_eq!(model.cache_len(), 0);
		assert!(model.table().get("the").is_none());
		assert_eq!(model.corpus(), ["a", "bird", "flew", "."]);
		assert_eq!(model.stats().total_tokens, 4);
	}

	#[test]
	fn non_text_leaves_model_untouched() {
		let mut model = model();
		model.train(TEXT).unwrap();
		let before = *model.stats();

		let err = model.train_bytes(&[0x66, 0xff, 0xfe]).unwrap_err();
		assert!(matches!(err, TrainingError::NotText(_)));
		assert_eq!(*model.stats(), before);
		assert_eq!(model.corpus().len(), 8);

		model.train_bytes("the end.".as_bytes()).unwrap();
		assert_eq!(model.stats().total_tokens, 3);
	}

	#[test]
	fn repeated_query_is_served_from_cache() {
		let mut model = model();
		model.train(TEXT).unwrap();

		let first = model.next_tokens("the", 0.8).unwrap();
		let second = model.next_tokens("the", 0.8).unwrap();
		assert_eq!(first, second);
		assert_eq!(model.cache_len(), 1);

		model.next_tokens("the", 1.2).unwrap();
		assert_eq!(model.cache_len(), 2);
	}

	#[test]
	fn cache_is_bounded() {
		let mut model = model();
		model.configure(&ConfigOptions { cache_max_size: Some(2), ..Default::default() }).unwrap();
		model.train(TEXT).unwrap();

		for context in ["the", "cat", "sat", "dog"] {
			model.next_tokens(context, 1.0).unwrap();
		}
		assert_eq!(model.cache_len(), 2);
	}

	#[test]
	fn configure_validates_and_clears_cache() {
		let mut model = model();
		model.train(TEXT).unwrap();
		model.next_tokens("the", 1.0).unwrap();

		assert!(model.configure(&ConfigOptions { alpha: Some(-1.0), ..Default::default() }).is_err());
		assert_eq!(model.config().alpha, 0.1);
		assert_eq!(model.cache_len(), 1);

		let config = model.configure(&ConfigOptions { alpha: Some(0.5), ..Default::default() }).unwrap();
		assert_eq!(config.alpha, 0.5);
		assert_eq!(config.ngram_size, 2);
		assert_eq!(model.cache_len(), 0);
	}

	#[test]
	fn configure_before_training_updates_stats() {
		let mut model = model();
		model.configure(&ConfigOptions { ngram_size: Some(5), ..Default::default() }).unwrap();
		assert_eq!(model.stats().ngram_size, 5);
		assert_eq!(model.stats().max_order, 5);

		model.train(TEXT).unwrap();
		model.configure(&ConfigOptions { ngram_size: Some(2), ..Default::default() }).unwrap();
		assert_eq!(model.stats().ngram_size, 5);
		assert_eq!(model.stats().max_order, model.table().max_order());
	}

	#[test]
	fn invalid_temperature_is_rejected() {
		let mut model = model();
		model.train(TEXT).unwrap();
		for t in [0.0, -1.0, f64::NAN] {
			assert!(matches!(model.next_tokens("the", t), Err(GenerationError::InvalidConfig(_))));
		}
	}
}
