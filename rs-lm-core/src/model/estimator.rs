use std::cmp::Ordering;

use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use crate::config::{Config, SmoothingMethod};
use super::ngram_table::NGramTable;
use super::state::State;
use super::temperature::Temperature;

/// Maximum number of candidates returned for one context.
pub const TOP_K: usize = 10;

/// A possible next token and its probability.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Candidate {
	pub token: String,
	pub probability: f64,
}

/// Next-token distribution estimator.
///
/// Borrows a built table and the configuration; holds no state of its own.
///
/// # Algorithm
/// 1. Backoff: the longest suffix (at most `max_order` tokens) of the context
///    with recorded continuations is used. None at all → uniform cold start.
/// 2. Smoothing: `(count + alpha) / (total + alpha * |V|)`.
/// 3. Exploration: a few random vocabulary tokens absent from the counts are
///    added with the unseen-token probability `alpha / (total + alpha * |V|)`.
/// 4. Temperature: `p^(1/T)`, then normalization.
/// 5. The best `TOP_K` are kept, by descending probability.
pub struct Estimator<'a> {
	table: &'a NGramTable,
	config: &'a Config,
}

impl<'a> Estimator<'a> {
	pub fn new(table: &'a NGramTable, config: &'a Config) -> Self {
		Self { table, config }
	}

	/// Computes the ranked next-token candidates for `context`.
	///
	/// `context` is a space-separated token window. The result is empty only
	/// when the vocabulary is empty.
	pub fn next_tokens<R: Rng + ?Sized>(
		&self,
		context: &str,
		temperature: Temperature,
		rng: &mut R,
	) -> Vec<Candidate> {
		let Some(state) = self.backoff(context) else {
			log::debug!("estimator: no continuation for {context:?}, cold start");
			return self.uniform(rng);
		};

		let vocabulary_size = self.table.vocabulary().len() as f64;
		let (mut tokens, mut probabilities, unseen) = match self.config.smoothing_method {
			SmoothingMethod::Laplace => self.additive(state, vocabulary_size),
		};

		let explore = (TOP_K / 4).max(2);
		for token in self.table.vocabulary().iter().choose_multiple(rng, explore) {
			if !state.contains(token) {
				tokens.push(token.as_str());
				probabilities.push(unseen);
			}
		}

		temperature.apply(&mut probabilities);

		let mut candidates: Vec<Candidate> = tokens
			.into_iter()
			.zip(probabilities)
			.map(|(token, probability)| Candidate { token: token.to_owned(), probability })
			.collect();
		candidates.sort_by(|a, b| {
			b.probability
				.partial_cmp(&a.probability)
				.unwrap_or(Ordering::Equal)
				.then_with(|| a.token.cmp(&b.token))
		});
		candidates.truncate(TOP_K);
		candidates
	}

	/// Finds the longest suffix of `context`, at most `max_order` tokens, with continuations.
	pub fn backoff(&self, context: &str) -> Option<&'a State> {
		let tokens: Vec<&str> = context.split_whitespace().collect();
		let start = tokens.len().saturating_sub(self.table.max_order());
		let window = &tokens[start..];

		(0..window.len()).find_map(|skip| {
			self.table
				.get(&window[skip..].join(" "))
				.filter(|state| !state.is_empty())
		})
	}

	/// Additive smoothing over the observed continuations of `state`.
	///
	/// Returns the observed tokens, their smoothed probabilities, and the
	/// probability an unseen token would receive.
	fn additive(&self, state: &'a State, vocabulary_size: f64) -> (Vec<&'a str>, Vec<f64>, f64) {
		let alpha = self.config.alpha;
		let denominator = state.total() as f64 + alpha * vocabulary_size;

		let (tokens, probabilities) = state
			.transitions()
			.map(|(token, count)| (token, (count as f64 + alpha) / denominator))
			.unzip();

		(tokens, probabilities, alpha / denominator)
	}

	/// Up to `TOP_K` random vocabulary tokens, equally likely.
	///
	/// Each gets `1/n` over the `n` returned tokens, which is `1/|V|` only
	/// while the vocabulary fits in `TOP_K`.
	fn uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Candidate> {
		let mut picked = self.table.vocabulary().iter().choose_multiple(rng, TOP_K);
		picked.shuffle(rng);

		let probability = 1.0 / picked.len() as f64;
		picked
			.into_iter()
			.map(|token| Candidate { token: token.clone(), probability })
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	const SEED: u64 = 42;

	fn table(text: &str, max_order: usize) -> NGramTable {
		let tokens: Vec<&str> = text.split_whitespace().collect();
		NGramTable::build(&tokens, max_order)
	}

	fn sum(candidates: &[Candidate]) -> f64 {
		candidates.iter().map(|c| c.probability).sum()
	}

	#[test]
	fn probabilities_sum_to_one() {
		let table = table("the cat sat on the mat . the dog sat on the log . a cat ran .", 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);
		let mut rng = StdRng::seed_from_u64(SEED);

		for context in ["the", "sat on the", "unknown words here", "", "cat"] {
			for t in [0.1, 0.7, 1.0, 1.5, 10.0] {
				let candidates = estimator.next_tokens(context, Temperature::new(t).unwrap(), &mut rng);
				assert!(!candidates.is_empty());
				assert!(candidates.len() <= TOP_K);
				assert!((sum(&candidates) - 1.0).abs() < 1e-9, "{context:?} t={t}");
				assert!(candidates.windows(2).all(|w| w[0].probability >= w[1].probability));
			}
		}
	}

	#[test]
	fn smoothing_matches_formula() {
		// Vocabulary: {cat, sat, ., the, dog}.
		let table = table("the cat sat . the dog sat . the cat", 3);
		assert_eq!(table.vocabulary().len(), 5);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);

		let state = estimator.backoff("the").unwrap();
		let (tokens, probabilities, unseen) = estimator.additive(state, 5.0);
		assert_eq!(tokens, vec!["cat", "dog"]);
		// total = 3, denominator = 3 + 0.1 * 5 = 3.5
		assert!((probabilities[0] - 2.1 / 3.5).abs() < 1e-12);
		assert!((probabilities[1] - 1.1 / 3.5).abs() < 1e-12);
		assert!((unseen - 0.1 / 3.5).abs() < 1e-12);
	}

	#[test]
	fn backs_off_to_seen_suffix() {
		let table = table("the cat sat . a dog ran .", 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);

		let state = estimator.backoff("zebra yak cat").unwrap();
		assert_eq!(state.key(), "cat");
		let state = estimator.backoff("zebra the cat").unwrap();
		assert_eq!(state.key(), "the cat");
		// Longer than max_order: only the last three tokens matter.
		let state = estimator.backoff("ran . the cat sat").unwrap();
		assert_eq!(state.key(), "the cat sat");
		assert!(estimator.backoff("zebra").is_none());
		assert!(estimator.backoff("").is_none());
	}

	#[test]
	fn backoff_distribution_equals_suffix_distribution() {
		let table = table("the cat sat . the cat ran . the dog sat .", 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);

		let unseen_context = estimator.next_tokens(
			"zebra zebra cat",
			Temperature::NEUTRAL,
			&mut StdRng::seed_from_u64(SEED),
		);
		let suffix = estimator.next_tokens("cat", Temperature::NEUTRAL, &mut StdRng::seed_from_u64(SEED));
		assert_eq!(unseen_context, suffix);
		assert_eq!(suffix[0].token, "ran");
		assert_eq!(suffix[1].token, "sat");
	}

	#[test]
	fn exploration_adds_unseen_tokens_at_smoothed_mass() {
		let table = table("a b c d e f g h i j k l m n o p a b", 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);
		let mut rng = StdRng::seed_from_u64(SEED);

		let candidates = estimator.next_tokens("a", Temperature::NEUTRAL, &mut rng);
		// "a" is always followed by "b"; two exploration tokens are drawn.
		assert!(candidates.len() >= 2 && candidates.len() <= 3);
		assert_eq!(candidates[0].token, "b");

		// Observed and unseen masses keep their smoothed ratio.
		let ratio = (2.0 + 0.1) / 0.1;
		for extra in &candidates[1..] {
			assert!((candidates[0].probability / extra.probability - ratio).abs() < 1e-9);
		}
	}

	#[test]
	fn cold_start_is_uniform() {
		let table = table("one two three four five", 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);

		let candidates = estimator.next_tokens("zebra", Temperature::NEUTRAL, &mut StdRng::seed_from_u64(SEED));
		assert_eq!(candidates.len(), 4);
		for candidate in &candidates {
			assert!((candidate.probability - 0.25).abs() < 1e-12);
		}
	}

	#[test]
	fn cold_start_caps_at_top_k() {
		let text = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
		let table = table(&text, 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);

		let candidates = estimator.next_tokens("", Temperature::NEUTRAL, &mut StdRng::seed_from_u64(SEED));
		assert_eq!(candidates.len(), TOP_K);
		assert!((sum(&candidates) - 1.0).abs() < 1e-9);
	}

	#[test]
	fn empty_vocabulary_gives_nothing() {
		let table = NGramTable::new(3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);
		assert!(estimator.next_tokens("the", Temperature::NEUTRAL, &mut StdRng::seed_from_u64(SEED)).is_empty());
	}

	#[test]
	fn same_seed_same_result() {
		let table = table("the cat sat . the dog sat . the bird flew .", 3);
		let config = Config::default();
		let estimator = Estimator::new(&table, &config);
		let t = Temperature::new(1.3).unwrap();

		let first = estimator.next_tokens("the", t, &mut StdRng::seed_from_u64(7));
		let second = estimator.next_tokens("the", t, &mut StdRng::seed_from_u64(7));
		assert_eq!(first, second);
	}
}
