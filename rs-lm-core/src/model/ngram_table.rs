use std::collections::{BTreeSet, HashMap};

use super::state::State;

/// Flat multi-order n-gram count table.
///
/// Every gram of order `1..=max_order` lives in the same map, keyed by its
/// tokens joined with a single space; the key's token count is its order.
///
/// # Responsibilities
/// - Build counts by sliding windows of every order over a corpus
/// - Track the vocabulary (tokens observed as a *next* token)
/// - Look up the continuation counts of a gram
///
/// # Invariants
/// - `max_order` is always >= 1
/// - Every state is non-empty and every count is >= 1
/// - Every token appearing in a state is in `vocabulary`
#[derive(Clone, Debug)]
pub struct NGramTable {
	/// Highest gram order stored.
	max_order: usize,

	/// Gram → next-token counts.
	states: HashMap<String, State>,

	/// Distinct tokens seen as a continuation, in token order.
	vocabulary: BTreeSet<String>,
}

impl NGramTable {
	/// Creates an empty table of order `max_order` (clamped to at least 1).
	pub fn new(max_order: usize) -> Self {
		Self {
			max_order: max_order.max(1),
			states: HashMap::new(),
			vocabulary: BTreeSet::new(),
		}
	}

	/// Builds a table from a tokenized corpus.
	///
	/// For each start position `i` and window length `j` in `1..=max_order`,
	/// the gram `tokens[i..i + j]` gains one observation of `tokens[i + j]`
	/// when that token exists.
	///
	/// # Notes
	/// - O(corpus length × max_order).
	/// - The first token of the corpus only enters the vocabulary if it
	///   also appears later as a continuation.
	pub fn build<S: AsRef<str>>(tokens: &[S], max_order: usize) -> Self {
		let mut table = Self::new(max_order);

		for i in 0..tokens.len() {
			for j in 1..=table.max_order {
				let Some(next_token) = tokens.get(i + j) else {
					break;
				};
				let gram = tokens[i..i + j].iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
				table.add_transition(gram, next_token.as_ref());
			}
		}

		table
	}

	/// Records one observation of `next_token` after `gram`.
	fn add_transition(&mut self, gram: String, next_token: &str) {
		let state = self.states.entry(gram).or_insert_with_key(|key| State::new(key));
		state.add_transition(next_token);

		if !self.vocabulary.contains(next_token) {
			self.vocabulary.insert(next_token.to_owned());
		}
	}

	/// Continuation counts of `gram`, `None` if it was never followed by a token.
	pub fn get(&self, gram: &str) -> Option<&State> {
		self.states.get(gram)
	}

	pub fn max_order(&self) -> usize {
		self.max_order
	}

	/// Number of distinct grams (all orders).
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn vocabulary(&self) -> &BTreeSet<String> {
		&self.vocabulary
	}

	/// Iterates over every stored state.
	pub fn states(&self) -> impl Iterator<Item = &State> {
		self.states.values()
	}
}
