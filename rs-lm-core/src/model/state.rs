use std::collections::BTreeMap;

/// Next-token counts observed after one gram.
///
/// A `State` corresponds to a gram (1..=max_order tokens joined by spaces)
/// and stores every token seen right after it in the corpus, with the
/// number of times it was seen.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
/// - `total` is the sum of every transition count
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// The gram this state belongs to.
	key: String,
	/// Outgoing transitions indexed by the next token, in token order.
	/// Example: { "cat" => 2, "dog" => 1 }
	transitions: BTreeMap<String, u64>,
	/// Number of observations across all transitions.
	total: u64,
}

impl State {
	/// Creates a new empty state for the given gram.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: BTreeMap::new(),
			total: 0,
		}
	}

	/// Records one occurrence of `next_token` following this gram.
	pub fn add_transition(&mut self, next_token: &str) {
		match self.transitions.get_mut(next_token) {
			Some(occurrence) => *occurrence += 1,
			None => {
				self.transitions.insert(next_token.to_owned(), 1);
			}
		}
		self.total += 1;
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Sum of all transition counts.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Count for `token`, `0` if never observed here.
	pub fn count(&self, token: &str) -> u64 {
		self.transitions.get(token).copied().unwrap_or(0)
	}

	pub fn contains(&self, token: &str) -> bool {
		self.transitions.contains_key(token)
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Number of distinct next tokens.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	/// Iterates over `(next_token, count)` pairs in token order.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, u64)> {
		self.transitions.iter().map(|(token, count)| (token.as_str(), *count))
	}
}
