use std::fmt;

use serde::{Deserialize, Serialize};

use super::ngram_table::NGramTable;

/// Counters describing the most recent training pass.
///
/// Recomputed in full by every training pass. Before the first pass only
/// `ngram_size` and `max_order` are set, following the configuration.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
	/// Configured n-gram size at training time, or the current one while untrained.
	pub ngram_size: usize,
	/// Order the table was built with.
	pub max_order: usize,
	/// Distinct grams, all orders together.
	pub unique_ngrams: usize,
	/// Distinct continuation tokens.
	pub vocabulary_size: usize,
	/// Tokens in the corpus.
	pub total_tokens: usize,
}

impl Stats {
	pub fn compute(ngram_size: usize, table: &NGramTable, total_tokens: usize) -> Self {
		Self {
			ngram_size,
			max_order: table.max_order(),
			unique_ngrams: table.len(),
			vocabulary_size: table.vocabulary().len(),
			total_tokens,
		}
	}
}

impl fmt::Display for Stats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "N-gram size:     {} (max order {})", self.ngram_size, self.max_order)?;
		writeln!(f, "Unique n-grams:  {}", self.unique_ngrams)?;
		writeln!(f, "Vocabulary size: {}", self.vocabulary_size)?;
		write!(f, "Total tokens:    {}", self.total_tokens)
	}
}
