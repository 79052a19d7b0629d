use std::collections::{BTreeMap, HashMap};

use super::estimator::Candidate;
use super::temperature::Temperature;

/// Key of a memoized distribution: the exact context and temperature asked for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
	pub context: String,
	pub temperature: Temperature,
}

impl CacheKey {
	pub fn new(context: &str, temperature: Temperature) -> Self {
		Self { context: context.to_owned(), temperature }
	}
}

/// Least-recently-used cache of estimator results.
///
/// Each entry remembers the tick of its last use; `recency` orders keys by
/// that tick so the oldest one is evicted first once `capacity` is reached.
///
/// # Invariants
/// - `entries.len() == recency.len() <= capacity`
/// - `capacity >= 1`
#[derive(Debug)]
pub struct DistributionCache {
	capacity: usize,
	entries: HashMap<CacheKey, (Vec<Candidate>, u64)>,
	recency: BTreeMap<u64, CacheKey>,
	tick: u64,
}

impl DistributionCache {
	/// Creates an empty cache holding at most `capacity` entries (at least 1).
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity: capacity.max(1),
			entries: HashMap::new(),
			recency: BTreeMap::new(),
			tick: 0,
		}
	}

	/// Returns the cached candidates for `key`, marking them as most recently used.
	pub fn get(&mut self, key: &CacheKey) -> Option<&[Candidate]> {
		let tick = self.next_tick();
		let (candidates, last_used) = self.entries.get_mut(key)?;

		if let Some(owned_key) = self.recency.remove(last_used) {
			self.recency.insert(tick, owned_key);
		}
		*last_used = tick;

		Some(candidates.as_slice())
	}

	/// Stores `candidates` under `key`, evicting the least recently used entry if full.
	pub fn put(&mut self, key: CacheKey, candidates: Vec<Candidate>) {
		let tick = self.next_tick();

		if let Some((_, last_used)) = self.entries.remove(&key) {
			self.recency.remove(&last_used);
		} else if self.entries.len() >= self.capacity {
			self.evict_lru();
		}

		self.recency.insert(tick, key.clone());
		self.entries.insert(key, (candidates, tick));
	}

	/// Changes the capacity, evicting the oldest entries that no longer fit.
	pub fn resize(&mut self, capacity: usize) {
		self.capacity = capacity.max(1);
		while self.entries.len() > self.capacity {
			self.evict_lru();
		}
	}

	pub fn clear(&mut self) {
		self.entries.clear();
		self.recency.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn contains(&self, key: &CacheKey) -> bool {
		self.entries.contains_key(key)
	}

	fn next_tick(&mut self) -> u64 {
		self.tick += 1;
		self.tick
	}

	fn evict_lru(&mut self) {
		if let Some((_, key)) = self.recency.pop_first() {
			log::debug!("cache: evicting {:?} @ {}", key.context, key.temperature);
			self.entries.remove(&key);
		}
	}
}
