use rand::Rng;

use super::estimator::Candidate;

/// Picks one candidate by walking the cumulative distribution.
///
/// Draws `r` in `[0, 1)` and returns the first candidate whose cumulative
/// probability reaches `r`. If rounding leaves the walk short of `r`, the
/// last candidate is returned. `None` only for an empty slice.
pub fn select<'a, R: Rng + ?Sized>(candidates: &'a [Candidate], rng: &mut R) -> Option<&'a Candidate> {
	let r: f64 = rng.random();

	let mut cumulative = 0.0;
	for candidate in candidates {
		cumulative += candidate.probability;
		if cumulative >= r {
			return Some(candidate);
		}
	}

	// Rounding left the total just under r.
	candidates.last()
}
