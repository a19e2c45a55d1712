use std::collections::HashMap;

use serde::{Deserialize, Serialize};


/// Observed continuations of one context.
///
/// A `State` corresponds to a fixed n-character context (`key`) and stores
/// how many times each next character followed it across the corpus.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during counting
/// - Report the total mass used for normalization
/// - Merge with another state having the same key (ex. chunked counting)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct State {
	/// The context (n characters).
	key: String,
	/// Outgoing transitions indexed by the next character.
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: HashMap<char, usize>
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: HashMap::new(),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}

	/// Records an occurrence of a transition toward `next_char`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next_char: char) {
		*self.transitions.entry(next_char).or_insert(0) += 1;
	}

	/// Occurrence count of `next_char` after this context (0 if never seen).
	pub fn count(&self, next_char: char) -> usize {
		self.transitions.get(&next_char).copied().unwrap_or(0)
	}

	/// Sum of all occurrence counts.
	///
	/// Always >= 1 for a state stored in a table.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Iterates over `(next_char, count)` pairs in storage order.
	pub fn transitions(&self) -> impl Iterator<Item = (char, usize)> + '_ {
		self.transitions.iter().map(|(c, n)| (*c, *n))
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same context (`key`).
	/// Transition occurrence counts are summed.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err(format!("Key mismatch: '{}' vs '{}'", self.key, other.key));
		}

		for (next_char, occurrence) in &other.transitions {
			*self.transitions.entry(*next_char).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}
