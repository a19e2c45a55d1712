use super::ordering::OrderedTable;
use super::state::State;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Character transition counts for a fixed context length `n`.
///
/// The `TransitionTable` stores one state per observed context of exactly
/// `n` characters, recording which character followed it and how often.
///
/// # Responsibilities
/// - Build the table from a sequence of normalized words
/// - Accumulate transition counts for each context
/// - Merge with another table of the same `n`
///
/// # Invariants
/// - `n` is always >= 1
/// - Each state in `states` corresponds to a unique context of length `n`
/// - All state transitions have occurrence counts >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TransitionTable {
	/// Context length.
	n: usize, // must be >= 1

	/// Mapping from a context (length n) to its corresponding state
	states: HashMap<String, State>,
}

impl TransitionTable {
	/// Creates an empty table for contexts of length `n`.
	///
	/// # Errors
	/// Returns `ConfigError::InvalidN` if `n < 1`.
	pub fn new(n: usize) -> Result<Self, ConfigError> {
		if n < 1 {
			return Err(ConfigError::InvalidN(n));
		}
		Ok(Self { n, states: HashMap::new() })
	}

	/// Counts every `(context, next character)` pair in `words`.
	///
	/// For each word longer than `n`, slides a window of width `n` and
	/// records the character right after it. Words of length <= `n`
	/// contribute nothing.
	///
	/// # Errors
	/// Returns `ConfigError::InvalidN` if `n < 1`, before looking at any word.
	pub fn count<I, S>(words: I, n: usize) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut table = Self::new(n)?;
		for word in words {
			table.add_word(word.as_ref());
		}
		log::debug!("Counted {} contexts for n = {}", table.states.len(), n);
		Ok(table)
	}

	/// Adds the transitions of a single normalized word.
	pub fn add_word(&mut self, word: &str) {
		let chars: Vec<char> = word.chars().collect();
		if chars.len() <= self.n {
			return;
		}

		for i in 0..chars.len() - self.n {
			let context: String = chars[i..i + self.n].iter().collect();
			let next_char = chars[i + self.n];

			// Get or create the state for this context
			let state = self.states.entry(context).or_insert_with_key(|key| State::new(key));
			state.add_transition(next_char);
		}
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn get(&self, context: &str) -> Option<&State> {
		self.states.get(context)
	}

	/// Iterates over states in storage order (unspecified).
	pub fn states(&self) -> impl Iterator<Item = &State> {
		self.states.values()
	}

	/// Returns the deterministic view: contexts ascending, continuations by
	/// descending count.
	pub fn ordered(&self) -> OrderedTable<usize> {
		OrderedTable::from_rows(
			self.n,
			self.states.values().map(|state| (state.key().to_owned(), state.transitions().collect::<Vec<_>>())),
		)
	}

	/// Merges another table into this one.
	///
	/// # Notes
	/// - Both tables must have the same `n`.
	/// - Occurrence counts for matching contexts and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the context lengths do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.n != other.n {
			return Err(format!("N mismatch: {} vs {}", self.n, other.n));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}
}
