use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ordering::OrderedTable;
use super::transition_table::TransitionTable;

/// Rounds `value` to `precision` decimal digits, half away from zero.
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
	let scale = scale(precision);
	(value * scale).round() / scale
}

pub(crate) fn scale(precision: u32) -> f64 {
	10f64.powi(precision as i32)
}

/// Per-context probability distributions derived from a `TransitionTable`.
///
/// Same shape as the counts table; each count is replaced by
/// `count / total` rounded to `precision` digits.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProbabilityTable {
	n: usize,
	precision: u32,
	states: HashMap<String, HashMap<char, f64>>,
}

impl ProbabilityTable {
	/// Converts counts into rounded probabilities.
	///
	/// For every context, `p = round(10^precision * count / total) / 10^precision`
	/// with round-half-away-from-zero. The input table is left untouched.
	pub fn normalize(table: &TransitionTable, precision: u32) -> Self {
		let scale = scale(precision);
		let states = table
			.states()
			.map(|state| {
				let total = state.total();
				assert!(total > 0, "context '{}' has no transitions", state.key());

				let probabilities: HashMap<char, f64> = state
					.transitions()
					.map(|(next_char, count)| {
						let probability = (scale * count as f64 / total as f64).round() / scale;
						(next_char, probability)
					})
					.collect();
				(state.key().to_owned(), probabilities)
			})
			.collect();

		Self { n: table.n(), precision, states }
	}

	pub fn n(&self) -> usize {
		self.n
	}

	pub fn precision(&self) -> u32 {
		self.precision
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn get(&self, context: &str) -> Option<&HashMap<char, f64>> {
		self.states.get(context)
	}

	pub fn probability(&self, context: &str, next_char: char) -> Option<f64> {
		self.states.get(context)?.get(&next_char).copied()
	}

	/// Iterates over `(context, distribution)` in storage order (unspecified).
	pub fn contexts(&self) -> impl Iterator<Item = (&str, &HashMap<char, f64>)> {
		self.states.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Returns the deterministic view: contexts ascending, continuations by
	/// descending probability.
	pub fn ordered(&self) -> OrderedTable<f64> {
		OrderedTable::from_rows(
			self.n,
			self.states
				.iter()
				.map(|(context, dist)| (context.clone(), dist.iter().map(|(c, p)| (*c, *p)).collect::<Vec<_>>())),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cat_car_can_probabilities() {
		let counts = TransitionTable::count(["cat", "car", "can"], 1).unwrap();
		let probabilities = ProbabilityTable::normalize(&counts, 3);

		assert_eq!(probabilities.probability("c", 'a'), Some(1.0));
		for c in ['t', 'r', 'n'] {
			assert_eq!(probabilities.probability("a", c), Some(0.333));
		}
		// Input is not consumed or modified
		assert_eq!(counts.get("a").unwrap().total(), 3);
	}

	#[test]
	fn single_transition_is_certain() {
		let counts = TransitionTable::count(["aa"], 1).unwrap();
		let probabilities = ProbabilityTable::normalize(&counts, 3);
		assert_eq!(probabilities.probability("a", 'a'), Some(1.0));
		assert_eq!(probabilities.len(), 1);
	}

	#[test]
	fn rounding_is_half_away_from_zero() {
		// 1/8 = 0.125 -> 0.13 at two digits
		let counts = TransitionTable::count(["ab", "ac", "ac", "ac", "ac", "ac", "ac", "ac"], 1).unwrap();
		let probabilities = ProbabilityTable::normalize(&counts, 2);
		assert_eq!(probabilities.probability("a", 'b'), Some(0.13));
		assert_eq!(probabilities.probability("a", 'c'), Some(0.88));

		assert_eq!(round_to_precision(0.0005, 3), 0.001);
		assert_eq!(round_to_precision(2.5, 0), 3.0);
	}

	#[test]
	fn ordered_view_ranks_by_probability() {
		let counts = TransitionTable::count(["ab", "ac", "ac"], 1).unwrap();
		let ordered = ProbabilityTable::normalize(&counts, 3).ordered();
		assert_eq!(ordered.get("a").unwrap().transitions, vec![('c', 0.667), ('b', 0.333)]);
	}
}
