use serde::Serialize;

use super::probability::{round_to_precision, ProbabilityTable};

/// A context whose probability mass lands outside the margin of error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Violation {
	pub context: String,
	pub observed_total: f64,
}

/// Sum of a distribution, re-rounded to `precision` digits.
pub fn rounded_total<I>(probabilities: I, precision: u32) -> f64
where
	I: IntoIterator<Item = f64>,
{
	round_to_precision(probabilities.into_iter().sum(), precision)
}

/// Whether a (rounded) total deviates from 1.0 by more than `margin`.
///
/// The deviation itself is measured at `precision` digits, so a total of
/// `0.999` against a margin of `0.001` is within bounds.
pub fn exceeds_margin(total: f64, margin: f64, precision: u32) -> bool {
	round_to_precision((total - 1.0).abs(), precision) > margin
}

/// Lists every context whose probabilities do not sum to 1 within `margin`.
///
/// Read-only diagnostic: low-count contexts can legitimately drift under
/// fixed-point rounding. Violations come back sorted by context.
pub fn verify(table: &ProbabilityTable, margin: f64) -> Vec<Violation> {
	let precision = table.precision();
	let mut violations: Vec<Violation> = table
		.contexts()
		.filter_map(|(context, distribution)| {
			let total = rounded_total(distribution.values().copied(), precision);
			exceeds_margin(total, margin, precision).then(|| Violation {
				context: context.to_owned(),
				observed_total: total,
			})
		})
		.collect();
	violations.sort_by(|a, b| a.context.cmp(&b.context));
	violations
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::transition_table::TransitionTable;

	fn probabilities(words: &[&str], n: usize, precision: u32) -> ProbabilityTable {
		ProbabilityTable::normalize(&TransitionTable::count(words, n).unwrap(), precision)
	}

	#[test]
	fn thirds_pass_with_margin_of_a_thousandth() {
		let table = probabilities(&["cat", "car", "can"], 1, 3);
		assert!(verify(&table, 0.001).is_empty());
		assert!(verify(&table, 0.01).is_empty());
	}

	#[test]
	fn thirds_fail_with_zero_margin() {
		let table = probabilities(&["cat", "car", "can"], 1, 3);
		let violations = verify(&table, 0.0);
		assert_eq!(violations, vec![Violation { context: "a".to_owned(), observed_total: 0.999 }]);
	}

	#[test]
	fn coarse_precision_drifts() {
		// Seven equally likely continuations at one digit: 7 * 0.1 = 0.7
		let table = probabilities(&["ab", "ac", "ad", "ae", "af", "ag", "ah"], 1, 1);
		let violations = verify(&table, 0.1);
		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].context, "a");
		assert_eq!(violations[0].observed_total, 0.7);
	}

	#[test]
	fn certain_context_never_violates() {
		let table = probabilities(&["aa"], 1, 3);
		assert!(verify(&table, 0.0).is_empty());
	}

	#[test]
	fn margin_boundary_is_inclusive() {
		assert!(!exceeds_margin(0.99, 0.01, 3));
		assert!(exceeds_margin(0.989, 0.01, 3));
		assert!(!exceeds_margin(1.01, 0.01, 3));
		assert!(exceeds_margin(1.011, 0.01, 3));
	}
}
