use serde::Serialize;

use super::ordering::OrderedTable;

/// Corpus-wide summary of a probability table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorpusStatistics {
	pub top_k: usize,
	/// Mean continuation probability, all continuations considered.
	pub average_probability: f64,
	/// Mean continuation probability over each context's `top_k` best.
	pub average_top_k_probability: f64,
	/// Mean probability mass held by each context's `top_k` best.
	pub average_top_k_sum: f64,
}

impl CorpusStatistics {
	pub fn compute(table: &OrderedTable<f64>, top_k: usize) -> Self {
		Self {
			top_k,
			average_probability: average_probability(table, None),
			average_top_k_probability: average_probability(table, Some(top_k)),
			average_top_k_sum: average_sum_probability(table, top_k),
		}
	}
}

/// Averages, across contexts, the mean probability of each context's
/// `top_k` most likely continuations (all of them when `top_k` is `None`).
///
/// Returns 0.0 for an empty table.
pub fn average_probability(table: &OrderedTable<f64>, top_k: Option<usize>) -> f64 {
	mean(table.rows().iter().map(|row| {
		let top = row.top(top_k);
		if top.is_empty() {
			0.0
		} else {
			top.iter().map(|(_, p)| p).sum::<f64>() / top.len() as f64
		}
	}))
}

/// Averages, across contexts, the summed probability of each context's
/// `top_k` most likely continuations.
///
/// Returns 0.0 for an empty table.
pub fn average_sum_probability(table: &OrderedTable<f64>, top_k: usize) -> f64 {
	mean(
		table
			.rows()
			.iter()
			.map(|row| row.top(Some(top_k)).iter().map(|(_, p)| p).sum::<f64>()),
	)
}

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
	let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
	if count == 0 { 0.0 } else { sum / count as f64 }
}
