use std::cmp::Ordering;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A value stored in a table cell (a count or a probability).
///
/// Provides the total order used to rank continuations.
pub trait Weight: Copy {
	fn cmp_weight(&self, other: &Self) -> Ordering;
}

impl Weight for usize {
	fn cmp_weight(&self, other: &Self) -> Ordering {
		self.cmp(other)
	}
}

impl Weight for f64 {
	fn cmp_weight(&self, other: &Self) -> Ordering {
		self.total_cmp(other)
	}
}

/// One context and its continuations, most likely first.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedRow<V> {
	pub context: String,
	pub transitions: Vec<(char, V)>,
}

impl<V: Weight> OrderedRow<V> {
	/// The `k` highest-ranked continuations (all of them if `k` is `None`).
	pub fn top(&self, k: Option<usize>) -> &[(char, V)] {
		match k {
			Some(k) => &self.transitions[..k.min(self.transitions.len())],
			None => &self.transitions,
		}
	}
}

/// Presentation view of a transition or probability table.
///
/// Rows are sorted by ascending context; inside a row, continuations are
/// sorted by descending value, ties broken by ascending character.
/// Building it never changes a value, and re-ordering an `OrderedTable`
/// gives back an equal table.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderedTable<V> {
	n: usize,
	rows: Vec<OrderedRow<V>>,
}

impl<V: Weight> OrderedTable<V> {
	/// Sorts raw `(context, transitions)` pairs into an ordered table.
	pub fn from_rows<I>(n: usize, rows: I) -> Self
	where
		I: IntoIterator<Item = (String, Vec<(char, V)>)>,
	{
		let mut rows: Vec<OrderedRow<V>> = rows
			.into_iter()
			.map(|(context, mut transitions)| {
				sort_transitions(&mut transitions);
				OrderedRow { context, transitions }
			})
			.collect();
		rows.sort_by(|a, b| a.context.cmp(&b.context));
		Self { n, rows }
	}

	/// Applies the ordering pass again. Idempotent.
	pub fn ordered(&self) -> Self {
		Self::from_rows(self.n, self.rows.iter().map(|row| (row.context.clone(), row.transitions.clone())))
	}

	pub fn n(&self) -> usize {
		self.n
	}

	pub fn rows(&self) -> &[OrderedRow<V>] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Looks a context up (binary search over the sorted rows).
	pub fn get(&self, context: &str) -> Option<&OrderedRow<V>> {
		self.rows
			.binary_search_by(|row| row.context.as_str().cmp(context))
			.ok()
			.map(|i| &self.rows[i])
	}
}

fn sort_transitions<V: Weight>(transitions: &mut [(char, V)]) {
	transitions.sort_by(|a, b| b.1.cmp_weight(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Serializes as a two-level object `{ context: { char: value } }`,
/// keeping row and continuation order.
impl<V: Serialize> Serialize for OrderedTable<V> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.rows.len()))?;
		for row in &self.rows {
			map.serialize_entry(&row.context, &Continuations(&row.transitions))?;
		}
		map.end()
	}
}

struct Continuations<'a, V>(&'a [(char, V)]);

impl<V: Serialize> Serialize for Continuations<'_, V> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for (next_char, value) in self.0 {
			map.serialize_entry(next_char, value)?;
		}
		map.end()
	}
}
