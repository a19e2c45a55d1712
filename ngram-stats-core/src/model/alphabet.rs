use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::error::ConfigError;

/// A named, immutable set of characters accepted for one script.
///
/// A word is counted only if every one of its characters (after folding)
/// belongs to a single alphabet.
///
/// # Invariants
/// - `letters` is never empty
#[derive(Clone, Debug, PartialEq)]
pub struct Alphabet {
	name: String,
	letters: BTreeSet<char>,
}

impl Alphabet {
	/// Creates an alphabet from an explicit set of letters.
	///
	/// # Errors
	/// Returns `ConfigError::EmptyAlphabet` if `letters` yields nothing.
	pub fn new<I>(name: &str, letters: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = char>,
	{
		let letters: BTreeSet<char> = letters.into_iter().collect();
		if letters.is_empty() {
			return Err(ConfigError::EmptyAlphabet(name.to_owned()));
		}
		Ok(Self { name: name.to_owned(), letters })
	}

	/// Lowercase Latin letters `a` to `z`.
	pub fn latin() -> Self {
		Self { name: "latin".to_owned(), letters: ('a'..='z').collect() }
	}

	/// Lowercase Russian Cyrillic letters `а` to `я`.
	///
	/// `ё` is not part of the set; pair it with `FoldTable::cyrillic()`
	/// to fold it onto `е` instead of rejecting the word.
	pub fn cyrillic() -> Self {
		Self { name: "cyrillic".to_owned(), letters: ('а'..='я').collect() }
	}

	/// Resolves a built-in alphabet by name (`latin`, `cyrillic`).
	pub fn builtin(name: &str) -> Result<Self, ConfigError> {
		match name.to_lowercase().as_str() {
			"latin" => Ok(Self::latin()),
			"cyrillic" => Ok(Self::cyrillic()),
			_ => Err(ConfigError::UnknownAlphabet(name.to_owned())),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn contains(&self, c: char) -> bool {
		self.letters.contains(&c)
	}
}

/// Variant character to canonical character mapping, applied before
/// alphabet validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoldTable {
	folds: HashMap<char, char>,
}

impl FoldTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// The usual Russian fold: `ё` -> `е`.
	pub fn cyrillic() -> Self {
		let mut table = Self::new();
		table.insert('ё', 'е');
		table
	}

	/// Builds a table from textual pairs, as found in a config file.
	///
	/// # Errors
	/// Returns `ConfigError::InvalidFold` if either side of a pair is not
	/// exactly one character.
	pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let mut table = Self::new();
		for (from, to) in pairs {
			match (single_char(from), single_char(to)) {
				(Some(f), Some(t)) => table.insert(f, t),
				_ => {
					return Err(ConfigError::InvalidFold { from: from.to_owned(), to: to.to_owned() });
				}
			}
		}
		Ok(table)
	}

	pub fn insert(&mut self, from: char, to: char) {
		self.folds.insert(from, to);
	}

	/// Returns the canonical form of `c` (or `c` itself when unmapped).
	pub fn fold(&self, c: char) -> char {
		self.folds.get(&c).copied().unwrap_or(c)
	}
}

fn single_char(s: &str) -> Option<char> {
	let mut chars = s.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Some(c),
		_ => None,
	}
}

/// Why a line was excluded from the corpus.
///
/// This is corpus filtering, not a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
	/// Nothing left after trimming.
	Empty,
	/// A character that no configured alphabet contains.
	UnknownCharacter(char),
	/// Every character is known, but no single alphabet covers them all.
	MixedAlphabets,
}

/// A word accepted by the normalizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedWord {
	pub word: String,
	/// Index of the alphabet that covers the whole word.
	pub alphabet: usize,
}

/// Rejection tallies kept for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
	pub empty: usize,
	pub unknown_character: usize,
	pub mixed_alphabets: usize,
}

impl RejectionCounts {
	pub fn total(&self) -> usize {
		self.empty + self.unknown_character + self.mixed_alphabets
	}

	fn record(&mut self, rejection: Rejection) {
		match rejection {
			Rejection::Empty => self.empty += 1,
			Rejection::UnknownCharacter(_) => self.unknown_character += 1,
			Rejection::MixedAlphabets => self.mixed_alphabets += 1,
		}
	}
}

/// The cleaned word sequence handed to the counter, plus what was
/// filtered out on the way.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Corpus {
	#[serde(skip)]
	pub words: Vec<String>,
	pub accepted: usize,
	pub rejected: RejectionCounts,
	/// Accepted words per alphabet name.
	pub per_alphabet: BTreeMap<String, usize>,
}

/// Lowercases, trims, folds and validates raw lines.
#[derive(Clone, Debug)]
pub struct TextNormalizer {
	alphabets: Vec<Alphabet>,
	fold: FoldTable,
}

impl TextNormalizer {
	/// # Errors
	/// Returns `ConfigError::NoAlphabet` if `alphabets` is empty.
	pub fn new(alphabets: Vec<Alphabet>, fold: FoldTable) -> Result<Self, ConfigError> {
		if alphabets.is_empty() {
			return Err(ConfigError::NoAlphabet);
		}
		Ok(Self { alphabets, fold })
	}

	pub fn alphabets(&self) -> &[Alphabet] {
		&self.alphabets
	}

	/// Normalizes a single line.
	///
	/// Lowercase, trim, then fold each character. The result is accepted
	/// only if one alphabet contains every character.
	pub fn normalize(&self, line: &str) -> Result<NormalizedWord, Rejection> {
		let lowered = line.to_lowercase();
		let word: String = lowered.trim().chars().map(|c| self.fold.fold(c)).collect();
		if word.is_empty() {
			return Err(Rejection::Empty);
		}

		if let Some(alphabet) = self
			.alphabets
			.iter()
			.position(|alphabet| word.chars().all(|c| alphabet.contains(c)))
		{
			return Ok(NormalizedWord { word, alphabet });
		}

		match word.chars().find(|&c| !self.alphabets.iter().any(|a| a.contains(c))) {
			Some(c) => Err(Rejection::UnknownCharacter(c)),
			None => Err(Rejection::MixedAlphabets),
		}
	}

	/// Normalizes every line, keeping accepted words in input order.
	pub fn corpus<I, S>(&self, lines: I) -> Corpus
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut corpus = Corpus::default();
		for alphabet in &self.alphabets {
			corpus.per_alphabet.entry(alphabet.name().to_owned()).or_insert(0);
		}

		for line in lines {
			match self.normalize(line.as_ref()) {
				Ok(normalized) => {
					let name = self.alphabets[normalized.alphabet].name();
					*corpus.per_alphabet.entry(name.to_owned()).or_insert(0) += 1;
					corpus.accepted += 1;
					corpus.words.push(normalized.word);
				}
				Err(rejection) => corpus.rejected.record(rejection),
			}
		}

		log::debug!(
			"Normalized corpus: {} accepted, {} rejected",
			corpus.accepted,
			corpus.rejected.total()
		);
		corpus
	}
}
