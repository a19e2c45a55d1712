use std::collections::BTreeMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::model::alphabet::{Alphabet, FoldTable, TextNormalizer};

/// Highest supported rounding precision (decimal digits).
pub const MAX_PRECISION: u32 = 12;

/// Most context lengths a single run may cover (`max_n - min_n + 1`).
pub const MAX_NGRAM_SIZES: usize = 64;

/// An accepted script: a built-in name or an explicit letter set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlphabetSpec {
	Builtin(String),
	Custom { name: String, letters: String },
}

impl AlphabetSpec {
	pub fn resolve(&self) -> std::result::Result<Alphabet, ConfigError> {
		match self {
			AlphabetSpec::Builtin(name) => Alphabet::builtin(name),
			AlphabetSpec::Custom { name, letters } => {
				Alphabet::new(name, letters.chars().filter(|c| !c.is_whitespace()))
			}
		}
	}
}

/// Settings of one analysis run.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration (Latin alphabet, n = 1, three digits).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
	#[serde(default = "default_alphabets")]
	pub alphabets: Vec<AlphabetSpec>,
	#[serde(default = "default_n")]
	pub min_n: usize,
	#[serde(default = "default_n")]
	pub max_n: usize,
	#[serde(default = "default_precision")]
	pub precision: u32,
	/// Defaults to `10 / 10^precision`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub margin_of_error: Option<f64>,
	/// Enables corpus statistics over each context's `top_k` continuations.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_k: Option<usize>,
	/// Variant -> canonical character, one character on each side.
	#[serde(default)]
	pub fold: BTreeMap<String, String>,
}

fn default_alphabets() -> Vec<AlphabetSpec> {
	vec![AlphabetSpec::Builtin("latin".to_string())]
}
fn default_n() -> usize {
	1
}
fn default_precision() -> u32 {
	3
}

impl Default for AnalysisConfig {
	fn default() -> Self {
		Self {
			alphabets: default_alphabets(),
			min_n: default_n(),
			max_n: default_n(),
			precision: default_precision(),
			margin_of_error: None,
			top_k: None,
			fold: BTreeMap::new(),
		}
	}
}

impl AnalysisConfig {
	/// Reads a TOML configuration file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let content = fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Checks every setting that would make a run meaningless.
	///
	/// # Errors
	/// - `InvalidN` if `min_n < 1`
	/// - `InvertedRange` if `max_n < min_n`
	/// - `RangeTooLarge` if the range covers more than `MAX_NGRAM_SIZES` lengths
	/// - `NoAlphabet`, `EmptyAlphabet`, `UnknownAlphabet` for alphabet issues
	/// - `InvalidFold` for malformed fold entries
	/// - `InvalidPrecision`, `InvalidMargin`, `InvalidTopK`
	pub fn validate(&self) -> std::result::Result<(), ConfigError> {
		if self.min_n < 1 {
			return Err(ConfigError::InvalidN(self.min_n));
		}
		if self.max_n < self.min_n {
			return Err(ConfigError::InvertedRange { min: self.min_n, max: self.max_n });
		}
		if self.max_n - self.min_n >= MAX_NGRAM_SIZES {
			return Err(ConfigError::RangeTooLarge { min: self.min_n, max: self.max_n, limit: MAX_NGRAM_SIZES });
		}
		if self.precision > MAX_PRECISION {
			return Err(ConfigError::InvalidPrecision { got: self.precision, max: MAX_PRECISION });
		}
		let margin = self.margin_of_error();
		if !margin.is_finite() || margin < 0.0 {
			return Err(ConfigError::InvalidMargin(margin));
		}
		if self.top_k == Some(0) {
			return Err(ConfigError::InvalidTopK);
		}
		self.normalizer().map(|_| ())
	}

	/// Effective margin of error.
	pub fn margin_of_error(&self) -> f64 {
		self.margin_of_error
			.unwrap_or_else(|| 10.0 / 10f64.powi(self.precision as i32))
	}

	pub fn ngram_range(&self) -> RangeInclusive<usize> {
		self.min_n..=self.max_n
	}

	pub fn fold_table(&self) -> std::result::Result<FoldTable, ConfigError> {
		FoldTable::from_pairs(self.fold.iter().map(|(k, v)| (k.as_str(), v.as_str())))
	}

	/// Builds the text normalizer described by `alphabets` and `fold`.
	pub fn normalizer(&self) -> std::result::Result<TextNormalizer, ConfigError> {
		let alphabets = self
			.alphabets
			.iter()
			.map(AlphabetSpec::resolve)
			.collect::<std::result::Result<Vec<_>, _>>()?;
		TextNormalizer::new(alphabets, self.fold_table()?)
	}
}
