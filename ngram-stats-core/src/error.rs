use thiserror::Error;

/// Invalid analysis settings.
///
/// Raised before any word is counted. A run never starts with a
/// configuration that produced one of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
	#[error("n must be >= 1, got {0}")]
	InvalidN(usize),

	#[error("n range is inverted: min_n = {min}, max_n = {max}")]
	InvertedRange { min: usize, max: usize },

	#[error("n range {min}..={max} spans more than {limit} context lengths")]
	RangeTooLarge { min: usize, max: usize, limit: usize },

	#[error("at least one alphabet must be configured")]
	NoAlphabet,

	#[error("alphabet '{0}' has no letters")]
	EmptyAlphabet(String),

	#[error("unknown built-in alphabet '{0}' (expected 'latin' or 'cyrillic')")]
	UnknownAlphabet(String),

	#[error("fold entry '{from}' -> '{to}' must map one character to one character")]
	InvalidFold { from: String, to: String },

	#[error("precision must be between 0 and {max}, got {got}")]
	InvalidPrecision { got: u32, max: u32 },

	#[error("margin of error must be a finite value >= 0, got {0}")]
	InvalidMargin(f64),

	#[error("top_k must be >= 1")]
	InvalidTopK,
}

/// Any failure the library can report.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("invalid configuration file: {0}")]
	Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
