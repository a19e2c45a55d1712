//! Character n-gram statistics over a word corpus.
//!
//! This crate provides a modular counting engine including:
//! - Alphabet-based word filtering with optional character folding
//! - Context → next-character transition counts for any `n >= 1`
//! - Rounded probability tables and their verification
//! - Corpus-wide summary statistics
//! - I/O helpers to load corpora and persist tables as JSON
//!
//! The engine itself is pure and synchronous. Reading corpora and writing
//! results live in `io` and are only used by callers that want them.

/// Core n-gram tables and the analysis pipeline.
pub mod model;

/// Analysis settings, loadable from TOML.
pub mod config;

/// Configuration and I/O error types.
pub mod error;

/// I/O utilities (corpus loading, output paths, JSON persistence).
pub mod io;

pub use config::AnalysisConfig;
pub use error::{ConfigError, Error};
pub use model::analyzer::{Analysis, NGramAnalyzer, NGramReport};
