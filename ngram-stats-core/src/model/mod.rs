//! Top-level module for the n-gram statistics engine.
//!
//! This module provides the whole counting pipeline, including:
//! - Word normalization against configured alphabets (`TextNormalizer`)
//! - Fixed-length context counting (`TransitionTable`)
//! - Deterministic presentation order (`OrderedTable`)
//! - Rounded probability distributions (`ProbabilityTable`)
//! - Probability mass verification (`verify`)
//! - Corpus-wide summary metrics (`CorpusStatistics`)
//! - A multi-n driver (`NGramAnalyzer`)

/// Alphabets, character folding and word normalization.
///
/// Rejected words are values, not errors: they are tallied and skipped.
pub mod alphabet;

/// High-level driver running the pipeline for a range of context lengths.
///
/// Normalizes once, then builds independent reports per `n` in parallel.
pub mod analyzer;

/// Deterministic ordering pass over counts or probabilities.
pub mod ordering;

/// Count-to-probability conversion with fixed decimal rounding.
pub mod probability;

/// Descriptive statistics over a probability table.
pub mod statistics;

/// Fixed-length context counting (`n >= 1`).
///
/// Handles word ingestion, transition counting and table merging.
pub mod transition_table;

/// Checks that each context's probabilities sum to 1 within a margin.
pub mod verifier;

/// A single context and its observed continuations.
pub mod state;
