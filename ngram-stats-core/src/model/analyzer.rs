use std::sync::mpsc;
use std::thread;

use crate::config::AnalysisConfig;
use crate::error::ConfigError;
use super::alphabet::{Corpus, TextNormalizer};
use super::ordering::OrderedTable;
use super::probability::ProbabilityTable;
use super::statistics::CorpusStatistics;
use super::transition_table::TransitionTable;
use super::verifier::{verify, Violation};

/// Everything computed for one context length `n`.
#[derive(Clone, Debug)]
pub struct NGramReport {
	pub n: usize,
	pub counts: OrderedTable<usize>,
	pub probabilities: OrderedTable<f64>,
	pub violations: Vec<Violation>,
	pub statistics: Option<CorpusStatistics>,
}

/// Result of a run over one corpus: diagnostics plus one report per `n`,
/// sorted by `n`.
#[derive(Clone, Debug)]
pub struct Analysis {
	pub corpus: Corpus,
	pub reports: Vec<NGramReport>,
}

/// Runs the whole pipeline for a configured range of context lengths.
///
/// # Responsibilities
/// - Normalize raw lines once into a shared word list
/// - Count, order, normalize and verify one table per `n`
/// - Compute corpus statistics when `top_k` is configured
///
/// Each `n` is independent: workers only read the shared word list and
/// own the table they build.
#[derive(Debug)]
pub struct NGramAnalyzer {
	config: AnalysisConfig,
	normalizer: TextNormalizer,
}

impl NGramAnalyzer {
	/// Validates `config` and prepares the normalizer.
	///
	/// # Errors
	/// Any `ConfigError` from `AnalysisConfig::validate`. Nothing has been
	/// counted at that point.
	pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		let normalizer = config.normalizer()?;
		Ok(Self { config, normalizer })
	}

	pub fn config(&self) -> &AnalysisConfig {
		&self.config
	}

	pub fn normalizer(&self) -> &TextNormalizer {
		&self.normalizer
	}

	/// Normalizes `lines` and builds a report for every configured `n`.
	pub fn analyze<I, S>(&self, lines: I) -> Result<Analysis, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let corpus = self.normalizer.corpus(lines);
		let reports = self.analyze_words(&corpus.words)?;
		Ok(Analysis { corpus, reports })
	}

	/// Builds the reports for already normalized words.
	///
	/// # Behavior
	/// - Spawns one scoped worker per `n`, at most `num_cpus::get()` at a time.
	/// - Workers send finished reports over an MPSC channel.
	/// - Reports are returned sorted by `n`.
	pub fn analyze_words(&self, words: &[String]) -> Result<Vec<NGramReport>, ConfigError> {
		let mut sizes = self.config.ngram_range();
		let workers = num_cpus::get().max(1);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			loop {
				let handles: Vec<_> = sizes
					.by_ref()
					.take(workers)
					.map(|n| {
						let tx = tx.clone();
						scope.spawn(move || {
							tx.send(self.report(words, n)).expect("receiver outlives workers");
						})
					})
					.collect();
				if handles.is_empty() {
					break;
				}

				// Bound the number of live workers before starting the next batch
				for handle in handles {
					if let Err(panic) = handle.join() {
						std::panic::resume_unwind(panic);
					}
				}
			}
		});
		drop(tx);

		let mut reports = rx.iter().collect::<Result<Vec<_>, _>>()?;
		reports.sort_by_key(|report| report.n);
		Ok(reports)
	}

	/// Builds the report for a single context length.
	///
	/// # Errors
	/// Returns `ConfigError::InvalidN` if `n < 1`.
	pub fn report(&self, words: &[String], n: usize) -> Result<NGramReport, ConfigError> {
		let counts = TransitionTable::count(words, n)?;
		let probabilities = ProbabilityTable::normalize(&counts, self.config.precision);
		let violations = verify(&probabilities, self.config.margin_of_error());

		for violation in &violations {
			log::warn!(
				"[error:{}] Total probability is beyond margin of error: {}",
				violation.context,
				violation.observed_total
			);
		}

		let probabilities = probabilities.ordered();
		let statistics = self
			.config
			.top_k
			.map(|top_k| CorpusStatistics::compute(&probabilities, top_k));

		log::debug!(
			"n = {}: {} contexts, {} violations",
			n,
			counts.len(),
			violations.len()
		);

		Ok(NGramReport { n, counts: counts.ordered(), probabilities, violations, statistics })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn analyzer(config: AnalysisConfig) -> NGramAnalyzer {
		NGramAnalyzer::new(config).unwrap()
	}

	#[test]
	fn single_n_scenario() {
		let analysis = analyzer(AnalysisConfig::default()).analyze(["Cat", "car", "can", "c4t"]).unwrap();
		assert_eq!(analysis.corpus.accepted, 3);
		assert_eq!(analysis.corpus.rejected.unknown_character, 1);
		assert_eq!(analysis.reports.len(), 1);

		let report = &analysis.reports[0];
		assert_eq!(report.n, 1);
		assert_eq!(report.counts.get("c").unwrap().transitions, vec![('a', 3)]);
		assert_eq!(report.counts.get("a").unwrap().transitions, vec![('n', 1), ('r', 1), ('t', 1)]);
		assert_eq!(report.probabilities.get("c").unwrap().transitions, vec![('a', 1.0)]);
		assert!(report.violations.is_empty());
		assert!(report.statistics.is_none());
	}

	#[test]
	fn reports_come_back_sorted_by_n() {
		let config = AnalysisConfig { min_n: 1, max_n: 5, top_k: Some(2), ..AnalysisConfig::default() };
		let analysis = analyzer(config).analyze(["abracadabra", "banana"]).unwrap();
		let sizes: Vec<usize> = analysis.reports.iter().map(|r| r.n).collect();
		assert_eq!(sizes, vec![1, 2, 3, 4, 5]);
		for report in &analysis.reports {
			assert_eq!(report.counts.n(), report.n);
			assert!(report.statistics.is_some());
		}
	}

	#[test]
	fn parallel_matches_sequential() {
		let config = AnalysisConfig { min_n: 1, max_n: 4, ..AnalysisConfig::default() };
		let analyzer = analyzer(config);
		let words: Vec<String> = ["mississippi", "missing", "sip"].iter().map(|s| s.to_string()).collect();

		let parallel = analyzer.analyze_words(&words).unwrap();
		for report in parallel {
			let sequential = analyzer.report(&words, report.n).unwrap();
			assert_eq!(report.counts, sequential.counts);
			assert_eq!(report.probabilities, sequential.probabilities);
			assert_eq!(report.violations, sequential.violations);
		}
	}

	#[test]
	fn zero_n_fails_before_counting() {
		let config = AnalysisConfig { min_n: 0, ..AnalysisConfig::default() };
		assert_eq!(NGramAnalyzer::new(config).unwrap_err(), ConfigError::InvalidN(0));

		let analyzer = analyzer(AnalysisConfig::default());
		assert_eq!(analyzer.report(&[], 0).unwrap_err(), ConfigError::InvalidN(0));
	}

	#[test]
	fn unbounded_range_fails_before_counting() {
		let config = AnalysisConfig { min_n: 1, max_n: usize::MAX, ..AnalysisConfig::default() };
		assert!(matches!(NGramAnalyzer::new(config), Err(ConfigError::RangeTooLarge { .. })));
	}

	#[test]
	fn widest_range_runs_every_size() {
		let config = AnalysisConfig {
			min_n: 1,
			max_n: crate::config::MAX_NGRAM_SIZES,
			..AnalysisConfig::default()
		};
		let analysis = analyzer(config).analyze(["abracadabra"]).unwrap();
		assert_eq!(analysis.reports.len(), crate::config::MAX_NGRAM_SIZES);
		assert_eq!(analysis.reports.last().unwrap().n, crate::config::MAX_NGRAM_SIZES);
	}

	#[test]
	fn huge_single_n_yields_empty_tables() {
		let config = AnalysisConfig { min_n: usize::MAX, max_n: usize::MAX, ..AnalysisConfig::default() };
		let analysis = analyzer(config).analyze(["cat"]).unwrap();
		assert_eq!(analysis.reports.len(), 1);
		assert!(analysis.reports[0].counts.is_empty());
	}

	#[test]
	fn long_n_yields_empty_tables() {
		let config = AnalysisConfig { min_n: 10, max_n: 10, ..AnalysisConfig::default() };
		let analysis = analyzer(config).analyze(["short"]).unwrap();
		assert!(analysis.reports[0].counts.is_empty());
		assert!(analysis.reports[0].probabilities.is_empty());
	}
}
