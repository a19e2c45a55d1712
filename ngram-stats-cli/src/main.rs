use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use ngram_stats_core::config::AlphabetSpec;
use ngram_stats_core::io::{collect_inputs, get_filename, read_file, save_analysis};
use ngram_stats_core::{AnalysisConfig, NGramAnalyzer};

#[derive(Parser, Debug)]
#[command(name = "ngram-stats", version, about = "Character n-gram counts and probabilities for word lists")]
struct Cli {
	/// Corpus files (one word per line) or directories of .txt corpora
	#[arg(required = true)]
	inputs: Vec<PathBuf>,

	#[arg(short, long, help = "TOML configuration file")]
	config: Option<PathBuf>,

	#[arg(short, long, default_value = "output", help = "Directory receiving the JSON files")]
	output: PathBuf,

	#[arg(short = 'n', long = "n", help = "Context length (sets both --min-n and --max-n)")]
	n: Option<usize>,

	#[arg(long, conflicts_with = "n")]
	min_n: Option<usize>,

	#[arg(long, conflicts_with = "n")]
	max_n: Option<usize>,

	#[arg(short, long, help = "Decimal digits kept in probabilities")]
	precision: Option<u32>,

	#[arg(long, help = "Allowed deviation of a context's total probability from 1")]
	margin: Option<f64>,

	#[arg(short, long = "alphabet", help = "Accepted alphabet (latin, cyrillic), repeatable")]
	alphabets: Vec<String>,

	#[arg(long = "fold", value_parser = parse_fold, help = "Character fold VARIANT=CANONICAL, repeatable")]
	folds: Vec<(String, String)>,

	#[arg(short = 'k', long, help = "Compute corpus statistics over the top K continuations")]
	top_k: Option<usize>,

	#[arg(short, long, conflicts_with = "quiet", help = "Debug output")]
	verbose: bool,

	#[arg(short, long, help = "Only warnings and errors")]
	quiet: bool,
}

fn parse_fold(s: &str) -> Result<(String, String), String> {
	match s.split_once('=') {
		Some((from, to)) => Ok((from.to_owned(), to.to_owned())),
		None => Err(format!("expected VARIANT=CANONICAL, got '{s}'")),
	}
}

impl Cli {
	/// Loads the configuration file (if any) and applies command-line overrides.
	fn analysis_config(&self) -> Result<AnalysisConfig> {
		let mut config = match &self.config {
			Some(path) => AnalysisConfig::load(path)
				.with_context(|| format!("Failed to load configuration {}", path.display()))?,
			None => AnalysisConfig::default(),
		};

		if let Some(n) = self.n {
			config.min_n = n;
			config.max_n = n;
		}
		if let Some(min_n) = self.min_n {
			config.min_n = min_n;
		}
		if let Some(max_n) = self.max_n {
			config.max_n = max_n;
		}
		if let Some(precision) = self.precision {
			config.precision = precision;
		}
		if self.margin.is_some() {
			config.margin_of_error = self.margin;
		}
		if !self.alphabets.is_empty() {
			config.alphabets = self.alphabets.iter().cloned().map(AlphabetSpec::Builtin).collect();
		}
		for (from, to) in &self.folds {
			config.fold.insert(from.clone(), to.clone());
		}
		if self.top_k.is_some() {
			config.top_k = self.top_k;
		}

		Ok(config)
	}

	fn log_level(&self) -> &'static str {
		if self.verbose {
			"debug"
		} else if self.quiet {
			"warn"
		} else {
			"info"
		}
	}
}

/// Analyzes one corpus file and writes its tables. Returns the written paths.
fn process_file(analyzer: &NGramAnalyzer, input: &Path, output: &Path) -> Result<Vec<PathBuf>> {
	let lines = read_file(input).with_context(|| format!("Failed to read {}", input.display()))?;
	log::info!("Corpus {}: {} lines", input.display(), lines.len());

	let analysis = analyzer.analyze(&lines)?;
	log::info!(
		"{} words accepted, {} rejected",
		analysis.corpus.accepted,
		analysis.corpus.rejected.total()
	);

	for report in &analysis.reports {
		log::info!(
			"n = {}: {} contexts, {} violations",
			report.n,
			report.counts.len(),
			report.violations.len()
		);
		if let Some(stats) = &report.statistics {
			log::info!(
				"n = {}: average probability {:.4}, top {} average {:.4}, top {} mass {:.4}",
				report.n,
				stats.average_probability,
				stats.top_k,
				stats.average_top_k_probability,
				stats.top_k,
				stats.average_top_k_sum
			);
		}
	}

	let written = save_analysis(&analysis, input, output)
		.with_context(|| format!("Failed to save results to {}", output.display()))?;
	for path in &written {
		log::info!("Output saved to: {}", path.display());
	}
	Ok(written)
}

/// Expands every input into corpus files.
///
/// Outputs are named after the file stem, so two corpora sharing a stem
/// (e.g. `a/english.txt` and `b/english.txt`) are refused before anything
/// is written.
fn collect_corpora(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut stems: HashMap<String, PathBuf> = HashMap::new();

	for input in inputs {
		let found = collect_inputs(input, "txt").with_context(|| format!("Invalid input {}", input.display()))?;
		if found.is_empty() {
			log::warn!("No .txt corpus found in {}", input.display());
		}
		for file in found {
			let stem = get_filename(&file).with_context(|| format!("Invalid input {}", file.display()))?;
			if let Some(previous) = stems.get(&stem) {
				bail!(
					"{} and {} would both write '{stem}' outputs",
					previous.display(),
					file.display()
				);
			}
			stems.insert(stem, file.clone());
			files.push(file);
		}
	}
	Ok(files)
}

fn run(cli: &Cli) -> Result<Vec<PathBuf>> {
	let analyzer = NGramAnalyzer::new(cli.analysis_config()?)?;
	let files = collect_corpora(&cli.inputs)?;

	let mut written = Vec::new();
	for file in files {
		written.extend(process_file(&analyzer, &file, &cli.output)?);
	}
	Ok(written)
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

	log::info!("--- Run ---");
	run(&cli)?;
	log::info!("--- End ---");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn defaults_without_flags() {
		let cli = Cli::try_parse_from(["ngram-stats", "words.txt"]).unwrap();
		let config = cli.analysis_config().unwrap();
		assert_eq!(config, AnalysisConfig::default());
		assert_eq!(cli.output, PathBuf::from("output"));
		assert_eq!(cli.log_level(), "info");
	}

	#[test]
	fn flags_override_configuration() {
		let cli = Cli::try_parse_from([
			"ngram-stats",
			"-n",
			"3",
			"-p",
			"4",
			"--margin",
			"0.002",
			"-a",
			"cyrillic",
			"--fold",
			"ё=е",
			"-k",
			"5",
			"-v",
			"corpus",
		])
		.unwrap();
		let config = cli.analysis_config().unwrap();
		assert_eq!(config.ngram_range(), 3..=3);
		assert_eq!(config.precision, 4);
		assert_eq!(config.margin_of_error(), 0.002);
		assert_eq!(config.alphabets, vec![AlphabetSpec::Builtin("cyrillic".to_owned())]);
		assert_eq!(config.fold.get("ё").map(String::as_str), Some("е"));
		assert_eq!(config.top_k, Some(5));
		assert_eq!(cli.log_level(), "debug");
	}

	#[test]
	fn range_flags_conflict_with_n() {
		assert!(Cli::try_parse_from(["ngram-stats", "-n", "2", "--max-n", "3", "w.txt"]).is_err());
		let cli = Cli::try_parse_from(["ngram-stats", "--min-n", "1", "--max-n", "3", "w.txt"]).unwrap();
		assert_eq!(cli.analysis_config().unwrap().ngram_range(), 1..=3);
	}

	#[test]
	fn malformed_fold_is_refused() {
		assert!(Cli::try_parse_from(["ngram-stats", "--fold", "ee", "w.txt"]).is_err());
	}

	#[test]
	fn zero_n_fails_before_reading_input() {
		let cli = Cli::try_parse_from(["ngram-stats", "-n", "0", "does-not-exist.txt"]).unwrap();
		let err = run(&cli).unwrap_err();
		assert!(err.to_string().contains("n must be >= 1"));
	}

	#[test]
	fn runs_a_directory_of_corpora() {
		let dir = TempDir::new().unwrap();
		let input = dir.path().join("input");
		fs::create_dir(&input).unwrap();
		fs::write(input.join("english.txt"), "cat\ncar\ncan\n").unwrap();
		fs::write(input.join("russian.txt"), "кот\nкит\n").unwrap();
		let output = dir.path().join("output");

		let cli = Cli::try_parse_from([
			"ngram-stats".to_owned(),
			"-a".to_owned(),
			"latin".to_owned(),
			"-a".to_owned(),
			"cyrillic".to_owned(),
			"-o".to_owned(),
			output.to_string_lossy().to_string(),
			input.to_string_lossy().to_string(),
		])
		.unwrap();
		let written = run(&cli).unwrap();
		assert_eq!(written.len(), 6);
		assert!(output.join("english-n1-counts.json").is_file());
		assert!(output.join("russian-n1-probabilities.json").is_file());
		assert!(output.join("russian-summary.json").is_file());
	}

	#[test]
	fn corpora_sharing_a_stem_are_refused() {
		let dir = TempDir::new().unwrap();
		for sub in ["a", "b"] {
			fs::create_dir(dir.path().join(sub)).unwrap();
			fs::write(dir.path().join(sub).join("english.txt"), "cat\n").unwrap();
		}
		let output = dir.path().join("output");

		let cli = Cli::try_parse_from([
			"ngram-stats".to_owned(),
			"-o".to_owned(),
			output.to_string_lossy().to_string(),
			dir.path().join("a").to_string_lossy().to_string(),
			dir.path().join("b").to_string_lossy().to_string(),
		])
		.unwrap();
		let err = run(&cli).unwrap_err();
		assert!(err.to_string().contains("'english'"));
		// Refused before the first corpus was written
		assert!(!output.exists());

		// Same file passed twice is refused as well
		let file = dir.path().join("a").join("english.txt");
		assert!(collect_corpora(&[file.clone(), file]).is_err());
	}

	#[test]
	fn configuration_file_is_used() {
		let dir = TempDir::new().unwrap();
		let config_path = dir.path().join("ngram.toml");
		fs::write(&config_path, "min_n = 2\nmax_n = 3\nprecision = 2\n").unwrap();

		let cli = Cli::try_parse_from([
			"ngram-stats".to_owned(),
			"-c".to_owned(),
			config_path.to_string_lossy().to_string(),
			"--max-n".to_owned(),
			"4".to_owned(),
			"w.txt".to_owned(),
		])
		.unwrap();
		let config = cli.analysis_config().unwrap();
		assert_eq!(config.ngram_range(), 2..=4);
		assert_eq!(config.precision, 2);
	}
}
