use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::model::alphabet::Corpus;
use crate::model::analyzer::{Analysis, NGramReport};
use crate::model::statistics::CorpusStatistics;
use crate::model::verifier::Violation;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Builds an output path in `output_dir` from an input stem and a suffix.
///
/// Example:
/// `data/english.txt` + `"-n2-counts"` + `"json"` → `output/english-n2-counts.json`
pub fn build_output_path<P, D>(input_path: P, output_dir: D, suffix: &str, extension: &str) -> io::Result<PathBuf>
where
	P: AsRef<Path>,
	D: AsRef<Path>,
{
	let stem = get_filename(input_path)?;
	Ok(output_dir.as_ref().join(format!("{stem}{suffix}.{extension}")))
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./input/english-20000.txt"` → `"english-20000"`
/// - `"english-20000.txt"` → `"english-20000"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Resolves an input argument into corpus files.
///
/// A file is returned as-is; a directory expands to every file in it with
/// the given extension.
pub fn collect_inputs<P: AsRef<Path>>(input: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let path = input.as_ref();
	if path.is_dir() {
		Ok(list_files(path, extension)?.into_iter().map(|name| path.join(name)).collect())
	} else if path.is_file() {
		Ok(vec![path.to_path_buf()])
	} else {
		Err(io::Error::new(io::ErrorKind::NotFound, format!("No such file or directory: {}", path.display())))
	}
}

/// Writes `data` as pretty JSON.
///
/// The parent directory is created when missing. Data goes to a temporary
/// sibling file first, then replaces the target. On failure the temporary
/// file is removed and the target is left as it was.
pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, data: &T) -> Result<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	let tmp_path = path.with_extension("tmp");

	let json = serde_json::to_string_pretty(data)?;
	if let Err(err) = replace_with(&tmp_path, path, json.as_bytes()) {
		// Best effort: the temporary file may never have been created
		let _ = fs::remove_file(&tmp_path);
		return Err(err.into());
	}
	Ok(())
}

fn replace_with(tmp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
	let mut file = File::create(tmp_path)?;
	file.write_all(bytes)?;
	file.sync_all()?;
	fs::rename(tmp_path, path)
}

#[derive(Serialize)]
struct Summary<'a> {
	corpus: &'a Corpus,
	ngrams: Vec<NGramSummary<'a>>,
}

#[derive(Serialize)]
struct NGramSummary<'a> {
	n: usize,
	contexts: usize,
	violations: &'a [Violation],
	#[serde(skip_serializing_if = "Option::is_none")]
	statistics: Option<&'a CorpusStatistics>,
}

impl<'a> From<&'a NGramReport> for NGramSummary<'a> {
	fn from(report: &'a NGramReport) -> Self {
		Self {
			n: report.n,
			contexts: report.counts.len(),
			violations: &report.violations,
			statistics: report.statistics.as_ref(),
		}
	}
}

/// Persists an analysis of `input_path` into `output_dir`.
///
/// Writes, for each n, `<stem>-n<n>-counts.json` and
/// `<stem>-n<n>-probabilities.json`, then `<stem>-summary.json`.
/// Returns the written paths in that order.
pub fn save_analysis<P, D>(analysis: &Analysis, input_path: P, output_dir: D) -> Result<Vec<PathBuf>>
where
	P: AsRef<Path>,
	D: AsRef<Path>,
{
	let mut written = Vec::with_capacity(analysis.reports.len() * 2 + 1);

	for report in &analysis.reports {
		let counts_path = build_output_path(&input_path, &output_dir, &format!("-n{}-counts", report.n), "json")?;
		write_json(&counts_path, &report.counts)?;
		written.push(counts_path);

		let probabilities_path =
			build_output_path(&input_path, &output_dir, &format!("-n{}-probabilities", report.n), "json")?;
		write_json(&probabilities_path, &report.probabilities)?;
		written.push(probabilities_path);
	}

	let summary = Summary {
		corpus: &analysis.corpus,
		ngrams: analysis.reports.iter().map(NGramSummary::from).collect(),
	};
	let summary_path = build_output_path(&input_path, &output_dir, "-summary", "json")?;
	write_json(&summary_path, &summary)?;
	written.push(summary_path);

	Ok(written)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_from_input_stem() {
		let path = build_output_path("input/english-20000.txt", "output", "-n1-counts", "json").unwrap();
		assert_eq!(path, PathBuf::from("output/english-20000-n1-counts.json"));
	}

	#[test]
	fn dotted_stem_is_kept() {
		let path = build_output_path("words.v2.txt", "out", "-summary", "json").unwrap();
		assert_eq!(path, PathBuf::from("out/words.v2-summary.json"));
	}

	#[test]
	fn filename_without_extension() {
		assert_eq!(get_filename("./data/model.dat").unwrap(), "model");
		assert_eq!(get_filename("model").unwrap(), "model");
		assert!(get_filename("/").is_err());
	}
}
