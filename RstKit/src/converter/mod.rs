//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Format conversion utilities
//!
//! Handles conversions between the string table formats:
//! - RST (binary) - `.stringtable` files as shipped with the game
//! - JSON - Human-readable document for editing and diffing

pub mod rst_json;

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::formats::rst::{RST_EXTENSION, RST_MAGIC, RstVersion};
use crate::hashes::HashNames;

pub use rst_json::{
    JSON_EXTENSION, RstJsonDocument, convert_json_to_rst, convert_json_to_rst_with_progress,
    convert_rst_to_json, convert_rst_to_json_with_progress, from_json, to_json,
};

/// Phase of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    /// Reading the source file
    ReadingSource,
    /// Converting between representations
    Converting,
    /// Writing the output file
    WritingOutput,
    /// Conversion complete
    Complete,
}

impl ConvertPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingSource => "Reading source",
            Self::Converting => "Converting",
            Self::WritingOutput => "Writing output",
            Self::Complete => "Complete",
        }
    }
}

/// Progress update for a conversion
#[derive(Debug, Clone)]
pub struct ConvertProgress {
    pub phase: ConvertPhase,
    /// Current step or item number (1-indexed)
    pub current: usize,
    /// Total number of steps or items
    pub total: usize,
    /// Message or file being processed (if applicable)
    pub current_file: Option<String>,
}

impl ConvertProgress {
    #[must_use]
    pub fn new(phase: ConvertPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file/item name
    #[must_use]
    pub fn with_file(
        phase: ConvertPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Progress callback type for conversion operations
pub type ConvertProgressCallback<'a> = &'a (dyn Fn(&ConvertProgress) + Sync);

/// Direction-defining format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Rst,
    Json,
}

impl FileFormat {
    /// Extension used for files of this format
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Rst => RST_EXTENSION,
            Self::Json => JSON_EXTENSION,
        }
    }

    /// The format a file of this format converts into
    #[must_use]
    pub fn target(self) -> Self {
        match self {
            Self::Rst => Self::Json,
            Self::Json => Self::Rst,
        }
    }
}

/// Detect the format of file contents from the first byte.
///
/// `R` starts a binary table; anything else is treated as JSON.
pub fn detect_format(data: &[u8]) -> Result<FileFormat> {
    match data.first() {
        None => Err(Error::InvalidFormat("empty file".into())),
        Some(&b) if b == RST_MAGIC[0] => Ok(FileFormat::Rst),
        Some(_) => Ok(FileFormat::Json),
    }
}

/// Options for file conversions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Layout assumed for binary version byte 5
    pub v5_variant: RstVersion,
    /// Layout to write JSON input as, overriding the document's `version`
    pub version_override: Option<RstVersion>,
}

/// Output path for a converted file: same stem, swapped extension
#[must_use]
pub fn output_path(source: &Path, target: FileFormat, output_dir: Option<&Path>) -> PathBuf {
    let renamed = source.with_extension(target.extension());
    match (output_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory
pub(crate) fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path)?;
    Ok(())
}

/// Convert one file in whichever direction its contents call for
///
/// # Returns
/// The path of the written file
pub fn convert_file(
    source: &Path,
    output_dir: Option<&Path>,
    names: &HashNames,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    let data = fs::read(source)?;
    let format = detect_format(&data)?;
    let dest = output_path(source, format.target(), output_dir);

    match format {
        FileFormat::Rst => rst_json::rst_bytes_to_json_file(&data, &dest, names, *options)?,
        FileFormat::Json => rst_json::json_bytes_to_rst_file(&data, &dest, *options)?,
    }
    Ok(dest)
}

/// Result of a batch conversion
#[derive(Debug, Clone, Default)]
pub struct BatchConvertResult {
    /// Number of files converted
    pub success_count: usize,
    /// Number of files that failed
    pub fail_count: usize,
    /// Written outputs, in input order
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Failed inputs with their error message
    pub failures: Vec<(PathBuf, String)>,
}

/// Output path `source` will be converted to, detected from its first byte
pub fn planned_output(source: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let mut head = Vec::with_capacity(1);
    File::open(source)?.take(1).read_to_end(&mut head)?;
    let format = detect_format(&head)?;
    Ok(output_path(source, format.target(), output_dir))
}

/// Comparable form of a path whose file may not exist yet
fn path_key(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Flags inputs whose output is shared with another input, or is itself
/// one of the inputs
fn conflicting_outputs(sources: &[PathBuf], plans: &[Result<PathBuf>]) -> Vec<bool> {
    let source_keys: HashSet<PathBuf> = sources.iter().map(|s| path_key(s)).collect();
    let dest_keys: Vec<Option<PathBuf>> = plans
        .iter()
        .map(|plan| plan.as_ref().ok().map(|dest| path_key(dest)))
        .collect();

    let mut claims: HashMap<&Path, usize> = HashMap::new();
    for key in dest_keys.iter().flatten() {
        *claims.entry(key.as_path()).or_default() += 1;
    }

    dest_keys
        .iter()
        .map(|key| {
            key.as_ref().is_some_and(|key| {
                claims.get(key.as_path()).copied().unwrap_or(0) > 1 || source_keys.contains(key)
            })
        })
        .collect()
}

/// Convert many files in parallel
///
/// Each file is converted independently; a failure is logged and recorded
/// and the batch continues with the next file. Inputs that would write the
/// same output, or overwrite another input, fail with
/// [`Error::OutputConflict`] and are not converted.
pub fn batch_convert<F>(
    sources: &[PathBuf],
    output_dir: Option<&Path>,
    names: &HashNames,
    options: &ConvertOptions,
    progress: F,
) -> BatchConvertResult
where
    F: Fn(&ConvertProgress) + Send + Sync,
{
    let processed = AtomicUsize::new(0);
    let total = sources.len();

    let plans: Vec<Result<PathBuf>> = sources
        .par_iter()
        .map(|source| planned_output(source, output_dir))
        .collect();
    let conflicts = conflicting_outputs(sources, &plans);

    let outcomes: Vec<(PathBuf, Result<PathBuf>)> = sources
        .par_iter()
        .zip(plans.into_par_iter())
        .zip(conflicts.par_iter())
        .map(|((source, plan), &conflict)| {
            let outcome = match plan {
                Ok(dest) if conflict => Err(Error::OutputConflict(dest)),
                Ok(_) => convert_file(source, output_dir, names, options),
                Err(e) => Err(e),
            };

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&ConvertProgress::with_file(
                ConvertPhase::Converting,
                current,
                total,
                source.display().to_string(),
            ));

            (source.clone(), outcome)
        })
        .collect();

    let mut result = BatchConvertResult::default();
    for (source, outcome) in outcomes {
        match outcome {
            Ok(dest) => {
                tracing::info!("Converted {} -> {}", source.display(), dest.display());
                result.success_count += 1;
                result.converted.push((source, dest));
            }
            Err(e) => {
                tracing::warn!("Failed to convert {}: {}", source.display(), e);
                result.fail_count += 1;
                result.failures.push((source, e.to_string()));
            }
        }
    }

    progress(&ConvertProgress::new(ConvertPhase::Complete, total, total));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(b"RST\x05").unwrap(), FileFormat::Rst);
        assert_eq!(detect_format(b"{\"entries\":{}}").unwrap(), FileFormat::Json);
        assert!(matches!(detect_format(b""), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_output_path() {
        let source = Path::new("data/menu.stringtable");
        assert_eq!(
            output_path(source, FileFormat::Json, None),
            PathBuf::from("data/menu.json")
        );
        let out = Some(Path::new("out"));
        assert_eq!(
            output_path(Path::new("data/menu.json"), FileFormat::Rst, out),
            PathBuf::from("out/menu.stringtable")
        );
    }

    #[test]
    fn test_batch_rejects_shared_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        for sub in ["a", "b"] {
            let sub_dir = dir.path().join(sub);
            fs::create_dir_all(&sub_dir).unwrap();
            fs::write(sub_dir.join("x.json"), r#"{"entries": {}}"#).unwrap();
        }
        fs::create_dir_all(&out).unwrap();
        let sources = vec![dir.path().join("a/x.json"), dir.path().join("b/x.json")];

        let result = batch_convert(
            &sources,
            Some(&out),
            &HashNames::empty(),
            &ConvertOptions::default(),
            |_| {},
        );

        assert_eq!(result.success_count, 0);
        assert_eq!(result.fail_count, 2);
        assert!(!out.join("x.stringtable").exists());
    }

    #[test]
    fn test_batch_rejects_output_over_input() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("menu.json");
        let rst = dir.path().join("menu.stringtable");
        fs::write(&json, r#"{"entries": {"hello": "hi"}}"#).unwrap();
        fs::write(&rst, b"RST\x05\x00\x00\x00\x00").unwrap();
        let other = dir.path().join("items.json");
        fs::write(&other, r#"{"entries": {}}"#).unwrap();

        let sources = vec![json.clone(), rst.clone(), other];
        let result = batch_convert(
            &sources,
            None,
            &HashNames::empty(),
            &ConvertOptions::default(),
            |_| {},
        );

        assert_eq!(result.success_count, 1);
        assert_eq!(result.fail_count, 2);
        assert_eq!(fs::read(&json).unwrap(), br#"{"entries": {"hello": "hi"}}"#);
        assert_eq!(fs::read(&rst).unwrap(), b"RST\x05\x00\x00\x00\x00");
        assert!(dir.path().join("items.stringtable").exists());
    }

    #[test]
    fn test_progress_percentage() {
        let quarter = ConvertProgress::new(ConvertPhase::Converting, 1, 4);
        assert!((quarter.percentage() - 0.25).abs() < f32::EPSILON);

        let empty = ConvertProgress::new(ConvertPhase::Complete, 0, 0);
        assert!((empty.percentage() - 1.0).abs() < f32::EPSILON);
    }
}
