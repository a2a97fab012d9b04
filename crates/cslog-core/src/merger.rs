//! Traversal driver: root pattern to merged output lines.
//!
//! The root argument is a glob-style prefix (`<root>*`). Every directory it
//! matches is scanned one level deep; each file whose name marks it as an MH
//! or MSS log is reduced to one summary line and appended to that family's
//! merged output. A failure on one file is logged and recorded in the
//! [`MergeReport`]; the scan moves on to the next file.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::family::{classify, LogFamily};
use crate::output::MergedOutputs;
use crate::parser::parse_consensus_latest;

/// One summary line produced from one source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedLine {
    pub source: PathBuf,
    pub family: LogFamily,
    pub line: String,
}

/// A source file that produced no summary line, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub source: PathBuf,
    /// `None` when the failure happened before classification.
    pub family: Option<LogFamily>,
    pub reason: String,
}

/// Outcome of a merge run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Matched directories that were scanned.
    pub directories: usize,
    pub merged: Vec<MergedLine>,
    pub skipped: Vec<SkippedFile>,
    /// Lines produced per family.
    pub counts: BTreeMap<LogFamily, usize>,
}

impl MergeReport {
    pub fn merged_count(&self, family: LogFamily) -> usize {
        self.counts.get(&family).copied().unwrap_or(0)
    }

    /// Returns `true` if no file was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn record_merged(&mut self, source: &Path, family: LogFamily, line: String) {
        *self.counts.entry(family).or_default() += 1;
        self.merged.push(MergedLine {
            source: source.to_path_buf(),
            family,
            line,
        });
    }

    fn record_skipped(&mut self, source: &Path, family: Option<LogFamily>, err: &MergeError) {
        warn!(
            source = %source.display(),
            family = family.map(LogFamily::marker).unwrap_or("-"),
            error = %err,
            "skipping log file"
        );
        self.skipped.push(SkippedFile {
            source: source.to_path_buf(),
            family,
            reason: err.to_string(),
        });
    }
}

/// Scans node log directories and appends per-file summaries.
#[derive(Clone, Debug)]
pub struct LogMerger {
    config: MergeConfig,
    outputs: MergedOutputs,
}

impl LogMerger {
    pub fn new(config: MergeConfig) -> Self {
        let outputs = MergedOutputs::under(&config.home);
        Self { config, outputs }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn outputs(&self) -> &MergedOutputs {
        &self.outputs
    }

    /// Merge every log under the directories matched by `<root>*`.
    ///
    /// Fails only if the pattern's base directory is missing or unreadable.
    pub fn merge_logs(&self, root: &Path) -> MergeResult<MergeReport> {
        let dirs = matching_directories(root)?;
        if dirs.is_empty() {
            warn!(root = %root.display(), "root pattern matched no directories");
        }

        let mut report = MergeReport::default();
        for dir in &dirs {
            self.merge_directory(dir, &mut report);
        }

        info!(
            directories = report.directories,
            mh = report.merged_count(LogFamily::Mh),
            mss = report.merged_count(LogFamily::Mss),
            skipped = report.skipped.len(),
            dry_run = self.config.dry_run,
            "merge complete"
        );
        Ok(report)
    }

    /// Process the files directly inside `dir`, in name order.
    pub fn merge_directory(&self, dir: &Path, report: &mut MergeReport) {
        debug!(dir = %dir.display(), "scanning directory");
        report.directories += 1;

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let source = e.path().unwrap_or(dir).to_path_buf();
                    report.record_skipped(&source, None, &walk_error(dir, e));
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy();
            let class = classify(&name);
            if !class.is_recognized() {
                continue;
            }
            if !entry.file_type().is_file() {
                debug!(path = %entry.path().display(), "not a regular file; ignoring");
                continue;
            }

            for &family in class.families() {
                self.merge_file(entry.path(), family, report);
            }
        }
    }

    fn merge_file(&self, path: &Path, family: LogFamily, report: &mut MergeReport) {
        let record = match parse_consensus_latest(path, family, self.config.parse_mode) {
            Ok(record) => record,
            Err(e) => {
                report.record_skipped(path, Some(family), &e);
                return;
            }
        };

        let line = record.summary_line();
        if !self.config.dry_run {
            if let Err(e) = self.outputs.for_family(family).append_line(&line) {
                report.record_skipped(path, Some(family), &e);
                return;
            }
        }

        debug!(source = %path.display(), %family, %line, "merged");
        report.record_merged(path, family, line);
    }
}

/// Split `root` into the directory to list and the name prefix to match.
///
/// `logs/run` lists `logs` for names starting with `run`; `logs/run/`
/// lists `logs/run` for every name.
pub fn split_pattern(root: &Path) -> (PathBuf, String) {
    let ends_with_separator = root
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator);

    match root.file_name() {
        Some(name) if !ends_with_separator => {
            let base = match root.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (base, name.to_string_lossy().into_owned())
        }
        _ => (root.to_path_buf(), String::new()),
    }
}

/// Directories matched by the pattern `<root>*`, sorted by name.
///
/// As with shell globs, an empty prefix does not match dot-entries.
pub fn matching_directories(root: &Path) -> MergeResult<Vec<PathBuf>> {
    let (base, prefix) = split_pattern(root);
    if !base.is_dir() {
        return Err(MergeError::RootNotFound(base));
    }

    let mut dirs = Vec::new();
    let entries = WalkDir::new(&base)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            // An unreadable base directory is fatal; a dangling entry is not.
            Err(e) if e.depth() == 0 => return Err(walk_error(&base, e)),
            Err(e) => {
                debug!(error = %e, "ignoring unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        if !name.starts_with(prefix.as_str()) || (prefix.is_empty() && name.starts_with('.')) {
            continue;
        }
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "matched entry is not a directory");
        }
    }
    Ok(dirs)
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> MergeError {
    let path = err.path().unwrap_or(fallback).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop"));
    MergeError::FileAccess { path, source }
}
