//! Per-file reduction: consensus lines to a single summary record.
//!
//! Every qualifying line is turned into a [`ConsensusRecord`] and stored
//! under its node token. A later line for the same node replaces the earlier
//! record even when its timestamp is smaller; only then is the record with
//! the largest timestamp picked across nodes.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MergeError, MergeResult};
use crate::family::LogFamily;
use crate::record::{is_consensus_line, tokenize, ConsensusRecord};

/// How to treat consensus lines that lack the required fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Skip the line and keep reading.
    #[default]
    Lenient,
    /// Fail the whole file.
    Strict,
}

/// Node token to latest record, in order of first appearance.
#[derive(Debug, Default)]
pub struct NodeLatestMap {
    records: Vec<ConsensusRecord>,
    positions: HashMap<String, usize>,
}

impl NodeLatestMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record`, replacing any earlier record for the same node.
    ///
    /// A replaced node keeps its original position.
    pub fn insert(&mut self, record: ConsensusRecord) {
        match self.positions.get(&record.node) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.positions.insert(record.node.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, node: &str) -> Option<&ConsensusRecord> {
        self.positions.get(node).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &ConsensusRecord> {
        self.records.iter()
    }

    /// The record with the largest timestamp; the earliest node wins ties.
    pub fn latest(&self) -> Option<&ConsensusRecord> {
        self.records.iter().fold(None, |best, rec| match best {
            Some(b) if b.timestamp.value >= rec.timestamp.value => Some(b),
            _ => Some(rec),
        })
    }

    pub fn into_latest(mut self) -> Option<ConsensusRecord> {
        let idx = self
            .records
            .iter()
            .enumerate()
            .fold(None::<(usize, i64)>, |best, (i, rec)| match best {
                Some((_, v)) if v >= rec.timestamp.value => best,
                _ => Some((i, rec.timestamp.value)),
            })?
            .0;
        Some(self.records.swap_remove(idx))
    }
}

/// Reduce consensus lines from `reader` to the latest record.
///
/// Errors carry no file path; [`parse_consensus_latest`] fills it in.
pub fn summarize_lines<R: BufRead>(
    mut reader: R,
    family: LogFamily,
    mode: ParseMode,
) -> MergeResult<ConsensusRecord> {
    let mut nodes = NodeLatestMap::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    let mut skipped = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| MergeError::file_access("", e))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        if !is_consensus_line(&line) {
            continue;
        }

        match ConsensusRecord::from_fields(&tokenize(&line), family) {
            Ok(record) => nodes.insert(record),
            Err(e) if mode == ParseMode::Strict => {
                return Err(MergeError::MalformedLogLine {
                    path: None,
                    line: line_no,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                skipped += 1;
                warn!(line = line_no, %family, error = %e, "skipping malformed consensus line");
            }
        }
    }

    debug!(%family, nodes = nodes.len(), lines = line_no, skipped, "consensus lines reduced");

    nodes.into_latest().ok_or_else(|| MergeError::EmptyResult {
        path: Default::default(),
    })
}

/// Read the log at `path` and return its latest consensus record.
pub fn parse_consensus_latest(
    path: &Path,
    family: LogFamily,
    mode: ParseMode,
) -> MergeResult<ConsensusRecord> {
    let file = File::open(path).map_err(|e| MergeError::file_access(path, e))?;
    summarize_lines(BufReader::new(file), family, mode).map_err(|e| match e {
        MergeError::FileAccess { source, .. } => MergeError::file_access(path, source),
        other => other.with_path(path),
    })
}
