//! Consensus log merger for multi-node testbed runs.
//!
//! Scans per-run directories of node logs, reduces each mobile host (MH) and
//! mobile support station (MSS) log to its latest consensus record, and
//! appends one summary line per log to a merged file per family.
//!
//! # Key Types
//!
//! - [`LogMerger`] -- Traversal driver over a root pattern
//! - [`LogFamily`] / [`FileClass`] -- Name-based classification
//! - [`ConsensusRecord`] -- Named fields extracted from one log line
//! - [`NodeLatestMap`] -- Last-write-wins record per node
//! - [`MergedOutput`] -- Append-only merged file of one family
//! - [`MergeReport`] -- What was merged and what was skipped

pub mod config;
pub mod error;
pub mod family;
pub mod merger;
pub mod output;
pub mod parser;
pub mod record;

pub use config::MergeConfig;
pub use error::{MergeError, MergeResult};
pub use family::{classify, FileClass, LogFamily};
pub use merger::{LogMerger, MergeReport, MergedLine, SkippedFile};
pub use output::{MergedOutput, MergedOutputs};
pub use parser::{parse_consensus_latest, summarize_lines, NodeLatestMap, ParseMode};
pub use record::{ConsensusRecord, FieldError, Timestamp};
