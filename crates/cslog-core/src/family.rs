//! Log family classification by file name.
//!
//! The testbed writes one log per node kind. Mobile hosts log to files whose
//! names contain `mh`, mobile support stations to files containing `mss`.
//! The two checks are independent, so a name can belong to both families.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A family of node logs sharing one line layout and one merged output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFamily {
    /// Mobile host logs: `<node> <timestamp>`.
    Mh,
    /// Mobile support station logs: `<node> <timestamp> <round>`.
    Mss,
}

/// Where the numeric fields sit, counted from the end of the token list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Offset of the timestamp from the end (1 = last token).
    pub timestamp_from_end: usize,
    /// Offset of the round from the end, if the family records one.
    pub round_from_end: Option<usize>,
}

impl RecordLayout {
    /// Minimum token count so that every field lands after the node token.
    pub fn min_fields(&self) -> usize {
        let deepest = self
            .round_from_end
            .map_or(self.timestamp_from_end, |r| r.max(self.timestamp_from_end));
        NODE_FIELD + 1 + deepest
    }
}

/// Index of the node token in a tokenized line.
pub const NODE_FIELD: usize = 1;

impl LogFamily {
    /// All families, in processing order.
    pub const ALL: [LogFamily; 2] = [LogFamily::Mh, LogFamily::Mss];

    /// Substring that marks a file name as belonging to this family.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Mh => "mh",
            Self::Mss => "mss",
        }
    }

    /// File name of the merged output, relative to the logs directory.
    pub fn output_file_name(self) -> &'static str {
        match self {
            Self::Mh => "mh_merged.txt",
            Self::Mss => "mss_merged.txt",
        }
    }

    pub fn record_layout(self) -> RecordLayout {
        match self {
            Self::Mh => RecordLayout {
                timestamp_from_end: 1,
                round_from_end: None,
            },
            Self::Mss => RecordLayout {
                timestamp_from_end: 3,
                round_from_end: Some(1),
            },
        }
    }

    /// Returns `true` if `file_name` carries this family's marker.
    pub fn matches(self, file_name: &str) -> bool {
        file_name.contains(self.marker())
    }
}

impl fmt::Display for LogFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Classification of a directory entry by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileClass {
    Mh,
    Mss,
    /// Name contains both markers; processed once per family.
    Both,
    Unrecognized,
}

impl FileClass {
    /// Families the file should be merged into, MH first.
    pub fn families(self) -> &'static [LogFamily] {
        match self {
            Self::Mh => &[LogFamily::Mh],
            Self::Mss => &[LogFamily::Mss],
            Self::Both => &LogFamily::ALL,
            Self::Unrecognized => &[],
        }
    }

    pub fn is_recognized(self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// Classify a file name into its log families.
pub fn classify(file_name: &str) -> FileClass {
    match (
        LogFamily::Mh.matches(file_name),
        LogFamily::Mss.matches(file_name),
    ) {
        (true, true) => FileClass::Both,
        (true, false) => FileClass::Mh,
        (false, true) => FileClass::Mss,
        (false, false) => FileClass::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_single_families() {
        assert_eq!(classify("mh_logfile.txt"), FileClass::Mh);
        assert_eq!(classify("mss_logfile.txt"), FileClass::Mss);
        assert_eq!(classify("coordinator.txt"), FileClass::Unrecognized);
    }

    #[test]
    fn classify_is_not_exclusive() {
        let class = classify("mh_mss_combined.log");
        assert_eq!(class, FileClass::Both);
        assert_eq!(class.families(), &[LogFamily::Mh, LogFamily::Mss]);
    }

    #[test]
    fn dot_entries_are_unrecognized() {
        assert!(!classify(".").is_recognized());
        assert!(!classify("..").is_recognized());
    }

    #[test]
    fn marker_is_a_plain_substring() {
        // "smhs" contains "mh"; matching is not anchored.
        assert_eq!(classify("smhs.log"), FileClass::Mh);
        assert_eq!(classify("MH.log"), FileClass::Unrecognized);
    }

    #[test]
    fn layouts_require_fields_past_the_node() {
        assert_eq!(LogFamily::Mh.record_layout().min_fields(), 3);
        assert_eq!(LogFamily::Mss.record_layout().min_fields(), 5);
    }

    #[test]
    fn output_names() {
        assert_eq!(LogFamily::Mh.output_file_name(), "mh_merged.txt");
        assert_eq!(LogFamily::Mss.output_file_name(), "mss_merged.txt");
        assert_eq!(LogFamily::Mss.to_string(), "mss");
    }
}
