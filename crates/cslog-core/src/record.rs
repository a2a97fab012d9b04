//! Tokenizer and named-field records for consensus log lines.
//!
//! The log format is free text. The only contract is positional:
//!
//! | field            | position                         |
//! |------------------|----------------------------------|
//! | node             | token 1 (zero-based)             |
//! | timestamp (MH)   | last token                       |
//! | timestamp (MSS)  | third token from the end         |
//! | round (MSS)      | last token                       |
//!
//! A numeric token may carry a `key=` prefix (`ts=120`); only the text after
//! the last `=` is kept.

use serde::{Deserialize, Serialize};

use crate::family::{LogFamily, NODE_FIELD};

/// Substring that marks a line as a consensus event.
pub const CONSENSUS_MARKER: &str = "consensus";

/// Returns `true` if the line reports a consensus event.
pub fn is_consensus_line(line: &str) -> bool {
    line.contains(CONSENSUS_MARKER)
}

/// Split a line on runs of whitespace.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Reasons a consensus line cannot be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("expected at least {required} fields, found {found}")]
    TooFewFields { found: usize, required: usize },

    #[error("timestamp {0:?} is not an integer")]
    InvalidTimestamp(String),
}

/// A timestamp token: the text as logged and its integer value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub text: String,
    pub value: i64,
}

impl Timestamp {
    pub fn parse(token: &str) -> Result<Self, FieldError> {
        let text = strip_key(token);
        let value = text
            .parse::<i64>()
            .map_err(|_| FieldError::InvalidTimestamp(token.to_string()))?;
        Ok(Self {
            text: text.to_string(),
            value,
        })
    }
}

/// The latest consensus report of one node, as read from one line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRecord {
    /// Node token exactly as logged, e.g. `[nodeA]` or `3]`.
    pub node: String,
    pub timestamp: Timestamp,
    /// Consensus round; present for MSS records only.
    pub round: Option<String>,
}

impl ConsensusRecord {
    /// Build a record from a tokenized line using the family's layout.
    pub fn from_fields(fields: &[&str], family: LogFamily) -> Result<Self, FieldError> {
        let layout = family.record_layout();
        let required = layout.min_fields();
        if fields.len() < required {
            return Err(FieldError::TooFewFields {
                found: fields.len(),
                required,
            });
        }

        let from_end = |offset: usize| fields[fields.len() - offset];
        let timestamp = Timestamp::parse(from_end(layout.timestamp_from_end))?;
        let round = layout
            .round_from_end
            .map(|offset| strip_key(from_end(offset)).to_string());

        Ok(Self {
            node: fields[NODE_FIELD].to_string(),
            timestamp,
            round,
        })
    }

    /// Tokenize `line` and build a record from it.
    pub fn from_line(line: &str, family: LogFamily) -> Result<Self, FieldError> {
        Self::from_fields(&tokenize(line), family)
    }

    /// Node identifier with bracket decoration removed.
    pub fn node_id(&self) -> String {
        normalize_node(&self.node)
    }

    /// The merged-file line: `<node> <timestamp>[ <round>]`.
    pub fn summary_line(&self) -> String {
        match &self.round {
            Some(round) => format!("{} {} {}", self.node_id(), self.timestamp.text, round),
            None => format!("{} {}", self.node_id(), self.timestamp.text),
        }
    }
}

/// Remove every `]` and a leading `[` from a node token.
pub fn normalize_node(token: &str) -> String {
    let token = token.strip_prefix('[').unwrap_or(token);
    token.replace(']', "")
}

fn strip_key(token: &str) -> &str {
    match token.rfind('=') {
        Some(idx) => &token[idx + 1..],
        None => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn consensus_filter_is_substring_match() {
        assert!(is_consensus_line("[MSSNode 3] consensus reached at 120"));
        assert!(is_consensus_line("noconsensusx"));
        assert!(!is_consensus_line("[MSSNode 3] sending ACK to coordinator"));
        assert!(!is_consensus_line("Consensus"));
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(
            tokenize("  2024-01-01\t[nodeA]   sent  consensus \n"),
            vec!["2024-01-01", "[nodeA]", "sent", "consensus"]
        );
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn mh_record_uses_last_field() {
        let rec = ConsensusRecord::from_line(
            "2024-01-01 [nodeA] sent consensus msg ts=200",
            LogFamily::Mh,
        )
        .unwrap();
        assert_eq!(rec.node, "[nodeA]");
        assert_eq!(rec.timestamp.value, 200);
        assert_eq!(rec.round, None);
        assert_eq!(rec.summary_line(), "nodeA 200");
    }

    #[test]
    fn mss_record_uses_third_from_last_and_last() {
        let rec = ConsensusRecord::from_line(
            "2024-01-01 [nodeX] consensus reached 50 round 3",
            LogFamily::Mss,
        )
        .unwrap();
        assert_eq!(rec.timestamp.text, "50");
        assert_eq!(rec.round.as_deref(), Some("3"));
        assert_eq!(rec.summary_line(), "nodeX 50 3");
    }

    #[test]
    fn simulator_node_token_is_normalized() {
        let rec = ConsensusRecord::from_line("[MHNode 12] consensus reached at 340", LogFamily::Mh)
            .unwrap();
        assert_eq!(rec.node, "12]");
        assert_eq!(rec.summary_line(), "12 340");
    }

    #[test]
    fn normalize_strips_every_closing_bracket() {
        assert_eq!(normalize_node("[node3]"), "node3");
        assert_eq!(normalize_node("[node3"), "node3");
        assert_eq!(normalize_node("a]b]"), "ab");
        assert_eq!(normalize_node("plain"), "plain");
    }

    #[test]
    fn too_few_fields_is_rejected() {
        let err = ConsensusRecord::from_line("x consensus", LogFamily::Mh).unwrap_err();
        assert_eq!(err, FieldError::TooFewFields { found: 2, required: 3 });

        let err = ConsensusRecord::from_line("a [n] consensus 1", LogFamily::Mss).unwrap_err();
        assert_eq!(err, FieldError::TooFewFields { found: 4, required: 5 });
    }

    #[test]
    fn non_numeric_timestamp_is_rejected() {
        let err = ConsensusRecord::from_line("a [n] consensus soon", LogFamily::Mh).unwrap_err();
        assert_eq!(err, FieldError::InvalidTimestamp("soon".into()));
    }

    #[test]
    fn negative_timestamps_parse() {
        let ts = Timestamp::parse("-5").unwrap();
        assert_eq!(ts.value, -5);
        assert_eq!(ts.text, "-5");
    }

    proptest! {
        #[test]
        fn single_mh_line_is_reproduced(
            node in "[a-zA-Z][a-zA-Z0-9_]{0,11}",
            ts in 0i64..1_000_000_000,
        ) {
            let line = format!("2024-01-01 [{node}] consensus reached at {ts}");
            let rec = ConsensusRecord::from_line(&line, LogFamily::Mh).unwrap();
            prop_assert_eq!(rec.summary_line(), format!("{node} {ts}"));
        }

        #[test]
        fn single_mss_line_is_reproduced(
            node in "[a-zA-Z0-9]{1,8}",
            ts in 0i64..1_000_000_000,
            round in 0u32..10_000,
        ) {
            let line = format!("info {node}] consensus at {ts} round {round}");
            let rec = ConsensusRecord::from_line(&line, LogFamily::Mss).unwrap();
            prop_assert_eq!(rec.summary_line(), format!("{node} {ts} {round}"));
        }
    }
}
