//! Raw and decoded event log types.

use alloy_primitives::B256;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::call::DecodedParam;

/// An undecoded log entry as fetched from a node: hex strings throughout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    /// topics[0] is the event signature hash; topics[1..] are indexed params.
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters, `0x`-prefixed (may be just `0x`).
    #[serde(default = "empty_data")]
    pub data: String,
}

fn empty_data() -> String {
    "0x".to_string()
}

impl RawLog {
    pub fn new(topics: Vec<String>, data: impl Into<String>) -> Self {
        Self {
            topics,
            data: data.into(),
        }
    }

    /// topics[0], if present.
    pub fn signature_topic(&self) -> Option<&str> {
        self.topics.first().map(|s| s.as_str())
    }

    /// Number of indexed values carried in the topics list.
    pub fn indexed_topic_count(&self) -> usize {
        self.topics.len().saturating_sub(1)
    }
}

/// A decoded event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLog {
    /// Event name (e.g. "Transfer")
    pub name: String,
    /// Canonical signature of the matched variant
    pub signature: String,
    /// The topic the event was matched on
    pub topic: B256,
    /// Decoded parameters in declaration order, indexed and non-indexed interleaved
    pub params: Vec<DecodedParam>,
    /// Parameters that failed to decode (label → reason)
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub decode_errors: IndexMap<String, String>,
}

impl DecodedLog {
    /// Get a decoded parameter by name.
    pub fn param(&self, name: &str) -> Option<&DecodedParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns `true` if any parameter failed to decode.
    pub fn has_errors(&self) -> bool {
        !self.decode_errors.is_empty()
    }
}
