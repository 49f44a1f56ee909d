//! 📦 Common data structures — the building blocks of fanout.
//!
//! 🎬 COLD OPEN — INT. MESSAGE BUS — 3:47 AM
//!
//! A batch arrives from the scheduler. Forty records, one destination, one collapse mode.
//! None of the records know how big the topic's mailbox is. None of them asked.
//! They just want to be delivered. Relatable.
//!
//! These types ferry records in, and ferry outbound payloads (plus the receipts of which
//! records they carry) out. They don't ask questions. They carry the bytes.
//!
//! 🦆

use std::str::FromStr;

use serde::Deserialize;

use crate::collapsers::CollapseMode;
use crate::errors::CollapseError;

/// 🎯 A `Record` — one opaque payload plus an optional routing key.
///
/// The key is routing metadata ONLY. It never appears in any outbound payload, in any mode.
/// Not configurable. Not negotiable. The key stays home.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// 🔧 Partitioning hint from upstream. We carry it, we never serialize it.
    pub key: Option<String>,
    /// 📦 The raw bytes. Could be JSON, could be a haiku. We mostly don't care.
    pub data: Vec<u8>,
}

impl Record {
    /// 🏗️ A keyless record. The common case.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            key: None,
            data: data.into(),
        }
    }

    /// 🏗️ A record with a routing key riding shotgun.
    pub fn with_key(key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key: Some(key.into()),
            data: data.into(),
        }
    }

    /// 📏 Payload size in bytes. The key does not count — it never leaves the building.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 📡 Where the records go, and how they get squeezed on the way.
///
/// `collapse` deserializes through `CollapseMode::from_str`, so a config with an unknown mode
/// fails at load time, long before a single record is read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    /// 📬 Topic address (ARN or equivalent). Opaque to us beyond "not empty".
    pub destination: String,
    /// 🗜️ How to pack records into outbound messages.
    #[serde(default)]
    pub collapse: CollapseMode,
}

impl Target {
    pub fn new(destination: impl Into<String>, collapse: CollapseMode) -> Self {
        Self {
            destination: destination.into(),
            collapse,
        }
    }

    /// 🎛️ Build a target from the wire-visible mode string. Unknown modes are rejected here,
    /// before anybody gets the bright idea to default them to something.
    pub fn parse(destination: impl Into<String>, collapse: &str) -> Result<Self, CollapseError> {
        Ok(Self::new(destination, CollapseMode::from_str(collapse)?))
    }
}

/// 📨 One payload, ready for the transport, plus the receipt of which input records it carries.
///
/// `records` holds indices into the input slice handed to `collapse`, in order. The scheduler
/// maps outcomes back to its own records through them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub records: Vec<usize>,
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// 📏 Serialized size — the number the endpoint actually cares about.
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// 🧾 A collapse failure scoped to the records it affects.
///
/// One index for `RecordTooLarge`, the whole group for `InvalidRecordEncoding`.
/// Failures sit next to the successful messages — one bad record never sinks its neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseFailure {
    pub records: Vec<usize>,
    pub error: CollapseError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_the_key_does_not_count_toward_size() {
        let record = Record::with_key("partition-7", r#"{"a":1}"#);
        assert_eq!(record.len(), 7);
        assert_eq!(record.key.as_deref(), Some("partition-7"));
    }

    #[test]
    fn the_one_where_an_unknown_mode_never_makes_it_into_a_target() {
        let err = Target::parse("arn:aws:sns:us-east-1:123456789012:orders", "unknown")
            .expect_err("💀 'unknown' should not parse. It did. Chaos reigns.");
        assert_eq!(err, CollapseError::UnsupportedCollapseMode("unknown".into()));
    }

    #[test]
    fn the_one_where_a_target_deserializes_from_toml() -> anyhow::Result<()> {
        let target: Target = toml::from_str(
            r#"
            destination = "arn:aws:sns:us-east-1:123456789012:orders"
            collapse = "concat-base64"
            "#,
        )?;
        assert_eq!(target.collapse, CollapseMode::ConcatBase64);
        Ok(())
    }

    #[test]
    fn the_one_where_toml_with_a_bogus_mode_is_rejected() {
        let parsed: Result<Target, _> = toml::from_str(
            r#"
            destination = "arn:aws:sns:us-east-1:123456789012:orders"
            collapse = "zip-it-real-good"
            "#,
        );
        let err = parsed.expect_err("💀 serde accepted a mode we never heard of");
        assert!(err.to_string().contains("unsupported collapse mode"));
    }
}
