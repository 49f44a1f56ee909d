//! 🎬 *[the group has been chosen. the bytes are waiting. someone must wrap them.]*
//! *["Squeeze me," whispers the payload. "But not past 256 KiB."]*
//!
//! 🗜️ The Collapsers module — one transform per collapse mode.
//!
//! A collapser receives a group the engine already sized and turns it into the exact bytes
//! that go over the wire. It never decides grouping. It never checks limits. It wraps.
//!
//! 🧠 Knowledge graph:
//! - **none** (`SingleRecord`): one record, raw bytes, no wrapping.
//! - **json-array** (`JsonRecords`): `{"Records":[<record>,<record>]}`, each record embedded as JSON.
//! - **concat** (`Concat`): raw bytes back to back. No separators. Good luck, consumer.
//! - **concat-base64** (`ConcatBase64`): the same concatenation, then base64.
//! - Pattern: trait → zero-sized impls → `CollapserBackend` enum → `from_mode` resolver.
//!   The match is exhaustive, so adding a mode without a transform is a compile error.
//!
//! ```text
//! CollapsingEngine:
//!   records → greedy groups (CapacityModel) → collapser.materialize(group) → OutboundMessage
//! ```
//!
//! 🦆 (the duck has been compressed. it is fine. it is a smaller duck now.)

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::Record;
use crate::errors::CollapseError;

pub(crate) mod concat;
pub(crate) mod concat_base64;
pub(crate) mod json_records;
pub(crate) mod single;

pub(crate) use concat::Concat;
pub(crate) use concat_base64::ConcatBase64;
pub(crate) use json_records::JsonRecords;
pub(crate) use single::SingleRecord;

// ===== Mode =====

/// 🎛️ How records get packed into outbound messages. Wire-visible as a string on the target.
///
/// Deserialization goes through `FromStr`, so an unknown string is an
/// `UnsupportedCollapseMode` at config time. There is no fallthrough arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum CollapseMode {
    /// 📨 One record per message, sent as-is.
    #[default]
    None,
    /// 📦 `{"Records":[...]}` — records must be JSON.
    JsonArray,
    /// 🔗 Raw bytes, appended.
    Concat,
    /// 🔤 Raw bytes, appended, then base64.
    ConcatBase64,
}

impl CollapseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::JsonArray => "json-array",
            Self::Concat => "concat",
            Self::ConcatBase64 => "concat-base64",
        }
    }
}

impl FromStr for CollapseMode {
    type Err = CollapseError;

    /// 🔧 `JSON` and `concat-b64` are the legacy spellings older target configs still carry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "json-array" | "JSON" => Ok(Self::JsonArray),
            "concat" => Ok(Self::Concat),
            "concat-base64" | "concat-b64" => Ok(Self::ConcatBase64),
            other => Err(CollapseError::UnsupportedCollapseMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for CollapseMode {
    type Error = CollapseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CollapseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Trait =====

/// 🗜️ Turns one pre-sized group of records into a wire payload.
///
/// `group` holds indices into `records`, in input order, never empty. Implementations
/// report errors with the input index of the record that caused them.
pub(crate) trait Collapser: fmt::Debug {
    fn materialize(&self, records: &[Record], group: &[usize]) -> Result<Vec<u8>, CollapseError>;
}

// ===== Dispatcher Enum =====

/// 🎭 The polymorphic collapser — wraps the concrete collapsers, dispatches via match.
///
/// Same pattern as `TransportBackend`. Every collapser is zero-sized; cloning this is free.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CollapserBackend {
    Single(SingleRecord),
    JsonRecords(JsonRecords),
    Concat(Concat),
    ConcatBase64(ConcatBase64),
}

impl CollapserBackend {
    /// 🔧 Resolve the collapser for a mode.
    ///
    /// | Mode            | Collapser      | Payload                    |
    /// |-----------------|----------------|----------------------------|
    /// | `none`          | SingleRecord   | `rec`                      |
    /// | `json-array`    | JsonRecords    | `{"Records":[rec,rec]}`    |
    /// | `concat`        | Concat         | `recrec`                   |
    /// | `concat-base64` | ConcatBase64   | `base64(recrec)`           |
    pub(crate) fn from_mode(mode: CollapseMode) -> Self {
        match mode {
            CollapseMode::None => Self::Single(SingleRecord),
            CollapseMode::JsonArray => Self::JsonRecords(JsonRecords),
            CollapseMode::Concat => Self::Concat(Concat),
            CollapseMode::ConcatBase64 => Self::ConcatBase64(ConcatBase64),
        }
    }
}

impl Collapser for CollapserBackend {
    #[inline]
    fn materialize(&self, records: &[Record], group: &[usize]) -> Result<Vec<u8>, CollapseError> {
        match self {
            Self::Single(c) => c.materialize(records, group),
            Self::JsonRecords(c) => c.materialize(records, group),
            Self::Concat(c) => c.materialize(records, group),
            Self::ConcatBase64(c) => c.materialize(records, group),
        }
    }
}
