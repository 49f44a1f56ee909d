//! 📏 Capacity Model — the bouncer with a tape measure.
//!
//! 🧠 Knowledge graph:
//! - `CapacityLimits` is the endpoint's size contract. Fixed per endpoint type, passed in at
//!   construction, never mutated. Two targets with different limits can collapse side by side.
//! - `CapacityModel::fits` is the pure verdict: "would these records, packed in this mode,
//!   squeeze through the door?" It never reorders, drops or splits anything. Splitting is the
//!   Collapsing Engine's job.
//! - `SizeTally` is the running count the engine keeps while greedily filling a group, so
//!   the check stays O(1) per record instead of re-summing the group every time.
//!
//! Size formulas, by mode:
//!
//! | Mode            | Estimated size                                                 |
//! |-----------------|----------------------------------------------------------------|
//! | `none`          | the single record's length                                     |
//! | `json-array`    | list + Σ(per_record + len) + inter_record × (n − 1)            |
//! | `concat`        | Σ len                                                          |
//! | `concat-base64` | 4 × ⌈Σ len / 3⌉ (padded base64, exactly what we emit)          |

use serde::Deserialize;

use crate::collapsers::CollapseMode;
use crate::common::Record;
use crate::errors::CollapseError;

/// 📐 The endpoint's size constants. Defaults describe the reference topic endpoint:
/// 256 KiB per message, records wrapped in `{"Records":[...]}`, comma-separated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapacityLimits {
    /// 🚪 Hard ceiling for one outbound message, in bytes.
    #[serde(default = "default_max_total_size")]
    pub max_total_size: usize,
    /// 🚪 Hard ceiling for one record's own payload, in bytes.
    #[serde(default = "default_max_unit_size")]
    pub max_unit_size: usize,
    /// 🔢 Optional cap on records per outbound message. `None` = bounded only by bytes.
    #[serde(default)]
    pub max_records: Option<usize>,
    /// `{"Records":[]}` — 14 bytes of envelope.
    #[serde(default = "default_list_overhead_bytes")]
    pub list_overhead_bytes: usize,
    #[serde(default)]
    pub per_record_overhead_bytes: usize,
    /// One comma between neighbors.
    #[serde(default = "default_inter_record_overhead_bytes")]
    pub inter_record_overhead_bytes: usize,
}

// 🚪 256 KiB. The topic endpoint has spoken. 256 * 1024 = 262144, the comment did the math.
fn default_max_total_size() -> usize {
    256 * 1024
}

fn default_max_unit_size() -> usize {
    256 * 1024
}

fn default_list_overhead_bytes() -> usize {
    14
}

fn default_inter_record_overhead_bytes() -> usize {
    1
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self {
            max_total_size: default_max_total_size(),
            max_unit_size: default_max_unit_size(),
            max_records: None,
            list_overhead_bytes: default_list_overhead_bytes(),
            per_record_overhead_bytes: 0,
            inter_record_overhead_bytes: default_inter_record_overhead_bytes(),
        }
    }
}

impl CapacityLimits {
    /// 🔒 Keys are routing metadata and never ride inside a payload. Not a knob. Always `false`.
    pub fn include_key_in_output(&self) -> bool {
        false
    }
}

/// ⚖️ The verdict: does it fit, and how big did we think it would be?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub ok: bool,
    pub estimated_size: usize,
}

/// 🧮 Running totals for a candidate group. Cheap to copy, cheap to extend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SizeTally {
    pub(crate) records: usize,
    pub(crate) bytes: usize,
}

impl SizeTally {
    #[inline]
    pub(crate) fn of(len: usize) -> Self {
        Self::default().with(len)
    }

    #[inline]
    pub(crate) fn with(self, len: usize) -> Self {
        Self {
            records: self.records + 1,
            bytes: self.bytes + len,
        }
    }
}

/// 📏 The tape measure itself. Holds the limits, answers size questions, has no other hobbies.
#[derive(Debug, Clone, Default)]
pub struct CapacityModel {
    limits: CapacityLimits,
}

impl CapacityModel {
    pub fn new(limits: CapacityLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &CapacityLimits {
        &self.limits
    }

    /// ⚖️ Would `records`, packed in `mode`, fit in one outbound message?
    ///
    /// # Errors
    /// - `TooManyRecords` when `mode` is `none` and more than one record shows up.
    /// - `RecordTooLarge` for the first record whose own payload exceeds `max_unit_size`.
    ///   Such a record can never be sent, so this is an error, not a `Fit { ok: false }`.
    pub fn fits(&self, records: &[Record], mode: CollapseMode) -> Result<Fit, CollapseError> {
        if mode == CollapseMode::None && records.len() > 1 {
            return Err(CollapseError::TooManyRecords {
                count: records.len(),
            });
        }
        let mut tally = SizeTally::default();
        for (index, record) in records.iter().enumerate() {
            self.check_unit(index, record)?;
            tally = tally.with(record.len());
        }
        Ok(self.verdict(tally, mode))
    }

    /// 🚪 The per-record gate. Independent of grouping.
    pub(crate) fn check_unit(&self, index: usize, record: &Record) -> Result<(), CollapseError> {
        if record.len() > self.limits.max_unit_size {
            return Err(CollapseError::RecordTooLarge {
                index,
                size: record.len(),
                limit: self.limits.max_unit_size,
            });
        }
        Ok(())
    }

    pub(crate) fn verdict(&self, tally: SizeTally, mode: CollapseMode) -> Fit {
        let estimated_size = self.estimate(tally, mode);
        let within_count = self
            .limits
            .max_records
            .is_none_or(|max| tally.records <= max);
        Fit {
            ok: within_count && estimated_size <= self.limits.max_total_size,
            estimated_size,
        }
    }

    pub(crate) fn estimate(&self, tally: SizeTally, mode: CollapseMode) -> usize {
        match mode {
            CollapseMode::None | CollapseMode::Concat => tally.bytes,
            CollapseMode::JsonArray => {
                self.limits.list_overhead_bytes
                    + tally.records * self.limits.per_record_overhead_bytes
                    + tally.bytes
                    + tally.records.saturating_sub(1) * self.limits.inter_record_overhead_bytes
            }
            // 🔤 padded base64: every started 3-byte chunk costs 4 characters
            CollapseMode::ConcatBase64 => tally.bytes.div_ceil(3) * 4,
        }
    }
}
