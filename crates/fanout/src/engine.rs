//! 🎬 *[forty records walk into a topic. the topic says "256 KiB, max". the records look at each other.]*
//!
//! 🧩 The Collapsing Engine — decides how many outbound messages a batch needs, and builds them.
//!
//! 🧠 Knowledge graph:
//! - Greedy forward fill: keep appending records to the current group while `CapacityModel`
//!   says it fits; the first record that would overflow closes the group and opens the next.
//!   One pass, no look-ahead, deterministic. Minimal-ish message count, never an overflow.
//! - Oversized records are pulled aside as `RecordTooLarge` failures and the fill continues
//!   around them. One whale does not sink the boat.
//! - A group whose transform fails (`json-array` with a non-JSON record) becomes one failure
//!   covering the whole group. Its neighbors still ship.
//! - Pure. No I/O, no logging, no shared state. Same input, same bytes, every time.
//!
//! ```text
//! records ──▶ partition (CapacityModel) ──▶ groups ──▶ CollapserBackend ──▶ OutboundMessage[]
//!                   │                                        │
//!                   └──▶ RecordTooLarge ─────────┬───────────┴──▶ InvalidRecordEncoding
//!                                                ▼
//!                                        CollapseFailure[]
//! ```

use crate::capacity::{CapacityLimits, CapacityModel, SizeTally};
use crate::collapsers::{CollapseMode, Collapser, CollapserBackend};
use crate::common::{CollapseFailure, OutboundMessage, Record, Target};
use crate::errors::CollapseError;

/// 📋 What came out of one `collapse` call: the messages to send and the records we couldn't.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseReport {
    pub outbound: Vec<OutboundMessage>,
    pub failures: Vec<CollapseFailure>,
}

impl CollapseReport {
    /// 🔢 How many input records made it into some outbound message.
    pub fn collapsed_records(&self) -> usize {
        self.outbound.iter().map(|m| m.records.len()).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollapsingEngine {
    capacity: CapacityModel,
}

impl CollapsingEngine {
    pub fn new(limits: CapacityLimits) -> Self {
        Self {
            capacity: CapacityModel::new(limits),
        }
    }

    pub fn capacity(&self) -> &CapacityModel {
        &self.capacity
    }

    /// 🗜️ Pack `records` for `target` into as few outbound messages as the greedy fill allows.
    ///
    /// Zero records → empty report. Per-record and per-group problems land in
    /// `report.failures`; only a scheduler bug (`TooManyRecords` in mode `none`) is an `Err`,
    /// and then nothing is produced at all.
    pub fn collapse(
        &self,
        records: &[Record],
        target: &Target,
    ) -> Result<CollapseReport, CollapseError> {
        let mode = target.collapse;
        if mode == CollapseMode::None && records.len() > 1 {
            return Err(CollapseError::TooManyRecords {
                count: records.len(),
            });
        }

        let (groups, mut failures) = self.partition(records, mode);
        let collapser = CollapserBackend::from_mode(mode);

        let mut outbound = Vec::with_capacity(groups.len());
        for group in groups {
            match collapser.materialize(records, &group) {
                Ok(payload) => outbound.push(OutboundMessage {
                    records: group,
                    payload,
                }),
                Err(error) => failures.push(CollapseFailure {
                    records: group,
                    error,
                }),
            }
        }
        // -- 📋 report failures in input order, whichever stage caught them
        failures.sort_by_key(|failure| failure.records.first().copied());

        Ok(CollapseReport { outbound, failures })
    }

    /// 🧩 Greedy forward fill over the records that can be sent at all.
    fn partition(
        &self,
        records: &[Record],
        mode: CollapseMode,
    ) -> (Vec<Vec<usize>>, Vec<CollapseFailure>) {
        let mut groups = Vec::new();
        let mut failures = Vec::new();
        let mut current: Vec<usize> = Vec::new();
        let mut tally = SizeTally::default();

        for (index, record) in records.iter().enumerate() {
            if let Err(error) = self.capacity.check_unit(index, record) {
                failures.push(CollapseFailure {
                    records: vec![index],
                    error,
                });
                continue;
            }

            // -- 🐋 fits the unit limit but not even alone once wrapped/encoded: same fate
            let alone = SizeTally::of(record.len());
            let solo = self.capacity.verdict(alone, mode);
            if !solo.ok {
                failures.push(CollapseFailure {
                    records: vec![index],
                    error: CollapseError::RecordTooLarge {
                        index,
                        size: solo.estimated_size,
                        limit: self.capacity.limits().max_total_size,
                    },
                });
                continue;
            }

            let candidate = tally.with(record.len());
            if current.is_empty() || self.capacity.verdict(candidate, mode).ok {
                current.push(index);
                tally = candidate;
            } else {
                groups.push(std::mem::take(&mut current));
                current.push(index);
                tally = alone;
            }
        }

        if !current.is_empty() {
            groups.push(current);
        }
        (groups, failures)
    }
}
