//! 🎬 *[camera pans across a dimly lit message bus]*
//! 🎬 "In a world where records must be delivered..."
//! 🎬 "One publisher dared to collapse them first."
//! 🎬 *[record scratch]* 🦆
//!
//! 📣 The Publisher — collapse, then dispatch, then hand back the receipt.
//!
//! 🧠 Knowledge graph:
//! - Owns a `CollapsingEngine` (with its limits), one `Target`, and one transport.
//!   Everything is fixed at construction, so publishers for different targets and limits
//!   can run side by side with nothing shared.
//! - `send` never retries. The `SendReport` tells the scheduler exactly which records
//!   failed permanently (collapse failures) and which need another try (failed or
//!   pending outcomes).

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::common::{CollapseFailure, Record, Target};
use crate::dispatch::{Outcome, dispatch_until};
use crate::engine::{CollapseReport, CollapsingEngine};
use crate::errors::CollapseError;
use crate::transports::{Transport, TransportBackend};

/// 🧾 The full receipt for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    /// 🔢 How many records the scheduler handed us.
    pub records: usize,
    /// 💀 Records that can never be sent as-is. Do not retry these.
    pub failures: Vec<CollapseFailure>,
    /// 📡 One entry per outbound message, in message order.
    pub outcomes: Vec<Outcome>,
}

impl SendReport {
    /// ✅ Every record collapsed and every message published.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.outcomes.iter().all(Outcome::success)
    }

    /// 🔁 Input indices of records whose message failed or never answered.
    pub fn records_to_retry(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.needs_retry())
            .flat_map(|outcome| outcome.records.iter().copied())
            .collect()
    }
}

#[derive(Debug)]
pub struct Publisher<T: Transport = TransportBackend> {
    engine: CollapsingEngine,
    target: Target,
    /// 🤝 Shared with every publish task, so a task we stop waiting for can still finish.
    transport: Arc<T>,
    debug: bool,
}

impl<T: Transport + 'static> Publisher<T> {
    pub fn new(engine: CollapsingEngine, target: Target, transport: T) -> Self {
        Self {
            engine,
            target,
            transport: Arc::new(transport),
            debug: false,
        }
    }

    /// 🔊 Promote per-send summaries from `debug` to `info`.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 📣 Collapse `records` and publish every resulting message, waiting for all of them.
    ///
    /// # Errors
    /// Only `TooManyRecords` (mode `none` with more than one record). Everything else is
    /// in the report.
    pub async fn send(&self, records: &[Record]) -> Result<SendReport, CollapseError> {
        self.send_until(records, std::future::pending::<()>()).await
    }

    /// 📣 Like [`Publisher::send`], but stops waiting for the transport once `abort` resolves.
    pub async fn send_until<A>(&self, records: &[Record], abort: A) -> Result<SendReport, CollapseError>
    where
        A: Future<Output = ()>,
    {
        let CollapseReport { outbound, failures } = self.engine.collapse(records, &self.target)?;
        for failure in &failures {
            warn!("💀 Record(s) {:?} will not be sent: {}", failure.records, failure.error);
        }

        let outcomes = dispatch_until(&outbound, &self.target, &self.transport, abort).await;

        let report = SendReport {
            records: records.len(),
            failures,
            outcomes,
        };
        let published = report.outcomes.iter().filter(|o| o.success()).count();
        let summary = format!(
            "📣 '{}' ({}): {} record(s) → {} message(s), {} published, {} collapse failure(s)",
            self.target.destination,
            self.target.collapse,
            report.records,
            report.outcomes.len(),
            published,
            report.failures.len()
        );
        if self.debug {
            info!("{summary}");
        } else {
            debug!("{summary}");
        }
        Ok(report)
    }
}
