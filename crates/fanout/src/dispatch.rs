//! 🎬 *[N payloads leave the building at once. N answers come back, eventually. probably.]*
//!
//! 📡 The Dispatch Adapter — one publish per outbound message, one outcome per publish.
//!
//! 🧠 Knowledge graph:
//! - Fan-out/fan-in: every publish is spawned onto the runtime together (`JoinSet`), and the
//!   outcome list comes back only once every one of them has landed. No partial returns.
//! - No short-circuit: a failed publish is written down and the others keep going.
//! - No retries. Single attempt, pass-through. The scheduler reads the outcomes and decides.
//! - Abort: `dispatch_until` stops waiting when the abort future resolves. In-flight publishes
//!   are detached, not dropped, so a half-sent POST still gets to finish. They are just not
//!   waited for. Their outcome stays `Pending`: "maybe sent, retry to be sure".

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::common::{OutboundMessage, Target};
use crate::transports::Transport;

/// 🚦 What happened to one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// ✅ The transport said yes.
    Published,
    /// 💀 The transport said no. The reason is the transport's, passed through unchanged.
    Failed { reason: String },
    /// ⏳ We stopped waiting before the transport answered. Unknown, retry it.
    Pending,
}

/// 🧾 One row of the receipt: which message, which records, what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message_index: usize,
    pub records: Vec<usize>,
    pub bytes: usize,
    pub status: DeliveryStatus,
}

impl Outcome {
    pub fn success(&self) -> bool {
        self.status == DeliveryStatus::Published
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.status {
            DeliveryStatus::Failed { reason } => Some(reason),
            DeliveryStatus::Published | DeliveryStatus::Pending => None,
        }
    }

    /// 🔁 Failed and unknown outcomes both go back to the scheduler for another try.
    pub fn needs_retry(&self) -> bool {
        !self.success()
    }
}

/// 📡 Publish every message to `target.destination` and wait for all of them.
pub async fn dispatch<T>(
    outbound: &[OutboundMessage],
    target: &Target,
    transport: &Arc<T>,
) -> Vec<Outcome>
where
    T: Transport + ?Sized + 'static,
{
    dispatch_until(outbound, target, transport, std::future::pending::<()>()).await
}

/// 📡 Like [`dispatch`], but gives up waiting once `abort` resolves.
///
/// Whatever finished before the abort keeps its real status; the rest are `Pending`.
/// Completions that are already ready win over the abort.
pub async fn dispatch_until<T, A>(
    outbound: &[OutboundMessage],
    target: &Target,
    transport: &Arc<T>,
    abort: A,
) -> Vec<Outcome>
where
    T: Transport + ?Sized + 'static,
    A: Future<Output = ()>,
{
    debug!(
        "📡 Dispatching {} message(s) to '{}'",
        outbound.len(),
        target.destination
    );

    let mut outcomes: Vec<Outcome> = outbound
        .iter()
        .enumerate()
        .map(|(message_index, message)| Outcome {
            message_index,
            records: message.records.clone(),
            bytes: message.len(),
            status: DeliveryStatus::Pending,
        })
        .collect();

    // 🚀 Each publish owns what it needs, so it can outlive this function if we stop waiting.
    let destination: Arc<str> = Arc::from(target.destination.as_str());
    let mut in_flight = JoinSet::new();
    for (message_index, message) in outbound.iter().enumerate() {
        let transport = Arc::clone(transport);
        let destination = Arc::clone(&destination);
        let payload = message.payload.clone();
        in_flight.spawn(async move {
            let result = transport.publish(&destination, &payload).await;
            (message_index, result)
        });
    }

    tokio::pin!(abort);
    loop {
        tokio::select! {
            biased;
            landed = in_flight.join_next() => match landed {
                Some(Ok((message_index, Ok(())))) => {
                    trace!("✅ Message #{message_index} published");
                    outcomes[message_index].status = DeliveryStatus::Published;
                }
                Some(Ok((message_index, Err(err)))) => {
                    // -- 💀 written down, not thrown. The siblings keep flying.
                    warn!("💀 Message #{message_index} failed to publish: {err:#}");
                    outcomes[message_index].status = DeliveryStatus::Failed {
                        reason: format!("{err:#}"),
                    };
                }
                Some(Err(join_err)) => {
                    // -- 🙀 the transport panicked. Nobody knows if it sent; that message stays Pending.
                    warn!("💀 A publish task died before answering: {join_err}");
                }
                None => break,
            },
            () = &mut abort => {
                warn!(
                    "⏳ Dispatch aborted with {} publish(es) still in flight. Reporting them as pending, letting them finish",
                    in_flight.len()
                );
                // -- 🪁 let go of the string. Dropping the set would abort every task in it.
                in_flight.detach_all();
                break;
            }
        }
    }

    outcomes
}
