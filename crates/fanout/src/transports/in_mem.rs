//! 📦 A transport that never forgets. Unlike my dad, who forgot my soccer game in 1998.
//!
//! `InMemoryTransport` hoards every published payload in a shared Vec wrapped in a Mutex
//! wrapped in an Arc. It's types all the way down. Clone it before handing it off and the
//! clone sees everything the original publishes. Great for assertions. Great for dry runs.
//!
//! ⚠️ This is NOT for production. If you're deploying this to prod, please also deploy a therapist.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Transport;

/// 📬 One accepted publish call, exactly as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub destination: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryTransport {
    /// 🔒 The evidence locker. Arc so clones share it, Mutex so concurrent publishes queue up.
    received: Arc<Mutex<Vec<Published>>>,
}

impl InMemoryTransport {
    /// 📋 Snapshot of everything published so far, in arrival order.
    pub async fn published(&self) -> Vec<Published> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    /// 📡 Lock, push, done. Like a fax machine but for bytes. 🦆
    async fn publish(&self, destination: &str, payload: &[u8]) -> Result<()> {
        self.received.lock().await.push(Published {
            destination: destination.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
