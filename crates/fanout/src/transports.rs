//! 🔌 Transports — where the bytes actually leave.
//!
//! 🚰 The collapsing core hands over finished payloads; a transport publishes them. That's it.
//! No buffering, no retries, no opinions about the payload. Like a postal worker who
//! delivers the mail without reading it. (Unlike your actual postal worker, Kevin.)
//!
//! 🧠 Knowledge graph:
//! - Pattern: `Transport` trait → concrete impls (`InMemoryTransport`, `FileTransport`,
//!   `HttpTransport`) → `TransportBackend` enum → `from_config` resolver.
//! - Failure is an `anyhow::Error` whose text ends up, unchanged, in the `Outcome`.
//!   Transient vs permanent is the transport's call, not ours.
//!
//! 🦆 The duck is here because every file must have one. This is law.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

pub mod file;
pub mod http;
pub mod in_mem;

pub use file::{FileTransport, FileTransportConfig};
pub use http::{HttpTransport, HttpTransportConfig};
pub use in_mem::InMemoryTransport;

/// 📡 The publish capability. One call, one payload, one verdict.
///
/// # Contract 📜
/// - Accepts payloads up to the endpoint's `max_total_size`.
/// - `Ok(())` means the endpoint accepted the message. `Err` carries the reason.
/// - Must not retry internally; the scheduler owns retries.
/// - `&self`, not `&mut self`: the dispatch adapter publishes many messages concurrently.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    async fn publish(&self, destination: &str, payload: &[u8]) -> Result<()>;
}

/// 🔧 Which transport to build, and its knobs. Externally tagged in TOML:
///
/// ```toml
/// transport = "InMemory"
///
/// [transport.File]
/// file_name = "published.out"
///
/// [transport.Http]
/// url = "http://localhost:4566/topics"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum TransportConfig {
    InMemory,
    File(FileTransportConfig),
    Http(HttpTransportConfig),
}

/// 🎭 The many faces of a Transport, dispatched by match.
#[derive(Debug)]
pub enum TransportBackend {
    InMemory(InMemoryTransport),
    File(FileTransport),
    Http(HttpTransport),
}

impl TransportBackend {
    /// 🚀 Build the configured transport. With `debug` on, creation is announced at `info`.
    pub async fn from_config(config: TransportConfig, debug: bool) -> Result<Self> {
        let backend = match config {
            TransportConfig::InMemory => Self::InMemory(InMemoryTransport::default()),
            TransportConfig::File(file_config) => Self::File(
                FileTransport::new(file_config)
                    .await
                    .context("💀 Could not open the file transport's output file")?,
            ),
            TransportConfig::Http(http_config) => Self::Http(
                HttpTransport::new(http_config)
                    .context("💀 Could not build the HTTP transport")?,
            ),
        };
        if debug {
            info!("🔌 Created new transport instance: {}", backend.kind());
        } else {
            debug!("🔌 Created new transport instance: {}", backend.kind());
        }
        Ok(backend)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "in-memory",
            Self::File(_) => "file",
            Self::Http(_) => "http",
        }
    }
}

#[async_trait]
impl Transport for TransportBackend {
    async fn publish(&self, destination: &str, payload: &[u8]) -> Result<()> {
        match self {
            Self::InMemory(t) => t.publish(destination, payload).await,
            Self::File(t) => t.publish(destination, payload).await,
            Self::Http(t) => t.publish(destination, payload).await,
        }
    }
}
