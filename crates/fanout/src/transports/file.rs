use std::io::SeekFrom;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::trace;

use super::Transport;

// -- 📂 FileTransportConfig — "It's just a file", said no sysadmin ever before the disk filled up.
// -- Lives next to the transport that uses it. One backend = one config = one file.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FileTransportConfig {
    pub file_name: String,
}

/// 🚰 FileTransport — writes each published payload to disk, one per line. I/O only.
///
/// The destination is not written; the file IS the destination. Payloads are flushed on every
/// publish so that `Published` in an outcome means "it's on disk", not "it's in a buffer".
///
/// A line is either on disk whole or not at all: a failed write is cut back off the end of the
/// file, so the next payload never starts in the middle of a torn one.
///
/// ⚠️ `File::create` truncates if the file exists. No warning. No backup. Just gone.
/// He who runs this without checking the output path, re-publishes in shame.
#[derive(Debug)]
pub struct FileTransport {
    output: Mutex<OutputFile>,
    config: FileTransportConfig,
}

/// 📏 The file plus how many bytes of it are known-good whole lines.
#[derive(Debug)]
struct OutputFile {
    file: File,
    committed: u64,
}

impl OutputFile {
    async fn append_line(&mut self, payload: &[u8]) -> Result<()> {
        let mut line = Vec::with_capacity(payload.len() + 1);
        line.extend_from_slice(payload);
        line.push(b'\n');

        if let Err(err) = self.write_and_flush(&line).await {
            // -- ✂️ whatever half of the line made it out gets cut back off
            self.rollback()
                .await
                .context("💀 The write failed, and so did cutting the torn line back off. The file needs a human.")?;
            return Err(err);
        }
        self.committed += line.len() as u64;
        Ok(())
    }

    async fn write_and_flush(&mut self, line: &[u8]) -> Result<()> {
        self.file
            .write_all(line)
            .await
            .context("💀 Failed to write payload to the output file")?;
        self.file
            .flush()
            .await
            .context("💀 Failed to flush the output file. The disk may be full. The disk is always full.")?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.file.set_len(self.committed).await?;
        self.file.seek(SeekFrom::Start(self.committed)).await?;
        Ok(())
    }
}

impl FileTransport {
    /// 🚀 Creates (or obliterates and recreates) the output file.
    pub async fn new(config: FileTransportConfig) -> Result<Self> {
        let file = File::create(&config.file_name).await.with_context(|| {
            format!(
                "💀 Could not create '{}'. Check the directory exists and that we're allowed to write there.",
                config.file_name
            )
        })?;
        Ok(Self {
            output: Mutex::new(OutputFile { file, committed: 0 }),
            config,
        })
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn publish(&self, destination: &str, payload: &[u8]) -> Result<()> {
        trace!(
            "📂 Writing {} bytes for '{}' to {}",
            payload.len(),
            destination,
            self.config.file_name
        );
        // 🔒 one writer at a time, so concurrent publishes never interleave mid-line
        self.output.lock().await.append_line(payload).await
    }
}
