//! 📂 Record input — turns a newline-delimited file into records for one invocation.
//!
//! One record per non-empty line. `\r\n` endings lose their `\r`. Files ending in `.gz` are
//! gunzipped first, because bandwidth is expensive and bytes are squishy.
//!
//! 🧠 Knowledge graph: this is the CLI's stand-in for the scheduler. Real schedulers build
//! `Record`s themselves and call `Publisher::send` directly.

use std::io::Read;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::info;

use crate::common::Record;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    pub file_name: String,
}

/// 🚀 Read the whole input file and split it into records.
pub async fn read_records(config: &InputConfig) -> Result<Vec<Record>> {
    let raw = tokio::fs::read(&config.file_name).await.with_context(|| {
        format!(
            "💀 Could not read input file '{}'. Does it exist? Is it yours to read?",
            config.file_name
        )
    })?;

    let bytes = if config.file_name.ends_with(".gz") {
        let mut inflated = Vec::with_capacity(raw.len() * 4);
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut inflated)
            .with_context(|| format!("💀 '{}' says it's gzip. It lied.", config.file_name))?;
        inflated
    } else {
        raw
    };

    let records = split_records(&bytes);
    info!(
        "📂 Read {} record(s) ({} bytes) from '{}'",
        records.len(),
        bytes.len(),
        config.file_name
    );
    Ok(records)
}

/// ✂️ Split on `\n` with memchr, trim a trailing `\r`, skip blank lines.
pub fn split_records(bytes: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut start = 0;
    for end in memchr::memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        let mut line = &bytes[start..end];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        if !line.is_empty() {
            records.push(Record::new(line));
        }
        start = end + 1;
    }
    records
}
