use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace};

use super::Transport;

/// 📡 Where the topic gateway lives. Each publish is a POST to `{url}/{destination}`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub url: String,
    /// ⏱️ Per-request timeout. We will wait, but not forever.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 📡 Publishes payloads over HTTP. One request per outbound message, no retries.
///
/// Any non-2xx status is a failure, and the response body rides along in the reason
/// so whoever reads the outcome has something better than "400".
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        // 🔧 10 second connect timeout: if the gateway can't handshake in 10 seconds,
        // it's not having a good time and neither are we.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("💀 The HTTP client refused to be born. Probably TLS. It's always TLS.")?;
        Ok(Self { client, config })
    }

    fn publish_url(&self, destination: &str) -> String {
        // -- 🧹 one slash of difference, infinite suffering of difference
        format!("{}/{}", self.config.url.trim_end_matches('/'), destination)
    }
}

/// 🧾 The error body, or a note that there was one and we couldn't read it.
fn describe_body<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    match body {
        Ok(body) => body,
        Err(err) => {
            trace!("🙈 Couldn't read the error response body: {err}");
            format!("<unreadable body: {err}>")
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn publish(&self, destination: &str, payload: &[u8]) -> Result<()> {
        let url = self.publish_url(destination);
        debug!("📡 POSTing {} bytes to {}", payload.len(), url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .body(payload.to_vec())
            .send()
            .await
            .with_context(|| format!("💀 The publish request to '{url}' never made it. Check connectivity."))?;

        let status = response.status();
        if !status.is_success() {
            let body = describe_body(response.text().await);
            anyhow::bail!("💀 The topic gateway answered {status} for '{destination}': {body}");
        }
        trace!("🚀 Published to '{}'", destination);
        Ok(())
    }
}
