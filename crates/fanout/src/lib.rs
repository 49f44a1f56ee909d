//! 📣 fanout — packs batches of records into as few size-limited pub/sub messages as possible,
//! publishes them, and reports what happened to every one.
//!
//! ```text
//! scheduler ──▶ Publisher ──▶ CollapsingEngine ──▶ CapacityModel
//!                   │                 │
//!                   │                 └──▶ OutboundMessage[] + CollapseFailure[]
//!                   └──▶ dispatch ──▶ Transport::publish × N ──▶ Outcome[]
//! ```

pub mod app_config;
pub mod capacity;
pub mod collapsers;
pub mod common;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod input;
pub mod publisher;
pub mod transports;

use anyhow::{Context, Result};

pub use capacity::{CapacityLimits, CapacityModel, Fit};
pub use collapsers::CollapseMode;
pub use common::{CollapseFailure, OutboundMessage, Record, Target};
pub use dispatch::{DeliveryStatus, Outcome, dispatch, dispatch_until};
pub use engine::{CollapseReport, CollapsingEngine};
pub use errors::CollapseError;
pub use publisher::{Publisher, SendReport};
pub use transports::{Transport, TransportBackend};

use crate::app_config::AppConfig;

/// 🚀 One invocation, end to end: read the input file, build the transport, collapse, publish.
pub async fn run(app_config: AppConfig) -> Result<SendReport> {
    let records = input::read_records(&app_config.input)
        .await
        .context("💀 Failed to read the records to publish")?;

    let transport = TransportBackend::from_config(app_config.transport, app_config.debug)
        .await
        .context("💀 Failed to set up the transport")?;

    let publisher = Publisher::new(
        CollapsingEngine::new(app_config.limits),
        app_config.target,
        transport,
    )
    .with_debug(app_config.debug);

    publisher
        .send(&records)
        .await
        .context("💀 The batch could not be collapsed for this target")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputConfig;
    use crate::transports::{FileTransportConfig, TransportConfig};

    #[tokio::test]
    async fn the_one_where_a_file_goes_in_and_envelopes_come_out() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input_path = dir.path().join("records.ndjson");
        let output_path = dir.path().join("published.out");
        std::fs::write(&input_path, "{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n")?;

        let app_config = AppConfig {
            target: Target::parse("arn:aws:sns:us-east-1:123456789012:orders", "json-array")?,
            limits: CapacityLimits {
                // 🧪 room for exactly two records per envelope
                max_total_size: 30,
                ..CapacityLimits::default()
            },
            transport: TransportConfig::File(FileTransportConfig {
                file_name: output_path.to_string_lossy().into_owned(),
            }),
            input: InputConfig {
                file_name: input_path.to_string_lossy().into_owned(),
            },
            debug: false,
        };

        let report = run(app_config).await?;

        assert!(report.is_clean());
        assert_eq!(report.outcomes.len(), 2);
        let mut lines: Vec<String> = std::fs::read_to_string(&output_path)?
            .lines()
            .map(str::to_owned)
            .collect();
        lines.sort();
        assert_eq!(
            lines,
            vec![
                r#"{"Records":[{"a":1},{"b":2}]}"#.to_string(),
                r#"{"Records":[{"c":3}]}"#.to_string(),
            ]
        );
        Ok(())
    }
}
