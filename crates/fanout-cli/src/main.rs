//! 🚀 fanout-cli — the front door, the bouncer, the maitre d' of fanout.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary crate is the thin CLI wrapper that loads config,
//! sets up logging, runs one publish invocation and prints the receipt.
//! Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use fanout::{DeliveryStatus, SendReport};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// 📣 Collapse a file of records into as few topic messages as fit, and publish them.
#[derive(Debug, Parser)]
#[command(name = "fanout", version)]
struct Args {
    /// 🔧 TOML config file. If it doesn't exist, config comes from FANOUT_* env vars only.
    #[arg(default_value = "fanout.toml")]
    config: PathBuf,
}

/// 🚀 main() — where it all begins. The genesis. The big bang.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args
/// 3. Load config (the moment of truth)
/// 4. Run the thing (send it and pray 🙏)
/// 5. Print the receipt, exit non-zero if anything didn't make it
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // 🔒 A missing file is fine (env-only config); an unreadable path is not.
    let config_file = args.config.as_path();
    let config_file_if_it_exists = match config_file.try_exists().with_context(|| {
        format!(
            "💀 Couldn't check whether the configuration file exists. Was checking here: '{}'",
            config_file.display()
        )
    })? {
        true => Some(config_file),
        false => None,
    };

    let app_config = fanout::app_config::load_config(config_file_if_it_exists)
        .context("💀 In fanout-cli, main, we couldn't load the configuration. Take a look at the file and the FANOUT_* env vars.")?;

    match fanout::run(app_config).await {
        Ok(report) => {
            println!("{}", render_report(&report));
            if !report.is_clean() {
                // -- 🔁 the table already said which ones; the exit code tells the shell
                std::process::exit(1);
            }
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one layer at a time
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
            }
            std::process::exit(1);
        }
    }

    // ✅ If we got here, everything worked. Pop the champagne. 🍾
    Ok(())
}

/// 🍽️ One row per outbound message, then one row per record we refused to send.
fn render_report(report: &SendReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["message", "records", "bytes", "status"]);

    for outcome in &report.outcomes {
        let status = match &outcome.status {
            DeliveryStatus::Published => "✅ published".to_string(),
            DeliveryStatus::Failed { reason } => format!("💀 failed: {reason}"),
            DeliveryStatus::Pending => "⏳ pending".to_string(),
        };
        table.add_row(vec![
            Cell::new(outcome.message_index),
            Cell::new(format!("{:?}", outcome.records)),
            Cell::new(outcome.bytes),
            Cell::new(status),
        ]);
    }

    for failure in &report.failures {
        table.add_row(vec![
            Cell::new("-"),
            Cell::new(format!("{:?}", failure.records)),
            Cell::new("-"),
            Cell::new(format!("🚫 not sent: {}", failure.error)),
        ]);
    }

    table
}
