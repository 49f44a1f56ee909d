//! 🔧 App Configuration — the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! 🧠 Knowledge graph: there is no process-wide settings map. Whatever gets loaded here is
//! passed by value into the engine, the transport and the publisher at construction time.

use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::capacity::CapacityLimits;
use crate::common::Target;
use crate::input::InputConfig;
use crate::transports::TransportConfig;

/// 📦 The AppConfig: one struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 📬 Where records go and how they get squeezed.
    pub target: Target,
    /// 📏 Endpoint size constants. Leave it out and you get the reference topic endpoint.
    #[serde(default)]
    pub limits: CapacityLimits,
    pub transport: TransportConfig,
    pub input: InputConfig,
    /// 🔊 Louder lifecycle logging (transport creation, per-send summaries at `info`).
    #[serde(default)]
    pub debug: bool,
}

impl AppConfig {
    /// 🔒 Semantic checks serde can't express. The collapse mode was already checked by serde.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target.destination.trim().is_empty() {
            anyhow::bail!("💀 target.destination is empty. We need somewhere to send things.");
        }
        if self.limits.max_total_size == 0 {
            anyhow::bail!("💀 limits.max_total_size is 0. Nothing fits in nothing.");
        }
        if self.limits.max_records == Some(0) {
            anyhow::bail!("💀 limits.max_records is 0. Leave it out for 'unbounded'.");
        }
        Ok(())
    }
}

/// 🚀 Load the config — from a file, from env vars, or from the sheer power of hoping.
///
/// 🔧 Merges environment variables (FANOUT_*) with an optional TOML file.
///   - If `config_file_name` is None  → env vars only.
///   - If `config_file_name` is Some  → env vars + TOML file, merged. TOML wins on conflicts.
///
/// 💀 Returns an error if the config is unparseable, names an unknown collapse mode,
/// or fails `AppConfig::validate`.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("FANOUT_"));
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (FANOUT_*).",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (FANOUT_*). \
                 No file was provided — this one's all on the environment. Classic."
            .to_string(),
    };

    let app_config: AppConfig = config.extract().context(context_msg)?;
    app_config
        .validate()
        .context("💀 The configuration parsed, but it doesn't make sense")?;
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapsers::CollapseMode;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create a temp config. The filesystem said 'new phone who dis'.");
        file.write_all(contents.as_bytes())
            .expect("💀 Failed to write test config.");
        file
    }

    #[test]
    fn the_one_where_a_full_config_loads() {
        let file = write_test_config(
            r#"
            debug = true

            [target]
            destination = "arn:aws:sns:us-east-1:123456789012:orders"
            collapse = "json-array"

            [limits]
            max_total_size = 131072
            max_records = 50

            [transport.Http]
            url = "http://localhost:4566/topics"
            timeout_secs = 5

            [input]
            file_name = "records.ndjson"
            "#,
        );

        let app_config = load_config(Some(file.path()))
            .expect("💀 A complete config should parse. The schema drift goblin does not get this win.");

        assert!(app_config.debug);
        assert_eq!(app_config.target.collapse, CollapseMode::JsonArray);
        assert_eq!(app_config.limits.max_total_size, 131072);
        assert_eq!(app_config.limits.max_unit_size, 262144);
        assert_eq!(app_config.limits.max_records, Some(50));
        assert_eq!(app_config.input.file_name, "records.ndjson");
        match app_config.transport {
            TransportConfig::Http(http) => assert_eq!(http.timeout_secs, 5),
            honestly_who_knows => panic!(
                "💀 Expected Http transport config, but serde took us to {honestly_who_knows:?}. Plot twist energy."
            ),
        }
    }

    #[test]
    fn the_one_where_defaults_show_up_uninvited_but_helpful() {
        let file = write_test_config(
            r#"
            transport = "InMemory"

            [target]
            destination = "arn:aws:sns:us-east-1:123456789012:orders"

            [input]
            file_name = "records.ndjson"
            "#,
        );

        let app_config: AppConfig = Figment::new()
            .merge(Toml::file(file.path()))
            .extract()
            .expect("💀 Defaults should fill the gaps. Serde left us on read otherwise.");

        assert!(!app_config.debug);
        assert_eq!(app_config.target.collapse, CollapseMode::None);
        assert_eq!(app_config.limits, CapacityLimits::default());
        assert_eq!(app_config.transport, TransportConfig::InMemory);
    }

    #[test]
    fn the_one_where_an_unknown_mode_stops_the_show() {
        let file = write_test_config(
            r#"
            transport = "InMemory"

            [target]
            destination = "arn:aws:sns:us-east-1:123456789012:orders"
            collapse = "unknown"

            [input]
            file_name = "records.ndjson"
            "#,
        );

        let err = load_config(Some(file.path()))
            .expect_err("💀 'unknown' collapse mode should not load");
        assert!(format!("{err:#}").contains("unsupported collapse mode 'unknown'"));
    }

    #[test]
    fn the_one_where_an_empty_destination_is_rejected() {
        let file = write_test_config(
            r#"
            transport = "InMemory"

            [target]
            destination = "   "
            collapse = "concat"

            [input]
            file_name = "records.ndjson"
            "#,
        );

        let err = load_config(Some(file.path())).expect_err("💀 blank destination loaded");
        assert!(format!("{err:#}").contains("target.destination is empty"));
    }
}
