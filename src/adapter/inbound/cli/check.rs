//! Handler for `check config`.

use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::infrastructure::config::fetcher::API_KEY_ENV;
use crate::infrastructure::config::fetcher::FetcherConfig;
use crate::infrastructure::config::Config;

/// What `check config` found, beyond the file parsing cleanly.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigCheckReport {
    pub config_found: bool,
    pub fetcher: Option<String>,
    pub fetcher_api_key_present: bool,
    pub catalog_configured: bool,
    pub missing_catalog_files: Vec<String>,
    pub telegram_enabled: bool,
    pub telegram_token_present: bool,
    pub telegram_chat_present: bool,
    pub seed_routes: usize,
}

impl ConfigCheckReport {
    /// Inspect a parsed config and the environment it will run in.
    #[must_use]
    pub fn inspect(config: &Config, config_found: bool) -> Self {
        let env_present = |name: &str| std::env::var(name).is_ok_and(|v| !v.is_empty());
        let missing_catalog_files = config
            .resolver
            .catalog_paths()
            .map(|(airports, countries)| {
                [airports, countries]
                    .into_iter()
                    .filter(|path| !path.exists())
                    .map(|path| path.display().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            config_found,
            fetcher: config.fetcher.as_ref().map(FetcherConfig::describe),
            fetcher_api_key_present: env_present(API_KEY_ENV),
            catalog_configured: config.resolver.catalog_paths().is_some(),
            missing_catalog_files,
            telegram_enabled: config.telegram.enabled,
            telegram_token_present: env_present("TELEGRAM_BOT_TOKEN"),
            telegram_chat_present: env_present("TELEGRAM_CHAT_ID"),
            seed_routes: config.routes.len(),
        }
    }
}

/// Validate the configuration without starting the watcher.
///
/// Parsing and validation already happened while loading; reaching this
/// handler means the file is valid.
pub fn execute_config(path: &Path, config_found: bool, config: &Config) {
    let report = ConfigCheckReport::inspect(config, config_found);

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "config": path.display().to_string(),
            "valid": true,
            "report": report,
        }));
        return;
    }

    output::section("Configuration Check");
    output::field("Config", path.display());
    if report.config_found {
        output::success("Configuration file is valid");
    } else {
        output::warning("No configuration file, using defaults");
    }

    output::section("Summary");
    match &report.fetcher {
        Some(fetcher) => output::field("Fetcher", fetcher),
        None => output::warning("No [fetcher] configured; `farewatch run` needs one"),
    }
    if matches!(config.fetcher, Some(FetcherConfig::Http { .. })) && !report.fetcher_api_key_present
    {
        output::field("API key", format!("not set ({API_KEY_ENV})"));
    }

    if report.catalog_configured {
        if report.missing_catalog_files.is_empty() {
            output::success("Airport catalog files found");
        } else {
            for missing in &report.missing_catalog_files {
                output::warning(&format!("Catalog file not found: {missing}"));
            }
        }
    } else {
        output::field("Resolver", "literal airport codes only");
    }

    if report.telegram_enabled {
        if report.telegram_token_present && report.telegram_chat_present {
            output::success("Telegram integration configured");
        } else {
            output::warning("Telegram enabled but environment variables are missing");
            if !report.telegram_token_present {
                output::field("Missing", "TELEGRAM_BOT_TOKEN");
            }
            if !report.telegram_chat_present {
                output::field("Missing", "TELEGRAM_CHAT_ID");
            }
        }
    } else {
        output::field("Telegram", "disabled");
    }

    output::field("Seed routes", report.seed_routes);
    output::field("Same day", format!("{:?}", config.history.same_day).to_lowercase());
    output::success("Configuration check complete");
}
