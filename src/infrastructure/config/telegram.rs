//! Telegram notification configuration.
//!
//! The bot token and chat id are secrets and come from the environment
//! (`TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`), never from the file.

use serde::Deserialize;

use crate::port::Severity;

/// Telegram notification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    /// Lowest severity that is sent.
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,
}

const fn default_min_severity() -> Severity {
    Severity::Info
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_severity: default_min_severity(),
        }
    }
}
