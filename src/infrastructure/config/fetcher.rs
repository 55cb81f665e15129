//! Price source configuration.

use serde::Deserialize;

/// Environment variable holding the HTTP price service key.
pub const API_KEY_ENV: &str = "FAREWATCH_FETCHER_API_KEY";

/// Where prices come from.
///
/// ```toml
/// [fetcher]
/// type = "command"
/// program = "kayak-scraper"
/// args = ["--headless"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FetcherConfig {
    /// Run a program per fetch; route JSON on stdin, fare JSON on stdout.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// POST the route to an HTTP endpoint.
    Http {
        url: String,
    },
}

impl FetcherConfig {
    /// Short label for status output.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Command { program, args } if args.is_empty() => format!("command {program}"),
            Self::Command { program, args } => format!("command {program} {}", args.join(" ")),
            Self::Http { url } => format!("http {url}"),
        }
    }
}
