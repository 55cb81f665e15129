//! Fetcher that runs an external scraper program.
//!
//! The resolved route is written to the child's stdin as JSON and the fare
//! is read from its stdout. A non-zero exit status is a network failure
//! carrying the child's stderr. The child is killed if the fetch is
//! cancelled, which is how the scheduler's timeout reaches it.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::{PriceObservation, ResolvedRoute};
use crate::error::FetchError;
use crate::port::PriceFetcher;

use super::payload::{parse_observation, today};

/// Runs `program args...` once per fetch.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandFetcher {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl PriceFetcher for CommandFetcher {
    async fn fetch(&self, route: &ResolvedRoute) -> Result<PriceObservation, FetchError> {
        let input = serde_json::to_vec(route).map_err(|e| FetchError::Parse(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FetchError::Network(format!("failed to start {}: {e}", self.program.display()))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A scraper that ignores its input may close stdin early.
            if let Err(e) = stdin.write_all(&input).await {
                debug!(error = %e, "Price command closed stdin");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Network(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_observation(&stdout, today())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
