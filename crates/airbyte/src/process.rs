//! Process-backed source connector.
//!
//! Runs an Airbyte source executable with the standard command line:
//!
//! ```text
//! <program> <args..> read --config config.json --catalog catalog.json [--state state.json]
//! ```
//!
//! The JSON files are written to a scratch directory that lives for the
//! duration of the read. Stdout is parsed line by line; stderr is captured so
//! that a crash without an error trace still produces a useful message.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use reader::ConnectorError;

use crate::connector::SourceConnector;
use crate::protocol::{self, AirbyteMessage, ConfiguredAirbyteCatalog};

/// Number of trailing stderr lines quoted in a failure message.
const STDERR_TAIL_LINES: usize = 5;

/// Runs an Airbyte source as a child process.
#[derive(Debug, Clone)]
pub struct ProcessConnector {
    name: String,
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl ProcessConnector {
    /// Creates a connector that runs `program` directly (e.g. the
    /// `source-zendesk-support` entry point installed by the connector package).
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Adds arguments placed before the `read` subcommand
    /// (e.g. a wrapper script or container runner invocation).
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the child process.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Overrides the name used in logs and errors (defaults to the program).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the program that will be executed.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn unavailable(&self, message: impl Into<String>) -> ConnectorError {
        ConnectorError::Unavailable {
            connector: self.name.clone(),
            message: message.into(),
        }
    }

    async fn write_json(
        &self,
        dir: &Path,
        file: &str,
        value: &impl Serialize,
    ) -> Result<std::path::PathBuf, ConnectorError> {
        let path = dir.join(file);
        let bytes = serde_json::to_vec(value)
            .map_err(|e| self.unavailable(format!("failed to encode {file}: {e}")))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| self.unavailable(format!("failed to write {file}: {e}")))?;
        Ok(path)
    }
}

#[async_trait]
impl SourceConnector for ProcessConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(
        &self,
        config: &Value,
        catalog: &ConfiguredAirbyteCatalog,
        state: Option<&Value>,
    ) -> Result<Vec<AirbyteMessage>, ConnectorError> {
        // Must outlive the child process.
        let scratch = tempfile::tempdir()
            .map_err(|e| self.unavailable(format!("failed to create scratch directory: {e}")))?;

        let config_path = self.write_json(scratch.path(), "config.json", config).await?;
        let catalog_path = self.write_json(scratch.path(), "catalog.json", catalog).await?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("read")
            .arg("--config")
            .arg(&config_path)
            .arg("--catalog")
            .arg(&catalog_path);
        if let Some(state) = state {
            let state_path = self.write_json(scratch.path(), "state.json", state).await?;
            command.arg("--state").arg(state_path);
        }
        command
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(connector = %self.name, program = %self.program, "Spawning source connector");
        let mut child = command
            .spawn()
            .map_err(|e| self.unavailable(format!("failed to spawn '{}': {e}", self.program)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.unavailable("stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.unavailable("stderr was not captured"))?;

        // Drained concurrently so a chatty connector cannot block on a full pipe.
        let stderr_name = self.name.clone();
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                debug!(connector = %stderr_name, error = %e, captured = buf.len(), "Connector stderr cut short");
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut messages = Vec::new();
        let mut stdout = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = stdout
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| ConnectorError::Failed {
                    connector: self.name.clone(),
                    message: format!("failed to read connector output: {e}"),
                })?;
            if read == 0 {
                break;
            }
            // Undecodable bytes cannot be JSON; they fall through to the noise branch.
            let line = String::from_utf8_lossy(&buf);
            match protocol::parse_line(&line) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => debug!(connector = %self.name, line = %line, "Ignoring non-protocol output"),
                Err(e) => {
                    return Err(ConnectorError::Protocol {
                        connector: self.name.clone(),
                        message: format!("invalid message: {e}"),
                    })
                }
            }
        }

        let status = child.wait().await.map_err(|e| ConnectorError::Failed {
            connector: self.name.clone(),
            message: format!("failed to wait for connector: {e}"),
        })?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            if let Some(err) = protocol::first_error(&messages, &self.name) {
                return Err(err);
            }
            let tail: Vec<&str> = stderr
                .lines()
                .rev()
                .take(STDERR_TAIL_LINES)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            warn!(connector = %self.name, %status, "Source connector exited unsuccessfully");
            return Err(ConnectorError::Failed {
                connector: self.name.clone(),
                message: if tail.is_empty() {
                    format!("exited with {status}")
                } else {
                    format!("exited with {status}: {}", tail.join("\n"))
                },
            });
        }

        debug!(
            connector = %self.name,
            messages = messages.len(),
            "Source connector finished"
        );
        Ok(messages)
    }
}
