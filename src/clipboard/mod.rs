//! Copying a selected entry back to the system clipboard
//!
//! The clipboard itself is owned by an external utility; this module only
//! feeds it bytes.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Clipboard errors
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The clipboard utility could not be started or fed
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The clipboard utility reported failure
    #[error("{program} exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

/// Destination for copied-out entries
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Replace the clipboard content with `content`
    async fn copy(&self, content: &[u8]) -> Result<(), ClipboardError>;

    /// Get sink name
    fn name(&self) -> &str;
}

/// Wayland clipboard through `wl-copy`
#[derive(Debug, Clone)]
pub struct WlCopy {
    program: String,
}

impl Default for WlCopy {
    fn default() -> Self {
        Self::with_program("wl-copy")
    }
}

impl WlCopy {
    /// Use another program with `wl-copy`'s stdin contract
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> ClipboardError {
        ClipboardError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

#[async_trait]
impl ClipboardSink for WlCopy {
    async fn copy(&self, content: &[u8]) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(content)
                .await
                .map_err(|e| self.spawn_error(e))?;
            // Closing stdin lets the program see EOF
            drop(stdin);
        }

        let status = child.wait().await.map_err(|e| self.spawn_error(e))?;
        if !status.success() {
            return Err(ClipboardError::Failed {
                program: self.program.clone(),
                status,
            });
        }

        debug!(program = %self.program, size = content.len(), "Copied to clipboard");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
