//! Spoken alerts through an external text-to-speech command.

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{BoardError, BoardResult};

/// Label spoken when a request does not name one.
pub const DEFAULT_ANNOUNCEMENT: &str = "特殊藥品";

/// Runs a configured program with the text to speak as its last argument.
#[derive(Debug, Clone)]
pub struct Announcer {
    program: String,
    args: Vec<String>,
}

impl Announcer {
    /// Parse a whitespace-separated command line such as `espeak -s 160`.
    pub fn from_command_line(command: &str) -> BoardResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| BoardError::validation("announce command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Speak `text`. Succeeds only if the command exits with status 0.
    pub async fn announce(&self, text: &str) -> BoardResult<()> {
        debug!(program = %self.program, text = %text, "Running announce command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .kill_on_drop(true)
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            warn!(program = %self.program, %status, "Announce command failed");
            Err(BoardError::Announce(format!("{} exited with {}", self.program, status)))
        }
    }
}

/// Resolve the text to speak from an optional request parameter.
pub fn announcement_text(requested: Option<&str>) -> &str {
    requested
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ANNOUNCEMENT)
}
