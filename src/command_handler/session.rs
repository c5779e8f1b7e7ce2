// src/command_handler/session.rs
// ============================================
// Shell session with a persistent working directory
// ============================================
//
// Each `/c` runs in a fresh child shell, so a plain `cd` would be lost as
// soon as the child exits. The session intercepts `cd` and keeps the
// directory itself; every later command starts there.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::handlers::common::run_shell;
use super::CommandError;
use crate::utils::system::{expand_home, home_dir};

/// Characters that chain or redirect shell commands
const SHELL_OPERATORS: &[char] = &['&', ';', '|', '<', '>', '\n'];

/// Working directory state for shell commands
#[derive(Debug, Clone)]
pub struct ShellSession {
    current_dir: PathBuf,
    shell: String,
    timeout: Duration,
}

impl ShellSession {
    pub fn new(initial_dir: impl Into<PathBuf>, shell: impl Into<String>, timeout: Duration) -> Self {
        Self {
            current_dir: initial_dir.into(),
            shell: shell.into(),
            timeout,
        }
    }

    /// Directory the next command will run in
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Run a raw shell command and describe the outcome as text.
    ///
    /// Never fails: spawn errors, timeouts and non-zero exits all come back
    /// as the returned string.
    pub async fn run(&mut self, command: &str) -> String {
        if let Some(target) = parse_cd(command) {
            return match self.change_directory(target).await {
                Ok(dir) => format!("📁 Current directory: {}", dir.display()),
                Err(e) => format!("❌ {}", e),
            };
        }

        match run_shell(&self.shell, command, &self.current_dir, self.timeout).await {
            Ok(output) => {
                debug!(
                    "Command exited with {:?} after {}ms",
                    output.exit_code, output.execution_time_ms
                );
                output.text()
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Resolve `target` against the tracked directory and switch to it.
    ///
    /// The tracked directory is left untouched on failure.
    pub async fn change_directory(&mut self, target: &str) -> Result<&Path, CommandError> {
        let requested = if target.is_empty() {
            home_dir().map_err(|e| CommandError::io("cd", e))?
        } else {
            expand_home(target).map_err(|e| CommandError::io(format!("cd {}", target), e))?
        };

        let absolute = if requested.is_absolute() {
            requested
        } else {
            self.current_dir.join(requested)
        };

        let canonical = tokio::fs::canonicalize(&absolute)
            .await
            .map_err(|e| CommandError::io(format!("cd {}", target), e))?;

        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| CommandError::io(format!("cd {}", target), e))?;
        if !metadata.is_dir() {
            return Err(CommandError::Usage(format!("cd {}: Not a directory", target)));
        }

        // Listing the directory proves the agent may enter it
        tokio::fs::read_dir(&canonical)
            .await
            .map_err(|e| CommandError::io(format!("cd {}", target), e))?;

        info!("Working directory changed to {}", canonical.display());
        self.current_dir = canonical;
        Ok(&self.current_dir)
    }
}

/// Extract the target of a standalone `cd` command.
///
/// `cd` chained with other commands is left to the shell.
fn parse_cd(command: &str) -> Option<&str> {
    let rest = command.trim().strip_prefix("cd")?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let target = rest.trim();
    if target.contains(SHELL_OPERATORS) {
        return None;
    }
    Some(strip_quotes(target))
}

fn strip_quotes(target: &str) -> &str {
    for quote in ['"', '\''] {
        if target.len() >= 2 && target.starts_with(quote) && target.ends_with(quote) {
            return &target[1..target.len() - 1];
        }
    }
    target
}
