// src/command_handler/handlers/common.rs
// ============================================
// Common utilities for handlers
// ============================================

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::command_handler::CommandError;
use crate::metrics::{MetricsError, MetricsProvider};
use crate::utils::security::escape_html;
use crate::utils::truncate_output;

/// Captured result of a finished child process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub execution_time_ms: u64,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout when it has content, otherwise stderr, otherwise an exit code note
    pub fn text(&self) -> String {
        if !self.stdout.trim().is_empty() {
            self.stdout.clone()
        } else if !self.stderr.trim().is_empty() {
            self.stderr.clone()
        } else {
            match self.exit_code {
                Some(code) => format!("(no output, exit code {})", code),
                None => "(no output, terminated by signal)".to_string(),
            }
        }
    }
}

/// Run `command` through `shell -c` in `cwd`, killing it after `timeout_duration`.
///
/// The shell leads its own process group; on timeout the whole group is
/// killed so pipelines and background jobs die with it.
pub async fn run_shell(
    shell: &str,
    command: &str,
    cwd: &Path,
    timeout_duration: Duration,
) -> Result<ProcessOutput, CommandError> {
    let mut std_command = std::process::Command::new(shell);
    std_command
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_command.process_group(0);
    }

    let mut process = Command::from(std_command);
    process.kill_on_drop(true);

    debug!("Spawning `{}` in {}", command, cwd.display());
    let start = Instant::now();

    let mut child = process
        .spawn()
        .map_err(|e| CommandError::Execution(format!("Failed to execute command: {}", e)))?;
    let pid = child.id();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let collect = async {
        let (status, stdout, stderr) =
            tokio::join!(child.wait(), read_pipe(stdout), read_pipe(stderr));
        Ok::<_, std::io::Error>((status?, stdout?, stderr?))
    };
    let result = timeout(timeout_duration, collect).await;

    match result {
        Ok(Ok((status, stdout, stderr))) => {
            let execution_time_ms = start.elapsed().as_millis() as u64;
            let total_output_size = stdout.len() + stderr.len();
            if total_output_size > 64 * 1024 {
                info!("Large command output: {} bytes total", total_output_size);
            }

            Ok(ProcessOutput {
                stdout: String::from_utf8_lossy(&stdout).to_string(),
                stderr: String::from_utf8_lossy(&stderr).to_string(),
                exit_code: status.code(),
                execution_time_ms,
            })
        }
        Ok(Err(e)) => Err(CommandError::Execution(format!(
            "Failed to execute command: {}",
            e
        ))),
        Err(_) => {
            warn!("Command timed out after {:?}, killing process group", timeout_duration);
            #[cfg(unix)]
            if let Some(pid) = pid {
                if let Err(e) = kill_process_group(pid) {
                    warn!("Failed to kill process group {}: {}", pid, e);
                }
            }
            #[cfg(not(unix))]
            let _ = pid;
            // Kills the shell if it is still around and reaps it
            if let Err(e) = child.kill().await {
                debug!("Child already reaped: {}", e);
            }
            Err(CommandError::Timeout(timeout_duration))
        }
    }
}

async fn read_pipe<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

#[cfg(unix)]
fn kill_process_group(pid: u32) -> nix::Result<()> {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    killpg(Pid::from_raw(pid as i32), Signal::SIGKILL)
}

/// Query the metrics provider on the blocking thread pool
pub async fn query_metrics<T, F>(metrics: &Arc<dyn MetricsProvider>, query: F) -> Result<T, CommandError>
where
    T: Send + 'static,
    F: FnOnce(&dyn MetricsProvider) -> Result<T, MetricsError> + Send + 'static,
{
    let metrics = Arc::clone(metrics);
    tokio::task::spawn_blocking(move || query(metrics.as_ref()))
        .await
        .map_err(|e| CommandError::Execution(format!("Metrics task failed: {}", e)))?
        .map_err(CommandError::from)
}

/// Wrap command output in a titled `<pre>` block, capped and escaped
pub fn format_output_block(title: &str, output: &str, max_chars: usize) -> String {
    format!(
        "{}\n<pre>{}</pre>",
        title,
        escape_html(&truncate_output(output, max_chars))
    )
}
