//! Command execution for scheduler queries.

use camino::Utf8PathBuf;
use std::future::Future;
use thiserror::Error;
use tokio::process::Command;

/// Error type for command execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Failed to execute {command}: {error}")]
    Execution { command: String, error: String },
    #[error("Command {command} failed: {stderr}")]
    Failed { command: String, stderr: String },
}

impl CommandError {
    /// True when the process ran and reported failure through its exit status.
    pub fn is_exit_failure(&self) -> bool {
        matches!(self, CommandError::Failed { .. })
    }
}

/// Execute a command and return stdout as a string.
///
/// Non-zero exit is reported as [`CommandError::Failed`] with the
/// command's stderr attached.
pub async fn run_command(cmd: &mut Command, name: &str) -> Result<String, CommandError> {
    let output = cmd.output().await.map_err(|e| CommandError::Execution {
        command: name.to_string(),
        error: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::Failed {
            command: name.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Runs a scheduler tool and hands back its stdout.
///
/// This is the only point where the adapters touch the outside world, so
/// tests swap in a fake that records argv and returns canned output.
pub trait CommandRunner {
    fn call(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = Result<String, CommandError>> + Send;
}

/// Runs commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Directory holding the scheduler binaries; `PATH` lookup when unset.
    pub bin_dir: Option<Utf8PathBuf>,
    /// Extra environment exported to every child.
    pub envs: Vec<(String, String)>,
}

impl ProcessRunner {
    pub fn new(bin_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            bin_dir,
            envs: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Resolve a program name against the configured bin directory.
    pub fn resolve(&self, program: &str) -> Utf8PathBuf {
        match &self.bin_dir {
            Some(dir) => dir.join(program),
            None => Utf8PathBuf::from(program),
        }
    }
}

impl CommandRunner for ProcessRunner {
    async fn call(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let path = self.resolve(program);
        tracing::debug!("Running {} {}", path, args.join(" "));

        let mut cmd = Command::new(path.as_std_path());
        cmd.args(args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        run_command(&mut cmd, program).await
    }
}
