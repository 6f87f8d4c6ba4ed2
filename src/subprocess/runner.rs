use super::error::ProcessError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// A program invocation, built with [`ProcessCommandBuilder`](super::ProcessCommandBuilder)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ProcessCommand {
    /// Program and arguments as one line, for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        *self == ExitStatus::Success
    }

    /// Exit code, `None` when the process was killed by a signal
    pub fn code(&self) -> Option<i32> {
        match *self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(code),
            ExitStatus::Signal(_) => None,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            return ExitStatus::Success;
        }
        if let Some(code) = status.code() {
            return ExitStatus::Error(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }
        ExitStatus::Error(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and capture both output streams
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands with `tokio::process`; stdin is closed
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn to_tokio(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the future on timeout must not leave the tool running
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        debug!("Running {}", command.display());
        if let Some(dir) = &command.working_dir {
            trace!("Working directory: {}", dir.display());
        }

        let started = Instant::now();
        let child = Self::to_tokio(&command).spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::CommandNotFound(command.program.clone()),
            _ => ProcessError::Io(e),
        })?;

        let waited = child.wait_with_output();
        let output = match command.timeout {
            Some(limit) => tokio::time::timeout(limit, waited)
                .await
                .map_err(|_| ProcessError::Timeout(limit))??,
            None => waited.await?,
        };

        let output = ProcessOutput {
            status: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: started.elapsed(),
        };

        match output.status {
            ExitStatus::Success => debug!(
                "{} finished in {:?} with {} byte(s) of output",
                command.program,
                output.duration,
                output.stdout.len()
            ),
            ExitStatus::Error(code) => debug!("{} exited with {}", command.display(), code),
            ExitStatus::Signal(signal) => {
                warn!("{} killed by signal {}", command.display(), signal)
            }
        }
        Ok(output)
    }
}
