use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("'{0}' is not installed or not on PATH")]
    CommandNotFound(String),

    #[error("Killed after running for {0:?}")]
    Timeout(Duration),

    #[error("I/O error while running the command: {0}")]
    Io(#[from] std::io::Error),

    /// A [`MockProcessRunner`](super::MockProcessRunner) call nobody scripted
    #[error("Unexpected call: {0}")]
    UnexpectedCall(String),
}
