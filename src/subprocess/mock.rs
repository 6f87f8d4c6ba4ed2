use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

type ArgsMatcher = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Scripted [`ProcessRunner`] for tests; clones share expectations and history
///
/// Expectations are tried in the order they were registered; the first one
/// whose program and argument matcher fit answers the call.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    expectations: Arc<Mutex<Vec<Expectation>>>,
    calls: Arc<Mutex<Vec<ProcessCommand>>>,
}

struct Expectation {
    program: String,
    matcher: Option<ArgsMatcher>,
    reply: Reply,
    limit: Option<usize>,
    seen: usize,
}

enum Reply {
    Output(ProcessOutput),
    Timeout(Duration),
}

/// Builder returned by [`MockProcessRunner::expect_command`]; call
/// [`finish`](Self::finish) to register it
pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: Expectation,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply to calls of `program`; succeeds with empty output
    /// unless configured otherwise
    pub fn expect_command(&mut self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: Expectation {
                program: program.to_string(),
                matcher: None,
                reply: Reply::Output(ProcessOutput {
                    status: ExitStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration: Duration::ZERO,
                }),
                limit: None,
                seen: 0,
            },
        }
    }

    /// Number of calls made to `program`
    pub fn calls_to(&self, program: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.program == program)
            .count()
    }

    /// Every command run so far, in order
    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        lock(&self.calls).push(command.clone());

        let mut expectations = lock(&self.expectations);
        let expectation = expectations
            .iter_mut()
            .find(|e| {
                e.program == command.program
                    && e.matcher.as_ref().map_or(true, |m| m(&command.args))
            })
            .ok_or_else(|| ProcessError::UnexpectedCall(command.display()))?;

        expectation.seen += 1;
        if let Some(limit) = expectation.limit.filter(|&limit| expectation.seen > limit) {
            return Err(ProcessError::UnexpectedCall(format!(
                "{} called {} time(s), expected {}",
                command.program, expectation.seen, limit
            )));
        }

        match &expectation.reply {
            Reply::Output(output) => Ok(output.clone()),
            Reply::Timeout(after) => Err(ProcessError::Timeout(*after)),
        }
    }
}

impl MockCommandConfig {
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.expectation.matcher = Some(Box::new(matcher));
        self
    }

    fn output_mut(&mut self) -> Option<&mut ProcessOutput> {
        match &mut self.expectation.reply {
            Reply::Output(output) => Some(output),
            Reply::Timeout(_) => None,
        }
    }

    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        if let Some(output) = self.output_mut() {
            output.stdout = stdout.to_string();
        }
        self
    }

    pub fn returns_stderr(mut self, stderr: &str) -> Self {
        if let Some(output) = self.output_mut() {
            output.stderr = stderr.to_string();
        }
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        if let Some(output) = self.output_mut() {
            output.status = match code {
                0 => ExitStatus::Success,
                code => ExitStatus::Error(code),
            };
        }
        self
    }

    pub fn times_out_after(mut self, after: Duration) -> Self {
        self.expectation.reply = Reply::Timeout(after);
        self
    }

    /// Fail any call beyond the `n`th
    pub fn times(mut self, n: usize) -> Self {
        self.expectation.limit = Some(n);
        self
    }

    pub fn finish(self) {
        lock(&self.runner.expectations).push(self.expectation);
    }
}
