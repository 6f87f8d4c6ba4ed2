use super::runner::ProcessCommand;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            command: ProcessCommand {
                program: program.into(),
                ..ProcessCommand::default()
            },
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `template`, replacing every `{name}` with its value
    pub fn templated_args<S: AsRef<str>>(
        mut self,
        template: &[S],
        values: &[(&str, &str)],
    ) -> Self {
        for arg in template {
            let mut arg = arg.as_ref().to_string();
            for (name, value) in values {
                arg = arg.replace(&format!("{{{name}}}"), value);
            }
            self.command.args.push(arg);
        }
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.command.working_dir = Some(dir.to_path_buf());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.command.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}
