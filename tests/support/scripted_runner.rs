// ABOUTME: Command runner that answers from a script instead of spawning processes.
// ABOUTME: Records every invocation so tests can assert on exact kubectl/minikube arguments.

use async_trait::async_trait;
use parking_lot::Mutex;
use reclaim::command::{CommandOutput, CommandRunner, Error, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    Timeout,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn line(&self) -> String {
        self.args.join(" ")
    }
}

/// Replies to the first rule whose needle occurs in the joined argument line.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    installed: HashSet<String>,
    rules: Vec<(String, Reply)>,
    calls: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a program as present on PATH.
    pub fn installed(mut self, program: &str) -> Self {
        self.installed.insert(program.to_string());
        self
    }

    /// Reply with exit code 0 and `stdout`.
    pub fn ok(self, needle: &str, stdout: &str) -> Self {
        self.reply(needle, 0, stdout, "")
    }

    /// Reply with `code`, `stdout` and `stderr`.
    pub fn reply(mut self, needle: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.rules.push((
            needle.to_string(),
            Reply::Output(CommandOutput {
                exit_code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            }),
        ));
        self
    }

    /// Simulate the deadline expiring.
    pub fn timeout(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Timeout));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(Invocation::line).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.installed
            .contains(program)
            .then(|| PathBuf::from(format!("/usr/local/bin/{program}")))
    }

    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            timeout,
        };
        let line = invocation.line();
        self.calls.lock().push(invocation);

        if !self.installed.contains(program) {
            return Err(Error::NotFound(program.to_string()));
        }

        match self.rules.iter().find(|(needle, _)| line.contains(needle.as_str())) {
            Some((_, Reply::Output(output))) => Ok(output.clone()),
            Some((_, Reply::Timeout)) => Err(Error::CommandTimeout {
                program: program.to_string(),
                timeout,
            }),
            None => Ok(CommandOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: format!("unscripted command: {program} {line}"),
            }),
        }
    }
}
