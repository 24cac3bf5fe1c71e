// ABOUTME: Confirmation prompt before a sweep runs.
// ABOUTME: Only `yes` or `y` (any case, surrounding whitespace ignored) proceeds.

use std::io::{BufRead, Write};

/// Asks the user whether to proceed.
pub trait Confirm {
    /// Show `prompt` and return whether the answer was affirmative.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Whether an answer means "proceed".
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("yes") || answer.eq_ignore_ascii_case("y")
}

/// Writes the prompt to `prompt_out` and reads one line from `input`. EOF declines.
#[derive(Debug)]
pub struct LineConfirm<R, W> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        let _ = write!(self.prompt_out, "{prompt} [yes/no]: ");
        let _ = self.prompt_out.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => false,
            Ok(_) => is_affirmative(&line),
            Err(e) => {
                tracing::warn!("failed to read confirmation: {e}");
                false
            }
        }
    }
}

/// Prompts on stderr and reads from stdin, so stdout carries only the report.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        LineConfirm::new(std::io::stdin().lock(), std::io::stderr()).confirm(prompt)
    }
}

/// Always proceeds (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Answers from a fixed string, for scripted runs.
#[derive(Debug, Clone)]
pub struct ScriptedAnswer(pub String);

impl Confirm for ScriptedAnswer {
    fn confirm(&mut self, _prompt: &str) -> bool {
        is_affirmative(&self.0)
    }
}
