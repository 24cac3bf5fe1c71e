// ABOUTME: Local command execution for CLI-driven backing systems.
// ABOUTME: Runs kubectl/minikube with captured output and a hard deadline.

mod error;
mod runner;

pub use error::{Error, Result};
pub use runner::{CommandOutput, CommandRunner, LocalRunner};
