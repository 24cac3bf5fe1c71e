// ABOUTME: Library root for reclaim - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cluster;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod sweep;
pub mod types;
