// ABOUTME: Command module aggregator for the reclaim CLI.
// ABOUTME: Re-exports the cleanup command handler.

mod run;

pub use run::cleanup;
