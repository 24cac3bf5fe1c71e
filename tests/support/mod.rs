// ABOUTME: Test support utilities.
// ABOUTME: Provides fake backends, a scripted command runner and tracing setup.

use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod fakes;
#[allow(dead_code)]
pub mod scripted_runner;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("reclaim=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Skip the test when no local container engine socket exists.
#[macro_export]
macro_rules! require_engine {
    () => {
        match reclaim::engine::detect_local(&reclaim::engine::EngineConfig::default()) {
            Ok(socket) => socket,
            Err(e) => {
                eprintln!("skipping: {e}");
                return;
            }
        }
    };
}
