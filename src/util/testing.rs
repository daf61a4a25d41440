//! Shared test setup: one global tracing subscriber per test binary.

use std::env;
use std::path::PathBuf;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();
static CONFIG_ISOLATION: Once = Once::new();

/// Installs the test subscriber on first call; later calls are no-ops.
///
/// `RUST_LOG` wins when set, otherwise navtree logs at trace.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

/// Shields config loading from the developer's own settings.
///
/// Points `XDG_CONFIG_HOME` at an empty directory unique to this test process
/// and clears every `NAVTREE*` variable, once per test binary. Call it before
/// anything loads `Settings`. Only affects platforms where `directories`
/// honours `XDG_CONFIG_HOME`.
pub fn isolate_config_env() -> PathBuf {
    let dir = env::temp_dir().join(format!("navtree-test-config-{}", std::process::id()));
    CONFIG_ISOLATION.call_once(|| {
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("Error: Failed to create {}: {}", dir.display(), e);
        }
        env::set_var("XDG_CONFIG_HOME", &dir);
        for (key, _) in env::vars_os() {
            if key.to_string_lossy().starts_with("NAVTREE") {
                env::remove_var(&key);
            }
        }
        debug!("config isolated under {}", dir.display());
    });
    dir
}

fn setup_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("navtree=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
