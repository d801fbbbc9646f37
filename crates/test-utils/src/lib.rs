//! Shared helpers for the `dagrun` integration tests.
//!
//! - [`builders`]: config and graph fixtures.
//! - [`recording`]: a callback that records when each node ran.

pub mod builders;
pub mod recording;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for a single dispatcher run in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-captured subscriber once per test binary.
///
/// Output only shows for failing tests (or with `--nocapture`). The filter
/// comes from `RUST_LOG` and defaults to `dagrun=debug,warn`, so dispatcher
/// decisions are visible in failure output without library noise.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("dagrun=debug,warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, panicking if it outlives [`TEST_TIMEOUT`].
///
/// Dispatcher tests wrap runs in this so a deadlock fails fast instead of
/// hanging the suite.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(out) => out,
        Err(_) => panic!("test future did not finish within {TEST_TIMEOUT:?} (deadlock?)"),
    }
}
