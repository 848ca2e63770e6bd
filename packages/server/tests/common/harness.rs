//! Test harness for integration testing.
//!
//! Each test gets a fresh in-memory store, the hashing embedder and a
//! recording notifier, wired into a real `LifecycleCoordinator`.

use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;

use match_core::domains::lifecycle::{CoordinatorSettings, LifecycleCoordinator};
use match_core::kernel::{RecordingNotifier, TestDependencies};
use match_core::server::build_app;

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let member = register(&ctx.coordinator, "Ada").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub coordinator: Arc<LifecycleCoordinator>,
    /// Every event the coordinator published, in order
    pub notifier: Arc<RecordingNotifier>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    async fn teardown(self) {
        // In-memory store is dropped with the coordinator
    }
}

impl TestHarness {
    /// Build a harness around custom dependencies (faulty store, slow embedder...)
    pub fn with_deps(deps: TestDependencies) -> Self {
        Self::with_settings(deps, test_settings())
    }

    pub fn with_settings(deps: TestDependencies, settings: CoordinatorSettings) -> Self {
        init_tracing();

        let notifier = deps.notifier.clone();
        let coordinator = Arc::new(LifecycleCoordinator::new(deps.into_server_deps(), settings));

        Self {
            coordinator,
            notifier,
        }
    }

    /// HTTP router over this harness's coordinator
    pub fn app(&self) -> axum::Router {
        build_app(self.coordinator.clone(), &[])
    }
}

pub fn test_settings() -> CoordinatorSettings {
    CoordinatorSettings {
        request_timeout: Duration::from_secs(5),
        ..CoordinatorSettings::default()
    }
}

/// Respect RUST_LOG when running tests with `-- --nocapture`.
/// Uses try_init() so repeated harnesses don't panic.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
