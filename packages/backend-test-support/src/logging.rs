//! Test logging bootstrap shared by unit and integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Quiet by default; driver chatter stays hidden even when the backend is verbose.
const DEFAULT_FILTER: &str = "warn,sqlx=error,sea_orm_migration=error";

/// Install a test-writer subscriber once per process.
///
/// Filter precedence: `TEST_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
/// Safe to call from several ctor hooks; a subscriber installed elsewhere wins.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init();
    });
}
