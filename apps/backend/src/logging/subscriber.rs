use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the process-wide JSON subscriber for a host embedding the core
/// (job runtime, CLI). `RUST_LOG` overrides the default filter.
///
/// Returns false when a subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,sea_orm=warn,sea_orm_migration=warn"));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .json()
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
