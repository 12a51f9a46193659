//! Log hygiene helpers and the host-side subscriber.

pub mod pii;
pub mod security;
pub mod subscriber;

pub use subscriber::init_tracing;
