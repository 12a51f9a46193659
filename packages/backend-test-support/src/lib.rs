//! Backend test support utilities
//!
//! Logging bootstrap and unique fixture data shared by the backend's unit and
//! integration tests. Deliberately independent of the backend crate.

pub mod logging;
pub mod unique_helpers;
