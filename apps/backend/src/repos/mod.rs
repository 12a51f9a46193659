//! Repository facade: generic per-entity record store with RLS scoping.

pub mod record;
pub mod repository;
pub mod rls;
pub mod scope;

pub use record::Record;
pub use repository::Repository;
pub use rls::Rls;
pub use scope::Scope;
