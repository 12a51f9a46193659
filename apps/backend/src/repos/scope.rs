use sea_orm::{ActiveModelBehavior, ActiveModelTrait, DatabaseTransaction, EntityTrait, IntoActiveModel};

use crate::config::engine::EngineConfig;
use crate::repos::record::Record;
use crate::repos::repository::Repository;
use crate::repos::rls::Rls;

/// Transaction, RLS identifiers and engine config for one domain operation.
#[derive(Clone)]
pub struct Scope<'a> {
    pub txn: &'a DatabaseTransaction,
    pub rls: Rls,
    pub config: &'a EngineConfig,
}

impl<'a> Scope<'a> {
    pub fn new(txn: &'a DatabaseTransaction, config: &'a EngineConfig) -> Self {
        Self {
            txn,
            rls: Rls::default(),
            config,
        }
    }

    pub fn with_rls(mut self, rls: Rls) -> Self {
        self.rls = rls;
        self
    }

    /// Same transaction without RLS. Invariant checks (caps, uniqueness) must
    /// see rows the caller cannot.
    pub fn unrestricted(&self) -> Scope<'a> {
        Scope::new(self.txn, self.config)
    }

    /// Repository for `E` carrying this scope's RLS identifiers.
    pub fn repo<E>(&self) -> Repository<'a, E>
    where
        E: EntityTrait,
        E::Model: Record + IntoActiveModel<E::ActiveModel>,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    {
        Repository::new(self.txn).with_rls(self.rls.clone())
    }
}
