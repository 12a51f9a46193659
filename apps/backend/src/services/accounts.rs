//! Account, account user, contact and platform subscription lifecycle.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::entities::{
    account, account_contact, account_subscription, account_user, account_user_contact,
    adventure_game_character, game_subscription, AccountSubscriptionStatus,
};
use crate::errors::domain::DomainError;
use crate::repos::Scope;
use crate::services::crud::{self, ensure_no_live_children, Lifecycle};

#[async_trait]
impl Lifecycle for account::Model {
    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<account_user::Entity>(scope, "account_id", self.id).await?;
        ensure_no_live_children::<account_contact::Entity>(scope, "account_id", self.id).await?;
        ensure_no_live_children::<account_subscription::Entity>(scope, "account_id", self.id)
            .await?;
        ensure_no_live_children::<game_subscription::Entity>(scope, "account_id", self.id).await
    }
}

#[async_trait]
impl Lifecycle for account_user::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        scope
            .repo::<account::Entity>()
            .get_one(self.account_id, Lock::None)
            .await?;
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<account_user_contact::Entity>(scope, "account_user_id", self.id)
            .await?;
        ensure_no_live_children::<account_subscription::Entity>(scope, "account_user_id", self.id)
            .await?;
        ensure_no_live_children::<adventure_game_character::Entity>(
            scope,
            "account_user_id",
            self.id,
        )
        .await
    }
}

#[async_trait]
impl Lifecycle for account_contact::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        scope
            .repo::<account::Entity>()
            .get_one(self.account_id, Lock::None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Lifecycle for account_user_contact::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        scope
            .repo::<account_user::Entity>()
            .get_one(self.account_user_id, Lock::None)
            .await?;
        Ok(())
    }
}

/// At most one active subscription per (owner, subscription type).
async fn ensure_single_active(
    scope: &Scope<'_>,
    rec: &account_subscription::Model,
) -> Result<(), DomainError> {
    if rec.status != AccountSubscriptionStatus::Active {
        return Ok(());
    }
    let mut options = QueryOptions::new()
        .eq("subscription_type", rec.subscription_type)
        .eq("status", AccountSubscriptionStatus::Active)
        .ne("id", rec.id)
        .with_limit(1)
        .with_lock(Lock::ForUpdateNoWait);
    options = match (rec.account_id, rec.account_user_id) {
        (Some(account_id), _) => options.eq("account_id", account_id),
        (None, Some(account_user_id)) => options.eq("account_user_id", account_user_id),
        (None, None) => return Err(DomainError::required("account_id")),
    };
    let clash = scope
        .unrestricted()
        .repo::<account_subscription::Entity>()
        .get_many(&options)
        .await?;
    if !clash.is_empty() {
        return Err(DomainError::invalid_field(
            "subscription_type",
            format!("{:?}", rec.subscription_type),
            "an active subscription of this type already exists",
        ));
    }
    Ok(())
}

#[async_trait]
impl Lifecycle for account_subscription::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_single_active(scope, self).await
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if self.status != AccountSubscriptionStatus::Active {
            ensure_single_active(scope, next).await?;
        }
        Ok(())
    }
}

/// Platform subscription verbs.
pub struct AccountService;

impl AccountService {
    pub fn new() -> Self {
        Self
    }

    /// Move an active subscription to `expired`.
    pub async fn expire_subscription(
        &self,
        scope: &Scope<'_>,
        subscription_id: Uuid,
    ) -> Result<account_subscription::Model, DomainError> {
        let mut sub = scope
            .repo::<account_subscription::Entity>()
            .get_one(subscription_id, Lock::ForUpdateNoWait)
            .await?;
        if sub.status != AccountSubscriptionStatus::Active {
            return Err(DomainError::invalid_field(
                "status",
                "expired",
                "only an active subscription can expire",
            ));
        }
        sub.status = AccountSubscriptionStatus::Expired;
        let sub = crud::update::<account_subscription::Entity>(scope, sub).await?;
        info!(account_subscription_id = %sub.id, "Account subscription expired");
        Ok(sub)
    }

    /// The live active subscriptions of an account and of its users.
    pub async fn active_subscriptions(
        &self,
        scope: &Scope<'_>,
        account_id: Uuid,
    ) -> Result<Vec<account_subscription::Model>, DomainError> {
        let user_ids: Vec<Uuid> = scope
            .repo::<account_user::Entity>()
            .get_many(&QueryOptions::new().eq("account_id", account_id))
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let repo = scope.repo::<account_subscription::Entity>();
        let mut subs = repo
            .get_many(
                &QueryOptions::new()
                    .eq("account_id", account_id)
                    .eq("status", AccountSubscriptionStatus::Active),
            )
            .await?;
        if !user_ids.is_empty() {
            subs.extend(
                repo.get_many(
                    &QueryOptions::new()
                        .is_in("account_user_id", user_ids)
                        .eq("status", AccountSubscriptionStatus::Active),
                )
                .await?,
            );
        }
        Ok(subs)
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}
