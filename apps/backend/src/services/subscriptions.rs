//! Game subscriptions, approval and player-to-instance assignment.

use async_trait::async_trait;
use sea_orm::Order;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::domain::instance_status;
use crate::entities::{
    account, account_user, account_user_contact, game_instance, game_subscription,
    game_subscription_instance, GameInstanceStatus, GameSubscriptionStatus, GameSubscriptionType,
};
use crate::errors::domain::DomainError;
use crate::logging::pii::redact;
use crate::logging::security;
use crate::repos::Scope;
use crate::services::catalog::require_game;
use crate::services::crud::{self, ensure_no_live_children, Lifecycle};
use crate::validation::rules;

#[async_trait]
impl Lifecycle for game_subscription::Model {
    /// Player subscriptions name a user of the account and one of that user's contacts.
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        if self.subscription_type != GameSubscriptionType::Player {
            return Ok(());
        }
        let scope = scope.unrestricted();
        let (Some(user_id), Some(contact_id)) = (self.account_user_id, self.account_user_contact_id)
        else {
            return Err(DomainError::required("account_user_contact_id"));
        };
        let user = scope
            .repo::<account_user::Entity>()
            .get_one(user_id, Lock::None)
            .await?;
        if user.account_id != self.account_id {
            return Err(DomainError::invalid_field(
                "account_user_id",
                user_id,
                "user does not belong to the subscribing account",
            ));
        }
        let contact = scope
            .repo::<account_user_contact::Entity>()
            .get_one(contact_id, Lock::None)
            .await?;
        if contact.account_user_id != user_id {
            return Err(DomainError::invalid_field(
                "account_user_contact_id",
                contact_id,
                "contact does not belong to the subscribing user",
            ));
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<game_subscription_instance::Entity>(
            scope,
            "game_subscription_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<game_instance::Entity>(scope, "game_subscription_id", self.id)
            .await
    }
}

/// Remaining seats on `instance`; `None` when the instance is unlimited.
async fn seats_left(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
) -> Result<Option<u64>, DomainError> {
    if instance.required_player_count < 1 {
        return Ok(None);
    }
    let taken = scope
        .unrestricted()
        .repo::<game_subscription_instance::Entity>()
        .count(&QueryOptions::new().eq("game_instance_id", instance.id))
        .await?;
    let cap = u64::try_from(instance.required_player_count).unwrap_or(0);
    Ok(Some(cap.saturating_sub(taken)))
}

#[async_trait]
impl Lifecycle for game_subscription_instance::Model {
    /// Player subscription, same game, live instance and a free seat.
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        let scope = scope.unrestricted();
        let sub = scope
            .repo::<game_subscription::Entity>()
            .get_one(self.game_subscription_id, Lock::None)
            .await?;
        if sub.subscription_type != GameSubscriptionType::Player {
            return Err(DomainError::invalid_field(
                "game_subscription_id",
                sub.id,
                "only player subscriptions can join a game instance",
            ));
        }
        if sub.account_id != self.account_id {
            return Err(DomainError::invalid_field(
                "account_id",
                self.account_id,
                "must match the subscription's account",
            ));
        }
        let instance = scope
            .repo::<game_instance::Entity>()
            .get_one(self.game_instance_id, Lock::ForUpdateNoWait)
            .await?;
        if instance.game_id != sub.game_id {
            return Err(DomainError::invalid_field(
                "game_instance_id",
                instance.id,
                "instance belongs to a different game",
            ));
        }
        if instance_status::is_terminal(instance.status) {
            return Err(DomainError::invalid_field(
                "game_instance_id",
                instance.id,
                "game instance has finished",
            ));
        }
        if seats_left(&scope, &instance).await? == Some(0) {
            return Err(DomainError::invalid_field(
                "required_player_count",
                instance.required_player_count,
                "game instance is full",
            ));
        }
        Ok(())
    }
}

/// Request to (re)open a subscription for approval.
#[derive(Debug, Clone)]
pub struct PendingSubscription {
    pub game_id: Uuid,
    pub account_id: Uuid,
    pub subscription_type: GameSubscriptionType,
    pub account_user_id: Option<Uuid>,
    pub account_user_contact_id: Option<Uuid>,
}

impl PendingSubscription {
    pub fn new(game_id: Uuid, account_id: Uuid, subscription_type: GameSubscriptionType) -> Self {
        Self {
            game_id,
            account_id,
            subscription_type,
            account_user_id: None,
            account_user_contact_id: None,
        }
    }

    pub fn with_user(mut self, account_user_id: Uuid, account_user_contact_id: Uuid) -> Self {
        self.account_user_id = Some(account_user_id);
        self.account_user_contact_id = Some(account_user_contact_id);
        self
    }
}

/// Subscription and capacity service.
pub struct SubscriptionService;

impl SubscriptionService {
    pub fn new() -> Self {
        Self
    }

    /// Idempotent: an existing `(game, account, type[, user])` subscription in
    /// any status goes back to `pending_approval`; otherwise one is created.
    pub async fn upsert_pending_subscription(
        &self,
        scope: &Scope<'_>,
        request: PendingSubscription,
    ) -> Result<game_subscription::Model, DomainError> {
        let mut options = QueryOptions::new()
            .eq("game_id", request.game_id)
            .eq("account_id", request.account_id)
            .eq("subscription_type", request.subscription_type)
            .with_lock(Lock::ForUpdateNoWait);
        if let Some(user_id) = request.account_user_id {
            options = options.eq("account_user_id", user_id);
        }

        let existing = scope
            .repo::<game_subscription::Entity>()
            .first(options)
            .await?;

        let sub = match existing {
            Some(mut sub) => {
                sub.status = GameSubscriptionStatus::PendingApproval;
                if request.account_user_contact_id.is_some() {
                    sub.account_user_contact_id = request.account_user_contact_id;
                }
                crud::update::<game_subscription::Entity>(scope, sub).await?
            }
            None => {
                crud::create::<game_subscription::Entity>(
                    scope,
                    game_subscription::Model {
                        id: Uuid::nil(),
                        game_id: request.game_id,
                        account_id: request.account_id,
                        account_user_id: request.account_user_id,
                        account_user_contact_id: request.account_user_contact_id,
                        subscription_type: request.subscription_type,
                        status: GameSubscriptionStatus::PendingApproval,
                        created_at: OffsetDateTime::now_utc(),
                        updated_at: None,
                        deleted_at: None,
                    },
                )
                .await?
            }
        };
        debug!(game_subscription_id = %sub.id, "Subscription pending approval");
        Ok(sub)
    }

    /// Activate a pending subscription when `email` matches its owner: the
    /// bound account user if any, otherwise the account.
    pub async fn approve_game_subscription(
        &self,
        scope: &Scope<'_>,
        subscription_id: Uuid,
        email: &str,
    ) -> Result<game_subscription::Model, DomainError> {
        let mut sub = scope
            .repo::<game_subscription::Entity>()
            .get_one(subscription_id, Lock::ForUpdateNoWait)
            .await?;
        if sub.status != GameSubscriptionStatus::PendingApproval {
            return Err(DomainError::invalid_field(
                "status",
                format!("{:?}", sub.status),
                "subscription is not pending approval",
            ));
        }

        let owner_email = match sub.account_user_id {
            Some(user_id) => {
                scope
                    .unrestricted()
                    .repo::<account_user::Entity>()
                    .get_one(user_id, Lock::None)
                    .await?
                    .email
            }
            None => {
                scope
                    .unrestricted()
                    .repo::<account::Entity>()
                    .get_one(sub.account_id, Lock::None)
                    .await?
                    .email
            }
        };
        if !rules::emails_match(&owner_email, email) {
            security::approval_email_mismatch(sub.id, email);
            return Err(DomainError::invalid_field(
                "email",
                redact(email),
                "email does not match the subscription owner",
            ));
        }

        sub.status = GameSubscriptionStatus::Active;
        let sub = crud::update::<game_subscription::Entity>(scope, sub).await?;
        info!(game_subscription_id = %sub.id, "Subscription approved");
        Ok(sub)
    }

    /// Bind a player subscription to an instance. Calling it again returns
    /// the existing link.
    pub async fn assign_player_to_game_instance(
        &self,
        scope: &Scope<'_>,
        subscription_id: Uuid,
        game_instance_id: Uuid,
    ) -> Result<game_subscription_instance::Model, DomainError> {
        let sub = scope
            .repo::<game_subscription::Entity>()
            .get_one(subscription_id, Lock::None)
            .await?;

        let existing = scope
            .unrestricted()
            .repo::<game_subscription_instance::Entity>()
            .first(
                QueryOptions::new()
                    .eq("game_subscription_id", subscription_id)
                    .eq("game_instance_id", game_instance_id),
            )
            .await?;
        if let Some(link) = existing {
            return Ok(link);
        }

        let link = crud::create::<game_subscription_instance::Entity>(
            scope,
            game_subscription_instance::Model {
                id: Uuid::nil(),
                game_subscription_id: sub.id,
                game_instance_id,
                account_id: sub.account_id,
                turn_sheet_token: None,
                turn_sheet_token_expires_at: None,
                created_at: OffsetDateTime::now_utc(),
                updated_at: None,
                deleted_at: None,
            },
        )
        .await?;
        info!(
            game_subscription_id = %sub.id,
            %game_instance_id,
            game_subscription_instance_id = %link.id,
            "Player assigned to game instance"
        );
        Ok(link)
    }

    /// Oldest `created` instance of the subscription's game with a free seat.
    pub async fn find_available_game_instance(
        &self,
        scope: &Scope<'_>,
        subscription_id: Uuid,
    ) -> Result<Option<game_instance::Model>, DomainError> {
        let sub = scope
            .repo::<game_subscription::Entity>()
            .get_one(subscription_id, Lock::None)
            .await?;
        let candidates = scope
            .unrestricted()
            .repo::<game_instance::Entity>()
            .get_many(
                &QueryOptions::new()
                    .eq("game_id", sub.game_id)
                    .eq("status", GameInstanceStatus::Created)
                    .with_sort("created_at", Order::Asc)
                    .with_sort("id", Order::Asc),
            )
            .await?;
        for instance in candidates {
            if seats_left(scope, &instance).await? != Some(0) {
                return Ok(Some(instance));
            }
        }
        Ok(None)
    }
}

impl Default for SubscriptionService {
    fn default() -> Self {
        Self::new()
    }
}
