use pbm_backend::entities::{
    account_subscription, AccountSubscriptionStatus, AccountSubscriptionType, SubscriptionPeriod,
};
use pbm_backend::services::{crud, AccountService};
use pbm_backend::{with_txn, DomainError, Rls};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::common::assert_invalid;
use crate::support::factory;
use crate::support::test_state::build_test_state;

fn subscription(
    account_id: Option<Uuid>,
    account_user_id: Option<Uuid>,
    subscription_type: AccountSubscriptionType,
) -> account_subscription::Model {
    account_subscription::Model {
        id: Uuid::nil(),
        account_id,
        account_user_id,
        subscription_type,
        subscription_period: SubscriptionPeriod::Month,
        status: AccountSubscriptionStatus::Active,
        created_at: OffsetDateTime::now_utc(),
        updated_at: None,
        deleted_at: None,
    }
}

#[tokio::test]
async fn one_active_subscription_per_type() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let account = factory::create_account(&scope, "studio").await?;
            let service = AccountService::new();

            let first = crud::create::<account_subscription::Entity>(
                &scope,
                subscription(Some(account.id), None, AccountSubscriptionType::BasicManager),
            )
            .await?;
            assert_invalid(
                crud::create::<account_subscription::Entity>(
                    &scope,
                    subscription(Some(account.id), None, AccountSubscriptionType::BasicManager),
                )
                .await,
                "an active subscription of this type already exists",
            );

            // Expiring frees the type for a new active row
            let expired = service.expire_subscription(&scope, first.id).await?;
            assert_eq!(expired.status, AccountSubscriptionStatus::Expired);
            assert_invalid(
                service.expire_subscription(&scope, first.id).await,
                "only an active subscription can expire",
            );
            crud::create::<account_subscription::Entity>(
                &scope,
                subscription(Some(account.id), None, AccountSubscriptionType::BasicManager),
            )
            .await?;

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn player_subscriptions_belong_to_users() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let account = factory::create_account(&scope, "family").await?;
            let user = factory::create_account_user(&scope, account.id, "kid").await?;

            let err = crud::create::<account_subscription::Entity>(
                &scope,
                subscription(Some(account.id), None, AccountSubscriptionType::BasicPlayer),
            )
            .await
            .unwrap_err();
            assert_eq!(err.field(), Some("account_user_id"));

            let player = crud::create::<account_subscription::Entity>(
                &scope,
                subscription(None, Some(user.id), AccountSubscriptionType::BasicPlayer),
            )
            .await?;
            let manager = crud::create::<account_subscription::Entity>(
                &scope,
                subscription(Some(account.id), None, AccountSubscriptionType::BasicManager),
            )
            .await?;

            let mut active: Vec<Uuid> = AccountService::new()
                .active_subscriptions(&scope, account.id)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();
            active.sort();
            let mut expected = vec![player.id, manager.id];
            expected.sort();
            assert_eq!(active, expected);

            Ok(())
        })
    })
    .await
}
