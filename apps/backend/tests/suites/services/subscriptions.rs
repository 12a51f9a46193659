use pbm_backend::entities::{
    game_subscription_instance, GameInstanceStatus, GameSubscriptionStatus, GameSubscriptionType,
};
use pbm_backend::services::{
    crud, GameInstanceService, NewGameInstance, PendingSubscription, SubscriptionService,
};
use pbm_backend::{with_txn, DomainError, Rls};

use crate::common::assert_invalid;
use crate::support::factory;
use crate::support::test_state::build_test_state;
use crate::support::world::{add_player, build_world, create_instance};

#[tokio::test]
async fn upsert_reuses_the_subscription_and_reopens_it() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let account = factory::create_account(&scope, "fan").await?;
            let user = factory::create_account_user(&scope, account.id, "fan").await?;
            let contact = factory::create_user_contact(&scope, user.id).await?;
            let service = SubscriptionService::new();
            let request =
                PendingSubscription::new(world.game.id, account.id, GameSubscriptionType::Player)
                    .with_user(user.id, contact.id);

            let first = service
                .upsert_pending_subscription(&scope, request.clone())
                .await?;
            assert_eq!(first.status, GameSubscriptionStatus::PendingApproval);

            let approved = service
                .approve_game_subscription(&scope, first.id, &user.email)
                .await?;
            assert_eq!(approved.status, GameSubscriptionStatus::Active);

            // Same (game, account, type, user) goes back to pending on the same row
            let again = service.upsert_pending_subscription(&scope, request).await?;
            assert_eq!(again.id, first.id);
            assert_eq!(again.status, GameSubscriptionStatus::PendingApproval);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn player_subscription_needs_a_user_and_contact() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let account = factory::create_account(&scope, "loner").await?;

            let err = SubscriptionService::new()
                .upsert_pending_subscription(
                    &scope,
                    PendingSubscription::new(
                        world.game.id,
                        account.id,
                        GameSubscriptionType::Player,
                    ),
                )
                .await
                .unwrap_err();
            assert_eq!(err, DomainError::required("account_user_id"));

            // A contact of some other user is refused
            let user = factory::create_account_user(&scope, account.id, "loner").await?;
            let stranger_account = factory::create_account(&scope, "stranger").await?;
            let stranger = factory::create_account_user(&scope, stranger_account.id, "stranger")
                .await?;
            let stranger_contact = factory::create_user_contact(&scope, stranger.id).await?;
            assert_invalid(
                SubscriptionService::new()
                    .upsert_pending_subscription(
                        &scope,
                        PendingSubscription::new(
                            world.game.id,
                            account.id,
                            GameSubscriptionType::Player,
                        )
                        .with_user(user.id, stranger_contact.id),
                    )
                    .await,
                "contact does not belong to the subscribing user",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn approval_matches_email_case_insensitively() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let account = factory::create_account(&scope, "shouty").await?;
            let user = factory::create_account_user(&scope, account.id, "shouty").await?;
            let contact = factory::create_user_contact(&scope, user.id).await?;
            let service = SubscriptionService::new();
            let pending = service
                .upsert_pending_subscription(
                    &scope,
                    PendingSubscription::new(
                        world.game.id,
                        account.id,
                        GameSubscriptionType::Player,
                    )
                    .with_user(user.id, contact.id),
                )
                .await?;

            // The account's address is not the bound user's address
            assert_invalid(
                service
                    .approve_game_subscription(&scope, pending.id, &account.email)
                    .await,
                "email does not match the subscription owner",
            );

            let shouted = format!("  {}  ", user.email.to_uppercase());
            let approved = service
                .approve_game_subscription(&scope, pending.id, &shouted)
                .await?;
            assert_eq!(approved.status, GameSubscriptionStatus::Active);

            assert_invalid(
                service
                    .approve_game_subscription(&scope, pending.id, &user.email)
                    .await,
                "subscription is not pending approval",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn assignment_is_idempotent_and_respects_capacity() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let bob = add_player(&scope, &world, "bob").await?;
            let instances = GameInstanceService::new();
            let small = instances
                .create_game_instance(
                    &scope,
                    NewGameInstance::new(world.game.id, world.manager_sub.id)
                        .with_required_player_count(1),
                )
                .await?;
            let service = SubscriptionService::new();

            let link = service
                .assign_player_to_game_instance(&scope, alice.subscription.id, small.id)
                .await?;
            let again = service
                .assign_player_to_game_instance(&scope, alice.subscription.id, small.id)
                .await?;
            assert_eq!(link.id, again.id);
            assert_eq!(link.account_id, alice.account.id);
            assert!(link.turn_sheet_token.is_none());

            assert_invalid(
                service
                    .assign_player_to_game_instance(&scope, bob.subscription.id, small.id)
                    .await,
                "game instance is full",
            );

            // Full instances are passed over; unlimited ones always qualify
            assert!(service
                .find_available_game_instance(&scope, bob.subscription.id)
                .await?
                .is_none());
            let open = create_instance(&scope, &world).await?;
            let found = service
                .find_available_game_instance(&scope, bob.subscription.id)
                .await?
                .expect("open instance");
            assert_eq!(found.id, open.id);
            assert_eq!(found.status, GameInstanceStatus::Created);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn only_player_subscriptions_join_live_instances() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let service = SubscriptionService::new();

            assert_invalid(
                service
                    .assign_player_to_game_instance(&scope, world.manager_sub.id, instance.id)
                    .await,
                "only player subscriptions can join a game instance",
            );

            GameInstanceService::new()
                .cancel_game_instance(&scope, instance.id)
                .await?;
            assert_invalid(
                service
                    .assign_player_to_game_instance(&scope, alice.subscription.id, instance.id)
                    .await,
                "game instance has finished",
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn a_soft_deleted_assignment_can_be_made_again() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let world = build_world(&scope).await?;
            let alice = add_player(&scope, &world, "alice").await?;
            let instance = create_instance(&scope, &world).await?;
            let service = SubscriptionService::new();

            let first = service
                .assign_player_to_game_instance(&scope, alice.subscription.id, instance.id)
                .await?;
            crud::delete::<game_subscription_instance::Entity>(&scope, first.id).await?;

            let second = service
                .assign_player_to_game_instance(&scope, alice.subscription.id, instance.id)
                .await?;
            assert_ne!(second.id, first.id);
            assert!(second.deleted_at.is_none());

            Ok(())
        })
    })
    .await
}
