use pbm_backend::adapters::records_sea::{Lock, QueryOptions};
use pbm_backend::entities::{account, account_user, game};
use pbm_backend::errors::domain::ConflictKind;
use pbm_backend::services::crud;
use pbm_backend::{with_txn, DomainError, Rls};
use sea_orm::Order;

use crate::support::factory;
use crate::support::test_state::build_test_state;

#[tokio::test]
async fn rls_hides_rows_of_other_accounts() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let mine = factory::create_account(&scope, "mine").await?;
            let theirs = factory::create_account(&scope, "theirs").await?;
            let my_user = factory::create_account_user(&scope, mine.id, "me").await?;
            let their_user = factory::create_account_user(&scope, theirs.id, "them").await?;
            let shared = factory::create_game(&scope, "shared").await?;

            let restricted = scope
                .clone()
                .with_rls(Rls::new().with("account_id", [mine.id]));

            // The account table's own key narrows its id column
            let accounts = restricted.repo::<account::Entity>();
            assert_eq!(accounts.get_one(mine.id, Lock::None).await?.id, mine.id);
            let err = accounts
                .get_one(theirs.id, Lock::None)
                .await
                .unwrap_err();
            assert!(err.is_not_found());
            assert_eq!(err.to_string(), format!("not found: account {}", theirs.id));

            let users = restricted
                .repo::<account_user::Entity>()
                .get_many(&QueryOptions::new())
                .await?;
            assert_eq!(users.len(), 1);
            assert_eq!(users[0].id, my_user.id);

            // Updates through a restricted scope cannot reach hidden rows
            let renamed = account_user::Model {
                email: "renamed@example.test".to_string(),
                ..their_user.clone()
            };
            assert!(restricted
                .repo::<account_user::Entity>()
                .update_one(renamed)
                .await
                .unwrap_err()
                .is_not_found());

            // Tables without the column are left alone
            let games = restricted.repo::<game::Entity>();
            assert_eq!(games.get_one(shared.id, Lock::None).await?.id, shared.id);

            // The unrestricted view still sees everything
            assert_eq!(
                restricted
                    .unrestricted()
                    .repo::<account_user::Entity>()
                    .get_one(their_user.id, Lock::None)
                    .await?
                    .id,
                their_user.id
            );

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn soft_deleted_rows_drop_out_of_reads() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let account = factory::create_account(&scope, "parent").await?;
            let first = factory::create_account_user(&scope, account.id, "first").await?;
            let second = factory::create_account_user(&scope, account.id, "second").await?;
            let repo = scope.repo::<account_user::Entity>();
            let by_account = QueryOptions::new().eq("account_id", account.id);

            assert_eq!(repo.count(&by_account).await?, 2);
            crud::delete::<account_user::Entity>(&scope, first.id).await?;

            assert_eq!(repo.count(&by_account).await?, 1);
            assert!(repo.find_one(first.id, Lock::None).await?.is_none());
            let all = repo
                .get_many(&by_account.clone().including_deleted())
                .await?;
            assert_eq!(all.len(), 2);
            let gone = all
                .iter()
                .find(|u| u.id == first.id)
                .expect("soft-deleted row still stored");
            assert!(gone.deleted_at.is_some());

            // Deleting twice reports the row as missing
            assert!(crud::delete::<account_user::Entity>(&scope, first.id)
                .await
                .unwrap_err()
                .is_not_found());

            // Soft-deleted rows can still be removed outright
            crud::remove::<account_user::Entity>(&scope, first.id).await?;
            let left = repo
                .get_many(&by_account.including_deleted())
                .await?;
            assert_eq!(left.len(), 1);
            assert_eq!(left[0].id, second.id);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn query_options_filter_sort_and_limit() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let game = factory::create_game(&scope, "maze").await?;
            for (name, start) in [("Cave", false), ("Atrium", true), ("Bridge", false)] {
                factory::create_location(&scope, game.id, name, start).await?;
            }
            let repo = scope.repo::<pbm_backend::entities::adventure_game_location::Entity>();
            let in_game = QueryOptions::new().eq("game_id", game.id);

            let sorted: Vec<String> = repo
                .get_many(&in_game.clone().with_sort("name", Order::Asc))
                .await?
                .into_iter()
                .map(|l| l.name)
                .collect();
            assert_eq!(sorted, vec!["Atrium", "Bridge", "Cave"]);

            let last = repo
                .first(in_game.clone().with_sort("name", Order::Desc))
                .await?
                .expect("locations exist");
            assert_eq!(last.name, "Cave");

            let not_start = repo
                .get_many(&in_game.clone().ne("is_starting_location", true))
                .await?;
            assert_eq!(not_start.len(), 2);

            let limited = repo.get_many(&in_game.with_limit(2)).await?;
            assert_eq!(limited.len(), 2);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_columns_are_rejected() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let result = scope
                .repo::<account::Entity>()
                .get_many(&QueryOptions::new().eq("shoe_size", 42))
                .await;
            assert!(result.is_err());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_account_email_is_a_conflict() -> Result<(), DomainError> {
    let state = build_test_state().await?;

    with_txn(&state, Rls::new(), |scope| {
        Box::pin(async move {
            let first = factory::create_account(&scope, "dupe").await?;

            // Must stay last: the failed insert poisons the transaction on Postgres
            let err = crud::create::<account::Entity>(
                &scope,
                account::Model {
                    id: uuid::Uuid::nil(),
                    ..first.clone()
                },
            )
            .await
            .unwrap_err();
            match err {
                DomainError::Conflict(ConflictKind::UniqueAccountEmail, _) => {}
                other => panic!("expected UniqueAccountEmail, got {other:?}"),
            }

            Ok(())
        })
    })
    .await
}
