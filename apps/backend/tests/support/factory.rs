//! Row factories. Everything goes through `crud` so validators and lifecycle
//! hooks run exactly as they do for service callers.

use backend_test_support::unique_helpers::{unique_email, unique_str};
use pbm_backend::entities::{
    account, account_user, account_user_contact, adventure_game_character, adventure_game_item,
    adventure_game_item_placement, adventure_game_location, adventure_game_location_link,
    adventure_game_location_link_requirement, game, AccountStatus, GameStatus, GameType,
};
use pbm_backend::services::crud;
use pbm_backend::{DomainError, Scope};
use time::OffsetDateTime;
use uuid::Uuid;

pub async fn create_account(scope: &Scope<'_>, prefix: &str) -> Result<account::Model, DomainError> {
    crud::create::<account::Entity>(
        scope,
        account::Model {
            id: Uuid::nil(),
            email: unique_email(prefix),
            name: format!("{prefix} account"),
            status: AccountStatus::Active,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

pub async fn create_account_user(
    scope: &Scope<'_>,
    account_id: Uuid,
    prefix: &str,
) -> Result<account_user::Model, DomainError> {
    crud::create::<account_user::Entity>(
        scope,
        account_user::Model {
            id: Uuid::nil(),
            account_id,
            email: unique_email(prefix),
            status: AccountStatus::Active,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

pub async fn create_user_contact(
    scope: &Scope<'_>,
    account_user_id: Uuid,
) -> Result<account_user_contact::Model, DomainError> {
    crud::create::<account_user_contact::Entity>(
        scope,
        account_user_contact::Model {
            id: Uuid::nil(),
            account_user_id,
            name: "Pat Player".to_string(),
            postal_address_line1: "12 Letterbox Lane".to_string(),
            postal_address_line2: None,
            state_province: "Victoria".to_string(),
            country: "Australia".to_string(),
            postal_code: "3000".to_string(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

/// Unsaved draft adventure with a 24 hour turn.
pub fn new_game(prefix: &str) -> game::Model {
    game::Model {
        id: Uuid::nil(),
        name: unique_str(prefix),
        game_type: GameType::Adventure,
        turn_duration_hours: 24,
        description: "A test adventure".to_string(),
        status: GameStatus::Draft,
        created_at: OffsetDateTime::now_utc(),
        updated_at: None,
        deleted_at: None,
    }
}

pub async fn create_game(scope: &Scope<'_>, prefix: &str) -> Result<game::Model, DomainError> {
    crud::create::<game::Entity>(scope, new_game(prefix)).await
}

pub async fn create_location(
    scope: &Scope<'_>,
    game_id: Uuid,
    name: &str,
    is_starting_location: bool,
) -> Result<adventure_game_location::Model, DomainError> {
    crud::create::<adventure_game_location::Entity>(
        scope,
        adventure_game_location::Model {
            id: Uuid::nil(),
            game_id,
            name: name.to_string(),
            description: format!("The {name}"),
            is_starting_location,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

pub async fn create_link(
    scope: &Scope<'_>,
    game_id: Uuid,
    from: Uuid,
    to: Uuid,
    name: &str,
) -> Result<adventure_game_location_link::Model, DomainError> {
    crud::create::<adventure_game_location_link::Entity>(
        scope,
        adventure_game_location_link::Model {
            id: Uuid::nil(),
            game_id,
            from_adventure_game_location_id: from,
            to_adventure_game_location_id: to,
            name: name.to_string(),
            description: String::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

/// Equippable when `slot` is given.
pub async fn create_item(
    scope: &Scope<'_>,
    game_id: Uuid,
    name: &str,
    slot: Option<&str>,
) -> Result<adventure_game_item::Model, DomainError> {
    crud::create::<adventure_game_item::Entity>(
        scope,
        adventure_game_item::Model {
            id: Uuid::nil(),
            game_id,
            name: name.to_string(),
            description: format!("A {name}"),
            can_be_equipped: slot.is_some(),
            equipment_slot: slot.map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

pub async fn place_item(
    scope: &Scope<'_>,
    game_id: Uuid,
    item_id: Uuid,
    location_id: Uuid,
    initial_count: i32,
) -> Result<adventure_game_item_placement::Model, DomainError> {
    crud::create::<adventure_game_item_placement::Entity>(
        scope,
        adventure_game_item_placement::Model {
            id: Uuid::nil(),
            game_id,
            adventure_game_item_id: item_id,
            adventure_game_location_id: location_id,
            initial_count,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

pub async fn require_item(
    scope: &Scope<'_>,
    game_id: Uuid,
    link_id: Uuid,
    item_id: Uuid,
    quantity: i32,
) -> Result<adventure_game_location_link_requirement::Model, DomainError> {
    crud::create::<adventure_game_location_link_requirement::Entity>(
        scope,
        adventure_game_location_link_requirement::Model {
            id: Uuid::nil(),
            game_id,
            adventure_game_location_link_id: link_id,
            adventure_game_item_id: item_id,
            quantity,
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}

pub async fn create_character(
    scope: &Scope<'_>,
    game_id: Uuid,
    account_id: Uuid,
    account_user_id: Uuid,
    name: &str,
) -> Result<adventure_game_character::Model, DomainError> {
    crud::create::<adventure_game_character::Entity>(
        scope,
        adventure_game_character::Model {
            id: Uuid::nil(),
            game_id,
            account_id,
            account_user_id,
            name: name.to_string(),
            description: String::new(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: None,
            deleted_at: None,
        },
    )
    .await
}
