//! A small published adventure and its players.
//!
//! Map: `Great Hall` (start) -> `Courtyard` -> `Vault`, with a way back from
//! the courtyard. The iron gate into the vault needs the brass key. The hall
//! holds the key and two swords.

use pbm_backend::adapters::records_sea::QueryOptions;
use pbm_backend::domain::turn_sheet_data::{self, LocationChoiceData, LocationChoiceScanData};
use pbm_backend::entities::{
    account, account_user, account_user_contact, adventure_game_character,
    adventure_game_character_instance, adventure_game_item, adventure_game_item_instance,
    adventure_game_location, adventure_game_location_instance, adventure_game_location_link,
    adventure_game_turn_sheet, game, game_instance, game_subscription, game_subscription_instance,
    game_turn_sheet, GameSubscriptionType,
};
use pbm_backend::services::{
    GameInstanceService, GameService, NewGameInstance, PendingSubscription, SubscriptionService,
};
use pbm_backend::{DomainError, Scope};
use uuid::Uuid;

use super::factory;

pub struct World {
    pub manager: account::Model,
    pub game: game::Model,
    pub manager_sub: game_subscription::Model,
    pub hall: adventure_game_location::Model,
    pub yard: adventure_game_location::Model,
    pub vault: adventure_game_location::Model,
    pub to_yard: adventure_game_location_link::Model,
    pub to_vault: adventure_game_location_link::Model,
    pub key: adventure_game_item::Model,
    pub sword: adventure_game_item::Model,
}

pub async fn build_world(scope: &Scope<'_>) -> Result<World, DomainError> {
    let manager = factory::create_account(scope, "manager").await?;
    let owned = GameService::new()
        .create_game_with_owner_subscriptions(
            scope,
            factory::new_game("castle"),
            manager.id,
            Some(manager.id),
        )
        .await?;
    let game_id = owned.game.id;
    let manager_sub = owned
        .manager
        .ok_or_else(|| DomainError::internal("manager subscription missing"))?;

    let hall = factory::create_location(scope, game_id, "Great Hall", true).await?;
    let yard = factory::create_location(scope, game_id, "Courtyard", false).await?;
    let vault = factory::create_location(scope, game_id, "Vault", false).await?;
    let to_yard = factory::create_link(scope, game_id, hall.id, yard.id, "Courtyard door").await?;
    let to_vault = factory::create_link(scope, game_id, yard.id, vault.id, "Iron gate").await?;
    factory::create_link(scope, game_id, yard.id, hall.id, "Back to the hall").await?;

    let key = factory::create_item(scope, game_id, "brass key", None).await?;
    let sword = factory::create_item(scope, game_id, "sword", Some("hand")).await?;
    factory::place_item(scope, game_id, key.id, hall.id, 1).await?;
    factory::place_item(scope, game_id, sword.id, hall.id, 2).await?;
    factory::require_item(scope, game_id, to_vault.id, key.id, 1).await?;

    let game = GameService::new().publish(scope, game_id).await?;
    Ok(World {
        manager,
        game,
        manager_sub,
        hall,
        yard,
        vault,
        to_yard,
        to_vault,
        key,
        sword,
    })
}

pub struct Player {
    pub account: account::Model,
    pub user: account_user::Model,
    pub contact: account_user_contact::Model,
    pub subscription: game_subscription::Model,
    pub character: adventure_game_character::Model,
}

/// Account, user, contact, an approved player subscription and a character.
pub async fn add_player(
    scope: &Scope<'_>,
    world: &World,
    prefix: &str,
) -> Result<Player, DomainError> {
    let account = factory::create_account(scope, prefix).await?;
    let user = factory::create_account_user(scope, account.id, prefix).await?;
    let contact = factory::create_user_contact(scope, user.id).await?;
    let subs = SubscriptionService::new();
    let pending = subs
        .upsert_pending_subscription(
            scope,
            PendingSubscription::new(world.game.id, account.id, GameSubscriptionType::Player)
                .with_user(user.id, contact.id),
        )
        .await?;
    let subscription = subs
        .approve_game_subscription(scope, pending.id, &user.email)
        .await?;
    let character = factory::create_character(
        scope,
        world.game.id,
        account.id,
        user.id,
        &format!("{prefix} the brave"),
    )
    .await?;
    Ok(Player {
        account,
        user,
        contact,
        subscription,
        character,
    })
}

pub async fn create_instance(
    scope: &Scope<'_>,
    world: &World,
) -> Result<game_instance::Model, DomainError> {
    GameInstanceService::new()
        .create_game_instance(scope, NewGameInstance::new(world.game.id, world.manager_sub.id))
        .await
}

/// Assign the player to the instance and join with their character.
pub async fn seat_player(
    scope: &Scope<'_>,
    player: &Player,
    game_instance_id: Uuid,
) -> Result<
    (
        game_subscription_instance::Model,
        adventure_game_character_instance::Model,
    ),
    DomainError,
> {
    let link = SubscriptionService::new()
        .assign_player_to_game_instance(scope, player.subscription.id, game_instance_id)
        .await?;
    let character = GameInstanceService::new()
        .join_game_instance(scope, link.id, player.character.id)
        .await?;
    Ok((link, character))
}

pub async fn location_instance(
    scope: &Scope<'_>,
    game_instance_id: Uuid,
    location_id: Uuid,
) -> Result<adventure_game_location_instance::Model, DomainError> {
    scope
        .repo::<adventure_game_location_instance::Entity>()
        .first(
            QueryOptions::new()
                .eq("game_instance_id", game_instance_id)
                .eq("adventure_game_location_id", location_id),
        )
        .await?
        .ok_or_else(|| DomainError::not_found("adventure_game_location_instance", location_id))
}

/// Current state of a character instance.
pub async fn reload_character(
    scope: &Scope<'_>,
    character_instance_id: Uuid,
) -> Result<adventure_game_character_instance::Model, DomainError> {
    pbm_backend::services::crud::get_one::<adventure_game_character_instance::Entity>(
        scope,
        character_instance_id,
    )
    .await
}

pub async fn item_instances(
    scope: &Scope<'_>,
    game_instance_id: Uuid,
    item_id: Uuid,
) -> Result<Vec<adventure_game_item_instance::Model>, DomainError> {
    scope
        .repo::<adventure_game_item_instance::Entity>()
        .get_many(
            &QueryOptions::new()
                .eq("game_instance_id", game_instance_id)
                .eq("adventure_game_item_id", item_id),
        )
        .await
}

/// The sheet issued to a character for `turn`.
pub async fn sheet_for(
    scope: &Scope<'_>,
    character_instance_id: Uuid,
    turn: i32,
) -> Result<game_turn_sheet::Model, DomainError> {
    let held: Vec<Uuid> = scope
        .repo::<adventure_game_turn_sheet::Entity>()
        .get_many(
            &QueryOptions::new().eq("adventure_game_character_instance_id", character_instance_id),
        )
        .await?
        .into_iter()
        .map(|link| link.game_turn_sheet_id)
        .collect();
    scope
        .repo::<game_turn_sheet::Entity>()
        .first(QueryOptions::new().is_in("id", held).eq("turn_number", turn))
        .await?
        .ok_or_else(|| DomainError::not_found("game_turn_sheet", character_instance_id))
}

pub async fn sheets_for_turn(
    scope: &Scope<'_>,
    game_instance_id: Uuid,
    turn: i32,
) -> Result<Vec<game_turn_sheet::Model>, DomainError> {
    scope
        .repo::<game_turn_sheet::Entity>()
        .get_many(
            &QueryOptions::new()
                .eq("game_instance_id", game_instance_id)
                .eq("turn_number", turn),
        )
        .await
}

pub fn offered(sheet: &game_turn_sheet::Model) -> Result<LocationChoiceData, DomainError> {
    turn_sheet_data::decode("sheet_data", &sheet.sheet_data)
}

/// Scan payload ticking a single destination.
pub fn choose(location_instance_id: Uuid) -> Result<Vec<u8>, DomainError> {
    turn_sheet_data::encode(&LocationChoiceScanData {
        choices: vec![location_instance_id],
    })
}
