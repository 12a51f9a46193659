//! Game instance lifecycle: creation under the manager cap, status moves,
//! start-time materialisation, player join and per-instance parameters.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use sea_orm::Order;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::domain::instance_status::{self, status_name};
use crate::domain::inventory::{self, Owner};
use crate::domain::parameters::{self, ALLOW_ITEM_DROP, INVENTORY_CAPACITY};
use crate::domain::readiness;
use crate::entities::{
    adventure_game_character, adventure_game_character_instance, adventure_game_creature_instance,
    adventure_game_creature_placement, adventure_game_item_instance, adventure_game_location,
    adventure_game_location_instance, adventure_game_turn_sheet, game, game_instance,
    game_instance_parameter, game_subscription, game_subscription_instance, game_turn_sheet,
    GameInstanceStatus, GameStatus, GameSubscriptionType,
};
use crate::errors::domain::DomainError;
use crate::repos::Scope;
use crate::services::catalog::require_game;
use crate::services::crud::{self, ensure_no_live_children, Lifecycle};
use crate::services::games::load_catalog;
use crate::services::turn_processing;

pub(crate) async fn lock_instance(
    scope: &Scope<'_>,
    game_instance_id: Uuid,
) -> Result<game_instance::Model, DomainError> {
    scope
        .repo::<game_instance::Entity>()
        .get_one(game_instance_id, Lock::ForUpdateNoWait)
        .await
}

fn turn_duration(game: &game::Model) -> Duration {
    Duration::hours(i64::from(game.turn_duration_hours))
}

#[async_trait]
impl Lifecycle for game_instance::Model {
    /// Manager subscription of a published game, below the instance cap.
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        let game = require_game(scope, self.game_id).await?;
        if game.status != GameStatus::Published {
            return Err(DomainError::invalid_field(
                "game_id",
                game.id,
                "instances can only be created from a published game",
            ));
        }

        let scope = scope.unrestricted();
        // Locking the subscription serialises concurrent creates against the cap.
        let sub = scope
            .repo::<game_subscription::Entity>()
            .get_one(self.game_subscription_id, Lock::ForUpdateNoWait)
            .await?;
        if sub.subscription_type != GameSubscriptionType::Manager {
            return Err(DomainError::invalid_field(
                "game_subscription_id",
                sub.id,
                "game instances must be owned by a manager subscription",
            ));
        }
        if sub.game_id != self.game_id {
            return Err(DomainError::invalid_field(
                "game_subscription_id",
                sub.id,
                "subscription belongs to a different game",
            ));
        }

        let max = scope.config.max_instances_per_manager;
        let live = scope
            .repo::<game_instance::Entity>()
            .count(&QueryOptions::new().eq("game_subscription_id", sub.id))
            .await?;
        if live >= max {
            return Err(DomainError::invalid_field(
                "game_subscription_id",
                sub.id,
                format!("manager subscription has reached the maximum of {max} game instances"),
            ));
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<game_subscription_instance::Entity>(
            scope,
            "game_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<game_turn_sheet::Entity>(scope, "game_instance_id", self.id)
            .await?;
        ensure_no_live_children::<game_instance_parameter::Entity>(
            scope,
            "game_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_character_instance::Entity>(
            scope,
            "game_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_item_instance::Entity>(
            scope,
            "game_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_creature_instance::Entity>(
            scope,
            "game_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_location_instance::Entity>(
            scope,
            "game_instance_id",
            self.id,
        )
        .await
    }
}

async fn check_parameter(
    scope: &Scope<'_>,
    rec: &game_instance_parameter::Model,
) -> Result<(), DomainError> {
    let instance = scope
        .repo::<game_instance::Entity>()
        .get_one(rec.game_instance_id, Lock::None)
        .await?;
    let game = require_game(scope, instance.game_id).await?;
    parameters::validate_parameter(game.game_type, &rec.parameter_key, &rec.parameter_value)
}

#[async_trait]
impl Lifecycle for game_instance_parameter::Model {
    /// Catalog key, typed value, one live row per key.
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        check_parameter(scope, self).await?;
        let taken = scope
            .unrestricted()
            .repo::<game_instance_parameter::Entity>()
            .count(
                &QueryOptions::new()
                    .eq("game_instance_id", self.game_instance_id)
                    .eq("parameter_key", self.parameter_key.clone()),
            )
            .await?;
        if taken > 0 {
            return Err(DomainError::invalid_field(
                "parameter_key",
                &self.parameter_key,
                "parameter is already set for this game instance",
            ));
        }
        Ok(())
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        check_parameter(scope, next).await
    }
}

#[async_trait]
impl Lifecycle for adventure_game_location_instance::Model {
    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_item_instance::Entity>(
            scope,
            "adventure_game_location_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_creature_instance::Entity>(
            scope,
            "adventure_game_location_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_character_instance::Entity>(
            scope,
            "adventure_game_location_instance_id",
            self.id,
        )
        .await
    }
}

fn different_instance(field: &'static str, id: Uuid) -> DomainError {
    DomainError::invalid_field(field, id, "owner belongs to a different game instance")
}

/// Live items carried by a character, not counting `except`.
async fn carried_excluding(
    scope: &Scope<'_>,
    character_id: Uuid,
    except: Uuid,
) -> Result<u64, DomainError> {
    scope
        .unrestricted()
        .repo::<adventure_game_item_instance::Entity>()
        .count(
            &QueryOptions::new()
                .eq("adventure_game_character_instance_id", character_id)
                .ne("id", except),
        )
        .await
}

/// Owner of the same instance, room in a character's inventory and a free
/// equipment slot.
async fn check_item_owner(
    scope: &Scope<'_>,
    rec: &adventure_game_item_instance::Model,
) -> Result<(), DomainError> {
    let scope = scope.unrestricted();
    match inventory::owner_of(rec)? {
        Owner::Location(id) => {
            let location = scope
                .repo::<adventure_game_location_instance::Entity>()
                .get_one(id, Lock::None)
                .await?;
            if location.game_instance_id != rec.game_instance_id {
                return Err(different_instance("adventure_game_location_instance_id", id));
            }
        }
        Owner::Creature(id) => {
            let creature = scope
                .repo::<adventure_game_creature_instance::Entity>()
                .get_one(id, Lock::None)
                .await?;
            if creature.game_instance_id != rec.game_instance_id {
                return Err(different_instance("adventure_game_creature_instance_id", id));
            }
        }
        Owner::Character(id) => {
            let character = scope
                .repo::<adventure_game_character_instance::Entity>()
                .get_one(id, Lock::None)
                .await?;
            if character.game_instance_id != rec.game_instance_id {
                return Err(different_instance("adventure_game_character_instance_id", id));
            }
            let carried = carried_excluding(&scope, id, rec.id).await?;
            if carried >= u64::try_from(character.inventory_capacity).unwrap_or(0) {
                return Err(DomainError::invalid_field(
                    "inventory_capacity",
                    character.inventory_capacity,
                    "inventory is full",
                ));
            }
            if let (true, Some(slot)) = (rec.is_equipped, &rec.equipment_slot) {
                let occupied = scope
                    .repo::<adventure_game_item_instance::Entity>()
                    .count(
                        &QueryOptions::new()
                            .eq("adventure_game_character_instance_id", id)
                            .eq("is_equipped", true)
                            .eq("equipment_slot", slot.clone())
                            .ne("id", rec.id),
                    )
                    .await?;
                if occupied > 0 {
                    return Err(DomainError::invalid_field(
                        "equipment_slot",
                        slot,
                        format!("another item is already equipped in slot {slot}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Lifecycle for adventure_game_item_instance::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        check_item_owner(scope, self).await
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        check_item_owner(scope, next).await
    }
}

#[async_trait]
impl Lifecycle for adventure_game_creature_instance::Model {
    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_item_instance::Entity>(
            scope,
            "adventure_game_creature_instance_id",
            self.id,
        )
        .await
    }
}

#[async_trait]
impl Lifecycle for adventure_game_character_instance::Model {
    /// A character position must be a location of the same instance, and
    /// the capacity never drops below what the character already carries.
    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if next.inventory_capacity < self.inventory_capacity {
            let carried = carried_excluding(scope, self.id, Uuid::nil()).await?;
            if carried > u64::try_from(next.inventory_capacity).unwrap_or(0) {
                return Err(DomainError::invalid_field(
                    "inventory_capacity",
                    next.inventory_capacity,
                    format!("capacity cannot drop below the {carried} items carried"),
                ));
            }
        }

        let Some(location_id) = next.adventure_game_location_instance_id else {
            return Ok(());
        };
        if self.adventure_game_location_instance_id == Some(location_id) {
            return Ok(());
        }
        let location = scope
            .unrestricted()
            .repo::<adventure_game_location_instance::Entity>()
            .get_one(location_id, Lock::None)
            .await?;
        if location.game_instance_id != next.game_instance_id {
            return Err(DomainError::invalid_field(
                "adventure_game_location_instance_id",
                location_id,
                "location belongs to a different game instance",
            ));
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_item_instance::Entity>(
            scope,
            "adventure_game_character_instance_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_turn_sheet::Entity>(
            scope,
            "adventure_game_character_instance_id",
            self.id,
        )
        .await
    }
}

/// Location instance of the game's starting location, once materialised.
pub(crate) async fn starting_location_instance(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
) -> Result<Option<adventure_game_location_instance::Model>, DomainError> {
    let scope = scope.unrestricted();
    let Some(start) = scope
        .repo::<adventure_game_location::Entity>()
        .first(
            QueryOptions::new()
                .eq("game_id", instance.game_id)
                .eq("is_starting_location", true),
        )
        .await?
    else {
        return Ok(None);
    };
    scope
        .repo::<adventure_game_location_instance::Entity>()
        .first(
            QueryOptions::new()
                .eq("game_instance_id", instance.id)
                .eq("adventure_game_location_id", start.id),
        )
        .await
}

/// Catalog defaults merged with the instance's stored overrides.
pub(crate) async fn load_parameters(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
) -> Result<BTreeMap<String, String>, DomainError> {
    let game = require_game(scope, instance.game_id).await?;
    let stored = scope
        .unrestricted()
        .repo::<game_instance_parameter::Entity>()
        .get_many(&QueryOptions::new().eq("game_instance_id", instance.id))
        .await?;
    Ok(parameters::effective_parameters(
        game.game_type,
        stored
            .iter()
            .map(|p| (p.parameter_key.as_str(), p.parameter_value.as_str())),
    ))
}

/// Fields a manager chooses when creating an instance.
#[derive(Debug, Clone)]
pub struct NewGameInstance {
    pub game_id: Uuid,
    pub game_subscription_id: Uuid,
    pub delivery_physical_post: bool,
    pub delivery_physical_local: bool,
    pub delivery_email: bool,
    pub is_closed_testing: bool,
    pub required_player_count: i32,
}

impl NewGameInstance {
    /// Email delivery, no player limit.
    pub fn new(game_id: Uuid, game_subscription_id: Uuid) -> Self {
        Self {
            game_id,
            game_subscription_id,
            delivery_physical_post: false,
            delivery_physical_local: false,
            delivery_email: true,
            is_closed_testing: false,
            required_player_count: 0,
        }
    }

    pub fn with_required_player_count(mut self, count: i32) -> Self {
        self.required_player_count = count;
        self
    }
}

/// Game instance service.
pub struct GameInstanceService;

impl GameInstanceService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_game_instance(
        &self,
        scope: &Scope<'_>,
        new: NewGameInstance,
    ) -> Result<game_instance::Model, DomainError> {
        let instance = crud::create::<game_instance::Entity>(
            scope,
            game_instance::Model {
                id: Uuid::nil(),
                game_id: new.game_id,
                game_subscription_id: new.game_subscription_id,
                status: GameInstanceStatus::Created,
                current_turn: 0,
                delivery_physical_post: new.delivery_physical_post,
                delivery_physical_local: new.delivery_physical_local,
                delivery_email: new.delivery_email,
                is_closed_testing: new.is_closed_testing,
                required_player_count: new.required_player_count,
                started_at: None,
                completed_at: None,
                last_turn_processed_at: None,
                next_turn_due_at: None,
                created_at: OffsetDateTime::now_utc(),
                updated_at: None,
                deleted_at: None,
            },
        )
        .await?;
        info!(game_instance_id = %instance.id, game_id = %instance.game_id, "Game instance created");
        Ok(instance)
    }

    /// `created -> started` materialises the catalog and issues turn 0;
    /// `paused -> started` resumes and re-arms the turn timer.
    pub async fn start_game_instance(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<game_instance::Model, DomainError> {
        let mut instance = lock_instance(scope, game_instance_id).await?;
        if instance.status == GameInstanceStatus::Started {
            return Err(DomainError::invalid_field(
                "status",
                "started",
                "game instance is already started",
            ));
        }
        instance_status::check_transition(instance.status, GameInstanceStatus::Started)?;
        let game = require_game(scope, instance.game_id).await?;
        let now = OffsetDateTime::now_utc();

        if instance.status == GameInstanceStatus::Paused {
            instance.status = GameInstanceStatus::Started;
            instance.next_turn_due_at = Some(now + turn_duration(&game));
            let instance = crud::update::<game_instance::Entity>(scope, instance).await?;
            info!(game_instance_id = %instance.id, turn = instance.current_turn, "Game instance resumed");
            return Ok(instance);
        }

        let issues = readiness::assess(&load_catalog(scope, game.id).await?);
        if readiness::has_errors(&issues) {
            let reasons: Vec<&str> = issues
                .iter()
                .filter(|i| i.severity == readiness::Severity::Error)
                .map(|i| i.message.as_str())
                .collect();
            return Err(DomainError::invalid_field(
                "game_id",
                game.id,
                format!("game is not ready: {}", reasons.join("; ")),
            ));
        }

        let locations = materialize(scope, &instance).await?;
        let start = starting_location_instance(scope, &instance)
            .await?
            .ok_or_else(|| DomainError::internal("starting location was not materialised"))?;
        let placed = place_waiting_characters(scope, &instance, start.id).await?;

        instance.status = GameInstanceStatus::Started;
        instance.started_at = Some(now);
        instance.next_turn_due_at = Some(now + turn_duration(&game));
        let instance = crud::update::<game_instance::Entity>(scope, instance).await?;

        let issued =
            turn_processing::generate_sheets_for_turn(scope, &instance, instance.current_turn)
                .await?;
        info!(
            game_instance_id = %instance.id,
            locations,
            characters = placed,
            sheets = issued,
            "Game instance started"
        );
        Ok(instance)
    }

    pub async fn pause_game_instance(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<game_instance::Model, DomainError> {
        self.move_to(scope, game_instance_id, GameInstanceStatus::Paused)
            .await
    }

    pub async fn complete_game_instance(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<game_instance::Model, DomainError> {
        self.move_to(scope, game_instance_id, GameInstanceStatus::Completed)
            .await
    }

    pub async fn cancel_game_instance(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<game_instance::Model, DomainError> {
        self.move_to(scope, game_instance_id, GameInstanceStatus::Cancelled)
            .await
    }

    /// Moves that only touch status and scheduling.
    async fn move_to(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
        to: GameInstanceStatus,
    ) -> Result<game_instance::Model, DomainError> {
        let mut instance = lock_instance(scope, game_instance_id).await?;
        if instance.status == to {
            return Err(DomainError::invalid_field(
                "status",
                status_name(to),
                format!("game instance is already {}", status_name(to)),
            ));
        }
        instance_status::check_transition(instance.status, to)?;
        let from = instance.status;
        instance.status = to;
        instance.next_turn_due_at = None;
        if to == GameInstanceStatus::Completed {
            instance.completed_at = Some(OffsetDateTime::now_utc());
        }
        let instance = crud::update::<game_instance::Entity>(scope, instance).await?;
        info!(
            game_instance_id = %instance.id,
            from = status_name(from),
            to = status_name(to),
            "Game instance status changed"
        );
        Ok(instance)
    }

    /// Create the character instance for a player's link. Idempotent per
    /// (instance, character). The character enters the world through its
    /// `join_game` sheet; a running instance gets that sheet immediately.
    pub async fn join_game_instance(
        &self,
        scope: &Scope<'_>,
        game_subscription_instance_id: Uuid,
        adventure_game_character_id: Uuid,
    ) -> Result<adventure_game_character_instance::Model, DomainError> {
        let link = scope
            .repo::<game_subscription_instance::Entity>()
            .get_one(game_subscription_instance_id, Lock::None)
            .await?;
        let instance = lock_instance(&scope.unrestricted(), link.game_instance_id).await?;
        if instance_status::is_terminal(instance.status) {
            return Err(DomainError::invalid_field(
                "game_instance_id",
                instance.id,
                "game instance has finished",
            ));
        }

        let character = scope
            .repo::<adventure_game_character::Entity>()
            .get_one(adventure_game_character_id, Lock::None)
            .await?;
        if character.game_id != instance.game_id {
            return Err(DomainError::invalid_field(
                "adventure_game_character_id",
                character.id,
                "character belongs to a different game",
            ));
        }
        if character.account_id != link.account_id {
            return Err(DomainError::invalid_field(
                "adventure_game_character_id",
                character.id,
                "character belongs to a different account",
            ));
        }
        let sub = scope
            .unrestricted()
            .repo::<game_subscription::Entity>()
            .get_one(link.game_subscription_id, Lock::None)
            .await?;
        if sub.account_user_id.is_some_and(|user| user != character.account_user_id) {
            return Err(DomainError::invalid_field(
                "adventure_game_character_id",
                character.id,
                "character is bound to a different account user",
            ));
        }

        let characters = scope
            .unrestricted()
            .repo::<adventure_game_character_instance::Entity>();
        let existing = characters
            .first(
                QueryOptions::new()
                    .eq("game_instance_id", instance.id)
                    .eq("adventure_game_character_id", character.id),
            )
            .await?;
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let params = load_parameters(scope, &instance).await?;
        let capacity = parameters::int_value(&params, INVENTORY_CAPACITY)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(scope.config.default_inventory_capacity);

        let created = crud::create::<adventure_game_character_instance::Entity>(
            scope,
            adventure_game_character_instance::Model {
                id: Uuid::nil(),
                game_id: instance.game_id,
                game_instance_id: instance.id,
                adventure_game_character_id: character.id,
                adventure_game_location_instance_id: None,
                health: scope.config.default_character_health,
                inventory_capacity: capacity,
                created_at: OffsetDateTime::now_utc(),
                updated_at: None,
                deleted_at: None,
            },
        )
        .await?;

        if instance.status == GameInstanceStatus::Started {
            turn_processing::issue_sheet(scope, &instance, &created, instance.current_turn).await?;
        }
        info!(
            game_instance_id = %instance.id,
            adventure_game_character_instance_id = %created.id,
            "Character joined game instance"
        );
        Ok(created)
    }

    /// Create or overwrite one parameter.
    pub async fn set_parameter(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
        key: &str,
        value: &str,
    ) -> Result<game_instance_parameter::Model, DomainError> {
        let existing = scope
            .repo::<game_instance_parameter::Entity>()
            .first(
                QueryOptions::new()
                    .eq("game_instance_id", game_instance_id)
                    .eq("parameter_key", key.to_string())
                    .with_lock(Lock::ForUpdateNoWait),
            )
            .await?;
        match existing {
            Some(mut param) => {
                param.parameter_value = value.to_string();
                crud::update::<game_instance_parameter::Entity>(scope, param).await
            }
            None => {
                crud::create::<game_instance_parameter::Entity>(
                    scope,
                    game_instance_parameter::Model {
                        id: Uuid::nil(),
                        game_instance_id,
                        parameter_key: key.to_string(),
                        parameter_value: value.to_string(),
                        created_at: OffsetDateTime::now_utc(),
                        updated_at: None,
                        deleted_at: None,
                    },
                )
                .await
            }
        }
    }

    pub async fn effective_parameters(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<BTreeMap<String, String>, DomainError> {
        let instance = scope
            .repo::<game_instance::Entity>()
            .get_one(game_instance_id, Lock::None)
            .await?;
        load_parameters(scope, &instance).await
    }

    /// Whether characters in this instance may drop items.
    pub async fn allows_item_drop(
        &self,
        scope: &Scope<'_>,
        instance: &game_instance::Model,
    ) -> Result<bool, DomainError> {
        let params = load_parameters(scope, instance).await?;
        Ok(parameters::bool_value(&params, ALLOW_ITEM_DROP).unwrap_or(true))
    }

    /// Started instances whose next turn is due at or before `now`, most
    /// overdue first.
    pub async fn find_instances_due(
        &self,
        scope: &Scope<'_>,
        now: OffsetDateTime,
    ) -> Result<Vec<game_instance::Model>, DomainError> {
        scope
            .repo::<game_instance::Entity>()
            .get_many(
                &QueryOptions::new()
                    .eq("status", GameInstanceStatus::Started)
                    .is_not_null("next_turn_due_at")
                    .lte("next_turn_due_at", now)
                    .with_sort("next_turn_due_at", Order::Asc)
                    .with_sort("id", Order::Asc),
            )
            .await
    }
}

impl Default for GameInstanceService {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy catalog content into the instance. Returns the number of location
/// instances created.
async fn materialize(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
) -> Result<usize, DomainError> {
    let catalog = load_catalog(scope, instance.game_id).await?;
    let now = OffsetDateTime::now_utc();

    let mut location_map: HashMap<Uuid, Uuid> = HashMap::new();
    for location in &catalog.locations {
        let created = crud::create::<adventure_game_location_instance::Entity>(
            scope,
            adventure_game_location_instance::Model {
                id: Uuid::nil(),
                game_id: instance.game_id,
                game_instance_id: instance.id,
                adventure_game_location_id: location.id,
                created_at: now,
                updated_at: None,
                deleted_at: None,
            },
        )
        .await?;
        location_map.insert(location.id, created.id);
    }

    let placed_at = |catalog_location: Uuid| {
        location_map.get(&catalog_location).copied().ok_or_else(|| {
            DomainError::internal(format!(
                "placement references location {catalog_location} outside the game"
            ))
        })
    };

    let mut items = 0usize;
    for placement in &catalog.item_placements {
        let location_instance_id = placed_at(placement.adventure_game_location_id)?;
        for _ in 0..placement.initial_count {
            crud::create::<adventure_game_item_instance::Entity>(
                scope,
                adventure_game_item_instance::Model {
                    id: Uuid::nil(),
                    game_id: instance.game_id,
                    game_instance_id: instance.id,
                    adventure_game_item_id: placement.adventure_game_item_id,
                    adventure_game_location_instance_id: Some(location_instance_id),
                    adventure_game_character_instance_id: None,
                    adventure_game_creature_instance_id: None,
                    is_equipped: false,
                    equipment_slot: None,
                    created_at: now,
                    updated_at: None,
                    deleted_at: None,
                },
            )
            .await?;
            items += 1;
        }
    }

    let creature_placements = scope
        .unrestricted()
        .repo::<adventure_game_creature_placement::Entity>()
        .get_many(&QueryOptions::new().eq("game_id", instance.game_id))
        .await?;
    let mut creatures = 0usize;
    for placement in &creature_placements {
        let location_instance_id = placed_at(placement.adventure_game_location_id)?;
        for _ in 0..placement.initial_count {
            crud::create::<adventure_game_creature_instance::Entity>(
                scope,
                adventure_game_creature_instance::Model {
                    id: Uuid::nil(),
                    game_id: instance.game_id,
                    game_instance_id: instance.id,
                    adventure_game_creature_id: placement.adventure_game_creature_id,
                    adventure_game_location_instance_id: location_instance_id,
                    health: scope.config.default_character_health,
                    created_at: now,
                    updated_at: None,
                    deleted_at: None,
                },
            )
            .await?;
            creatures += 1;
        }
    }

    debug!(
        game_instance_id = %instance.id,
        locations = location_map.len(),
        items,
        creatures,
        "Catalog materialised"
    );
    Ok(location_map.len())
}

/// Put characters that joined before the start at the starting location.
async fn place_waiting_characters(
    scope: &Scope<'_>,
    instance: &game_instance::Model,
    start_location_instance_id: Uuid,
) -> Result<usize, DomainError> {
    let waiting = scope
        .unrestricted()
        .repo::<adventure_game_character_instance::Entity>()
        .get_many(
            &QueryOptions::new()
                .eq("game_instance_id", instance.id)
                .is_null("adventure_game_location_instance_id"),
        )
        .await?;
    let count = waiting.len();
    for mut character in waiting {
        character.adventure_game_location_instance_id = Some(start_location_instance_id);
        crud::update::<adventure_game_character_instance::Entity>(scope, character).await?;
    }
    Ok(count)
}
