//! Catalog lifecycle hooks: designer content checked against the store.
//!
//! Catalog rows may be added to a published game, but the core fields of
//! existing rows are frozen once their game is published.

use async_trait::async_trait;
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::entities::{
    account_user, adventure_game_character, adventure_game_character_instance,
    adventure_game_creature, adventure_game_creature_instance, adventure_game_creature_placement,
    adventure_game_item, adventure_game_item_instance, adventure_game_item_placement,
    adventure_game_location, adventure_game_location_instance, adventure_game_location_link,
    adventure_game_location_link_requirement, game, GameStatus,
};
use crate::errors::domain::DomainError;
use crate::repos::Scope;
use crate::services::crud::{ensure_no_live_children, Lifecycle};
use crate::validation::rules;

pub const STARTING_LOCATION_TAKEN: &str = "only one starting location is allowed per game";

pub(crate) async fn require_game(scope: &Scope<'_>, game_id: Uuid) -> Result<game::Model, DomainError> {
    scope.repo::<game::Entity>().get_one(game_id, Lock::None).await
}

async fn is_published(scope: &Scope<'_>, game_id: Uuid) -> Result<bool, DomainError> {
    Ok(require_game(scope, game_id).await?.status == GameStatus::Published)
}

fn same_game(field: &str, id: Uuid, found: Uuid, expected: Uuid) -> Result<(), DomainError> {
    if found != expected {
        return Err(DomainError::invalid_field(
            field,
            id,
            "must belong to the same game",
        ));
    }
    Ok(())
}

/// Any other live starting location in the game fails the check.
async fn ensure_single_start(
    scope: &Scope<'_>,
    game_id: Uuid,
    own_id: Uuid,
) -> Result<(), DomainError> {
    let others = scope
        .unrestricted()
        .repo::<adventure_game_location::Entity>()
        .get_many(
            &QueryOptions::new()
                .eq("game_id", game_id)
                .eq("is_starting_location", true)
                .ne("id", own_id)
                .with_limit(2)
                .with_lock(Lock::ForUpdateNoWait),
        )
        .await?;
    if !others.is_empty() {
        return Err(DomainError::invalid_field(
            "is_starting_location",
            true,
            STARTING_LOCATION_TAKEN,
        ));
    }
    Ok(())
}

#[async_trait]
impl Lifecycle for adventure_game_location::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        if self.is_starting_location {
            ensure_single_start(scope, self.game_id, self.id).await?;
        }
        Ok(())
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if is_published(scope, self.game_id).await? {
            rules::immutable("name", &self.name, &next.name)?;
            rules::immutable(
                "is_starting_location",
                &self.is_starting_location,
                &next.is_starting_location,
            )?;
        }
        if !self.is_starting_location && next.is_starting_location {
            ensure_single_start(scope, next.game_id, next.id).await?;
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_location_link::Entity>(
            scope,
            "from_adventure_game_location_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_location_link::Entity>(
            scope,
            "to_adventure_game_location_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_item_placement::Entity>(
            scope,
            "adventure_game_location_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_creature_placement::Entity>(
            scope,
            "adventure_game_location_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_location_instance::Entity>(
            scope,
            "adventure_game_location_id",
            self.id,
        )
        .await
    }
}

async fn check_link_endpoints(
    scope: &Scope<'_>,
    link: &adventure_game_location_link::Model,
) -> Result<(), DomainError> {
    let locations = scope.repo::<adventure_game_location::Entity>();
    for (field, id) in [
        ("from_adventure_game_location_id", link.from_adventure_game_location_id),
        ("to_adventure_game_location_id", link.to_adventure_game_location_id),
    ] {
        let location = locations.get_one(id, Lock::None).await?;
        same_game(field, id, location.game_id, link.game_id)?;
    }
    Ok(())
}

#[async_trait]
impl Lifecycle for adventure_game_location_link::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        check_link_endpoints(scope, self).await
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        let endpoints_moved = self.from_adventure_game_location_id
            != next.from_adventure_game_location_id
            || self.to_adventure_game_location_id != next.to_adventure_game_location_id;
        if endpoints_moved && is_published(scope, self.game_id).await? {
            return Err(DomainError::invalid_field(
                "to_adventure_game_location_id",
                next.to_adventure_game_location_id,
                "link endpoints cannot change once the game is published",
            ));
        }
        if endpoints_moved {
            check_link_endpoints(scope, next).await?;
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_location_link_requirement::Entity>(
            scope,
            "adventure_game_location_link_id",
            self.id,
        )
        .await
    }
}

async fn check_requirement_refs(
    scope: &Scope<'_>,
    req: &adventure_game_location_link_requirement::Model,
) -> Result<(), DomainError> {
    let link = scope
        .repo::<adventure_game_location_link::Entity>()
        .get_one(req.adventure_game_location_link_id, Lock::None)
        .await?;
    same_game(
        "adventure_game_location_link_id",
        link.id,
        link.game_id,
        req.game_id,
    )?;
    let item = scope
        .repo::<adventure_game_item::Entity>()
        .get_one(req.adventure_game_item_id, Lock::None)
        .await?;
    same_game("adventure_game_item_id", item.id, item.game_id, req.game_id)
}

#[async_trait]
impl Lifecycle for adventure_game_location_link_requirement::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        check_requirement_refs(scope, self).await
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if is_published(scope, self.game_id).await? {
            rules::immutable_id(
                "adventure_game_item_id",
                self.adventure_game_item_id,
                next.adventure_game_item_id,
            )?;
            rules::immutable("quantity", &self.quantity, &next.quantity)?;
        }
        check_requirement_refs(scope, next).await
    }
}

#[async_trait]
impl Lifecycle for adventure_game_item::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        Ok(())
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if is_published(scope, self.game_id).await? {
            rules::immutable("name", &self.name, &next.name)?;
            rules::immutable("can_be_equipped", &self.can_be_equipped, &next.can_be_equipped)?;
            if self.equipment_slot != next.equipment_slot {
                return Err(DomainError::invalid_field(
                    "equipment_slot",
                    next.equipment_slot.as_deref().unwrap_or_default(),
                    "cannot be changed once the game is published",
                ));
            }
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_item_placement::Entity>(
            scope,
            "adventure_game_item_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_location_link_requirement::Entity>(
            scope,
            "adventure_game_item_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_item_instance::Entity>(
            scope,
            "adventure_game_item_id",
            self.id,
        )
        .await
    }
}

#[async_trait]
impl Lifecycle for adventure_game_creature::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        Ok(())
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if is_published(scope, self.game_id).await? {
            rules::immutable("name", &self.name, &next.name)?;
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_creature_placement::Entity>(
            scope,
            "adventure_game_creature_id",
            self.id,
        )
        .await?;
        ensure_no_live_children::<adventure_game_creature_instance::Entity>(
            scope,
            "adventure_game_creature_id",
            self.id,
        )
        .await
    }
}

#[async_trait]
impl Lifecycle for adventure_game_character::Model {
    /// The bound user must be a member of the owning account.
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        let user = scope
            .unrestricted()
            .repo::<account_user::Entity>()
            .get_one(self.account_user_id, Lock::None)
            .await?;
        if user.account_id != self.account_id {
            return Err(DomainError::invalid_field(
                "account_user_id",
                self.account_user_id,
                "user does not belong to the character's account",
            ));
        }
        Ok(())
    }

    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<adventure_game_character_instance::Entity>(
            scope,
            "adventure_game_character_id",
            self.id,
        )
        .await
    }
}

async fn check_location_in_game(
    scope: &Scope<'_>,
    location_id: Uuid,
    game_id: Uuid,
) -> Result<(), DomainError> {
    let location = scope
        .repo::<adventure_game_location::Entity>()
        .get_one(location_id, Lock::None)
        .await?;
    same_game("adventure_game_location_id", location_id, location.game_id, game_id)
}

#[async_trait]
impl Lifecycle for adventure_game_item_placement::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        let item = scope
            .repo::<adventure_game_item::Entity>()
            .get_one(self.adventure_game_item_id, Lock::None)
            .await?;
        same_game("adventure_game_item_id", item.id, item.game_id, self.game_id)?;
        check_location_in_game(scope, self.adventure_game_location_id, self.game_id).await
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if self.adventure_game_location_id != next.adventure_game_location_id {
            check_location_in_game(scope, next.adventure_game_location_id, next.game_id).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Lifecycle for adventure_game_creature_placement::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        let creature = scope
            .repo::<adventure_game_creature::Entity>()
            .get_one(self.adventure_game_creature_id, Lock::None)
            .await?;
        same_game(
            "adventure_game_creature_id",
            creature.id,
            creature.game_id,
            self.game_id,
        )?;
        check_location_in_game(scope, self.adventure_game_location_id, self.game_id).await
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        if self.adventure_game_location_id != next.adventure_game_location_id {
            check_location_in_game(scope, next.adventure_game_location_id, next.game_id).await?;
        }
        Ok(())
    }
}
