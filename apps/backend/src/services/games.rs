//! Game definitions: publishing, owner subscriptions and readiness.

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::records_sea::{Lock, QueryOptions};
use crate::domain::readiness::{self, CatalogSnapshot, ReadinessIssue};
use crate::entities::{
    adventure_game_character, adventure_game_creature, adventure_game_item,
    adventure_game_item_placement, adventure_game_location, adventure_game_location_link,
    adventure_game_location_link_requirement, game, game_image, game_instance, game_subscription,
    GameStatus, GameSubscriptionStatus, GameSubscriptionType,
};
use crate::errors::domain::DomainError;
use crate::repos::Scope;
use crate::services::catalog::require_game;
use crate::services::crud::{self, ensure_no_live_children, Lifecycle};
use crate::validation::images::validate_image;

#[async_trait]
impl Lifecycle for game::Model {
    async fn before_remove(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        ensure_no_live_children::<game_instance::Entity>(scope, "game_id", self.id).await?;
        ensure_no_live_children::<game_subscription::Entity>(scope, "game_id", self.id).await?;
        ensure_no_live_children::<adventure_game_location::Entity>(scope, "game_id", self.id)
            .await?;
        ensure_no_live_children::<adventure_game_item::Entity>(scope, "game_id", self.id).await?;
        ensure_no_live_children::<adventure_game_creature::Entity>(scope, "game_id", self.id)
            .await?;
        ensure_no_live_children::<adventure_game_character::Entity>(scope, "game_id", self.id)
            .await?;
        ensure_no_live_children::<game_image::Entity>(scope, "game_id", self.id).await
    }
}

#[async_trait]
impl Lifecycle for game_image::Model {
    async fn before_create(&self, scope: &Scope<'_>) -> Result<(), DomainError> {
        require_game(scope, self.game_id).await?;
        for issue in validate_image(self, scope.config)? {
            warn!(game_id = %self.game_id, field = %issue.field, "{}", issue.message);
        }
        Ok(())
    }

    async fn before_update(&self, next: &Self, scope: &Scope<'_>) -> Result<(), DomainError> {
        validate_image(next, scope.config)?;
        Ok(())
    }
}

/// Game created together with its owner subscriptions.
#[derive(Debug, Clone)]
pub struct OwnedGame {
    pub game: game::Model,
    pub designer: game_subscription::Model,
    pub manager: Option<game_subscription::Model>,
}

/// Game service.
pub struct GameService;

impl GameService {
    pub fn new() -> Self {
        Self
    }

    /// `draft -> published`. Publishing twice is rejected.
    pub async fn publish(&self, scope: &Scope<'_>, game_id: Uuid) -> Result<game::Model, DomainError> {
        let mut game = scope
            .repo::<game::Entity>()
            .get_one(game_id, Lock::ForUpdateNoWait)
            .await?;
        if game.status == GameStatus::Published {
            return Err(DomainError::invalid_field(
                "status",
                "published",
                "game is already published",
            ));
        }
        game.status = GameStatus::Published;
        let game = crud::update::<game::Entity>(scope, game).await?;
        info!(game_id = %game.id, "Game published");
        Ok(game)
    }

    /// Create a game plus an active Designer subscription for
    /// `designer_account_id` and, when given, an active Manager subscription.
    pub async fn create_game_with_owner_subscriptions(
        &self,
        scope: &Scope<'_>,
        game: game::Model,
        designer_account_id: Uuid,
        manager_account_id: Option<Uuid>,
    ) -> Result<OwnedGame, DomainError> {
        let game = crud::create::<game::Entity>(scope, game).await?;
        let designer = crud::create::<game_subscription::Entity>(
            scope,
            owner_subscription(game.id, designer_account_id, GameSubscriptionType::Designer),
        )
        .await?;
        let manager = match manager_account_id {
            Some(account_id) => Some(
                crud::create::<game_subscription::Entity>(
                    scope,
                    owner_subscription(game.id, account_id, GameSubscriptionType::Manager),
                )
                .await?,
            ),
            None => None,
        };
        info!(game_id = %game.id, %designer_account_id, "Game created with owner subscriptions");
        Ok(OwnedGame {
            game,
            designer,
            manager,
        })
    }

    /// Readiness report for starting an instance. Errors block the start;
    /// warnings are advisory.
    pub async fn validate_game_ready_for_instance(
        &self,
        scope: &Scope<'_>,
        game_id: Uuid,
    ) -> Result<Vec<ReadinessIssue>, DomainError> {
        let snapshot = load_catalog(scope, game_id).await?;
        Ok(readiness::assess(&snapshot))
    }
}

impl Default for GameService {
    fn default() -> Self {
        Self::new()
    }
}

fn owner_subscription(
    game_id: Uuid,
    account_id: Uuid,
    subscription_type: GameSubscriptionType,
) -> game_subscription::Model {
    game_subscription::Model {
        id: Uuid::nil(),
        game_id,
        account_id,
        account_user_id: None,
        account_user_contact_id: None,
        subscription_type,
        status: GameSubscriptionStatus::Active,
        created_at: OffsetDateTime::now_utc(),
        updated_at: None,
        deleted_at: None,
    }
}

/// Live catalog rows of `game_id`, read without RLS.
pub(crate) async fn load_catalog(
    scope: &Scope<'_>,
    game_id: Uuid,
) -> Result<CatalogSnapshot, DomainError> {
    require_game(scope, game_id).await?;
    let scope = scope.unrestricted();
    let by_game = QueryOptions::new().eq("game_id", game_id);
    Ok(CatalogSnapshot {
        locations: scope
            .repo::<adventure_game_location::Entity>()
            .get_many(&by_game)
            .await?,
        links: scope
            .repo::<adventure_game_location_link::Entity>()
            .get_many(&by_game)
            .await?,
        requirements: scope
            .repo::<adventure_game_location_link_requirement::Entity>()
            .get_many(&by_game)
            .await?,
        items: scope
            .repo::<adventure_game_item::Entity>()
            .get_many(&by_game)
            .await?,
        item_placements: scope
            .repo::<adventure_game_item_placement::Entity>()
            .get_many(&by_game)
            .await?,
    })
}
