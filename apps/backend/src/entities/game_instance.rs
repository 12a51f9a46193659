use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum GameInstanceStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "started")]
    Started,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// One running session of a published game, owned by a manager subscription.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_instance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub game_subscription_id: Uuid,
    pub status: GameInstanceStatus,
    pub current_turn: i32,
    pub delivery_physical_post: bool,
    pub delivery_physical_local: bool,
    pub delivery_email: bool,
    pub is_closed_testing: bool,
    /// Zero means unlimited.
    pub required_player_count: i32,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub last_turn_processed_at: Option<OffsetDateTime>,
    pub next_turn_due_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::game::Entity",
        from = "Column::GameId",
        to = "super::game::Column::Id"
    )]
    Game,
    #[sea_orm(
        belongs_to = "super::game_subscription::Entity",
        from = "Column::GameSubscriptionId",
        to = "super::game_subscription::Column::Id"
    )]
    GameSubscription,
}

impl Related<super::game::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Game.def()
    }
}

impl Related<super::game_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameSubscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
