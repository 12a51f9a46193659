use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Binds a player subscription to one game instance and carries the
/// rotating turn sheet token for that link.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_subscription_instance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_subscription_id: Uuid,
    pub game_instance_id: Uuid,
    pub account_id: Uuid,
    pub turn_sheet_token: Option<Uuid>,
    pub turn_sheet_token_expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::game_subscription::Entity",
        from = "Column::GameSubscriptionId",
        to = "super::game_subscription::Column::Id"
    )]
    GameSubscription,
    #[sea_orm(
        belongs_to = "super::game_instance::Entity",
        from = "Column::GameInstanceId",
        to = "super::game_instance::Column::Id"
    )]
    GameInstance,
}

impl Related<super::game_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameSubscription.def()
    }
}

impl Related<super::game_instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameInstance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
