use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adventure_game_creature_instance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub game_instance_id: Uuid,
    pub adventure_game_creature_id: Uuid,
    pub adventure_game_location_instance_id: Uuid,
    pub health: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::game_instance::Entity",
        from = "Column::GameInstanceId",
        to = "super::game_instance::Column::Id"
    )]
    GameInstance,
}

impl Related<super::game_instance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameInstance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
