use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adventure_game_creature_placement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub adventure_game_creature_id: Uuid,
    pub adventure_game_location_id: Uuid,
    pub initial_count: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::adventure_game_creature::Entity",
        from = "Column::AdventureGameCreatureId",
        to = "super::adventure_game_creature::Column::Id"
    )]
    Creature,
}

impl Related<super::adventure_game_creature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creature.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
