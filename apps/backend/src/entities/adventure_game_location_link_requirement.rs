use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Item a character must carry, in at least `quantity`, to traverse a link.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adventure_game_location_link_requirement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub adventure_game_location_link_id: Uuid,
    pub adventure_game_item_id: Uuid,
    pub quantity: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::adventure_game_location_link::Entity",
        from = "Column::AdventureGameLocationLinkId",
        to = "super::adventure_game_location_link::Column::Id"
    )]
    LocationLink,
}

impl Related<super::adventure_game_location_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LocationLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
