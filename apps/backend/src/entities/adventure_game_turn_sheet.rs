use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Links a generic turn sheet to the character instance it was issued for.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adventure_game_turn_sheet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub adventure_game_character_instance_id: Uuid,
    pub game_turn_sheet_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::game_turn_sheet::Entity",
        from = "Column::GameTurnSheetId",
        to = "super::game_turn_sheet::Column::Id"
    )]
    GameTurnSheet,
}

impl Related<super::game_turn_sheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameTurnSheet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
