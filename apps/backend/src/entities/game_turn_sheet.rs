use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "scanned")]
    Scanned,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "error")]
    Error,
}

/// The digital record of one paper turn sheet.
///
/// `sheet_type` stays a free string at this layer: unknown types must be
/// storable so that processing can flag them as errors.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_turn_sheet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub game_instance_id: Uuid,
    pub account_id: Uuid,
    pub turn_number: i32,
    pub sheet_type: String,
    pub sheet_order: i32,
    #[sea_orm(column_type = "VarBinary(StringLen::None)")]
    pub sheet_data: Vec<u8>,
    #[sea_orm(column_type = "VarBinary(StringLen::None)", nullable)]
    pub scanned_data: Option<Vec<u8>>,
    pub scanned_at: Option<OffsetDateTime>,
    pub scan_quality: Option<f64>,
    pub scanned_by: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<OffsetDateTime>,
    pub processing_status: ProcessingStatus,
    pub error_message: Option<String>,
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
