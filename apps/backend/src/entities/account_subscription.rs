use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Platform-level subscription product.
///
/// Designer and manager products belong to a tenant account; player
/// products belong to an individual account user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum AccountSubscriptionType {
    #[sea_orm(string_value = "basic_game_designer")]
    #[serde(rename = "basic_game_designer")]
    BasicGameDesigner,
    #[sea_orm(string_value = "professional_game_designer")]
    #[serde(rename = "professional_game_designer")]
    ProfessionalGameDesigner,
    #[sea_orm(string_value = "basic_manager")]
    #[serde(rename = "basic_manager")]
    BasicManager,
    #[sea_orm(string_value = "professional_manager")]
    #[serde(rename = "professional_manager")]
    ProfessionalManager,
    #[sea_orm(string_value = "basic_player")]
    #[serde(rename = "basic_player")]
    BasicPlayer,
    #[sea_orm(string_value = "professional_player")]
    #[serde(rename = "professional_player")]
    ProfessionalPlayer,
}

impl AccountSubscriptionType {
    /// Tenant-scoped products attach to `account_id`; the rest to `account_user_id`.
    pub fn is_tenant_scoped(self) -> bool {
        !matches!(self, Self::BasicPlayer | Self::ProfessionalPlayer)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPeriod {
    #[sea_orm(string_value = "month")]
    Month,
    #[sea_orm(string_value = "year")]
    Year,
    #[sea_orm(string_value = "eternal")]
    Eternal,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AccountSubscriptionStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub account_user_id: Option<Uuid>,
    pub subscription_type: AccountSubscriptionType,
    pub subscription_period: SubscriptionPeriod,
    pub status: AccountSubscriptionStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: Option<OffsetDateTime>,
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
