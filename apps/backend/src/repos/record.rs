//! Common shape of every persisted row.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities;

/// Id, audit timestamps and soft-delete marker shared by all tables.
pub trait Record: Clone + Send + Sync + 'static {
    /// Table name; also the prefix of RLS keys (`<TABLE>_id`).
    const TABLE: &'static str;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn created_at(&self) -> OffsetDateTime;
    fn set_created_at(&mut self, at: OffsetDateTime);
    fn set_updated_at(&mut self, at: Option<OffsetDateTime>);
    fn deleted_at(&self) -> Option<OffsetDateTime>;
    fn set_deleted_at(&mut self, at: Option<OffsetDateTime>);
}

macro_rules! impl_record {
    ($($module:ident),+ $(,)?) => {
        $(
            impl Record for entities::$module::Model {
                const TABLE: &'static str = stringify!($module);

                fn id(&self) -> Uuid {
                    self.id
                }

                fn set_id(&mut self, id: Uuid) {
                    self.id = id;
                }

                fn created_at(&self) -> OffsetDateTime {
                    self.created_at
                }

                fn set_created_at(&mut self, at: OffsetDateTime) {
                    self.created_at = at;
                }

                fn set_updated_at(&mut self, at: Option<OffsetDateTime>) {
                    self.updated_at = at;
                }

                fn deleted_at(&self) -> Option<OffsetDateTime> {
                    self.deleted_at
                }

                fn set_deleted_at(&mut self, at: Option<OffsetDateTime>) {
                    self.deleted_at = at;
                }
            }
        )+
    };
}

impl_record!(
    account,
    account_contact,
    account_subscription,
    account_user,
    account_user_contact,
    adventure_game_character,
    adventure_game_character_instance,
    adventure_game_creature,
    adventure_game_creature_instance,
    adventure_game_creature_placement,
    adventure_game_item,
    adventure_game_item_instance,
    adventure_game_item_placement,
    adventure_game_location,
    adventure_game_location_instance,
    adventure_game_location_link,
    adventure_game_location_link_requirement,
    adventure_game_turn_sheet,
    game,
    game_image,
    game_instance,
    game_instance_parameter,
    game_subscription,
    game_subscription_instance,
    game_turn_sheet,
);
