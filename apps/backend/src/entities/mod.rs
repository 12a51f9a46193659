//! SeaORM entities. Table names double as RLS keys (`<table>_id`).

pub mod account;
pub mod account_contact;
pub mod account_subscription;
pub mod account_user;
pub mod account_user_contact;
pub mod adventure_game_character;
pub mod adventure_game_character_instance;
pub mod adventure_game_creature;
pub mod adventure_game_creature_instance;
pub mod adventure_game_creature_placement;
pub mod adventure_game_item;
pub mod adventure_game_item_instance;
pub mod adventure_game_item_placement;
pub mod adventure_game_location;
pub mod adventure_game_location_instance;
pub mod adventure_game_location_link;
pub mod adventure_game_location_link_requirement;
pub mod adventure_game_turn_sheet;
pub mod game;
pub mod game_image;
pub mod game_instance;
pub mod game_instance_parameter;
pub mod game_subscription;
pub mod game_subscription_instance;
pub mod game_turn_sheet;

pub use account::{AccountStatus, Entity as Accounts, Model as Account};
pub use account_subscription::{
    AccountSubscriptionStatus, AccountSubscriptionType, SubscriptionPeriod,
};
pub use game::{Entity as Games, GameStatus, GameType, Model as Game};
pub use game_image::GameImageType;
pub use game_instance::{Entity as GameInstances, GameInstanceStatus, Model as GameInstance};
pub use game_subscription::{GameSubscriptionStatus, GameSubscriptionType};
pub use game_turn_sheet::{Entity as GameTurnSheets, Model as GameTurnSheet, ProcessingStatus};
