//! Domain services. Each method takes a [`Scope`](crate::repos::Scope) and
//! runs inside the caller's transaction.

pub mod accounts;
pub mod catalog;
pub mod crud;
pub mod game_instances;
pub mod games;
pub mod inventory;
pub mod subscriptions;
pub mod turn_processing;
pub mod turn_sheets;

pub use accounts::AccountService;
pub use game_instances::{GameInstanceService, NewGameInstance};
pub use games::{GameService, OwnedGame};
pub use inventory::{EquipOutcome, InventoryService};
pub use subscriptions::{PendingSubscription, SubscriptionService};
pub use turn_processing::TurnReport;
pub use turn_sheets::TurnSheetService;
