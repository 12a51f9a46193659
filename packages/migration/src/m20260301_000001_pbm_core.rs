use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use sea_orm_migration::sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, ForeignKeyCreateStatement, Index, Table,
    TableCreateStatement,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
// `id`, `created_at`, `updated_at` and `deleted_at` are shared; see `audited`.

#[derive(Iden)]
enum Account {
    Table,
    Email,
    Name,
    Status,
}

#[derive(Iden)]
enum AccountUser {
    Table,
    AccountId,
    Email,
    Status,
}

#[derive(Iden)]
enum AccountContact {
    Table,
    AccountId,
}

#[derive(Iden)]
enum AccountUserContact {
    Table,
    AccountUserId,
}

/// Postal columns shared by both contact tables.
#[derive(Iden)]
enum Postal {
    Name,
    PostalAddressLine1,
    PostalAddressLine2,
    StateProvince,
    Country,
    PostalCode,
}

#[derive(Iden)]
enum AccountSubscription {
    Table,
    AccountId,
    AccountUserId,
    SubscriptionType,
    SubscriptionPeriod,
    Status,
}

#[derive(Iden)]
enum Game {
    Table,
    Name,
    GameType,
    TurnDurationHours,
    Description,
    Status,
}

#[derive(Iden)]
enum GameImage {
    Table,
    GameId,
    ImageType,
    TurnSheetType,
    MimeType,
    FileSize,
    Width,
    Height,
}

#[derive(Iden)]
enum GameSubscription {
    Table,
    GameId,
    AccountId,
    AccountUserId,
    AccountUserContactId,
    SubscriptionType,
    Status,
}

#[derive(Iden)]
enum GameInstance {
    Table,
    GameId,
    GameSubscriptionId,
    Status,
    CurrentTurn,
    DeliveryPhysicalPost,
    DeliveryPhysicalLocal,
    DeliveryEmail,
    IsClosedTesting,
    RequiredPlayerCount,
    StartedAt,
    CompletedAt,
    LastTurnProcessedAt,
    NextTurnDueAt,
}

#[derive(Iden)]
enum GameInstanceParameter {
    Table,
    GameInstanceId,
    ParameterKey,
    ParameterValue,
}

#[derive(Iden)]
enum GameSubscriptionInstance {
    Table,
    GameSubscriptionId,
    GameInstanceId,
    AccountId,
    TurnSheetToken,
    TurnSheetTokenExpiresAt,
}

#[derive(Iden)]
enum AdventureGameLocation {
    Table,
    GameId,
    Name,
    Description,
    IsStartingLocation,
}

#[derive(Iden)]
enum AdventureGameLocationLink {
    Table,
    GameId,
    FromAdventureGameLocationId,
    ToAdventureGameLocationId,
    Name,
    Description,
}

#[derive(Iden)]
enum AdventureGameItem {
    Table,
    GameId,
    Name,
    Description,
    CanBeEquipped,
    EquipmentSlot,
}

#[derive(Iden)]
enum AdventureGameLocationLinkRequirement {
    Table,
    GameId,
    AdventureGameLocationLinkId,
    AdventureGameItemId,
    Quantity,
}

#[derive(Iden)]
enum AdventureGameCreature {
    Table,
    GameId,
    Name,
    Description,
}

#[derive(Iden)]
enum AdventureGameCharacter {
    Table,
    GameId,
    AccountId,
    AccountUserId,
    Name,
    Description,
}

#[derive(Iden)]
enum AdventureGameItemPlacement {
    Table,
    GameId,
    AdventureGameItemId,
    AdventureGameLocationId,
    InitialCount,
}

#[derive(Iden)]
enum AdventureGameCreaturePlacement {
    Table,
    GameId,
    AdventureGameCreatureId,
    AdventureGameLocationId,
    InitialCount,
}

#[derive(Iden)]
enum AdventureGameLocationInstance {
    Table,
    GameId,
    GameInstanceId,
    AdventureGameLocationId,
}

#[derive(Iden)]
enum AdventureGameCharacterInstance {
    Table,
    GameId,
    GameInstanceId,
    AdventureGameCharacterId,
    AdventureGameLocationInstanceId,
    Health,
    InventoryCapacity,
}

#[derive(Iden)]
enum AdventureGameCreatureInstance {
    Table,
    GameId,
    GameInstanceId,
    AdventureGameCreatureId,
    AdventureGameLocationInstanceId,
    Health,
}

#[derive(Iden)]
enum AdventureGameItemInstance {
    Table,
    GameId,
    GameInstanceId,
    AdventureGameItemId,
    AdventureGameLocationInstanceId,
    AdventureGameCharacterInstanceId,
    AdventureGameCreatureInstanceId,
    IsEquipped,
    EquipmentSlot,
}

#[derive(Iden)]
enum GameTurnSheet {
    Table,
    GameId,
    GameInstanceId,
    AccountId,
    TurnNumber,
    SheetType,
    SheetOrder,
    SheetData,
    ScannedData,
    ScannedAt,
    ScanQuality,
    ScannedBy,
    IsCompleted,
    CompletedAt,
    ProcessingStatus,
    ErrorMessage,
}

#[derive(Iden)]
enum AdventureGameTurnSheet {
    Table,
    GameId,
    AdventureGameCharacterInstanceId,
    GameTurnSheetId,
}

// ----- column helpers -----

fn uuid_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn uuid_null<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().null().to_owned()
}

fn text_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).string().not_null().to_owned()
}

fn long_text<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).text().not_null().default("").to_owned()
}

/// Enum columns are stored as their string value on every backend.
fn enum_col<T: IntoIden>(col: T, len: u32) -> ColumnDef {
    ColumnDef::new(col).string_len(len).not_null().to_owned()
}

fn int_col<T: IntoIden>(col: T, default: i32) -> ColumnDef {
    ColumnDef::new(col).integer().not_null().default(default).to_owned()
}

fn flag<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).boolean().not_null().default(false).to_owned()
}

fn ts_null<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().null().to_owned()
}

/// New table with the shared uuid primary key and audit timestamps.
fn audited<T: IntoIden + 'static>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(Alias::new("id"))
                .uuid()
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ts_null(Alias::new("updated_at")))
        .col(ts_null(Alias::new("deleted_at")))
        .to_owned()
}

/// FK to `<to>.id`. Removal of a parent is guarded in the services, so only
/// soft-deleted children are ever cascaded.
fn references<F, C, T>(name: &str, from: F, col: C, to: T) -> ForeignKeyCreateStatement
where
    F: IntoIden + 'static,
    C: IntoIden + 'static,
    T: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(from, col)
        .to(to, Alias::new("id"))
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

/// Unique over live rows only, so a soft-deleted row never blocks its
/// replacement. Partial indexes read the same on Postgres and SQLite.
async fn live_unique_index(
    manager: &SchemaManager<'_>,
    name: &str,
    table: &str,
    columns: &[&str],
) -> Result<(), DbErr> {
    let sql = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {name} ON {table} ({}) WHERE deleted_at IS NULL",
        columns.join(", ")
    );
    manager.get_connection().execute_unprepared(&sql).await?;
    Ok(())
}

fn postal(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(text_col(Postal::Name))
        .col(text_col(Postal::PostalAddressLine1))
        .col(ColumnDef::new(Postal::PostalAddressLine2).string().null())
        .col(text_col(Postal::StateProvince))
        .col(text_col(Postal::Country))
        .col(text_col(Postal::PostalCode))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ---- accounts ----
        manager
            .create_table(
                audited(Account::Table)
                    .col(text_col(Account::Email))
                    .col(text_col(Account::Name))
                    .col(enum_col(Account::Status, 32))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ux_account_email")
                    .table(Account::Table)
                    .col(Account::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AccountUser::Table)
                    .col(uuid_col(AccountUser::AccountId))
                    .col(text_col(AccountUser::Email))
                    .col(enum_col(AccountUser::Status, 32))
                    .foreign_key(&mut references(
                        "fk_account_user_account_id",
                        AccountUser::Table,
                        AccountUser::AccountId,
                        Account::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ux_account_user_email")
                    .table(AccountUser::Table)
                    .col(AccountUser::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut contact = audited(AccountContact::Table);
        contact.col(uuid_col(AccountContact::AccountId));
        postal(&mut contact).foreign_key(&mut references(
            "fk_account_contact_account_id",
            AccountContact::Table,
            AccountContact::AccountId,
            Account::Table,
        ));
        manager.create_table(contact).await?;

        let mut user_contact = audited(AccountUserContact::Table);
        user_contact.col(uuid_col(AccountUserContact::AccountUserId));
        postal(&mut user_contact).foreign_key(&mut references(
            "fk_account_user_contact_account_user_id",
            AccountUserContact::Table,
            AccountUserContact::AccountUserId,
            AccountUser::Table,
        ));
        manager.create_table(user_contact).await?;

        manager
            .create_table(
                audited(AccountSubscription::Table)
                    .col(uuid_null(AccountSubscription::AccountId))
                    .col(uuid_null(AccountSubscription::AccountUserId))
                    .col(enum_col(AccountSubscription::SubscriptionType, 64))
                    .col(enum_col(AccountSubscription::SubscriptionPeriod, 16))
                    .col(enum_col(AccountSubscription::Status, 16))
                    .foreign_key(&mut references(
                        "fk_account_subscription_account_id",
                        AccountSubscription::Table,
                        AccountSubscription::AccountId,
                        Account::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_account_subscription_account_user_id",
                        AccountSubscription::Table,
                        AccountSubscription::AccountUserId,
                        AccountUser::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        // ---- games and subscriptions ----
        manager
            .create_table(
                audited(Game::Table)
                    .col(text_col(Game::Name))
                    .col(enum_col(Game::GameType, 32))
                    .col(int_col(Game::TurnDurationHours, 168))
                    .col(long_text(Game::Description))
                    .col(enum_col(Game::Status, 16))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(GameImage::Table)
                    .col(uuid_col(GameImage::GameId))
                    .col(enum_col(GameImage::ImageType, 32))
                    .col(ColumnDef::new(GameImage::TurnSheetType).string().null())
                    .col(text_col(GameImage::MimeType))
                    .col(ColumnDef::new(GameImage::FileSize).big_integer().not_null())
                    .col(int_col(GameImage::Width, 0))
                    .col(int_col(GameImage::Height, 0))
                    .foreign_key(&mut references(
                        "fk_game_image_game_id",
                        GameImage::Table,
                        GameImage::GameId,
                        Game::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(GameSubscription::Table)
                    .col(uuid_col(GameSubscription::GameId))
                    .col(uuid_col(GameSubscription::AccountId))
                    .col(uuid_null(GameSubscription::AccountUserId))
                    .col(uuid_null(GameSubscription::AccountUserContactId))
                    .col(enum_col(GameSubscription::SubscriptionType, 16))
                    .col(enum_col(GameSubscription::Status, 32))
                    .foreign_key(&mut references(
                        "fk_game_subscription_game_id",
                        GameSubscription::Table,
                        GameSubscription::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_subscription_account_id",
                        GameSubscription::Table,
                        GameSubscription::AccountId,
                        Account::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_subscription_account_user_id",
                        GameSubscription::Table,
                        GameSubscription::AccountUserId,
                        AccountUser::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_subscription_account_user_contact_id",
                        GameSubscription::Table,
                        GameSubscription::AccountUserContactId,
                        AccountUserContact::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(GameInstance::Table)
                    .col(uuid_col(GameInstance::GameId))
                    .col(uuid_col(GameInstance::GameSubscriptionId))
                    .col(enum_col(GameInstance::Status, 16))
                    .col(int_col(GameInstance::CurrentTurn, 0))
                    .col(flag(GameInstance::DeliveryPhysicalPost))
                    .col(flag(GameInstance::DeliveryPhysicalLocal))
                    .col(flag(GameInstance::DeliveryEmail))
                    .col(flag(GameInstance::IsClosedTesting))
                    .col(int_col(GameInstance::RequiredPlayerCount, 0))
                    .col(ts_null(GameInstance::StartedAt))
                    .col(ts_null(GameInstance::CompletedAt))
                    .col(ts_null(GameInstance::LastTurnProcessedAt))
                    .col(ts_null(GameInstance::NextTurnDueAt))
                    .foreign_key(&mut references(
                        "fk_game_instance_game_id",
                        GameInstance::Table,
                        GameInstance::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_instance_game_subscription_id",
                        GameInstance::Table,
                        GameInstance::GameSubscriptionId,
                        GameSubscription::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_game_instance_status_due")
                    .table(GameInstance::Table)
                    .col(GameInstance::Status)
                    .col(GameInstance::NextTurnDueAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(GameInstanceParameter::Table)
                    .col(uuid_col(GameInstanceParameter::GameInstanceId))
                    .col(text_col(GameInstanceParameter::ParameterKey))
                    .col(long_text(GameInstanceParameter::ParameterValue))
                    .foreign_key(&mut references(
                        "fk_game_instance_parameter_game_instance_id",
                        GameInstanceParameter::Table,
                        GameInstanceParameter::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        live_unique_index(
            manager,
            "ux_game_instance_parameter_key",
            "game_instance_parameter",
            &["game_instance_id", "parameter_key"],
        )
        .await?;

        manager
            .create_table(
                audited(GameSubscriptionInstance::Table)
                    .col(uuid_col(GameSubscriptionInstance::GameSubscriptionId))
                    .col(uuid_col(GameSubscriptionInstance::GameInstanceId))
                    .col(uuid_col(GameSubscriptionInstance::AccountId))
                    .col(uuid_null(GameSubscriptionInstance::TurnSheetToken))
                    .col(ts_null(GameSubscriptionInstance::TurnSheetTokenExpiresAt))
                    .foreign_key(&mut references(
                        "fk_game_subscription_instance_game_subscription_id",
                        GameSubscriptionInstance::Table,
                        GameSubscriptionInstance::GameSubscriptionId,
                        GameSubscription::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_subscription_instance_game_instance_id",
                        GameSubscriptionInstance::Table,
                        GameSubscriptionInstance::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_subscription_instance_account_id",
                        GameSubscriptionInstance::Table,
                        GameSubscriptionInstance::AccountId,
                        Account::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        live_unique_index(
            manager,
            "ux_game_subscription_instance_link",
            "game_subscription_instance",
            &["game_subscription_id", "game_instance_id"],
        )
        .await?;

        // ---- adventure catalog ----
        manager
            .create_table(
                audited(AdventureGameLocation::Table)
                    .col(uuid_col(AdventureGameLocation::GameId))
                    .col(text_col(AdventureGameLocation::Name))
                    .col(long_text(AdventureGameLocation::Description))
                    .col(flag(AdventureGameLocation::IsStartingLocation))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_game_id",
                        AdventureGameLocation::Table,
                        AdventureGameLocation::GameId,
                        Game::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameLocationLink::Table)
                    .col(uuid_col(AdventureGameLocationLink::GameId))
                    .col(uuid_col(AdventureGameLocationLink::FromAdventureGameLocationId))
                    .col(uuid_col(AdventureGameLocationLink::ToAdventureGameLocationId))
                    .col(text_col(AdventureGameLocationLink::Name))
                    .col(long_text(AdventureGameLocationLink::Description))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_link_game_id",
                        AdventureGameLocationLink::Table,
                        AdventureGameLocationLink::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_link_from",
                        AdventureGameLocationLink::Table,
                        AdventureGameLocationLink::FromAdventureGameLocationId,
                        AdventureGameLocation::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_link_to",
                        AdventureGameLocationLink::Table,
                        AdventureGameLocationLink::ToAdventureGameLocationId,
                        AdventureGameLocation::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameItem::Table)
                    .col(uuid_col(AdventureGameItem::GameId))
                    .col(text_col(AdventureGameItem::Name))
                    .col(long_text(AdventureGameItem::Description))
                    .col(flag(AdventureGameItem::CanBeEquipped))
                    .col(ColumnDef::new(AdventureGameItem::EquipmentSlot).string().null())
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_game_id",
                        AdventureGameItem::Table,
                        AdventureGameItem::GameId,
                        Game::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameLocationLinkRequirement::Table)
                    .col(uuid_col(AdventureGameLocationLinkRequirement::GameId))
                    .col(uuid_col(
                        AdventureGameLocationLinkRequirement::AdventureGameLocationLinkId,
                    ))
                    .col(uuid_col(AdventureGameLocationLinkRequirement::AdventureGameItemId))
                    .col(int_col(AdventureGameLocationLinkRequirement::Quantity, 1))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_link_requirement_game_id",
                        AdventureGameLocationLinkRequirement::Table,
                        AdventureGameLocationLinkRequirement::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_link_requirement_link_id",
                        AdventureGameLocationLinkRequirement::Table,
                        AdventureGameLocationLinkRequirement::AdventureGameLocationLinkId,
                        AdventureGameLocationLink::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_link_requirement_item_id",
                        AdventureGameLocationLinkRequirement::Table,
                        AdventureGameLocationLinkRequirement::AdventureGameItemId,
                        AdventureGameItem::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameCreature::Table)
                    .col(uuid_col(AdventureGameCreature::GameId))
                    .col(text_col(AdventureGameCreature::Name))
                    .col(long_text(AdventureGameCreature::Description))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_game_id",
                        AdventureGameCreature::Table,
                        AdventureGameCreature::GameId,
                        Game::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameCharacter::Table)
                    .col(uuid_col(AdventureGameCharacter::GameId))
                    .col(uuid_col(AdventureGameCharacter::AccountId))
                    .col(uuid_col(AdventureGameCharacter::AccountUserId))
                    .col(text_col(AdventureGameCharacter::Name))
                    .col(long_text(AdventureGameCharacter::Description))
                    .foreign_key(&mut references(
                        "fk_adventure_game_character_game_id",
                        AdventureGameCharacter::Table,
                        AdventureGameCharacter::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_character_account_id",
                        AdventureGameCharacter::Table,
                        AdventureGameCharacter::AccountId,
                        Account::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_character_account_user_id",
                        AdventureGameCharacter::Table,
                        AdventureGameCharacter::AccountUserId,
                        AccountUser::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameItemPlacement::Table)
                    .col(uuid_col(AdventureGameItemPlacement::GameId))
                    .col(uuid_col(AdventureGameItemPlacement::AdventureGameItemId))
                    .col(uuid_col(AdventureGameItemPlacement::AdventureGameLocationId))
                    .col(int_col(AdventureGameItemPlacement::InitialCount, 1))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_placement_game_id",
                        AdventureGameItemPlacement::Table,
                        AdventureGameItemPlacement::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_placement_item_id",
                        AdventureGameItemPlacement::Table,
                        AdventureGameItemPlacement::AdventureGameItemId,
                        AdventureGameItem::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_placement_location_id",
                        AdventureGameItemPlacement::Table,
                        AdventureGameItemPlacement::AdventureGameLocationId,
                        AdventureGameLocation::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameCreaturePlacement::Table)
                    .col(uuid_col(AdventureGameCreaturePlacement::GameId))
                    .col(uuid_col(AdventureGameCreaturePlacement::AdventureGameCreatureId))
                    .col(uuid_col(AdventureGameCreaturePlacement::AdventureGameLocationId))
                    .col(int_col(AdventureGameCreaturePlacement::InitialCount, 1))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_placement_game_id",
                        AdventureGameCreaturePlacement::Table,
                        AdventureGameCreaturePlacement::GameId,
                        Game::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_placement_creature_id",
                        AdventureGameCreaturePlacement::Table,
                        AdventureGameCreaturePlacement::AdventureGameCreatureId,
                        AdventureGameCreature::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_placement_location_id",
                        AdventureGameCreaturePlacement::Table,
                        AdventureGameCreaturePlacement::AdventureGameLocationId,
                        AdventureGameLocation::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        // ---- adventure runtime ----
        manager
            .create_table(
                audited(AdventureGameLocationInstance::Table)
                    .col(uuid_col(AdventureGameLocationInstance::GameId))
                    .col(uuid_col(AdventureGameLocationInstance::GameInstanceId))
                    .col(uuid_col(AdventureGameLocationInstance::AdventureGameLocationId))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_instance_game_instance_id",
                        AdventureGameLocationInstance::Table,
                        AdventureGameLocationInstance::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_location_instance_location_id",
                        AdventureGameLocationInstance::Table,
                        AdventureGameLocationInstance::AdventureGameLocationId,
                        AdventureGameLocation::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameCharacterInstance::Table)
                    .col(uuid_col(AdventureGameCharacterInstance::GameId))
                    .col(uuid_col(AdventureGameCharacterInstance::GameInstanceId))
                    .col(uuid_col(AdventureGameCharacterInstance::AdventureGameCharacterId))
                    .col(uuid_null(
                        AdventureGameCharacterInstance::AdventureGameLocationInstanceId,
                    ))
                    .col(int_col(AdventureGameCharacterInstance::Health, 0))
                    .col(int_col(AdventureGameCharacterInstance::InventoryCapacity, 0))
                    .foreign_key(&mut references(
                        "fk_adventure_game_character_instance_game_instance_id",
                        AdventureGameCharacterInstance::Table,
                        AdventureGameCharacterInstance::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_character_instance_character_id",
                        AdventureGameCharacterInstance::Table,
                        AdventureGameCharacterInstance::AdventureGameCharacterId,
                        AdventureGameCharacter::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_character_instance_location_instance_id",
                        AdventureGameCharacterInstance::Table,
                        AdventureGameCharacterInstance::AdventureGameLocationInstanceId,
                        AdventureGameLocationInstance::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameCreatureInstance::Table)
                    .col(uuid_col(AdventureGameCreatureInstance::GameId))
                    .col(uuid_col(AdventureGameCreatureInstance::GameInstanceId))
                    .col(uuid_col(AdventureGameCreatureInstance::AdventureGameCreatureId))
                    .col(uuid_col(
                        AdventureGameCreatureInstance::AdventureGameLocationInstanceId,
                    ))
                    .col(int_col(AdventureGameCreatureInstance::Health, 0))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_instance_game_instance_id",
                        AdventureGameCreatureInstance::Table,
                        AdventureGameCreatureInstance::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_instance_creature_id",
                        AdventureGameCreatureInstance::Table,
                        AdventureGameCreatureInstance::AdventureGameCreatureId,
                        AdventureGameCreature::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_creature_instance_location_instance_id",
                        AdventureGameCreatureInstance::Table,
                        AdventureGameCreatureInstance::AdventureGameLocationInstanceId,
                        AdventureGameLocationInstance::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameItemInstance::Table)
                    .col(uuid_col(AdventureGameItemInstance::GameId))
                    .col(uuid_col(AdventureGameItemInstance::GameInstanceId))
                    .col(uuid_col(AdventureGameItemInstance::AdventureGameItemId))
                    .col(uuid_null(
                        AdventureGameItemInstance::AdventureGameLocationInstanceId,
                    ))
                    .col(uuid_null(
                        AdventureGameItemInstance::AdventureGameCharacterInstanceId,
                    ))
                    .col(uuid_null(
                        AdventureGameItemInstance::AdventureGameCreatureInstanceId,
                    ))
                    .col(flag(AdventureGameItemInstance::IsEquipped))
                    .col(
                        ColumnDef::new(AdventureGameItemInstance::EquipmentSlot)
                            .string()
                            .null(),
                    )
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_instance_game_instance_id",
                        AdventureGameItemInstance::Table,
                        AdventureGameItemInstance::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_instance_item_id",
                        AdventureGameItemInstance::Table,
                        AdventureGameItemInstance::AdventureGameItemId,
                        AdventureGameItem::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_instance_location_instance_id",
                        AdventureGameItemInstance::Table,
                        AdventureGameItemInstance::AdventureGameLocationInstanceId,
                        AdventureGameLocationInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_instance_character_instance_id",
                        AdventureGameItemInstance::Table,
                        AdventureGameItemInstance::AdventureGameCharacterInstanceId,
                        AdventureGameCharacterInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_item_instance_creature_instance_id",
                        AdventureGameItemInstance::Table,
                        AdventureGameItemInstance::AdventureGameCreatureInstanceId,
                        AdventureGameCreatureInstance::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        // ---- turn sheets ----
        manager
            .create_table(
                audited(GameTurnSheet::Table)
                    .col(uuid_col(GameTurnSheet::GameId))
                    .col(uuid_col(GameTurnSheet::GameInstanceId))
                    .col(uuid_col(GameTurnSheet::AccountId))
                    .col(int_col(GameTurnSheet::TurnNumber, 0))
                    .col(text_col(GameTurnSheet::SheetType))
                    .col(int_col(GameTurnSheet::SheetOrder, 0))
                    .col(ColumnDef::new(GameTurnSheet::SheetData).blob().not_null())
                    .col(ColumnDef::new(GameTurnSheet::ScannedData).blob().null())
                    .col(ts_null(GameTurnSheet::ScannedAt))
                    .col(ColumnDef::new(GameTurnSheet::ScanQuality).double().null())
                    .col(ColumnDef::new(GameTurnSheet::ScannedBy).string().null())
                    .col(flag(GameTurnSheet::IsCompleted))
                    .col(ts_null(GameTurnSheet::CompletedAt))
                    .col(enum_col(GameTurnSheet::ProcessingStatus, 16))
                    .col(ColumnDef::new(GameTurnSheet::ErrorMessage).text().null())
                    .foreign_key(&mut references(
                        "fk_game_turn_sheet_game_instance_id",
                        GameTurnSheet::Table,
                        GameTurnSheet::GameInstanceId,
                        GameInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_game_turn_sheet_account_id",
                        GameTurnSheet::Table,
                        GameTurnSheet::AccountId,
                        Account::Table,
                    ))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_game_turn_sheet_instance_turn")
                    .table(GameTurnSheet::Table)
                    .col(GameTurnSheet::GameInstanceId)
                    .col(GameTurnSheet::TurnNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                audited(AdventureGameTurnSheet::Table)
                    .col(uuid_col(AdventureGameTurnSheet::GameId))
                    .col(uuid_col(AdventureGameTurnSheet::AdventureGameCharacterInstanceId))
                    .col(uuid_col(AdventureGameTurnSheet::GameTurnSheetId))
                    .foreign_key(&mut references(
                        "fk_adventure_game_turn_sheet_character_instance_id",
                        AdventureGameTurnSheet::Table,
                        AdventureGameTurnSheet::AdventureGameCharacterInstanceId,
                        AdventureGameCharacterInstance::Table,
                    ))
                    .foreign_key(&mut references(
                        "fk_adventure_game_turn_sheet_game_turn_sheet_id",
                        AdventureGameTurnSheet::Table,
                        AdventureGameTurnSheet::GameTurnSheetId,
                        GameTurnSheet::Table,
                    ))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // reverse creation order; indexes go with their tables
        manager
            .drop_table(Table::drop().table(AdventureGameTurnSheet::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameTurnSheet::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameItemInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameCreatureInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameCharacterInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameLocationInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameCreaturePlacement::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameItemPlacement::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameCharacter::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameCreature::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AdventureGameLocationLinkRequirement::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameItem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameLocationLink::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdventureGameLocation::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameSubscriptionInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameInstanceParameter::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameInstance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameSubscription::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameImage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Game::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountSubscription::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountUserContact::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountContact::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountUser::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;
        Ok(())
    }
}
