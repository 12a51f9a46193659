//! Turn sheet state machine, token lifecycle and scan ingestion.

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapters::records_sea::Lock;
use crate::domain::sheet_status;
use crate::domain::tokens;
use crate::domain::turn_sheet_data::parse_scan;
use crate::entities::{
    adventure_game_turn_sheet, game_instance, game_subscription_instance, game_turn_sheet,
    GameInstanceStatus, ProcessingStatus,
};
use crate::errors::domain::DomainError;
use crate::logging::security;
use crate::repos::Scope;
use crate::services::crud::{self, Lifecycle};
use crate::services::turn_processing::{self, TurnReport};

/// Scanner id recorded for sheets submitted through the token flow.
pub const ONLINE_SCANNER: &str = "online";

#[async_trait]
impl Lifecycle for game_turn_sheet::Model {}

#[async_trait]
impl Lifecycle for adventure_game_turn_sheet::Model {}

async fn lock_sheet(
    scope: &Scope<'_>,
    turn_sheet_id: Uuid,
) -> Result<game_turn_sheet::Model, DomainError> {
    scope
        .repo::<game_turn_sheet::Entity>()
        .get_one(turn_sheet_id, Lock::ForUpdateNoWait)
        .await
}

/// Only sheets of a started instance's current turn take answers; older
/// sheets would never be read by turn processing.
async fn ensure_current_turn(
    scope: &Scope<'_>,
    sheet: &game_turn_sheet::Model,
) -> Result<(), DomainError> {
    let instance = scope
        .unrestricted()
        .repo::<game_instance::Entity>()
        .get_one(sheet.game_instance_id, Lock::None)
        .await?;
    if instance.status != GameInstanceStatus::Started {
        return Err(DomainError::invalid_field(
            "game_instance_id",
            instance.id,
            "game instance is not accepting turn sheets",
        ));
    }
    if sheet.turn_number != instance.current_turn {
        return Err(DomainError::invalid_field(
            "turn_number",
            sheet.turn_number,
            format!(
                "turn sheet is for turn {} but the game is on turn {}",
                sheet.turn_number, instance.current_turn
            ),
        ));
    }
    Ok(())
}

/// `* -> error` with a diagnostic. Applied to sheets in any state.
pub(crate) async fn record_error(
    scope: &Scope<'_>,
    turn_sheet_id: Uuid,
    message: &str,
) -> Result<game_turn_sheet::Model, DomainError> {
    let mut sheet = lock_sheet(scope, turn_sheet_id).await?;
    sheet.processing_status = ProcessingStatus::Error;
    sheet.error_message = Some(message.to_string());
    let sheet = crud::update::<game_turn_sheet::Entity>(scope, sheet).await?;
    debug!(sheet_id = %sheet.id, "Turn sheet marked error");
    Ok(sheet)
}

/// Turn sheet service.
pub struct TurnSheetService;

impl TurnSheetService {
    pub fn new() -> Self {
        Self
    }

    /// `pending -> scanned`. Records scan metadata only; the payload is not parsed.
    pub async fn mark_scanned(
        &self,
        scope: &Scope<'_>,
        turn_sheet_id: Uuid,
        quality: f64,
        scanner_id: &str,
    ) -> Result<game_turn_sheet::Model, DomainError> {
        sheet_status::check_quality(quality)?;
        let mut sheet = lock_sheet(scope, turn_sheet_id).await?;
        sheet_status::check_mark_scanned(sheet.processing_status)?;
        ensure_current_turn(scope, &sheet).await?;
        sheet.processing_status = ProcessingStatus::Scanned;
        sheet.scanned_at = Some(OffsetDateTime::now_utc());
        sheet.scan_quality = Some(quality);
        sheet.scanned_by = Some(scanner_id.to_string());
        crud::update::<game_turn_sheet::Entity>(scope, sheet).await
    }

    /// `scanned -> completed` with the typed payload.
    pub async fn mark_completed(
        &self,
        scope: &Scope<'_>,
        turn_sheet_id: Uuid,
        scanned_data: Vec<u8>,
    ) -> Result<game_turn_sheet::Model, DomainError> {
        let mut sheet = lock_sheet(scope, turn_sheet_id).await?;
        sheet_status::check_mark_completed(sheet.processing_status)?;
        ensure_current_turn(scope, &sheet).await?;
        sheet.processing_status = ProcessingStatus::Completed;
        sheet.scanned_data = Some(scanned_data);
        sheet.is_completed = true;
        sheet.completed_at = Some(OffsetDateTime::now_utc());
        crud::update::<game_turn_sheet::Entity>(scope, sheet).await
    }

    pub async fn mark_error(
        &self,
        scope: &Scope<'_>,
        turn_sheet_id: Uuid,
        message: &str,
    ) -> Result<game_turn_sheet::Model, DomainError> {
        record_error(scope, turn_sheet_id, message).await
    }

    /// Mint a fresh token for a player link, replacing any previous one.
    pub async fn generate_token(
        &self,
        scope: &Scope<'_>,
        game_subscription_instance_id: Uuid,
    ) -> Result<game_subscription_instance::Model, DomainError> {
        self.generate_token_at(scope, game_subscription_instance_id, OffsetDateTime::now_utc())
            .await
    }

    pub async fn generate_token_at(
        &self,
        scope: &Scope<'_>,
        game_subscription_instance_id: Uuid,
        now: OffsetDateTime,
    ) -> Result<game_subscription_instance::Model, DomainError> {
        let mut link = scope
            .repo::<game_subscription_instance::Entity>()
            .get_one(game_subscription_instance_id, Lock::ForUpdateNoWait)
            .await?;
        link.turn_sheet_token = Some(Uuid::new_v4());
        link.turn_sheet_token_expires_at = Some(now + scope.config.token_ttl());
        let link = crud::update::<game_subscription_instance::Entity>(scope, link).await?;
        info!(%game_subscription_instance_id, "Turn sheet token issued");
        Ok(link)
    }

    pub async fn verify_token(
        &self,
        scope: &Scope<'_>,
        game_subscription_instance_id: Uuid,
        token: Uuid,
    ) -> Result<game_subscription_instance::Model, DomainError> {
        self.verify_token_at(
            scope,
            game_subscription_instance_id,
            token,
            OffsetDateTime::now_utc(),
        )
        .await
    }

    /// The link when `token` is its current, unexpired token.
    pub async fn verify_token_at(
        &self,
        scope: &Scope<'_>,
        game_subscription_instance_id: Uuid,
        token: Uuid,
        now: OffsetDateTime,
    ) -> Result<game_subscription_instance::Model, DomainError> {
        let link = scope
            .repo::<game_subscription_instance::Entity>()
            .get_one(game_subscription_instance_id, Lock::None)
            .await?;
        if let Err(rejection) = tokens::verify(
            link.turn_sheet_token,
            link.turn_sheet_token_expires_at,
            token,
            now,
        ) {
            security::token_rejected(game_subscription_instance_id, rejection.reason());
            return Err(DomainError::invalid_field(
                "turn_sheet_token",
                "[REDACTED_TOKEN]",
                rejection.reason(),
            ));
        }
        Ok(link)
    }

    /// Mark scanned, then type the payload by `sheet_type`: a valid payload
    /// completes the sheet, anything else moves it to `error`. Only a bad
    /// quality value or an unexpected state fails the call.
    pub async fn ingest_scan(
        &self,
        scope: &Scope<'_>,
        turn_sheet_id: Uuid,
        quality: f64,
        scanner_id: &str,
        payload: &[u8],
    ) -> Result<game_turn_sheet::Model, DomainError> {
        let sheet = self
            .mark_scanned(scope, turn_sheet_id, quality, scanner_id)
            .await?;
        match parse_scan(&sheet.sheet_type, payload) {
            Ok(typed) => {
                let sheet = self
                    .mark_completed(scope, turn_sheet_id, typed.to_bytes()?)
                    .await?;
                info!(sheet_id = %sheet.id, turn = sheet.turn_number, "Turn sheet completed");
                Ok(sheet)
            }
            Err(e) if e.is_invalid_data() => record_error(scope, turn_sheet_id, &e.to_string()).await,
            Err(e) => Err(e),
        }
    }

    /// Player submission authenticated by the link's token.
    pub async fn submit_turn_sheet_with_token(
        &self,
        scope: &Scope<'_>,
        game_subscription_instance_id: Uuid,
        token: Uuid,
        turn_sheet_id: Uuid,
        payload: &[u8],
    ) -> Result<game_turn_sheet::Model, DomainError> {
        let link = self
            .verify_token(scope, game_subscription_instance_id, token)
            .await?;
        let sheet = scope
            .unrestricted()
            .repo::<game_turn_sheet::Entity>()
            .get_one(turn_sheet_id, Lock::None)
            .await?;
        if sheet.game_instance_id != link.game_instance_id || sheet.account_id != link.account_id {
            return Err(DomainError::invalid_field(
                "turn_sheet_id",
                turn_sheet_id,
                "turn sheet does not belong to this player",
            ));
        }
        self.ingest_scan(&scope.unrestricted(), turn_sheet_id, 1.0, ONLINE_SCANNER, payload)
            .await
    }

    pub async fn process_turn(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<TurnReport, DomainError> {
        turn_processing::process_turn(scope, game_instance_id).await
    }

    /// Issue any missing sheets for the instance's current turn.
    pub async fn generate_next_sheets(
        &self,
        scope: &Scope<'_>,
        game_instance_id: Uuid,
    ) -> Result<usize, DomainError> {
        let instance = scope
            .repo::<game_instance::Entity>()
            .get_one(game_instance_id, Lock::None)
            .await?;
        turn_processing::generate_sheets_for_turn(scope, &instance, instance.current_turn).await
    }
}

impl Default for TurnSheetService {
    fn default() -> Self {
        Self::new()
    }
}
