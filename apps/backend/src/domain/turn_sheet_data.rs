//! Typed views of `sheet_data` / `scanned_data`. The store keeps raw JSON bytes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::domain::DomainError;
use crate::validation::rules;

pub const LOCATION_CHOICE: &str = "location_choice";
pub const JOIN_GAME: &str = "join_game";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetType {
    /// Sent to a player whose character has not yet entered the game.
    JoinGame,
    LocationChoice,
}

impl SheetType {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            JOIN_GAME => Ok(Self::JoinGame),
            LOCATION_CHOICE => Ok(Self::LocationChoice),
            other => Err(DomainError::invalid_field(
                "sheet_type",
                other,
                "unknown turn sheet type",
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::JoinGame => JOIN_GAME,
            Self::LocationChoice => LOCATION_CHOICE,
        }
    }

    /// Processing order within a turn: joins land before moves.
    pub fn sheet_order(self) -> i32 {
        match self {
            Self::JoinGame => 0,
            Self::LocationChoice => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationOption {
    /// Location instance the option leads to
    pub location_id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChoiceData {
    pub current_location_id: Uuid,
    pub current_location_name: String,
    pub location_options: Vec<LocationOption>,
}

impl LocationChoiceData {
    pub fn offers(&self, location_id: Uuid) -> bool {
        self.location_options
            .iter()
            .any(|option| option.location_id == location_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChoiceScanData {
    pub choices: Vec<Uuid>,
}

impl LocationChoiceScanData {
    /// Exactly one box must be ticked.
    pub fn single_choice(&self) -> Result<Uuid, DomainError> {
        match self.choices.as_slice() {
            [only] => Ok(*only),
            [] => Err(DomainError::required("choices")),
            many => Err(DomainError::invalid_field(
                "choices",
                many.len(),
                "exactly one location must be chosen",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGameData {
    pub game_name: String,
    pub character_name: String,
    #[serde(default)]
    pub welcome_message: String,
}

/// What a player writes on a join sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinGameScanData {
    pub email: String,
    pub name: String,
    pub character_name: String,
}

impl JoinGameScanData {
    pub fn check(&self) -> Result<(), DomainError> {
        rules::email("email", &self.email)?;
        rules::name("name", &self.name, rules::NAME_MAX)?;
        rules::name("character_name", &self.character_name, rules::NAME_MAX)
    }
}

/// A scanned payload typed by its sheet type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPayload {
    JoinGame(JoinGameScanData),
    LocationChoice(LocationChoiceScanData),
}

impl ScanPayload {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DomainError> {
        match self {
            Self::JoinGame(data) => encode(data),
            Self::LocationChoice(data) => encode(data),
        }
    }
}

/// Type a raw scan for `sheet_type`; unknown types and malformed payloads fail.
pub fn parse_scan(sheet_type: &str, payload: &[u8]) -> Result<ScanPayload, DomainError> {
    match SheetType::parse(sheet_type)? {
        SheetType::JoinGame => {
            let data: JoinGameScanData = decode("scanned_data", payload)?;
            data.check()?;
            Ok(ScanPayload::JoinGame(data))
        }
        SheetType::LocationChoice => {
            let data: LocationChoiceScanData = decode("scanned_data", payload)?;
            data.single_choice()?;
            Ok(ScanPayload::LocationChoice(data))
        }
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DomainError> {
    serde_json::to_vec(value)
        .map_err(|e| DomainError::internal(format!("turn sheet payload encoding failed: {e}")))
}

pub fn decode<T: DeserializeOwned>(field: &str, bytes: &[u8]) -> Result<T, DomainError> {
    serde_json::from_slice(bytes).map_err(|e| {
        DomainError::invalid_field(field, format!("{} bytes", bytes.len()), format!("malformed payload: {e}"))
    })
}
