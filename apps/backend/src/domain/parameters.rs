//! Per-instance parameter catalog.

use std::collections::BTreeMap;

use crate::entities::GameType;
use crate::errors::domain::DomainError;

/// Stored and validated for hosts; the core engine does not read it.
pub const CHARACTER_LIVES: &str = "character_lives";
pub const INVENTORY_CAPACITY: &str = "inventory_capacity";
pub const ALLOW_ITEM_DROP: &str = "allow_item_drop";
pub const WELCOME_MESSAGE: &str = "welcome_message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Integer,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDef {
    pub key: &'static str,
    pub value_type: ParameterType,
    pub default: &'static str,
    pub description: &'static str,
}

const ADVENTURE: &[ParameterDef] = &[
    ParameterDef {
        key: CHARACTER_LIVES,
        value_type: ParameterType::Integer,
        default: "3",
        description: "Lives each character starts with",
    },
    ParameterDef {
        key: INVENTORY_CAPACITY,
        value_type: ParameterType::Integer,
        default: "10",
        description: "Items a character may carry",
    },
    ParameterDef {
        key: ALLOW_ITEM_DROP,
        value_type: ParameterType::Boolean,
        default: "true",
        description: "Whether characters may drop items",
    },
    ParameterDef {
        key: WELCOME_MESSAGE,
        value_type: ParameterType::String,
        default: "",
        description: "Printed on the first turn sheet",
    },
];

pub fn catalog_for(game_type: GameType) -> &'static [ParameterDef] {
    match game_type {
        GameType::Adventure => ADVENTURE,
    }
}

pub fn lookup(game_type: GameType, key: &str) -> Option<&'static ParameterDef> {
    catalog_for(game_type).iter().find(|def| def.key == key)
}

/// Key must be in the catalog and the value must parse as the declared type.
pub fn validate_parameter(game_type: GameType, key: &str, value: &str) -> Result<(), DomainError> {
    let def = lookup(game_type, key).ok_or_else(|| {
        DomainError::invalid_field(
            "parameter_key",
            key,
            "not a known parameter for this game type",
        )
    })?;
    let ok = match def.value_type {
        ParameterType::String => true,
        ParameterType::Integer => value.trim().parse::<i64>().is_ok(),
        ParameterType::Boolean => matches!(value.trim(), "true" | "false"),
    };
    if !ok {
        return Err(DomainError::invalid_field(
            "parameter_value",
            value,
            format!("must be a valid {:?} for {key}", def.value_type).to_lowercase(),
        ));
    }
    Ok(())
}

/// Catalog defaults overlaid with stored overrides; unknown keys are dropped.
pub fn effective_parameters<'a>(
    game_type: GameType,
    overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<String, String> {
    let mut values: BTreeMap<String, String> = catalog_for(game_type)
        .iter()
        .map(|def| (def.key.to_string(), def.default.to_string()))
        .collect();
    for (key, value) in overrides {
        if let Some(slot) = values.get_mut(key) {
            *slot = value.to_string();
        }
    }
    values
}

pub fn int_value(values: &BTreeMap<String, String>, key: &str) -> Option<i64> {
    values.get(key).and_then(|v| v.trim().parse().ok())
}

pub fn bool_value(values: &BTreeMap<String, String>, key: &str) -> Option<bool> {
    values.get(key).and_then(|v| match v.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    })
}
