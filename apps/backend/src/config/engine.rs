//! Tunables for the game engines, read from the environment with defaults.

use std::env;
use std::str::FromStr;

use time::Duration;

use crate::errors::domain::DomainError;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;
pub const DEFAULT_MAX_INSTANCES_PER_MANAGER: u64 = 10;
pub const DEFAULT_INVENTORY_CAPACITY: i32 = 10;
pub const DEFAULT_CHARACTER_HEALTH: i32 = 100;
pub const DEFAULT_MAX_IMAGE_BYTES: i64 = 1024 * 1024;

/// Pixel bounds accepted for uploaded game images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl Default for ImageBounds {
    fn default() -> Self {
        Self {
            min_width: 400,
            min_height: 400,
            max_width: 6000,
            max_height: 6000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Sliding validity window of a turn sheet token
    pub token_ttl_hours: i64,
    pub max_instances_per_manager: u64,
    pub default_inventory_capacity: i32,
    pub default_character_health: i32,
    pub max_image_bytes: i64,
    pub image_bounds: ImageBounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            max_instances_per_manager: DEFAULT_MAX_INSTANCES_PER_MANAGER,
            default_inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            default_character_health: DEFAULT_CHARACTER_HEALTH,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            image_bounds: ImageBounds::default(),
        }
    }
}

impl EngineConfig {
    /// Load from `PBM_*` environment variables; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, DomainError> {
        let defaults = Self::default();
        let bounds = defaults.image_bounds;

        let config = Self {
            token_ttl_hours: var_or("PBM_TURN_SHEET_TOKEN_TTL_HOURS", defaults.token_ttl_hours)?,
            max_instances_per_manager: var_or(
                "PBM_MAX_INSTANCES_PER_MANAGER",
                defaults.max_instances_per_manager,
            )?,
            default_inventory_capacity: var_or(
                "PBM_DEFAULT_INVENTORY_CAPACITY",
                defaults.default_inventory_capacity,
            )?,
            default_character_health: var_or(
                "PBM_DEFAULT_CHARACTER_HEALTH",
                defaults.default_character_health,
            )?,
            max_image_bytes: var_or("PBM_MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
            image_bounds: ImageBounds {
                min_width: var_or("PBM_IMAGE_MIN_WIDTH", bounds.min_width)?,
                min_height: var_or("PBM_IMAGE_MIN_HEIGHT", bounds.min_height)?,
                max_width: var_or("PBM_IMAGE_MAX_WIDTH", bounds.max_width)?,
                max_height: var_or("PBM_IMAGE_MAX_HEIGHT", bounds.max_height)?,
            },
        };
        config.check()?;
        Ok(config)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.token_ttl_hours)
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.token_ttl_hours <= 0 {
            return Err(DomainError::invalid_field(
                "PBM_TURN_SHEET_TOKEN_TTL_HOURS",
                self.token_ttl_hours,
                "must be greater than zero",
            ));
        }
        if self.default_inventory_capacity <= 0 {
            return Err(DomainError::invalid_field(
                "PBM_DEFAULT_INVENTORY_CAPACITY",
                self.default_inventory_capacity,
                "must be greater than zero",
            ));
        }
        if self.default_character_health < 0 {
            return Err(DomainError::invalid_field(
                "PBM_DEFAULT_CHARACTER_HEALTH",
                self.default_character_health,
                "must be zero or greater",
            ));
        }
        let b = &self.image_bounds;
        if b.min_width > b.max_width || b.min_height > b.max_height {
            return Err(DomainError::invalid_field(
                "PBM_IMAGE_MIN_WIDTH",
                format!("{}x{}", b.min_width, b.min_height),
                "minimum image dimensions exceed the maximum",
            ));
        }
        Ok(())
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> Result<T, DomainError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| DomainError::invalid_field(name, &raw, "not a valid number")),
        _ => Ok(default),
    }
}
