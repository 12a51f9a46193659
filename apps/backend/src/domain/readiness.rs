//! Readiness report for starting an instance of a game.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::entities::{
    adventure_game_item, adventure_game_item_placement, adventure_game_location,
    adventure_game_location_link, adventure_game_location_link_requirement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessIssue {
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

impl ReadinessIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Live catalog rows of one game.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub locations: Vec<adventure_game_location::Model>,
    pub links: Vec<adventure_game_location_link::Model>,
    pub requirements: Vec<adventure_game_location_link_requirement::Model>,
    pub items: Vec<adventure_game_item::Model>,
    pub item_placements: Vec<adventure_game_item_placement::Model>,
}

pub fn assess(catalog: &CatalogSnapshot) -> Vec<ReadinessIssue> {
    let mut issues = Vec::new();

    if catalog.locations.is_empty() {
        issues.push(ReadinessIssue::error("locations", "game has no locations"));
    } else {
        match catalog
            .locations
            .iter()
            .filter(|l| l.is_starting_location)
            .count()
        {
            0 => issues.push(ReadinessIssue::error(
                "is_starting_location",
                "game has no starting location",
            )),
            1 => {}
            n => issues.push(ReadinessIssue::error(
                "is_starting_location",
                format!("game has {n} starting locations"),
            )),
        }
    }

    if catalog.links.is_empty() {
        issues.push(ReadinessIssue::warning(
            "location_links",
            "game has no location links; characters will not be able to move",
        ));
    }

    if catalog.items.is_empty() {
        issues.push(ReadinessIssue::warning("items", "game has no items"));
    }

    let placed: HashSet<Uuid> = catalog
        .item_placements
        .iter()
        .filter(|p| p.initial_count > 0)
        .map(|p| p.adventure_game_item_id)
        .collect();

    for item in &catalog.items {
        if !placed.contains(&item.id) {
            issues.push(ReadinessIssue::warning(
                "item_placements",
                format!("item '{}' is never placed in an instance", item.name),
            ));
        }
    }

    for req in &catalog.requirements {
        if placed.contains(&req.adventure_game_item_id) {
            continue;
        }
        let link_name = catalog
            .links
            .iter()
            .find(|l| l.id == req.adventure_game_location_link_id)
            .map(|l| l.name.as_str())
            .unwrap_or("unknown link");
        issues.push(ReadinessIssue::warning(
            "location_link_requirements",
            format!("link '{link_name}' requires an item that never appears in an instance"),
        ));
    }

    issues
}

pub fn has_errors(issues: &[ReadinessIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
