// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Character sheet model as exchanged with the character API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Full character record.
///
/// Missing fields in a server payload deserialize to their defaults so a
/// partially filled sheet can still be displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Character {
    /// Document ID assigned by the character API
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// ID of the owning user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    // ─── Basic Details ───────────────────────────────────────────
    pub name: String,
    pub race: String,
    pub sex: String,
    pub size: String,
    pub age: i32,
    pub height: String,
    /// Stored as entered; may be fractional
    pub weight: f64,
    pub alignment: String,
    /// Known languages, in the order the player entered them
    pub languages: Vec<String>,

    // ─── Combat ──────────────────────────────────────────────────
    pub initiative: i32,
    pub speed: i32,
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
    #[serde(rename = "currentHP")]
    pub current_hp: i32,
    #[serde(rename = "tempHP")]
    pub temp_hp: i32,
    pub hit_dice_remaining: i32,
    /// Die notation, e.g. "d8"
    pub hit_dice_type: String,
    pub hit_dice_total: i32,

    // ─── Ability Scores ──────────────────────────────────────────
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub charisma: i32,
    pub wisdom: i32,
    pub intelligence: i32,
}

impl Character {
    /// Raw score for an ability.
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Charisma => self.charisma,
            Ability::Wisdom => self.wisdom,
            Ability::Intelligence => self.intelligence,
        }
    }

    /// Derived modifier for an ability. Never stored.
    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.score(ability))
    }

    /// Whether the record belongs to the given user. Records without an
    /// owner have not been assigned one yet.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_deref() == Some(user_id)
    }
}

/// The six ability scores, in sheet display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Charisma,
    Wisdom,
    Intelligence,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Charisma,
        Ability::Wisdom,
        Ability::Intelligence,
    ];

    /// Three-letter label shown on the sheet.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Ability::Strength => "Str",
            Ability::Dexterity => "Dex",
            Ability::Constitution => "Con",
            Ability::Charisma => "Cha",
            Ability::Wisdom => "Wis",
            Ability::Intelligence => "Int",
        }
    }
}

/// Ability modifier: `floor((score - 10) / 2)`.
///
/// Rounds toward negative infinity, so a score of 9 yields -1. Any `i32`
/// score is accepted; the result always fits.
pub fn ability_modifier(score: i32) -> i32 {
    (i64::from(score) - 10).div_euclid(2) as i32
}

/// Render a modifier with an explicit `+` when positive. Zero is unsigned.
pub fn format_modifier(modifier: i32) -> String {
    if modifier > 0 {
        format!("+{}", modifier)
    } else {
        modifier.to_string()
    }
}
