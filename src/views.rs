// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Render models consumed by the view layer.
//!
//! These are plain data: a renderer maps them onto widgets without reaching
//! back into the store. A sheet that has not finished loading is its own
//! variant so nothing reads fields off a missing character.

use crate::editor::EditPhase;
use crate::error::{ErrorBanner, FieldErrors};
use crate::form::{CharacterForm, FieldKind, FormField};
use crate::models::{format_modifier, Ability, Character, User};
use crate::routes::Route;
use serde::Serialize;

// ─── Character Sheet ─────────────────────────────────────────

/// One ability box: label, raw score and derived modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbilityPanel {
    pub name: &'static str,
    pub score: i32,
    pub modifier: i32,
    /// Modifier as shown, e.g. "+2", "0", "-1"
    pub display: String,
}

/// Ability panels in sheet order, computed fresh on every call.
pub fn ability_panels(character: &Character) -> Vec<AbilityPanel> {
    Ability::ALL
        .into_iter()
        .map(|ability| {
            let modifier = character.modifier(ability);
            AbilityPanel {
                name: ability.abbreviation(),
                score: character.score(ability),
                modifier,
                display: format_modifier(modifier),
            }
        })
        .collect()
}

/// One bound form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub field: FormField,
    pub label: &'static str,
    pub value: String,
    pub numeric: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedSheet {
    pub character_id: String,
    pub abilities: Vec<AbilityPanel>,
    pub fields: Vec<FieldView>,
    /// Submit is disabled while a save is outstanding
    pub saving: bool,
    pub banner: Option<ErrorBanner>,
}

/// Character sheet render state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SheetView {
    /// Placeholder while nothing is loaded (or a load is outstanding).
    NotLoaded {
        loading: bool,
        banner: Option<ErrorBanner>,
    },
    Loaded(Box<LoadedSheet>),
}

impl SheetView {
    pub fn build(
        character: Option<&Character>,
        phase: EditPhase,
        form: &CharacterForm,
        field_errors: &FieldErrors,
        banner: Option<&ErrorBanner>,
    ) -> Self {
        let character = match (phase, character) {
            (EditPhase::Loaded | EditPhase::Saving, Some(character)) => character,
            _ => {
                return SheetView::NotLoaded {
                    loading: phase == EditPhase::Loading,
                    banner: banner.cloned(),
                }
            }
        };

        let fields = FormField::ALL
            .into_iter()
            .map(|field| FieldView {
                field,
                label: field.label(),
                value: form.value(field).unwrap_or_default().to_string(),
                numeric: matches!(field.kind(), FieldKind::Number | FieldKind::Decimal),
                error: field_errors.for_field(field).map(str::to_string),
            })
            .collect();

        SheetView::Loaded(Box::new(LoadedSheet {
            character_id: character.id.clone(),
            abilities: ability_panels(character),
            fields,
            saving: phase == EditPhase::Saving,
            banner: banner.cloned(),
        }))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, SheetView::Loaded(_))
    }
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterListEntry {
    pub name: String,
    pub description: String,
    pub href: String,
}

/// The signed-in user's characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CharacterListView {
    Empty { message: &'static str },
    Entries { entries: Vec<CharacterListEntry> },
}

impl CharacterListView {
    pub fn for_user(user: Option<&User>) -> Self {
        let entries: Vec<_> = user
            .map(|u| u.characters.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|summary| CharacterListEntry {
                name: summary.name.clone(),
                description: format!("Level {} character", summary.level),
                href: Route::CharacterSheet(summary.id.clone()).path(),
            })
            .collect();

        if entries.is_empty() {
            CharacterListView::Empty {
                message: "No characters created.",
            }
        } else {
            CharacterListView::Entries { entries }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub greeting: String,
    pub characters: CharacterListView,
}

impl DashboardView {
    pub fn for_user(user: &User) -> Self {
        Self {
            greeting: format!("Welcome, {}", user.username),
            characters: CharacterListView::for_user(Some(user)),
        }
    }
}
