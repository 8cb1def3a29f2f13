// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Character sheet edit form.
//!
//! The form keeps raw text per field, exactly as typed. [`CharacterForm::validate`]
//! coerces that text into typed [`CharacterEdits`] or returns per-field errors.
//! Validation does no I/O and never looks at the session store.
//!
//! Cross-field rules such as `currentHP <= maxHP` are intentionally not
//! enforced; the sheet accepts whatever the player enters.

use crate::error::FieldErrors;
use crate::models::Character;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// How a field's raw text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, stored as-is (empty allowed).
    Text,
    /// Whole number coerced from text.
    Number,
    /// Number coerced from text, fractions allowed.
    Decimal,
    /// Comma-separated list of strings. Items themselves cannot contain a
    /// comma; a stored item that does is only kept intact while the field
    /// is left unedited.
    List,
}

/// Editable fields on the character sheet form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Race,
    Sex,
    Size,
    Age,
    Height,
    Weight,
    Alignment,
    Languages,
    Initiative,
    Speed,
    MaxHp,
    CurrentHp,
    TempHp,
    HitDiceRemaining,
    HitDiceType,
    HitDiceTotal,
}

impl FormField {
    pub const ALL: [FormField; 17] = [
        FormField::Name,
        FormField::Race,
        FormField::Sex,
        FormField::Size,
        FormField::Age,
        FormField::Height,
        FormField::Weight,
        FormField::Alignment,
        FormField::Languages,
        FormField::Initiative,
        FormField::Speed,
        FormField::MaxHp,
        FormField::CurrentHp,
        FormField::TempHp,
        FormField::HitDiceRemaining,
        FormField::HitDiceType,
        FormField::HitDiceTotal,
    ];

    /// Key used on the wire and in server validation responses.
    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Race => "race",
            FormField::Sex => "sex",
            FormField::Size => "size",
            FormField::Age => "age",
            FormField::Height => "height",
            FormField::Weight => "weight",
            FormField::Alignment => "alignment",
            FormField::Languages => "languages",
            FormField::Initiative => "initiative",
            FormField::Speed => "speed",
            FormField::MaxHp => "maxHP",
            FormField::CurrentHp => "currentHP",
            FormField::TempHp => "tempHP",
            FormField::HitDiceRemaining => "hitDiceRemaining",
            FormField::HitDiceType => "hitDiceType",
            FormField::HitDiceTotal => "hitDiceTotal",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Race => "Race",
            FormField::Sex => "Sex",
            FormField::Size => "Size",
            FormField::Age => "Age",
            FormField::Height => "Height",
            FormField::Weight => "Weight",
            FormField::Alignment => "Alignment",
            FormField::Languages => "Languages",
            FormField::Initiative => "Initiative",
            FormField::Speed => "Speed",
            FormField::MaxHp => "Max HP",
            FormField::CurrentHp => "Current HP",
            FormField::TempHp => "Temp HP",
            FormField::HitDiceRemaining => "Remaining Hit Die",
            FormField::HitDiceType => "Hit Dice Type",
            FormField::HitDiceTotal => "Max # of Hit Die",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FormField::Age
            | FormField::Initiative
            | FormField::Speed
            | FormField::MaxHp
            | FormField::CurrentHp
            | FormField::TempHp
            | FormField::HitDiceRemaining
            | FormField::HitDiceTotal => FieldKind::Number,
            FormField::Weight => FieldKind::Decimal,
            FormField::Languages => FieldKind::List,
            _ => FieldKind::Text,
        }
    }

    /// Look up a field by its wire key.
    pub fn from_key(key: &str) -> Option<FormField> {
        FormField::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl Serialize for FormField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Raw form state bound to the sheet inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterForm {
    values: BTreeMap<FormField, String>,
    /// Fields the user touched since the form was seeded
    edited: BTreeSet<FormField>,
}

impl Default for CharacterForm {
    /// Blank form: empty text, zero numbers, no languages.
    fn default() -> Self {
        let values = FormField::ALL
            .into_iter()
            .map(|field| {
                let value = match field.kind() {
                    FieldKind::Number | FieldKind::Decimal => "0".to_string(),
                    FieldKind::Text | FieldKind::List => String::new(),
                };
                (field, value)
            })
            .collect();

        Self {
            values,
            edited: BTreeSet::new(),
        }
    }
}

impl CharacterForm {
    /// Form seeded from a stored character.
    pub fn from_character(character: &Character) -> Self {
        Self {
            values: FormField::ALL
                .into_iter()
                .map(|field| (field, stored_value(character, field)))
                .collect(),
            edited: BTreeSet::new(),
        }
    }

    /// Re-seed every field the user has not edited from `character`.
    /// Edited fields keep their raw text.
    pub fn rebase(&mut self, character: &Character) {
        for field in FormField::ALL {
            if !self.edited.contains(&field) {
                self.values.insert(field, stored_value(character, field));
            }
        }
    }

    pub fn value(&self, field: FormField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Record user input for a field.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values.insert(field, value.into());
        self.edited.insert(field);
    }

    /// Remove a field's value entirely (e.g. an input that was unbound).
    pub fn clear(&mut self, field: FormField) {
        self.values.remove(&field);
        self.edited.insert(field);
    }

    /// Whether the user changed anything since the form was seeded.
    pub fn is_dirty(&self) -> bool {
        !self.edited.is_empty()
    }

    pub fn is_edited(&self, field: FormField) -> bool {
        self.edited.contains(&field)
    }

    /// Coerce every declared field. Collects all failures rather than
    /// stopping at the first.
    pub fn validate(&self) -> Result<CharacterEdits, FieldErrors> {
        let mut errors = FieldErrors::new();

        let mut text = |field: FormField| -> String {
            match self.values.get(&field) {
                Some(v) => v.clone(),
                None => {
                    errors.push(field, "is required");
                    String::new()
                }
            }
        };
        let name = text(FormField::Name);
        let race = text(FormField::Race);
        let sex = text(FormField::Sex);
        let size = text(FormField::Size);
        let height = text(FormField::Height);
        let alignment = text(FormField::Alignment);
        let hit_dice_type = text(FormField::HitDiceType);
        let languages_raw = text(FormField::Languages);

        let mut number = |field: FormField| -> i32 {
            match self.values.get(&field).map(|raw| coerce_number(raw)) {
                Some(Ok(n)) => n,
                Some(Err(message)) => {
                    errors.push(field, message);
                    0
                }
                None => {
                    errors.push(field, "is required");
                    0
                }
            }
        };
        let age = number(FormField::Age);
        let initiative = number(FormField::Initiative);
        let speed = number(FormField::Speed);
        let max_hp = number(FormField::MaxHp);
        let current_hp = number(FormField::CurrentHp);
        let temp_hp = number(FormField::TempHp);
        let hit_dice_remaining = number(FormField::HitDiceRemaining);
        let hit_dice_total = number(FormField::HitDiceTotal);

        let weight = match self.values.get(&FormField::Weight).map(|raw| coerce_decimal(raw)) {
            Some(Ok(n)) => n,
            Some(Err(message)) => {
                errors.push(FormField::Weight, message);
                0.0
            }
            None => {
                errors.push(FormField::Weight, "is required");
                0.0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CharacterEdits {
            name,
            race,
            sex,
            size,
            age,
            height,
            weight,
            alignment,
            languages: split_list(&languages_raw),
            initiative,
            speed,
            max_hp,
            current_hp,
            temp_hp,
            hit_dice_remaining,
            hit_dice_type,
            hit_dice_total,
        })
    }
}

/// Validated form values, ready to be applied to a character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterEdits {
    pub name: String,
    pub race: String,
    pub sex: String,
    pub size: String,
    pub age: i32,
    pub height: String,
    pub weight: f64,
    pub alignment: String,
    pub languages: Vec<String>,
    pub initiative: i32,
    pub speed: i32,
    pub max_hp: i32,
    pub current_hp: i32,
    pub temp_hp: i32,
    pub hit_dice_remaining: i32,
    pub hit_dice_type: String,
    pub hit_dice_total: i32,
}

impl CharacterEdits {
    /// Build the record to submit: edited fields over `base`, keeping the
    /// id, owner and ability scores of `base`.
    pub fn apply_to(&self, base: &Character) -> Character {
        Character {
            name: self.name.clone(),
            race: self.race.clone(),
            sex: self.sex.clone(),
            size: self.size.clone(),
            age: self.age,
            height: self.height.clone(),
            weight: self.weight,
            alignment: self.alignment.clone(),
            languages: self.languages.clone(),
            initiative: self.initiative,
            speed: self.speed,
            max_hp: self.max_hp,
            current_hp: self.current_hp,
            temp_hp: self.temp_hp,
            hit_dice_remaining: self.hit_dice_remaining,
            hit_dice_type: self.hit_dice_type.clone(),
            hit_dice_total: self.hit_dice_total,
            ..base.clone()
        }
    }
}

/// Coerce numeric-looking text to a whole number.
///
/// Accepts surrounding whitespace, a leading sign, and integral decimals
/// such as `"12.0"`.
pub fn coerce_number(raw: &str) -> Result<i32, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("is required");
    }

    if let Ok(n) = trimmed.parse::<i32>() {
        return Ok(n);
    }

    match trimmed.parse::<f64>() {
        Ok(f) if !f.is_finite() => Err("must be a number"),
        Ok(f) if f.fract() != 0.0 => Err("must be a whole number"),
        Ok(f) if f < i32::MIN as f64 || f > i32::MAX as f64 => Err("is out of range"),
        Ok(f) => Ok(f as i32),
        Err(_) => Err("must be a number"),
    }
}

/// Coerce numeric-looking text to a finite number, fractions allowed.
pub fn coerce_decimal(raw: &str) -> Result<f64, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("is required");
    }

    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        _ => Err("must be a number"),
    }
}

fn stored_value(character: &Character, field: FormField) -> String {
    match field {
        FormField::Name => character.name.clone(),
        FormField::Race => character.race.clone(),
        FormField::Sex => character.sex.clone(),
        FormField::Size => character.size.clone(),
        FormField::Age => character.age.to_string(),
        FormField::Height => character.height.clone(),
        FormField::Weight => character.weight.to_string(),
        FormField::Alignment => character.alignment.clone(),
        FormField::Languages => character.languages.join(", "),
        FormField::Initiative => character.initiative.to_string(),
        FormField::Speed => character.speed.to_string(),
        FormField::MaxHp => character.max_hp.to_string(),
        FormField::CurrentHp => character.current_hp.to_string(),
        FormField::TempHp => character.temp_hp.to_string(),
        FormField::HitDiceRemaining => character.hit_dice_remaining.to_string(),
        FormField::HitDiceType => character.hit_dice_type.clone(),
        FormField::HitDiceTotal => character.hit_dice_total.to_string(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
