// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod character;
pub mod user;

pub use character::{ability_modifier, format_modifier, Ability, Character};
pub use user::{CharacterSummary, Credentials, User};
