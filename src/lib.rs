// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Sheet-Keeper: client core for a tabletop character-sheet manager
//!
//! This crate holds the signed-in session, the character being edited, and
//! the rules that keep the edit form, the session store and the remote
//! character API in agreement.

pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod store;
pub mod views;

use config::Config;
use services::{AuthApi, CharacterApi};
use std::sync::Arc;
use store::SessionStore;

/// Shared application state, owned by the composition root.
pub struct AppState {
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub auth: Arc<dyn AuthApi>,
    pub characters: Arc<dyn CharacterApi>,
}
