// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - remote collaborators.

pub mod auth;
pub mod characters;
pub mod http;
pub mod token_store;

pub use auth::{AuthApi, AuthService, SessionClaims};
pub use characters::{CharacterApi, CharacterService};
pub use http::ApiClient;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
