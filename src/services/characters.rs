// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Character API client for fetching and saving character sheets.

use crate::error::{AppError, Result};
use crate::models::Character;
use crate::services::http::ApiClient;
use crate::services::token_store::TokenStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Character persistence operations consumed by the editor.
#[async_trait]
pub trait CharacterApi: Send + Sync {
    /// Fetch a character by id. `NotFound` for unknown ids, `Auth` when the
    /// session is missing or rejected.
    async fn get_character(&self, id: &str) -> Result<Character>;

    /// Persist a full character record. Returns the stored record when the
    /// API echoes it, `None` on an empty acknowledgement.
    async fn save_character(&self, character: &Character) -> Result<Option<Character>>;
}

/// HTTP-backed character service.
#[derive(Clone)]
pub struct CharacterService {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
}

impl CharacterService {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self { api, tokens }
    }

    fn character_url(&self, id: &str) -> String {
        self.api
            .url(&format!("/characters/{}", urlencoding::encode(id)))
    }

    fn bearer_token(&self) -> Result<String> {
        self.tokens
            .load()
            .ok_or_else(|| AppError::Auth("Not signed in".to_string()))
    }
}

#[async_trait]
impl CharacterApi for CharacterService {
    async fn get_character(&self, id: &str) -> Result<Character> {
        if id.is_empty() {
            return Err(AppError::MissingSelection);
        }
        let token = self.bearer_token()?;

        let request = self.api.http().get(self.character_url(id)).bearer_auth(token);
        let response = self.api.send(request).await?;
        let character: Character = self
            .api
            .check_response_json(response, &format!("Character {}", id))
            .await?;

        tracing::debug!(character_id = %character.id, "Character fetched");
        Ok(character)
    }

    async fn save_character(&self, character: &Character) -> Result<Option<Character>> {
        if character.id.is_empty() {
            return Err(AppError::MissingSelection);
        }
        let token = self.bearer_token()?;

        let request = self
            .api
            .http()
            .put(self.character_url(&character.id))
            .bearer_auth(token)
            .json(character);
        let response = self.api.send(request).await?;
        let stored = self
            .api
            .check_response_optional_json(response, &format!("Character {}", character.id))
            .await?;

        tracing::info!(
            character_id = %character.id,
            echoed = stored.is_some(),
            "Character saved"
        );
        Ok(stored)
    }
}
