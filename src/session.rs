// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session flows: restore, sign-in, sign-up, sign-out.
//!
//! These are the only places besides the editor that write to the store.

use crate::config::Config;
use crate::editor::CharacterEditor;
use crate::error::Result;
use crate::models::Credentials;
use crate::routes::Route;
use crate::services::{
    ApiClient, AuthApi, AuthService, CharacterApi, CharacterService, FileTokenStore, TokenStore,
};
use crate::store::SessionStore;
use crate::views::DashboardView;
use crate::AppState;
use std::sync::Arc;

impl AppState {
    /// Wire the state around the given collaborators with an empty store.
    pub fn new(
        config: Config,
        auth: Arc<dyn AuthApi>,
        characters: Arc<dyn CharacterApi>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(SessionStore::new()),
            auth,
            characters,
        }
    }

    /// Build the HTTP-backed collaborators described by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api_url, config.request_timeout)?;
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_path.clone()));

        let auth = Arc::new(AuthService::new(api.clone(), tokens.clone()));
        let characters = Arc::new(CharacterService::new(api, tokens));

        Ok(Self::new(config, auth, characters))
    }

    /// Load the user from a previous sign-in, if the stored session is valid.
    pub fn restore_session(&self) -> bool {
        let user = self.auth.get_user();
        let restored = user.is_some();
        if let Some(user) = &user {
            tracing::info!(user_id = %user.id, "Session restored");
        }
        self.store.set_user(user);
        restored
    }

    /// Sign in and return the page to navigate to.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Route> {
        let user = self.auth.sign_in(credentials).await.inspect_err(|e| {
            tracing::warn!(username = %credentials.username, error = %e, "Sign-in failed");
        })?;

        self.store.set_user(Some(user));
        Ok(Route::Dashboard)
    }

    /// Create an account, sign in, and return the page to navigate to.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Route> {
        let user = self.auth.sign_up(credentials).await.inspect_err(|e| {
            tracing::warn!(username = %credentials.username, error = %e, "Sign-up failed");
        })?;

        self.store.set_user(Some(user));
        Ok(Route::Dashboard)
    }

    /// End the session. Clears the user and the current character.
    pub fn sign_out(&self) -> Route {
        self.auth.sign_out();
        self.store.clear();
        Route::Landing
    }

    /// Page to show for `path` in the current session.
    pub fn navigate(&self, path: &str) -> Result<Route> {
        Route::resolve(path, self.store.user().as_ref())
    }

    /// Dashboard for the signed-in user, if any.
    pub fn dashboard(&self) -> Option<DashboardView> {
        self.store.user().as_ref().map(DashboardView::for_user)
    }

    /// Fresh editor bound to this session's store.
    pub fn character_editor(&self) -> CharacterEditor {
        CharacterEditor::new(self.store.clone(), self.characters.clone())
    }
}
