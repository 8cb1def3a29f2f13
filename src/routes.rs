// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side navigation table.
//!
//! Signed-out sessions can reach the landing, sign-in and sign-up pages;
//! signed-in sessions can reach the dashboard and character pages. Anything
//! else redirects to the default page for the session state.

use crate::error::{AppError, Result};
use crate::models::User;

const CHARACTERS_PREFIX: &str = "/characters/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Signin,
    Signup,
    Dashboard,
    Characters,
    CharacterSheet(String),
}

impl Route {
    /// Parse a location path. `Ok(None)` for paths that match no page.
    ///
    /// A sheet path without an id (`/characters/`) is `MissingSelection`.
    pub fn parse(path: &str) -> Result<Option<Route>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();

        if let Some(rest) = path.strip_prefix(CHARACTERS_PREFIX) {
            let id = rest.trim_end_matches('/');
            if id.is_empty() {
                return Err(AppError::MissingSelection);
            }
            if id.contains('/') {
                return Ok(None);
            }
            let id = urlencoding::decode(id)
                .map_err(|_| AppError::MissingSelection)?
                .into_owned();
            return Ok(Some(Route::CharacterSheet(id)));
        }

        let route = match path.trim_end_matches('/') {
            "" => Route::Landing,
            "/signin" => Route::Signin,
            "/signup" => Route::Signup,
            "/dashboard" => Route::Dashboard,
            "/characters" => Route::Characters,
            _ => return Ok(None),
        };
        Ok(Some(route))
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Signin => "/signin".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Characters => "/characters".to_string(),
            Route::CharacterSheet(id) => {
                format!("{}{}", CHARACTERS_PREFIX, urlencoding::encode(id))
            }
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Characters | Route::CharacterSheet(_)
        )
    }

    /// Page to show for `path` given the session user, after redirects.
    pub fn resolve(path: &str, user: Option<&User>) -> Result<Route> {
        let signed_in = user.is_some();
        let route = match Route::parse(path)? {
            Some(route) => route,
            None if signed_in => return Ok(Route::Dashboard),
            None => return Ok(Route::Landing),
        };

        Ok(match (route.requires_auth(), signed_in) {
            (true, false) => Route::Signin,
            (false, true) => Route::Dashboard,
            _ => route,
        })
    }
}
