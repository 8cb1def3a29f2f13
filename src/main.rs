// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sheet-Keeper client
//!
//! Composition root: builds the session store and API collaborators,
//! restores any previous session, and reports where the user lands.

use sheet_keeper::{config::Config, routes::Route, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, "Starting Sheet-Keeper");

    let state = AppState::from_config(config)?;

    let restored = state.restore_session();
    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let route = state.navigate(&path)?;
    tracing::info!(restored, requested = %path, route = %route.path(), "Resolved route");

    match route {
        Route::CharacterSheet(id) => {
            let editor = state.character_editor();
            // Load failures are already on the sheet's banner
            let _ = editor.open(&id).await;
            tracing::info!(sheet = %serde_json::to_string(&editor.view())?, "Character sheet");
        }
        _ => {
            if let Some(dashboard) = state.dashboard() {
                tracing::info!(dashboard = %serde_json::to_string(&dashboard)?, "Dashboard");
            }
        }
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sheet_keeper=debug,info"));

    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry().with(filter).with(format).init();
}
