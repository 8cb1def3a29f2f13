// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Character fetch-and-edit protocol.
//!
//! One [`CharacterEditor`] backs one open character sheet:
//!
//! ```text
//! Unloaded ──open──▶ Loading ──ok──▶ Loaded ──save──▶ Saving ──ok──▶ Loaded
//!                       │                                 │
//!                       └──err──▶ Unloaded + banner       └──err──▶ Loaded + banner
//!                                                                   (edits kept)
//! ```
//!
//! Every fetch and save takes a ticket from the [`SessionStore`]; a
//! completion whose ticket has been superseded is dropped without touching
//! the store or the editor.

use crate::error::{AppError, ErrorBanner, FieldErrors, Result};
use crate::form::{CharacterForm, FormField};
use crate::models::Character;
use crate::services::CharacterApi;
use crate::store::{RequestTicket, SessionStore};
use crate::views::SheetView;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where the sheet is in its load/save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Unloaded,
    Loading,
    Loaded,
    Saving,
}

/// Result of a fetch or save that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was written to the store.
    Applied,
    /// A newer request was issued first; the result was discarded.
    Superseded,
}

struct EditorState {
    phase: EditPhase,
    character_id: Option<String>,
    form: CharacterForm,
    /// Record the form was last seeded from.
    seeded_from: Option<Character>,
    field_errors: FieldErrors,
    banner: Option<ErrorBanner>,
    /// Ticket of this editor's outstanding fetch or save.
    pending: Option<RequestTicket>,
}

/// Edit session for a single character sheet.
pub struct CharacterEditor {
    store: Arc<SessionStore>,
    characters: Arc<dyn CharacterApi>,
    state: Mutex<EditorState>,
}

impl CharacterEditor {
    pub fn new(store: Arc<SessionStore>, characters: Arc<dyn CharacterApi>) -> Self {
        Self {
            store,
            characters,
            state: Mutex::new(EditorState {
                phase: EditPhase::Unloaded,
                character_id: None,
                form: CharacterForm::default(),
                seeded_from: None,
                field_errors: FieldErrors::new(),
                banner: None,
                pending: None,
            }),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn phase(&self) -> EditPhase {
        self.lock().phase
    }

    pub fn character_id(&self) -> Option<String> {
        self.lock().character_id.clone()
    }

    pub fn form(&self) -> CharacterForm {
        self.lock().form.clone()
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.lock().field_errors.clone()
    }

    /// Failure from the last fetch or save, if any.
    pub fn banner(&self) -> Option<ErrorBanner> {
        self.lock().banner.clone()
    }

    /// Render model for the sheet.
    pub fn view(&self) -> SheetView {
        let character = self.store.current_character();
        let state = self.lock();
        SheetView::build(
            character.as_ref(),
            state.phase,
            &state.form,
            &state.field_errors,
            state.banner.as_ref(),
        )
    }

    // ─── Editing ─────────────────────────────────────────────────────────────

    /// Record input for a field. Inputs are read-only while saving; returns
    /// `false` if the edit was ignored.
    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.phase == EditPhase::Saving {
            return false;
        }
        state.form.set(field, value);
        true
    }

    /// Follow an out-of-band change to the store's current character.
    ///
    /// A clean form is re-seeded from the stored record. A form with unsaved
    /// edits to the same character keeps the edited fields and takes every
    /// other field from the store; edits are never dropped for a different
    /// character. Returns `true` if the form changed.
    pub fn sync_from_store(&self) -> bool {
        let Some(current) = self.store.current_character() else {
            return false;
        };

        let mut state = self.lock();
        if state.phase != EditPhase::Loaded || state.seeded_from.as_ref() == Some(&current) {
            return false;
        }

        if !state.form.is_dirty() {
            tracing::debug!(character_id = %current.id, "Store changed, re-seeding form");
            state.character_id = Some(current.id.clone());
            state.form = CharacterForm::from_character(&current);
            state.field_errors = FieldErrors::new();
        } else if state.character_id.as_deref() == Some(current.id.as_str()) {
            tracing::debug!(character_id = %current.id, "Store changed, rebasing unsaved edits");
            state.form.rebase(&current);
        } else {
            return false;
        }
        state.seeded_from = Some(current);
        true
    }

    /// Keep the form mirroring the store until the store goes away. Catches
    /// up with any change made before the subscription.
    pub async fn follow_store(&self) {
        let mut changes = self.store.subscribe();
        self.sync_from_store();
        while changes.changed().await.is_ok() {
            self.sync_from_store();
        }
    }

    // ─── Load ────────────────────────────────────────────────────────────────

    /// Open the sheet for `id` and fetch it.
    ///
    /// An empty id is a caller bug and fails immediately with
    /// `MissingSelection`. Fetch failures leave the editor `Unloaded` with a
    /// banner and are also returned.
    pub async fn open(&self, id: &str) -> Result<Completion> {
        if id.is_empty() {
            return Err(AppError::MissingSelection);
        }

        let ticket = self.store.begin_request();
        {
            let mut state = self.lock();
            state.pending = Some(ticket);
            state.phase = EditPhase::Loading;
            state.character_id = Some(id.to_string());
            state.banner = None;
            state.field_errors = FieldErrors::new();
        }
        tracing::debug!(character_id = id, ticket = ticket.sequence(), "Loading character");

        match self.characters.get_character(id).await {
            Ok(character) => {
                if !self.store.apply_character(ticket, character.clone()) {
                    self.settle_superseded(ticket);
                    return Ok(Completion::Superseded);
                }

                let mut state = self.lock();
                state.pending = None;
                state.phase = EditPhase::Loaded;
                state.form = CharacterForm::from_character(&character);
                state.seeded_from = Some(character);
                Ok(Completion::Applied)
            }
            Err(e) => {
                if !self.store.is_current(ticket) {
                    tracing::debug!(character_id = id, error = %e, "Ignoring failure of superseded load");
                    self.settle_superseded(ticket);
                    return Ok(Completion::Superseded);
                }

                tracing::warn!(character_id = id, error = %e, "Failed to load character");
                let mut state = self.lock();
                state.pending = None;
                state.phase = EditPhase::Unloaded;
                state.banner = Some(e.banner());
                Err(e)
            }
        }
    }

    // ─── Save ────────────────────────────────────────────────────────────────

    /// Validate the form and submit it.
    ///
    /// Invalid input is reported per field and never reaches the API. A
    /// second save while one is outstanding is rejected with
    /// `SaveInProgress`. The submitted record is the store's current copy of
    /// the character with the edited fields applied, so a newer stored
    /// version is never reverted. On success the store is updated with the
    /// server's echoed record, or with the submitted record if the API
    /// returned none.
    pub async fn save(&self) -> Result<Completion> {
        let current = self.store.current_character();
        let (submitted, ticket) = {
            let mut state = self.lock();
            match state.phase {
                EditPhase::Saving => return Err(AppError::SaveInProgress),
                EditPhase::Unloaded | EditPhase::Loading => {
                    return Err(AppError::MissingSelection)
                }
                EditPhase::Loaded => {}
            }
            let base = match current {
                Some(current) if state.character_id.as_deref() == Some(current.id.as_str()) => {
                    if state.seeded_from.as_ref() != Some(&current) {
                        tracing::debug!(character_id = %current.id, "Rebasing edits onto newer stored record");
                        state.form.rebase(&current);
                        state.seeded_from = Some(current.clone());
                    }
                    current
                }
                _ => state
                    .seeded_from
                    .clone()
                    .ok_or(AppError::MissingSelection)?,
            };

            let edits = match state.form.validate() {
                Ok(edits) => edits,
                Err(errors) => {
                    tracing::debug!(errors = %errors, "Form validation failed");
                    state.field_errors = errors.clone();
                    return Err(AppError::Validation(errors));
                }
            };

            let mut submitted = edits.apply_to(&base);
            // Joining and re-splitting would break items containing a comma
            if !state.form.is_edited(FormField::Languages) {
                submitted.languages = base.languages.clone();
            }
            if let Some(user) = self.store.user() {
                if submitted.owner.is_some() && !submitted.is_owned_by(&user.id) {
                    let e = AppError::Auth(format!(
                        "Character {} belongs to another user",
                        submitted.id
                    ));
                    state.banner = Some(e.banner());
                    return Err(e);
                }
                submitted.owner.get_or_insert(user.id);
            }

            state.phase = EditPhase::Saving;
            state.field_errors = FieldErrors::new();
            state.banner = None;
            let ticket = self.store.begin_request();
            state.pending = Some(ticket);
            (submitted, ticket)
        };
        tracing::debug!(character_id = %submitted.id, ticket = ticket.sequence(), "Saving character");

        match self.characters.save_character(&submitted).await {
            Ok(echoed) => {
                let record = echoed.unwrap_or(submitted);
                if !self.store.apply_character(ticket, record.clone()) {
                    self.settle_superseded(ticket);
                    return Ok(Completion::Superseded);
                }

                let mut state = self.lock();
                state.pending = None;
                state.phase = EditPhase::Loaded;
                state.character_id = Some(record.id.clone());
                state.form = CharacterForm::from_character(&record);
                state.seeded_from = Some(record);
                Ok(Completion::Applied)
            }
            Err(e) => {
                if !self.store.is_current(ticket) {
                    tracing::debug!(character_id = %submitted.id, error = %e, "Ignoring failure of superseded save");
                    self.settle_superseded(ticket);
                    return Ok(Completion::Superseded);
                }

                tracing::warn!(character_id = %submitted.id, error = %e, "Failed to save character");
                let mut state = self.lock();
                state.pending = None;
                state.phase = EditPhase::Loaded;
                if let Some(errors) = e.field_errors() {
                    state.field_errors = errors.clone();
                }
                state.banner = Some(e.banner());
                Err(e)
            }
        }
    }

    /// Settle the phase after `ticket` lost to a write from outside this
    /// editor (sign-out, a direct store write, another editor). If this
    /// editor has issued a newer request since, that request owns the phase.
    fn settle_superseded(&self, ticket: RequestTicket) {
        let current = self.store.current_character();
        let mut state = self.lock();
        if state.pending != Some(ticket) {
            return;
        }
        state.pending = None;

        match (state.phase, current) {
            // Unsaved edits stay; the sheet goes back to editable
            (EditPhase::Saving, _) => state.phase = EditPhase::Loaded,
            (_, Some(character)) => {
                state.phase = EditPhase::Loaded;
                state.character_id = Some(character.id.clone());
                state.form = CharacterForm::from_character(&character);
                state.seeded_from = Some(character);
            }
            (_, None) => {
                state.phase = EditPhase::Unloaded;
                state.character_id = None;
                state.seeded_from = None;
                state.form = CharacterForm::default();
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
