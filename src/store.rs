// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and entity store.
//!
//! Single source of truth for who is signed in and which character is being
//! edited. The store is an ordinary value owned by [`crate::AppState`] and
//! shared by `Arc`; views read it synchronously and subscribe for changes.
//!
//! Writes replace values wholesale. Asynchronous completions go through
//! request tickets: only the most recently issued ticket may write the
//! current character, so a slow response can never overwrite a newer one.

use crate::models::{Character, User};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

/// Session contents as seen by subscribers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub current_character: Option<Character>,
}

/// Token identifying one fetch or save. Tickets are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// In-memory session store. No operation blocks on I/O or fails.
pub struct SessionStore {
    state: watch::Sender<SessionState>,
    /// Latest issued ticket. Held while applying a completion so issuing
    /// and applying are ordered.
    latest_ticket: Mutex<u64>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            state,
            latest_ticket: Mutex::new(0),
        }
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// The character bound to the edit form. `None` means "not yet loaded".
    pub fn current_character(&self) -> Option<Character> {
        self.state.borrow().current_character.clone()
    }

    /// Receiver notified after every write, for reactive re-rendering.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    // ─── Writes ──────────────────────────────────────────────────────────────

    /// Replace the session user. `None` is sign-out of the user only; use
    /// [`SessionStore::clear`] to end the whole session.
    pub fn set_user(&self, user: Option<User>) {
        tracing::debug!(
            user_id = user.as_ref().map(|u| u.id.as_str()),
            "Session user updated"
        );
        self.state.send_modify(|state| state.user = user);
    }

    /// Replace the current character wholesale.
    ///
    /// A direct write is newer than anything in flight, so outstanding
    /// tickets are invalidated.
    pub fn set_current_character(&self, character: Character) {
        let mut latest = self.lock_tickets();
        *latest += 1;
        self.state
            .send_modify(|state| state.current_character = Some(character));
    }

    /// End the session: clears the user and the current character together
    /// and invalidates outstanding requests.
    pub fn clear(&self) {
        let mut latest = self.lock_tickets();
        *latest += 1;
        self.state.send_modify(|state| {
            state.user = None;
            state.current_character = None;
        });
        tracing::debug!("Session cleared");
    }

    // ─── Request Tickets ─────────────────────────────────────────────────────

    /// Issue a ticket for a new fetch or save. Any earlier ticket becomes stale.
    pub fn begin_request(&self) -> RequestTicket {
        let mut latest = self.lock_tickets();
        *latest += 1;
        RequestTicket(*latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        *self.lock_tickets() == ticket.0
    }

    /// Apply a completed fetch or save. Returns `false` and leaves the store
    /// untouched if a newer request was issued after `ticket`.
    pub fn apply_character(&self, ticket: RequestTicket, character: Character) -> bool {
        let latest = self.lock_tickets();
        if *latest != ticket.0 {
            tracing::debug!(
                ticket = ticket.0,
                latest = *latest,
                character_id = %character.id,
                "Discarding stale character completion"
            );
            return false;
        }

        self.state
            .send_modify(|state| state.current_character = Some(character));
        true
    }

    fn lock_tickets(&self) -> std::sync::MutexGuard<'_, u64> {
        self.latest_ticket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
