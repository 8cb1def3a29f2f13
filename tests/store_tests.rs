// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store read/write and last-request-wins tests.

use sheet_keeper::store::SessionStore;

mod common;
use common::{character, user};

#[test]
fn test_set_user_then_get_returns_same_user() {
    let store = SessionStore::new();
    let u = user(&[character("c1", 14), character("c2", 8)]);

    store.set_user(Some(u.clone()));

    assert_eq!(store.user(), Some(u));
}

#[test]
fn test_set_user_none_signs_out() {
    let store = SessionStore::new();
    store.set_user(Some(user(&[])));

    store.set_user(None);

    assert_eq!(store.user(), None);
}

#[test]
fn test_current_character_roundtrip_is_unmodified() {
    let store = SessionStore::new();
    assert!(store.current_character().is_none(), "Nothing loaded yet");

    let c = character("c1", 14);
    store.set_current_character(c.clone());

    assert_eq!(store.current_character(), Some(c));
}

#[test]
fn test_set_current_character_replaces_wholesale() {
    let store = SessionStore::new();
    let mut first = character("c1", 14);
    first.languages = vec!["Elvish".to_string()];
    store.set_current_character(first);

    let mut second = character("c1", 14);
    second.languages = vec![];
    second.name = "Renamed".to_string();
    store.set_current_character(second.clone());

    assert_eq!(store.current_character(), Some(second));
}

#[test]
fn test_late_completion_of_superseded_fetch_is_discarded() {
    let store = SessionStore::new();

    let c1_ticket = store.begin_request();
    let c2_ticket = store.begin_request();

    // c2 completes first
    assert!(store.apply_character(c2_ticket, character("c2", 10)));
    // c1 arrives late
    assert!(!store.apply_character(c1_ticket, character("c1", 10)));

    assert_eq!(store.current_character().unwrap().id, "c2");
}

#[test]
fn test_clear_ends_session_and_invalidates_requests() {
    let store = SessionStore::new();
    store.set_user(Some(user(&[])));
    let ticket = store.begin_request();
    store.set_current_character(character("c1", 10));

    store.clear();

    assert_eq!(store.user(), None);
    assert_eq!(store.current_character(), None);
    assert!(!store.apply_character(ticket, character("c1", 10)));
    assert_eq!(store.current_character(), None);
}
