// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use sheet_keeper::config::Config;
use sheet_keeper::error::{AppError, FieldErrors, Result};
use sheet_keeper::models::{Character, CharacterSummary, Credentials, User};
use sheet_keeper::services::{AuthApi, CharacterApi, SessionClaims};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Password accepted by the fake collaborators.
#[allow(dead_code)]
pub const PASSWORD: &str = "b";

/// Build a character with the given id and strength; other fields filled in.
#[allow(dead_code)]
pub fn character(id: &str, strength: i32) -> Character {
    Character {
        id: id.to_string(),
        owner: Some("u1".to_string()),
        name: format!("Hero {}", id),
        race: "Dwarf".to_string(),
        sex: "F".to_string(),
        size: "Medium".to_string(),
        age: 60,
        height: "4'2\"".to_string(),
        weight: 150.0,
        alignment: "Lawful Good".to_string(),
        languages: vec!["Common".to_string(), "Dwarvish".to_string()],
        initiative: 1,
        speed: 25,
        max_hp: 12,
        current_hp: 12,
        temp_hp: 0,
        hit_dice_remaining: 1,
        hit_dice_type: "d10".to_string(),
        hit_dice_total: 1,
        strength,
        dexterity: 12,
        constitution: 16,
        charisma: 8,
        wisdom: 10,
        intelligence: 9,
    }
}

#[allow(dead_code)]
pub fn user(characters: &[Character]) -> User {
    User {
        id: "u1".to_string(),
        username: "a".to_string(),
        characters: characters
            .iter()
            .map(|c| CharacterSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                level: 1,
            })
            .collect(),
    }
}

/// Issue a session token the way the API does.
#[allow(dead_code)]
pub fn session_token(user: &User, exp: i64) -> String {
    let claims = SessionClaims {
        user: user.clone(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"api_signing_key"),
    )
    .expect("Failed to create session token")
}

#[allow(dead_code)]
pub fn config_for(api_url: &str, token_path: &std::path::Path) -> Config {
    Config {
        api_url: api_url.to_string(),
        token_path: token_path.to_path_buf(),
        ..Config::default()
    }
}

// ─── In-process collaborators ────────────────────────────────────────────────

/// Auth collaborator that accepts [`PASSWORD`] for any username.
#[allow(dead_code)]
pub struct FakeAuth {
    user: User,
    session: Mutex<Option<User>>,
}

#[allow(dead_code)]
impl FakeAuth {
    pub fn new(user: User) -> Self {
        Self {
            user,
            session: Mutex::new(None),
        }
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            session: Mutex::new(Some(user.clone())),
            user,
        }
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    fn get_user(&self) -> Option<User> {
        self.session.lock().unwrap().clone()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User> {
        if credentials.password != PASSWORD {
            return Err(AppError::Auth("Invalid credentials".to_string()));
        }
        let user = User {
            username: credentials.username.clone(),
            ..self.user.clone()
        };
        *self.session.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<User> {
        self.sign_in(credentials).await
    }

    fn sign_out(&self) {
        *self.session.lock().unwrap() = None;
    }
}

/// How the next save should fail.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum SaveFailure {
    Network,
    Rejected,
}

/// Character collaborator with controllable completion order.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeCharacters {
    records: Mutex<HashMap<String, Character>>,
    load_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    save_gate: Mutex<Option<oneshot::Receiver<()>>>,
    next_failure: Mutex<Option<SaveFailure>>,
    /// Echo the stored record back from saves
    pub echo: AtomicBool,
    pub get_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeCharacters {
    pub fn with(characters: impl IntoIterator<Item = Character>) -> Self {
        let fake = Self::default();
        {
            let mut records = fake.records.lock().unwrap();
            for c in characters {
                records.insert(c.id.clone(), c);
            }
        }
        fake
    }

    /// Hold `get_character(id)` until the returned sender fires.
    pub fn gate_load(&self, id: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.load_gates.lock().unwrap().insert(id.to_string(), rx);
        tx
    }

    /// Hold the next `save_character` until the returned sender fires.
    pub fn gate_save(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.save_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_next_save(&self, failure: SaveFailure) {
        *self.next_failure.lock().unwrap() = Some(failure);
    }

    pub fn record(&self, id: &str) -> Option<Character> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl CharacterApi for FakeCharacters {
    async fn get_character(&self, id: &str) -> Result<Character> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.load_gates.lock().unwrap().remove(id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.record(id)
            .ok_or_else(|| AppError::NotFound(format!("Character {}", id)))
    }

    async fn save_character(&self, character: &Character) -> Result<Option<Character>> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.save_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let failure = self.next_failure.lock().unwrap().take();
        match failure {
            Some(SaveFailure::Network) => {
                return Err(AppError::Network("connection reset".to_string()))
            }
            Some(SaveFailure::Rejected) => {
                return Err(AppError::Validation(FieldErrors::form("Rejected by server")))
            }
            None => {}
        }

        self.records
            .lock()
            .unwrap()
            .insert(character.id.clone(), character.clone());

        if self.echo.load(Ordering::SeqCst) {
            let mut stored = character.clone();
            stored.name = format!("{} (stored)", stored.name);
            Ok(Some(stored))
        } else {
            Ok(None)
        }
    }
}

// ─── Fake HTTP API ───────────────────────────────────────────────────────────

/// Backing data for the fake HTTP API.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeBackend {
    pub characters: Mutex<HashMap<String, Character>>,
    /// Echo saved characters instead of answering 204
    pub echo_saves: AtomicBool,
    pub saves: AtomicUsize,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn with(characters: impl IntoIterator<Item = Character>) -> Arc<Self> {
        let backend = Self::default();
        {
            let mut map = backend.characters.lock().unwrap();
            for c in characters {
                map.insert(c.id.clone(), c);
            }
        }
        Arc::new(backend)
    }

    fn user_for(&self, username: &str) -> User {
        let characters: Vec<Character> = {
            let map = self.characters.lock().unwrap();
            let mut all: Vec<_> = map.values().cloned().collect();
            all.sort_by(|a, b| a.id.cmp(&b.id));
            all
        };
        User {
            username: username.to_string(),
            ..user(&characters)
        }
    }
}

/// Serve the fake API on an ephemeral port. Returns its base URL.
#[allow(dead_code)]
pub async fn spawn_api(backend: Arc<FakeBackend>) -> String {
    let app = Router::new()
        .route("/auth/signin", post(signin))
        .route("/auth/signup", post(signup))
        .route("/characters/{id}", get(get_character).put(put_character))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake API");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn error_body(status: StatusCode, error: &str, details: &str) -> Response {
    (status, Json(json!({ "error": error, "details": details }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h.starts_with("Bearer ") && h.len() > 7)
}

fn token_response(backend: &FakeBackend, username: &str) -> Response {
    let exp = chrono::Utc::now().timestamp() + 3600;
    let token = session_token(&backend.user_for(username), exp);
    Json(json!({ "token": token })).into_response()
}

async fn signin(
    State(backend): State<Arc<FakeBackend>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if body["password"].as_str() != Some(PASSWORD) {
        return error_body(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid credentials");
    }
    token_response(&backend, username)
}

async fn signup(
    State(backend): State<Arc<FakeBackend>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    if username == "taken" {
        return error_body(StatusCode::BAD_REQUEST, "bad_request", "Username already taken");
    }
    token_response(&backend, username)
}

async fn get_character(
    State(backend): State<Arc<FakeBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, "unauthorized", "Missing token");
    }
    if id == "garbled" {
        return (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"_id":"garbled","strength":"very"}"#,
        )
            .into_response();
    }
    match backend.characters.lock().unwrap().get(&id) {
        Some(c) => Json(c.clone()).into_response(),
        None => error_body(StatusCode::NOT_FOUND, "not_found", "No such character"),
    }
}

async fn put_character(
    State(backend): State<Arc<FakeBackend>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if !authorized(&headers) {
        return error_body(StatusCode::UNAUTHORIZED, "unauthorized", "Missing token");
    }
    if body["age"].as_i64().is_some_and(|age| age < 0) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "validation", "fields": { "age": "must not be negative" } })),
        )
            .into_response();
    }

    let character: Character = match serde_json::from_value(body) {
        Ok(c) => c,
        Err(e) => return error_body(StatusCode::BAD_REQUEST, "bad_request", &e.to_string()),
    };
    if character.id != id {
        return error_body(StatusCode::BAD_REQUEST, "bad_request", "Id mismatch");
    }

    backend.saves.fetch_add(1, Ordering::SeqCst);
    backend
        .characters
        .lock()
        .unwrap()
        .insert(id, character.clone());

    if backend.echo_saves.load(Ordering::SeqCst) {
        Json(character).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
