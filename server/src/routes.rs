//! HTTP endpoints.
//!
//! Every handler that touches a game follows the same pattern: find the
//! session from its cookie, lock it, load the typed record, act on it and
//! store it back before the lock is released.

use crate::error::AppError;
use crate::session::{Player, SessionHandle, SessionStore};
use crate::word_source::WordSource;
use axum::extract::{Form, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shared::{Board, Difficulty, GameSession, GuessOutcome, RevealPolicy};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "hangman_session";

/// Game settings applied to every new game.
#[derive(Debug, Clone, Copy)]
pub struct GameRules {
    pub guess_budget: u32,
    pub reveal_policy: RevealPolicy,
}

impl GameRules {
    fn new_game(&self, secret: &str, prepopulate: bool) -> Result<GameSession, AppError> {
        let game = if prepopulate {
            GameSession::prepopulated(secret, self.guess_budget, &mut rand::thread_rng())?
        } else {
            GameSession::new(secret, self.guess_budget)?
        };
        Ok(game.with_reveal_policy(self.reveal_policy))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<SessionStore>>,
    pub words: Arc<WordSource>,
    pub rules: GameRules,
}

impl AppState {
    /// Wraps the store and word source for sharing across handlers.
    pub fn new(sessions: SessionStore, words: WordSource, rules: GameRules) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            words: Arc::new(words),
            rules,
        }
    }
}

/// Builds the router serving every game endpoint.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/start", post(start))
        .route("/play", get(play))
        .route("/guess", post(guess))
        .route("/count", get(count))
        .route("/reset", post(reset))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct StartForm {
    pub name: String,
    pub level: String,
    pub prepopulate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuessForm {
    pub guess: String,
}

#[derive(Debug, Serialize)]
struct IndexView {
    message: &'static str,
    levels: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct PlayView {
    name: String,
    level: u8,
    #[serde(flatten)]
    board: Board,
}

#[derive(Debug, Serialize)]
struct CountView {
    guess_count: u32,
}

/// Reads the session id out of the request cookies.
fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, id)| id.to_string())
}

fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

async fn existing_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Option<(String, SessionHandle)> {
    let id = session_id(headers)?;
    let handle = state.sessions.read().await.get(&id)?;
    Some((id, handle))
}

fn checkbox_checked(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1" | "yes"))
}

async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some((_, handle)) = existing_session(&state, &headers).await {
        let mut slot = handle.lock().await;
        if slot.load()?.game.is_some() {
            return Ok(Redirect::to("/play").into_response());
        }
    }

    Ok(Json(IndexView {
        message: "Welcome to Hangman! Pick a name and a level to start.",
        levels: Difficulty::all().map(Difficulty::get).collect(),
    })
    .into_response())
}

async fn start(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<StartForm>,
) -> Result<Response, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::MissingName);
    }
    let level: Difficulty = form.level.parse()?;

    let (id, handle) = match existing_session(&state, &headers).await {
        Some(found) => found,
        None => state
            .sessions
            .write()
            .await
            .create()
            .ok_or(AppError::SessionCapacity)?,
    };

    {
        let mut slot = handle.lock().await;
        let mut session = slot.load()?;
        session.begin(Player {
            name: name.to_string(),
            level,
            prepopulate: checkbox_checked(form.prepopulate.as_deref()),
        });
        slot.store(&session)?;
    }
    info!("Player '{}' started at level {} (session {})", name, level, id);

    Ok(([(SET_COOKIE, session_cookie(&id))], Redirect::to("/play")).into_response())
}

async fn play(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PlayView>, AppError> {
    let (id, handle) = existing_session(&state, &headers)
        .await
        .ok_or(AppError::NoActiveSession)?;

    let mut slot = handle.lock().await;
    let mut session = slot.load()?;
    let player = session.player.clone().ok_or(AppError::NoActiveSession)?;

    if session.game.is_none() {
        let secret = state
            .words
            .next_word(&mut session.word_batches, player.level)
            .await?;
        let game = state.rules.new_game(&secret, player.prepopulate)?;
        info!("New {}-letter game for session {}", secret.len(), id);
        session.game = Some(game);
        slot.store(&session)?;
    }
    let board = session
        .game
        .as_ref()
        .map(GameSession::board)
        .ok_or(AppError::NoActiveSession)?;

    Ok(Json(PlayView {
        name: player.name,
        level: player.level.get(),
        board,
    }))
}

async fn guess(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<GuessForm>,
) -> Result<Json<GuessOutcome>, AppError> {
    let (id, handle) = existing_session(&state, &headers)
        .await
        .ok_or(AppError::NoActiveSession)?;

    let mut slot = handle.lock().await;
    let mut session = slot.load()?;
    let game = session.game.as_mut().ok_or(AppError::NoActiveSession)?;

    let outcome = game.submit_guess(&form.guess)?;
    slot.store(&session)?;
    if let Some(message) = outcome.message() {
        debug!("Session {}: {}", id, message);
    }

    Ok(Json(outcome))
}

async fn count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CountView>, AppError> {
    let (_, handle) = existing_session(&state, &headers)
        .await
        .ok_or(AppError::NoActiveSession)?;

    let mut slot = handle.lock().await;
    let session = slot.load()?;
    let game = session.game.as_ref().ok_or(AppError::NoActiveSession)?;

    Ok(Json(CountView {
        guess_count: game.guesses_remaining(),
    }))
}

async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, AppError> {
    let (id, handle) = existing_session(&state, &headers)
        .await
        .ok_or(AppError::NoActiveSession)?;

    let mut slot = handle.lock().await;
    let mut session = slot.load()?;
    if session.player.is_none() {
        return Err(AppError::NoActiveSession);
    }
    session.reset_game();
    slot.store(&session)?;
    info!("Session {} reset its game", id);

    Ok(Redirect::to("/play"))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.write().await.remove(&id);
    }

    ([(SET_COOKIE, expired_cookie())], Redirect::to("/")).into_response()
}
