//! # Hangman Game Core
//!
//! Pure game state shared by the server and its tests. Nothing in this crate
//! touches the network or the session store.
//!
//! - [`game`]: the [`GameSession`] state machine and guess validation
//! - [`outcome`]: the board view and per-guess result returned to players
//! - [`words`]: difficulty levels and the per-session [`WordBatchCache`]

pub mod game;
pub mod outcome;
pub mod words;

pub use game::{GameError, GameSession, GameStatus, GuessEffect, GuessError};
pub use outcome::{Board, GuessOutcome, RevealPolicy};
pub use words::{accept_word, Difficulty, DifficultyError, WordBatchCache};

/// Wrong guesses a player may make before losing.
pub const DEFAULT_GUESS_BUDGET: u32 = 6;

/// A letter covering more than this share of the secret is never prepopulated.
pub const PREPOPULATE_MAX_FRACTION: f64 = 0.5;

/// A word batch smaller than this is refetched before the next draw.
pub const LOW_WATER_MARK: usize = 20;

/// Fetch attempts made before giving up on a word batch.
pub const MAX_FETCH_ATTEMPTS: u32 = 4;
