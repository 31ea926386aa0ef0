//! The per-player hangman state machine.
//!
//! A [`GameSession`] is built once from a secret word and a guess budget and is
//! afterwards changed only through [`GameSession::submit_guess`]. Validation
//! always happens before any field is touched, so a rejected guess leaves the
//! session exactly as it was.
//!
//! ```text
//! ┌─────────────┐  winning guess   ┌─────┐
//! │ InProgress  │─────────────────▶│ Won │
//! └──────┬──────┘                  └─────┘
//!        │ last guess missed
//!        ▼
//!     ┌──────┐
//!     │ Lost │
//!     └──────┘
//! ```

use crate::outcome::{Board, GuessOutcome, RevealPolicy};
use crate::PREPOPULATE_MAX_FRACTION;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Placeholder for a position that has not been revealed yet.
pub const HIDDEN: char = '_';

/// Where a game currently stands. Derived from the session, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Errors raised while constructing a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("secret word {0:?} must be one or more lowercase letters")]
    InvalidSecret(String),
    #[error("guess budget must be at least one")]
    ZeroBudget,
}

/// A guess the player can correct and resubmit. No state changes on either.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("Only the letters a-z are allowed")]
    InvalidCharacter,
    #[error("You have already guessed that")]
    AlreadyGuessed,
}

/// What a single accepted guess did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessEffect {
    /// A letter that appears `count` times in the secret.
    Revealed { letter: char, count: usize },
    /// The full secret word.
    Solved,
    /// A letter or word that is not in the secret.
    Missed { guess: String },
    /// The game had already finished; nothing changed.
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    secret: String,
    revealed: Vec<char>,
    /// Indices of every occurrence of each distinct letter, ascending.
    positions: BTreeMap<char, Vec<usize>>,
    missed: BTreeSet<String>,
    guesses_remaining: u32,
    reveal_policy: RevealPolicy,
}

impl GameSession {
    /// Starts a game with nothing revealed.
    pub fn new(secret: &str, budget: u32) -> Result<Self, GameError> {
        if secret.is_empty() || !secret.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(GameError::InvalidSecret(secret.to_string()));
        }
        if budget == 0 {
            return Err(GameError::ZeroBudget);
        }

        let mut positions: BTreeMap<char, Vec<usize>> = BTreeMap::new();
        for (index, letter) in secret.chars().enumerate() {
            positions.entry(letter).or_default().push(index);
        }

        Ok(Self {
            secret: secret.to_string(),
            revealed: vec![HIDDEN; secret.len()],
            positions,
            missed: BTreeSet::new(),
            guesses_remaining: budget,
            reveal_policy: RevealPolicy::default(),
        })
    }

    /// Starts a game with every occurrence of one letter already shown.
    ///
    /// The letter is picked uniformly among the distinct letters whose share of
    /// the word is at most one half. Candidates are shuffled once and tried in
    /// that order, so a rejected letter is never drawn again. With a single
    /// distinct letter nothing is revealed.
    pub fn prepopulated<R: Rng + ?Sized>(
        secret: &str,
        budget: u32,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let mut session = Self::new(secret, budget)?;
        if session.positions.len() < 2 {
            return Ok(session);
        }

        let mut candidates: Vec<char> = session.positions.keys().copied().collect();
        candidates.shuffle(rng);

        let length = session.secret.len() as f64;
        let chosen = candidates.into_iter().find(|letter| {
            let count = session.positions[letter].len() as f64;
            count / length <= PREPOPULATE_MAX_FRACTION
        });

        if let Some(letter) = chosen {
            debug!("Prepopulating letter '{}'", letter);
            session.reveal(letter);
        }
        Ok(session)
    }

    /// Sets when the finished board shows the secret.
    pub fn with_reveal_policy(mut self, policy: RevealPolicy) -> Self {
        self.reveal_policy = policy;
        self
    }

    /// Applies one guess: a single letter or a whole-word attempt.
    ///
    /// A one-letter guess always takes the letter branch, even when the secret
    /// itself is one letter long; the result is the same either way.
    pub fn submit_guess(&mut self, raw_guess: &str) -> Result<GuessOutcome, GuessError> {
        if self.status().is_over() {
            return Ok(self.outcome(GuessEffect::GameOver));
        }

        let guess = raw_guess.to_lowercase();
        if guess.is_empty() || !guess.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(GuessError::InvalidCharacter);
        }

        let single = single_letter(&guess);
        let already_revealed = single.is_some_and(|letter| self.revealed.contains(&letter));
        if self.missed.contains(&guess) || already_revealed {
            return Err(GuessError::AlreadyGuessed);
        }

        let effect = match single {
            None if guess == self.secret => {
                self.revealed = self.secret.chars().collect();
                GuessEffect::Solved
            }
            Some(letter) if self.positions.contains_key(&letter) => {
                let count = self.reveal(letter);
                GuessEffect::Revealed { letter, count }
            }
            _ => {
                self.miss(guess.clone());
                GuessEffect::Missed { guess }
            }
        };

        Ok(self.outcome(effect))
    }

    /// Derived from the board and the remaining budget, never stored.
    pub fn status(&self) -> GameStatus {
        if self.is_solved() && self.guesses_remaining > 0 {
            GameStatus::Won
        } else if self.guesses_remaining == 0 {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }

    /// Board view of the current state.
    pub fn board(&self) -> Board {
        let status = self.status();
        let show_secret = match self.reveal_policy {
            RevealPolicy::OnLoss => status == GameStatus::Lost,
            RevealPolicy::OnGameOver => status.is_over(),
        };

        Board {
            length: self.secret.len(),
            word: join_spaced(self.revealed.iter().map(|c| c.to_string())),
            guess_count: self.guesses_remaining,
            missed_guesses: join_spaced(self.missed.iter().cloned()),
            win: status == GameStatus::Won,
            game_over: status.is_over(),
            secret: show_secret.then(|| self.secret.clone()),
        }
    }

    /// The word being guessed.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The board as a string, with `_` for hidden positions.
    pub fn revealed(&self) -> String {
        self.revealed.iter().collect()
    }

    /// Indices of each distinct letter in the secret.
    pub fn positions(&self) -> &BTreeMap<char, Vec<usize>> {
        &self.positions
    }

    /// Wrong letters and words, sorted.
    pub fn missed(&self) -> &BTreeSet<String> {
        &self.missed
    }

    /// Wrong guesses still allowed before the game is lost.
    pub fn guesses_remaining(&self) -> u32 {
        self.guesses_remaining
    }

    fn is_solved(&self) -> bool {
        self.revealed.iter().copied().eq(self.secret.chars())
    }

    /// Uncovers every position of `letter` and returns how many there were.
    fn reveal(&mut self, letter: char) -> usize {
        let Some(indices) = self.positions.get(&letter) else {
            return 0;
        };
        for &index in indices {
            self.revealed[index] = letter;
        }
        indices.len()
    }

    fn miss(&mut self, guess: String) {
        self.missed.insert(guess);
        self.guesses_remaining = self.guesses_remaining.saturating_sub(1);
    }

    fn outcome(&self, effect: GuessEffect) -> GuessOutcome {
        let (occurrences_message, missed_message) = match &effect {
            GuessEffect::Revealed { letter, count: 1 } => {
                (Some(format!("There is 1 '{}'", letter)), None)
            }
            GuessEffect::Revealed { letter, count } => {
                (Some(format!("There are {} '{}'s", count, letter)), None)
            }
            GuessEffect::Solved => (Some(format!("You guessed the word '{}'", self.secret)), None),
            GuessEffect::Missed { guess } if guess.len() == 1 => {
                (None, Some(format!("Sorry, there is no '{}'", guess)))
            }
            GuessEffect::Missed { guess } => {
                (None, Some(format!("Sorry, '{}' is not the word", guess)))
            }
            GuessEffect::GameOver => (None, Some("The game is over".to_string())),
        };

        GuessOutcome {
            board: self.board(),
            effect,
            missed_message,
            occurrences_message,
        }
    }
}

fn single_letter(guess: &str) -> Option<char> {
    let mut chars = guess.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Some(letter),
        _ => None,
    }
}

fn join_spaced<I: Iterator<Item = String>>(parts: I) -> String {
    parts.collect::<Vec<_>>().join(" ")
}
