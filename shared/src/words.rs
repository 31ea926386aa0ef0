//! Difficulty levels and the per-session cache of fetched secret words.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 10;

/// A word-list difficulty level, `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Difficulty(u8);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("level {0:?} is not a number from 1 to 10")]
pub struct DifficultyError(String);

impl Difficulty {
    pub fn new(level: u8) -> Option<Self> {
        (MIN_DIFFICULTY..=MAX_DIFFICULTY)
            .contains(&level)
            .then_some(Self(level))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every selectable level, easiest first.
    pub fn all() -> impl Iterator<Item = Difficulty> {
        (MIN_DIFFICULTY..=MAX_DIFFICULTY).map(Self)
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| DifficultyError(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cleans one line of a word list. Returns `None` for anything that cannot be a secret.
pub fn accept_word(raw: &str, min_length: usize) -> Option<String> {
    let word = raw.trim().to_lowercase();
    let usable = !word.is_empty()
        && word.len() >= min_length
        && word.chars().all(|c| c.is_ascii_lowercase());
    usable.then_some(word)
}

/// Shuffled batches of candidate secrets, one per difficulty.
///
/// Words are drawn from the end of a batch, so each fetched word is served at
/// most once until the batch is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBatchCache {
    batches: BTreeMap<Difficulty, Vec<String>>,
}

impl WordBatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remaining(&self, level: Difficulty) -> usize {
        self.batches.get(&level).map_or(0, Vec::len)
    }

    /// Replaces the batch for `level` with `words` in random order.
    pub fn refill<R: Rng + ?Sized>(
        &mut self,
        level: Difficulty,
        mut words: Vec<String>,
        rng: &mut R,
    ) {
        words.shuffle(rng);
        self.batches.insert(level, words);
    }

    /// Takes the next word of the `level` batch, if any is left.
    pub fn pop(&mut self, level: Difficulty) -> Option<String> {
        self.batches.get_mut(&level)?.pop()
    }
}
