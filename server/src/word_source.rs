//! Secret word supply.
//!
//! Words come from a remote word-list endpoint or from a local list and are
//! drawn through the caller's [`WordBatchCache`], so each player works through
//! their own shuffled batch per level.

use log::{debug, warn};
use shared::{accept_word, Difficulty, WordBatchCache, LOW_WATER_MARK, MAX_FETCH_ATTEMPTS};
use std::time::Duration;
use thiserror::Error;

/// Default word-list endpoint, queried with `difficulty` and `minLength`.
pub const DEFAULT_WORD_API: &str =
    "http://linkedin-reach.hagbpyjegb.us-west-2.elasticbeanstalk.com/words";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("word list request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("word list endpoint answered {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum WordSourceError {
    #[error("no words available for level {level} after {attempts} fetch attempts")]
    Exhausted { level: Difficulty, attempts: u32 },
}

/// Where word batches are fetched from.
pub enum WordProvider {
    /// Newline-delimited list served over HTTP.
    Remote { client: reqwest::Client, url: String },
    /// A fixed list, the same for every level.
    Fixed(Vec<String>),
}

impl WordProvider {
    /// Remote provider whose requests give up after `timeout`.
    pub fn remote(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::Remote {
            client,
            url: url.into(),
        })
    }

    /// Provider backed by the lines of a word-list file's contents.
    pub fn from_lines(contents: &str) -> Self {
        Self::Fixed(contents.lines().map(str::to_string).collect())
    }

    /// Fetches one batch of usable words. An empty batch is not an error here.
    pub async fn fetch(
        &self,
        level: Difficulty,
        min_length: usize,
    ) -> Result<Vec<String>, FetchError> {
        let lines = match self {
            Self::Remote { client, url } => {
                let request = format!("{}?difficulty={}&minLength={}", url, level, min_length);
                let response = client.get(&request).send().await?;
                if !response.status().is_success() {
                    return Err(FetchError::Status(response.status()));
                }
                let body = response.text().await?;
                body.lines().map(str::to_string).collect::<Vec<_>>()
            }
            Self::Fixed(words) => words.clone(),
        };

        Ok(lines
            .iter()
            .filter_map(|line| accept_word(line, min_length))
            .collect())
    }
}

/// Draws secrets, refilling a player's batch when it runs low.
pub struct WordSource {
    provider: WordProvider,
    min_length: usize,
    low_water_mark: usize,
    max_attempts: u32,
}

impl WordSource {
    pub fn new(provider: WordProvider, min_length: usize) -> Self {
        Self {
            provider,
            min_length,
            low_water_mark: LOW_WATER_MARK,
            max_attempts: MAX_FETCH_ATTEMPTS,
        }
    }

    /// Shortest secret this source will hand out.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Takes the next secret for `level` out of `batches`.
    ///
    /// While the batch holds fewer than the low-water mark the provider is
    /// asked for a fresh one, up to the attempt limit. Empty answers and
    /// transport failures both count as failed attempts. Words left in the old
    /// batch are still served when every refill attempt fails.
    pub async fn next_word(
        &self,
        batches: &mut WordBatchCache,
        level: Difficulty,
    ) -> Result<String, WordSourceError> {
        let mut attempts = 0;

        while batches.remaining(level) < self.low_water_mark && attempts < self.max_attempts {
            attempts += 1;
            match self.provider.fetch(level, self.min_length).await {
                Ok(words) if !words.is_empty() => {
                    debug!("Fetched {} words for level {}", words.len(), level);
                    batches.refill(level, words, &mut rand::thread_rng());
                    break;
                }
                Ok(_) => warn!(
                    "Word fetch for level {} returned nothing (attempt {}/{})",
                    level, attempts, self.max_attempts
                ),
                Err(e) => warn!(
                    "Word fetch for level {} failed (attempt {}/{}): {}",
                    level, attempts, self.max_attempts, e
                ),
            }
        }

        batches
            .pop(level)
            .ok_or(WordSourceError::Exhausted { level, attempts })
    }
}
