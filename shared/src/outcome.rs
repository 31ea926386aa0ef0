//! Views of a game handed back to players.

use crate::game::GuessEffect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// When the secret word is included in a [`Board`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealPolicy {
    /// Only after the player has run out of guesses.
    #[default]
    OnLoss,
    /// Whenever the game has ended, won or lost.
    OnGameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reveal policy {0:?}, expected \"on-loss\" or \"on-game-over\"")]
pub struct UnknownRevealPolicy(String);

impl FromStr for RevealPolicy {
    type Err = UnknownRevealPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on-loss" | "loss" => Ok(Self::OnLoss),
            "on-game-over" | "game-over" => Ok(Self::OnGameOver),
            _ => Err(UnknownRevealPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for RevealPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnLoss => write!(f, "on-loss"),
            Self::OnGameOver => write!(f, "on-game-over"),
        }
    }
}

/// Everything needed to draw the game board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Number of letters in the secret.
    pub length: usize,
    /// Revealed letters and underscores, space separated.
    pub word: String,
    /// Guesses the player has left.
    pub guess_count: u32,
    /// Wrong guesses, sorted and space separated.
    pub missed_guesses: String,
    pub win: bool,
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Result of an accepted guess: the new board plus a message for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessOutcome {
    #[serde(flatten)]
    pub board: Board,
    #[serde(skip)]
    pub effect: GuessEffect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences_message: Option<String>,
}

impl GuessOutcome {
    /// The message shown to the player, whichever kind it is.
    pub fn message(&self) -> Option<&str> {
        self.occurrences_message
            .as_deref()
            .or(self.missed_message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSession;

    #[test]
    fn test_reveal_policy_parsing() {
        assert_eq!("on-loss".parse::<RevealPolicy>(), Ok(RevealPolicy::OnLoss));
        assert_eq!(
            "On-Game-Over".parse::<RevealPolicy>(),
            Ok(RevealPolicy::OnGameOver)
        );
        assert!("sometimes".parse::<RevealPolicy>().is_err());
        assert_eq!(RevealPolicy::OnGameOver.to_string(), "on-game-over");
    }

    #[test]
    fn test_outcome_json_shape() {
        let mut game = GameSession::new("cat", 6).unwrap();
        let outcome = game.submit_guess("z").unwrap();
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["length"], 3);
        assert_eq!(value["word"], "_ _ _");
        assert_eq!(value["guess_count"], 5);
        assert_eq!(value["missed_guesses"], "z");
        assert_eq!(value["win"], false);
        assert_eq!(value["game_over"], false);
        assert!(value.get("secret").is_none());
        assert!(value.get("occurrences_message").is_none());
        assert!(value.get("effect").is_none());
        assert_eq!(value["missed_message"], "Sorry, there is no 'z'");
    }

    #[test]
    fn test_lost_board_carries_secret() {
        let mut game = GameSession::new("cat", 1).unwrap();
        let outcome = game.submit_guess("dog").unwrap();
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["game_over"], true);
        assert_eq!(value["secret"], "cat");
        assert_eq!(outcome.message(), Some("Sorry, 'dog' is not the word"));
    }
}
