//! Command-line configuration for the hangman server.

use crate::word_source::DEFAULT_WORD_API;
use clap::Parser;
use shared::RevealPolicy;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Word-list endpoint, queried with difficulty and minLength
    #[arg(long, default_value = DEFAULT_WORD_API)]
    pub word_api: String,

    /// Serve secrets from this newline-delimited file instead of the word-list endpoint
    #[arg(long)]
    pub word_list: Option<PathBuf>,

    /// Shortest secret word accepted
    #[arg(long, default_value = "3")]
    pub min_length: usize,

    /// Wrong guesses allowed per game
    #[arg(short, long, default_value = "6", value_parser = clap::value_parser!(u32).range(1..))]
    pub guesses: u32,

    /// When to show the secret: on-loss or on-game-over
    #[arg(long, default_value = "on-loss")]
    pub reveal_secret: RevealPolicy,

    /// Word-list request timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub fetch_timeout_ms: u64,

    /// Seconds of inactivity before a session is dropped
    #[arg(long, default_value = "1800")]
    pub session_timeout_secs: u64,

    /// Maximum number of concurrent sessions
    #[arg(long, default_value = "1024")]
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}
