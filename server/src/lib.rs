//! # Hangman Server Library
//!
//! HTTP front end for the hangman game. Each browser gets a cookie-identified
//! session holding a typed record: the player's name and level, their current
//! [`shared::GameSession`] and their own batches of candidate secret words.
//!
//! ## Request Flow
//!
//! ```text
//! POST /start ──▶ identity stored ──▶ 303 /play
//! GET  /play  ──▶ secret drawn on first visit ──▶ board
//! POST /guess ──▶ GameSession::submit_guess ──▶ board + message
//! POST /reset ──▶ game dropped, identity kept ──▶ 303 /play
//! POST /logout ─▶ session removed ──▶ 303 /
//! ```
//!
//! ## Module Organization
//!
//! ### Session Module (`session`)
//! Typed session records, the bincode codec at the store boundary, per-session
//! locks and idle expiry. A request holds its session lock from load to store,
//! so a double-submitted guess can never be counted twice.
//!
//! ### Word Source Module (`word_source`)
//! Fetches newline-delimited word lists from a remote endpoint (or a local
//! file) and refills the player's batch when it runs low, retrying a bounded
//! number of times.
//!
//! ### Routes Module (`routes`)
//! The axum router and its handlers.
//!
//! ### Network Module (`network`)
//! Listener setup, the idle-session reaper task and graceful shutdown.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::parse_from(["hangman-server", "--port", "8000"]);
//!     let server = Server::bind(&config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod routes;
pub mod session;
pub mod word_source;
