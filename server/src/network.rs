//! Server network layer: binds the listener, serves the routes and expires idle sessions

use crate::config::ServerConfig;
use crate::routes::{app, AppState, GameRules};
use crate::session::SessionStore;
use crate::word_source::{WordProvider, WordSource};
use log::{debug, error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// How often idle sessions are looked for.
const REAPER_INTERVAL: Duration = Duration::from_secs(30);

/// Main server tying the HTTP routes to shared session state
pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Builds the word source and session store described by `config` and binds its address.
    pub async fn bind(config: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let provider = match &config.word_list {
            Some(path) => {
                let contents = tokio::fs::read_to_string(path).await?;
                info!("Serving secrets from {}", path.display());
                WordProvider::from_lines(&contents)
            }
            None => {
                info!("Serving secrets from {}", config.word_api);
                WordProvider::remote(config.word_api.clone(), config.fetch_timeout())?
            }
        };

        let state = AppState::new(
            SessionStore::new(config.max_sessions, config.session_timeout()),
            WordSource::new(provider, config.min_length),
            GameRules {
                guess_budget: config.guesses,
                reveal_policy: config.reveal_secret,
            },
        );

        info!(
            "Secrets need at least {} letters, at most {} sessions",
            state.words.min_length(),
            config.max_sessions
        );

        Ok(Self::with_state(&config.address(), state).await?)
    }

    /// Binds `addr` around an already assembled state.
    pub async fn with_state(addr: &str, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        Ok(Self { listener, state })
    }

    /// Address actually bound, useful when the port was 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Spawns task that periodically drops idle sessions
    fn spawn_session_reaper(&self) {
        let sessions = Arc::clone(&self.state.sessions);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REAPER_INTERVAL);

            loop {
                interval.tick().await;
                reap(&sessions).await;
            }
        });
    }

    /// Serves requests until Ctrl+C.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_session_reaper();

        info!("Server started successfully");
        axum::serve(self.listener, app(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutting down");
        Ok(())
    }
}

async fn reap(sessions: &RwLock<SessionStore>) {
    let mut store = sessions.write().await;
    let expired = store.check_timeouts();
    if !expired.is_empty() {
        debug!("{} idle sessions expired, {} remain", expired.len(), store.len());
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RevealPolicy;

    fn test_state(timeout: Duration) -> AppState {
        AppState::new(
            SessionStore::new(4, timeout),
            WordSource::new(WordProvider::Fixed(vec!["cat".to_string()]), 1),
            GameRules {
                guess_budget: 6,
                reveal_policy: RevealPolicy::OnLoss,
            },
        )
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::with_state("127.0.0.1:0", test_state(Duration::from_secs(60)))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_rejects_bad_address() {
        assert!(
            Server::with_state("not an address", test_state(Duration::from_secs(60)))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_bind_from_config_with_word_list() {
        let path = std::env::temp_dir().join(format!("hangman-words-{}.txt", std::process::id()));
        tokio::fs::write(&path, "apple\nbanana\n").await.unwrap();

        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            word_api: String::new(),
            word_list: Some(path.clone()),
            min_length: 3,
            guesses: 6,
            reveal_secret: RevealPolicy::OnLoss,
            fetch_timeout_ms: 100,
            session_timeout_secs: 60,
            max_sessions: 4,
        };
        let server = Server::bind(&config).await.unwrap();
        assert_eq!(server.state.words.min_length(), 3);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_missing_word_list_fails() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            word_api: String::new(),
            word_list: Some("/definitely/not/here.txt".into()),
            min_length: 3,
            guesses: 6,
            reveal_secret: RevealPolicy::OnLoss,
            fetch_timeout_ms: 100,
            session_timeout_secs: 60,
            max_sessions: 4,
        };
        assert!(Server::bind(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_reap_drops_idle_sessions() {
        let state = test_state(Duration::ZERO);
        state.sessions.write().await.create().unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        reap(&state.sessions).await;
        assert!(state.sessions.read().await.is_empty());
    }
}
