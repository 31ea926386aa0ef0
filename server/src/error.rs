//! Request-level errors and how each one is answered.

use crate::word_source::WordSourceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use log::{error, warn};
use serde_json::json;
use shared::{DifficultyError, GameError, GuessError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No identity or no game where one is required. Sends the player back to the index.
    #[error("no active session")]
    NoActiveSession,
    #[error("a player name is required")]
    MissingName,
    #[error(transparent)]
    InvalidLevel(#[from] DifficultyError),
    #[error(transparent)]
    Guess(#[from] GuessError),
    #[error("the server cannot open more sessions right now")]
    SessionCapacity,
    #[error(transparent)]
    Words(#[from] WordSourceError),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("stored session could not be read: {0}")]
    SessionCodec(#[from] bincode::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NoActiveSession => return Redirect::to("/").into_response(),
            Self::MissingName | Self::InvalidLevel(_) => StatusCode::BAD_REQUEST,
            Self::Guess(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SessionCapacity => StatusCode::SERVICE_UNAVAILABLE,
            Self::Words(e) => {
                warn!("Could not start a game: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Game(e) => {
                error!("Could not build a game: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::SessionCodec(e) => {
                error!("Session codec failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;
    use http_body_util::BodyExt;

    async fn error_message(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_no_session_redirects_to_index() {
        let response = AppError::NoActiveSession.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/");
    }

    #[tokio::test]
    async fn test_guess_errors_are_unprocessable() {
        let response = AppError::from(GuessError::AlreadyGuessed).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(response).await, "You have already guessed that");
    }

    #[tokio::test]
    async fn test_bad_level_is_bad_request() {
        let err = "eleven".parse::<shared::Difficulty>().unwrap_err();
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_exhausted_words_are_unavailable() {
        let err = WordSourceError::Exhausted {
            level: shared::Difficulty::new(2).unwrap(),
            attempts: 4,
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(error_message(response).await.contains("after 4 fetch attempts"));
    }
}
