//! Error type for the fallible edges of the crate (room ids, JSON input)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("room {0:?} does not yield a usable seed")]
    InvalidRoom(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}
