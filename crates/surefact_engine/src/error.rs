use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("invalid stream url: {0}")]
    InvalidUrl(String),
    #[error("bearer token is not a valid header value")]
    InvalidToken,
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    #[error("handshake rejected: {0}")]
    Handshake(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no frame received for {0:?}")]
    Idle(Duration),
}

pub(crate) fn map_ws_error(err: tungstenite::Error) -> StreamError {
    match err {
        tungstenite::Error::Http(response) => {
            StreamError::Handshake(format!("http status {}", response.status()))
        }
        tungstenite::Error::Url(err) => StreamError::InvalidUrl(err.to_string()),
        other => StreamError::Transport(other.to_string()),
    }
}
