use crate::connection::DisconnectReason;

/// Core error type.
///
/// Adapter crates map their transport errors into this type so the sequencer
/// and the connection supervisor can treat failures uniformly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("disconnected: {0}")]
    Disconnected(DisconnectReason),
}

pub type Result<T> = std::result::Result<T, Error>;
