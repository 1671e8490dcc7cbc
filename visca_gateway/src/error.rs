use std::io::Error as IoError;
use thiserror::Error;
use visca_protocol::reply::ErrorCode;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error(transparent)]
    IoError(#[from] IoError),

    #[error(transparent)]
    Protocol(#[from] visca_protocol::Error),

    #[error(transparent)]
    Serial(#[from] tokio_serial::Error),

    #[error("camera reported: {0}")]
    Camera(ErrorCode),

    #[error("command cancelled")]
    Cancelled,

    #[error("timeout waiting for a reply")]
    Timeout,

    #[error("transport closed")]
    Transport,

    #[error("no camera at address {0}")]
    UnknownCamera(u8),

    #[error("channel unavailable, likely dropped")]
    ChannelUnavailable,
}

impl Error {
    /// Maps a camera-reported error code onto the gateway taxonomy.
    ///
    /// A cancel reply is the expected answer to a Cancel command, so it
    /// keeps its own variant.
    pub(crate) fn from_code(code: ErrorCode) -> Self {
        match code {
            ErrorCode::Cancelled => Self::Cancelled,
            code => Self::Camera(code),
        }
    }
}
