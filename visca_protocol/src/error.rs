use thiserror::Error;

/// Error types.
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error("frame length out of range")]
    InvalidLength,

    #[error("frame does not end with the terminator byte")]
    MissingTerminator,

    #[error("terminator byte inside frame body")]
    EmbeddedTerminator,

    #[error("header marker bit not set: {0:#04x}")]
    InvalidHeader(u8),

    #[error("unknown message kind byte: {0:#04x}")]
    UnknownMessageKind(u8),

    #[error("data byte has its high nibble set: {0:#04x}")]
    InvalidNibble(u8),

    #[error("parameter out of valid range")]
    ParameterOutOfRange,

    #[error("reply too short: expected {expected} data bytes, got {got}")]
    TruncatedReply { expected: usize, got: usize },

    #[error("unknown camera error code: {0:#04x}")]
    UnknownErrorCode(u8),

    #[error("data parse error: {0}")]
    BinRwError(#[from] binrw::Error),
}
