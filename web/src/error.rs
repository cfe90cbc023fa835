use std::io;

use tokio_util::codec::AnyDelimiterCodecError;

/// A write request segment that could not be turned into a game record.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("max mass `{0}` is not a number")]
    Mass(String),
    #[error("max rank `{0}` is not an integer")]
    Rank(String),
    #[error("timestamp `{0}` is not a valid number of milliseconds since 1970")]
    Timestamp(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),
    #[error("line exceeds the maximum frame length")]
    LineTooLong,
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl From<AnyDelimiterCodecError> for TransportError {
    fn from(value: AnyDelimiterCodecError) -> Self {
        match value {
            AnyDelimiterCodecError::MaxChunkLengthExceeded => Self::LineTooLong,
            AnyDelimiterCodecError::Io(err) => Self::Io(err),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid database settings: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to bind listener: {0}")]
    Bind(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("failed to write response: {0}")]
    Fmt(#[from] std::fmt::Error),
    #[error("header value is not visible ascii: {0}")]
    HeaderValue(#[from] http::header::ToStrError),
}
