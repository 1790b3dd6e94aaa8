use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid payload for `{event}`: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("signing key rejected: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
