use {hublink_protocol::InboundEvent, thiserror::Error};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("`{event}` requires media but the payload has none")]
    MissingMedia { event: InboundEvent },

    #[error(transparent)]
    Protocol(#[from] hublink_protocol::Error),

    #[error(transparent)]
    Inline(#[from] hublink_inline::Error),

    #[error("platform adapter failed on `{event}`: {source}")]
    Adapter {
        event: InboundEvent,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("transport closed")]
    TransportClosed,
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn adapter(event: InboundEvent, source: anyhow::Error) -> Self {
        Self::Adapter {
            event,
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
