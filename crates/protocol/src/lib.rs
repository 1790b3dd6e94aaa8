//! Hub event protocol shared by every hublink boundary.
//!
//! All communication is JSON text frames over a WebSocket:
//! `{"event": "<name>", "payload": <json>}`. Outbound events go from the
//! boundary to the hub, inbound events are commands the hub asks the
//! boundary to carry out on its chat platform.

pub mod error;
pub mod payloads;
pub mod signing;

use {
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    std::fmt,
};

pub use {
    error::{Error, Result},
    payloads::*,
    signing::{Signed, sign, verify},
};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_SOCKET_PATH: &str = "/socket.io/";
pub const BOUNDARY_ROLE: &str = "boundary";

// ── Event names ──────────────────────────────────────────────────────────────

pub mod events {
    // Outbound.
    pub const INTRODUCTION: &str = "introduction";
    pub const MESSAGE: &str = "message";
    pub const FORWARD_EVENT: &str = "forward_event";
    pub const REPLY_RESOURCE: &str = "reply_resource";

    // Forwarded inside `forward_event`.
    pub const USER_JOINED_GROUP: &str = "user_joined_group";
    pub const USER_LEFT_GROUP: &str = "user_left_group";

    // Inbound.
    pub const REPLY_WITH_TEXT: &str = "reply_with_text";
    pub const REPLY_WITH_STICKER: &str = "reply_with_sticker";
    pub const REPLY_WITH_MEDIA: &str = "reply_with_media";
    pub const SEND_MESSAGE: &str = "send_message";
    pub const SEND_MESSAGE_WITH_MEDIA: &str = "send_message_with_media";
    pub const SEND_MESSAGE_WITH_STICKER: &str = "send_message_with_sticker";
    pub const REACT_MESSAGE: &str = "react_message";
    pub const DELETE_MESSAGE: &str = "delete_message";
    pub const ASK_RESOURCE: &str = "ask_resource";
}

/// Every event the hub may send to a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundEvent {
    ReplyWithText,
    ReplyWithSticker,
    ReplyWithMedia,
    SendMessage,
    SendMessageWithMedia,
    SendMessageWithSticker,
    ReactMessage,
    DeleteMessage,
    AskResource,
}

impl InboundEvent {
    pub const ALL: [Self; 9] = [
        Self::ReplyWithText,
        Self::ReplyWithSticker,
        Self::ReplyWithMedia,
        Self::SendMessage,
        Self::SendMessageWithMedia,
        Self::SendMessageWithSticker,
        Self::ReactMessage,
        Self::DeleteMessage,
        Self::AskResource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReplyWithText => events::REPLY_WITH_TEXT,
            Self::ReplyWithSticker => events::REPLY_WITH_STICKER,
            Self::ReplyWithMedia => events::REPLY_WITH_MEDIA,
            Self::SendMessage => events::SEND_MESSAGE,
            Self::SendMessageWithMedia => events::SEND_MESSAGE_WITH_MEDIA,
            Self::SendMessageWithSticker => events::SEND_MESSAGE_WITH_STICKER,
            Self::ReactMessage => events::REACT_MESSAGE,
            Self::DeleteMessage => events::DELETE_MESSAGE,
            Self::AskResource => events::ASK_RESOURCE,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }

    /// Whether the payload must carry `media` to be acted on.
    pub fn requires_media(self) -> bool {
        matches!(
            self,
            Self::ReplyWithSticker
                | Self::ReplyWithMedia
                | Self::SendMessageWithMedia
                | Self::SendMessageWithSticker
        )
    }

    /// Whether the payload body goes through inline command resolution.
    pub fn renders_body(self) -> bool {
        matches!(
            self,
            Self::ReplyWithText
                | Self::ReplyWithSticker
                | Self::ReplyWithMedia
                | Self::SendMessage
                | Self::SendMessageWithSticker
        )
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// One named event on the wire, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl EventFrame {
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Build a frame from any serializable payload.
    pub fn encode(event: impl Into<String>, payload: &impl Serialize) -> Result<Self> {
        Ok(Self::new(event, serde_json::to_value(payload)?))
    }

    /// Deserialize the payload into the type the event name implies.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.payload.clone()).map_err(|source| Error::Payload {
            event: self.event.clone(),
            source,
        })
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    #[rstest]
    #[case("reply_with_text", Some(InboundEvent::ReplyWithText))]
    #[case("send_message_with_media", Some(InboundEvent::SendMessageWithMedia))]
    #[case("ask_resource", Some(InboundEvent::AskResource))]
    #[case("message", None)]
    #[case("REPLY_WITH_TEXT", None)]
    fn inbound_event_names(#[case] name: &str, #[case] expected: Option<InboundEvent>) {
        assert_eq!(InboundEvent::from_name(name), expected);
    }

    #[test]
    fn every_inbound_event_round_trips_its_name() {
        for event in InboundEvent::ALL {
            assert_eq!(InboundEvent::from_name(&event.to_string()), Some(event));
        }
    }

    #[test]
    fn media_bearing_events() {
        let media: Vec<_> = InboundEvent::ALL
            .into_iter()
            .filter(|e| e.requires_media())
            .collect();
        assert_eq!(media, vec![
            InboundEvent::ReplyWithSticker,
            InboundEvent::ReplyWithMedia,
            InboundEvent::SendMessageWithMedia,
            InboundEvent::SendMessageWithSticker,
        ]);
        assert!(!InboundEvent::SendMessageWithMedia.renders_body());
        assert!(!InboundEvent::ReactMessage.renders_body());
    }

    #[test]
    fn frame_wire_shape() {
        let frame = EventFrame::new(events::MESSAGE, json!({"body": "hi"}));
        let text = frame.to_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"event": "message", "payload": {"body": "hi"}}));
        assert_eq!(EventFrame::from_text(&text).unwrap(), frame);
    }

    #[test]
    fn frame_without_payload_defaults_to_null() {
        let frame = EventFrame::from_text(r#"{"event":"ping"}"#).unwrap();
        assert!(frame.payload.is_null());
    }

    #[test]
    fn decode_error_names_the_event() {
        let frame = EventFrame::new(events::REACT_MESSAGE, json!({"emote": 3}));
        let err = frame.decode::<ReactToMessagePayload>().unwrap_err();
        assert!(err.to_string().contains("react_message"), "{err}");
    }
}
