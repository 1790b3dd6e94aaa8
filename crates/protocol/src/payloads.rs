//! Payload shapes carried by hub events.
//!
//! Field names follow the hub's camelCase wire format.

use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    std::{fmt, str::FromStr},
};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

// ── Platform ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Whatsapp,
    Discord,
    Telegram,
    Slack,
    Matrix,
    Instagram,
    Console,
}

impl Platform {
    pub const ALL: [Self; 7] = [
        Self::Whatsapp,
        Self::Discord,
        Self::Telegram,
        Self::Slack,
        Self::Matrix,
        Self::Instagram,
        Self::Console,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Discord => "discord",
            Self::Telegram => "telegram",
            Self::Slack => "slack",
            Self::Matrix => "matrix",
            Self::Instagram => "instagram",
            Self::Console => "console",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform `{0}`")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

// ── Introduction ─────────────────────────────────────────────────────────────

/// First event a boundary sends after connecting, always signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryIntroduction {
    #[serde(rename = "OS")]
    pub os: String,
    pub platform: Platform,
    pub role: String,
    pub name: String,
}

impl BoundaryIntroduction {
    /// Introduction for a boundary running on the current host OS.
    pub fn new(platform: Platform, name: impl Into<String>) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            platform,
            role: crate::BOUNDARY_ROLE.to_string(),
            name: name.into(),
        }
    }
}

// ── Media & contacts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTransport {
    /// `data` is base64-encoded file content.
    B64,
    /// `data` is a URL the boundary downloads from.
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub data: String,
    pub transport_type: MediaTransport,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
    /// Seconds, for audio and video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub id: String,
    #[serde(default)]
    pub public_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_name: Option<String>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_group: bool,
}

// ── Outbound ─────────────────────────────────────────────────────────────────

/// A message observed on the platform, forwarded to the hub as `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceived {
    pub id: String,
    #[serde(default)]
    pub from_host_account: bool,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tagged_contacts: Vec<ContactPayload>,
    pub contact: ContactPayload,
    pub boundary_name: String,
    pub platform: Platform,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub is_group_message: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_message: Option<Box<MessageReceived>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
}

/// A member joining or leaving a group chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipChange {
    pub group_id: String,
    pub user_id: String,
    pub boundary_name: String,
    pub platform: Platform,
    pub timestamp: Timestamp,
}

pub type UserJoinedGroup = GroupMembershipChange;
pub type UserLeftGroup = GroupMembershipChange;

/// Envelope of the `forward_event` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardableEvent<T = Value> {
    pub event_name: String,
    pub payload: T,
}

impl<T> ForwardableEvent<T> {
    pub fn new(event_name: impl Into<String>, payload: T) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
        }
    }
}

// ── Inbound ──────────────────────────────────────────────────────────────────

/// Payload of every send/reply event. `media` is required for the sticker
/// and media variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub chat_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl SendMessagePayload {
    pub fn new(chat_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            body: body.into(),
            quote_id: None,
            media: None,
            boundary_name: None,
            platform: None,
            timestamp: 0,
        }
    }

    #[must_use]
    pub fn with_media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    #[must_use]
    pub fn quoting(mut self, message_id: impl Into<String>) -> Self {
        self.quote_id = Some(message_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactToMessagePayload {
    pub message_id: String,
    pub chat_id: String,
    pub emote: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessagePayload {
    pub message_id: String,
    pub chat_id: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

// ── Resources ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub resource: String,
    #[serde(default)]
    pub data: Value,
}

/// The hub asking a boundary for a named resource.
///
/// Fields the boundary does not interpret are kept in `extra` so the answer
/// echoes them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResourcePayload {
    pub request: ResourceRequest,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AskResourcePayload {
    pub fn new(resource: impl Into<String>, data: Value) -> Self {
        Self {
            request: ResourceRequest {
                resource: resource.into(),
                data,
            },
            extra: Map::new(),
        }
    }

    /// Answer this request: the original payload plus `response` and a fresh
    /// `timestamp`.
    pub fn respond(mut self, response: Value, timestamp: Timestamp) -> ProvideResourcePayload {
        self.extra.remove("response");
        self.extra.remove("timestamp");
        ProvideResourcePayload {
            ask: self,
            response,
            timestamp,
        }
    }
}

/// Answer to an [`AskResourcePayload`], sent as `reply_resource`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvideResourcePayload {
    #[serde(flatten)]
    pub ask: AskResourcePayload,
    pub response: Value,
    pub timestamp: Timestamp,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    #[test]
    fn introduction_uses_upper_case_os_key() {
        let intro = BoundaryIntroduction::new(Platform::Telegram, "tg-main");
        let value = serde_json::to_value(&intro).unwrap();
        assert_eq!(value["OS"], json!(std::env::consts::OS));
        assert_eq!(value["platform"], json!("telegram"));
        assert_eq!(value["role"], json!("boundary"));
        assert_eq!(value["name"], json!("tg-main"));
    }

    #[rstest]
    #[case("telegram", Platform::Telegram)]
    #[case(" Discord ", Platform::Discord)]
    #[case("WHATSAPP", Platform::Whatsapp)]
    fn platform_from_str(#[case] input: &str, #[case] expected: Platform) {
        assert_eq!(input.parse::<Platform>().unwrap(), expected);
    }

    #[test]
    fn unknown_platform_is_rejected() {
        let err = "fax".parse::<Platform>().unwrap_err();
        assert_eq!(err.to_string(), "unknown platform `fax`");
    }

    #[test]
    fn send_message_payload_from_hub_json() {
        let payload: SendMessagePayload = serde_json::from_value(json!({
            "chatId": "c1",
            "body": "hi {mention:u1}",
            "quoteId": "m9",
            "timestamp": 1700000000000i64,
            "media": {
                "data": "https://example.org/cat.webp",
                "transportType": "url",
                "mimeType": "image/webp"
            }
        }))
        .unwrap();
        assert_eq!(payload.chat_id, "c1");
        assert_eq!(payload.quote_id.as_deref(), Some("m9"));
        let media = payload.media.unwrap();
        assert_eq!(media.transport_type, MediaTransport::Url);
        assert_eq!(media.file_name, None);
    }

    #[test]
    fn send_message_payload_optional_fields_default() {
        let payload: SendMessagePayload =
            serde_json::from_value(json!({"chatId": "c1"})).unwrap();
        assert_eq!(payload, SendMessagePayload::new("c1", ""));
    }

    #[test]
    fn forwardable_event_shape() {
        let change = GroupMembershipChange {
            group_id: "g1".into(),
            user_id: "u1".into(),
            boundary_name: "b".into(),
            platform: Platform::Whatsapp,
            timestamp: 5,
        };
        let value =
            serde_json::to_value(ForwardableEvent::new("user_joined_group", change)).unwrap();
        assert_eq!(value["eventName"], json!("user_joined_group"));
        assert_eq!(value["payload"]["groupId"], json!("g1"));
    }

    #[test]
    fn resource_answer_echoes_request_fields() {
        let ask: AskResourcePayload = serde_json::from_value(json!({
            "id": "req-1",
            "request": {"resource": "contact_profile", "data": {"id": "u1"}},
            "requester": {"id": "mod-a"},
            "timestamp": 10,
        }))
        .unwrap();
        assert_eq!(ask.request.resource, "contact_profile");

        let answer = ask.respond(json!({"name": "Ana"}), 20);
        let value = serde_json::to_value(&answer).unwrap();
        assert_eq!(value, json!({
            "id": "req-1",
            "request": {"resource": "contact_profile", "data": {"id": "u1"}},
            "requester": {"id": "mod-a"},
            "response": {"name": "Ana"},
            "timestamp": 20,
        }));
    }

    #[test]
    fn message_received_round_trips_through_hub_json() {
        let raw = json!({
            "id": "m1",
            "from": "u1",
            "to": "c1",
            "body": "hello",
            "contact": {"id": "u1", "publicName": "Ana"},
            "boundaryName": "tg",
            "platform": "telegram",
            "timestamp": 1,
            "isGroupMessage": true,
            "groupName": "friends"
        });
        let message: MessageReceived = serde_json::from_value(raw).unwrap();
        assert!(message.is_group_message);
        assert_eq!(message.contact.public_name, "Ana");
        assert!(message.tagged_contacts.is_empty());
        let back = serde_json::to_value(&message).unwrap();
        assert_eq!(back["groupName"], json!("friends"));
        assert!(back.get("media").is_none());
    }
}
