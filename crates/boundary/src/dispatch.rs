//! Local event fan-out.
//!
//! Callbacks are kept in registration order and never removed. Triggering an
//! event calls every callback registered for its kind, synchronously, in that
//! order.

use {
    hublink_protocol::{
        BoundaryIntroduction, DeleteMessagePayload, GroupMembershipChange, InboundEvent,
        MessageReceived, ReactToMessagePayload, SendMessagePayload, events,
    },
    std::{
        fmt,
        sync::{Arc, RwLock},
    },
    tracing::debug,
};

// ── Event kinds ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalEventKind {
    Connect,
    Message,
    UserJoinedGroup,
    UserLeftGroup,
    ReplyWithText,
    ReplyWithSticker,
    ReplyWithMedia,
    SendMessage,
    SendMessageWithMedia,
    SendMessageWithSticker,
    ReactMessage,
    DeleteMessage,
}

impl LocalEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Message => events::MESSAGE,
            Self::UserJoinedGroup => events::USER_JOINED_GROUP,
            Self::UserLeftGroup => events::USER_LEFT_GROUP,
            Self::ReplyWithText => events::REPLY_WITH_TEXT,
            Self::ReplyWithSticker => events::REPLY_WITH_STICKER,
            Self::ReplyWithMedia => events::REPLY_WITH_MEDIA,
            Self::SendMessage => events::SEND_MESSAGE,
            Self::SendMessageWithMedia => events::SEND_MESSAGE_WITH_MEDIA,
            Self::SendMessageWithSticker => events::SEND_MESSAGE_WITH_STICKER,
            Self::ReactMessage => events::REACT_MESSAGE,
            Self::DeleteMessage => events::DELETE_MESSAGE,
        }
    }
}

impl fmt::Display for LocalEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Events ──────────────────────────────────────────────────────────────────

/// Something the boundary sent or carried out, observed locally.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEvent {
    Connect(BoundaryIntroduction),
    Message(MessageReceived),
    UserJoinedGroup(GroupMembershipChange),
    UserLeftGroup(GroupMembershipChange),
    ReplyWithText(SendMessagePayload),
    ReplyWithSticker(SendMessagePayload),
    ReplyWithMedia(SendMessagePayload),
    SendMessage(SendMessagePayload),
    SendMessageWithMedia(SendMessagePayload),
    SendMessageWithSticker(SendMessagePayload),
    ReactMessage(ReactToMessagePayload),
    DeleteMessage(DeleteMessagePayload),
}

impl LocalEvent {
    pub fn kind(&self) -> LocalEventKind {
        match self {
            Self::Connect(_) => LocalEventKind::Connect,
            Self::Message(_) => LocalEventKind::Message,
            Self::UserJoinedGroup(_) => LocalEventKind::UserJoinedGroup,
            Self::UserLeftGroup(_) => LocalEventKind::UserLeftGroup,
            Self::ReplyWithText(_) => LocalEventKind::ReplyWithText,
            Self::ReplyWithSticker(_) => LocalEventKind::ReplyWithSticker,
            Self::ReplyWithMedia(_) => LocalEventKind::ReplyWithMedia,
            Self::SendMessage(_) => LocalEventKind::SendMessage,
            Self::SendMessageWithMedia(_) => LocalEventKind::SendMessageWithMedia,
            Self::SendMessageWithSticker(_) => LocalEventKind::SendMessageWithSticker,
            Self::ReactMessage(_) => LocalEventKind::ReactMessage,
            Self::DeleteMessage(_) => LocalEventKind::DeleteMessage,
        }
    }

    /// The local event for an inbound send or reply carrying `payload`.
    ///
    /// `None` for inbound events with other payload types.
    pub fn outgoing(event: InboundEvent, payload: SendMessagePayload) -> Option<Self> {
        let local = match event {
            InboundEvent::ReplyWithText => Self::ReplyWithText(payload),
            InboundEvent::ReplyWithSticker => Self::ReplyWithSticker(payload),
            InboundEvent::ReplyWithMedia => Self::ReplyWithMedia(payload),
            InboundEvent::SendMessage => Self::SendMessage(payload),
            InboundEvent::SendMessageWithMedia => Self::SendMessageWithMedia(payload),
            InboundEvent::SendMessageWithSticker => Self::SendMessageWithSticker(payload),
            InboundEvent::ReactMessage
            | InboundEvent::DeleteMessage
            | InboundEvent::AskResource => return None,
        };
        Some(local)
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────────────

pub type EventCallback = Arc<dyn Fn(&LocalEvent) + Send + Sync>;

struct Subscription {
    kind: LocalEventKind,
    callback: EventCallback,
}

/// Append-only list of `(kind, callback)` pairs.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriptions", &self.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &self,
        kind: LocalEventKind,
        callback: impl Fn(&LocalEvent) + Send + Sync + 'static,
    ) {
        self.subscriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Subscription {
                kind,
                callback: Arc::new(callback),
            });
    }

    /// Call every callback registered for `event`'s kind, in registration
    /// order. Returns how many ran.
    pub fn trigger(&self, event: &LocalEvent) -> usize {
        let kind = event.kind();
        // Snapshot so callbacks may register further callbacks.
        let matching: Vec<EventCallback> = self
            .subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.callback))
            .collect();

        for callback in &matching {
            callback(event);
        }
        if !matching.is_empty() {
            debug!(event = %kind, callbacks = matching.len(), "local event triggered");
        }
        matching.len()
    }

    pub fn len(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::sync::Mutex};

    fn delete(id: &str) -> LocalEvent {
        LocalEvent::DeleteMessage(DeleteMessagePayload {
            message_id: id.into(),
            chat_id: "c1".into(),
            timestamp: 0,
        })
    }

    #[test]
    fn callbacks_fire_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            dispatcher.on(LocalEventKind::DeleteMessage, move |_| {
                log.lock().unwrap().push(tag);
            });
        }
        assert_eq!(dispatcher.trigger(&delete("m1")), 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn only_matching_kind_fires() {
        let dispatcher = EventDispatcher::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&hits);
        dispatcher.on(LocalEventKind::ReactMessage, move |event| {
            sink.lock().unwrap().push(event.kind());
        });
        assert_eq!(dispatcher.trigger(&delete("m1")), 0);
        assert!(hits.lock().unwrap().is_empty());
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn callbacks_see_the_payload() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        dispatcher.on(LocalEventKind::DeleteMessage, move |event| {
            if let LocalEvent::DeleteMessage(payload) = event {
                *sink.lock().unwrap() = Some(payload.message_id.clone());
            }
        });
        dispatcher.trigger(&delete("m42"));
        assert_eq!(seen.lock().unwrap().as_deref(), Some("m42"));
    }

    #[test]
    fn callback_may_register_another() {
        let dispatcher = Arc::new(EventDispatcher::new());
        let inner = Arc::clone(&dispatcher);
        dispatcher.on(LocalEventKind::DeleteMessage, move |_| {
            inner.on(LocalEventKind::DeleteMessage, |_| {});
        });
        assert_eq!(dispatcher.trigger(&delete("m1")), 1);
        assert_eq!(dispatcher.len(), 2);
        assert_eq!(dispatcher.trigger(&delete("m2")), 2);
    }

    #[test]
    fn outgoing_maps_send_family_only() {
        let payload = SendMessagePayload::new("c1", "hi");
        let local = LocalEvent::outgoing(InboundEvent::ReplyWithMedia, payload.clone()).unwrap();
        assert_eq!(local.kind(), LocalEventKind::ReplyWithMedia);
        assert!(LocalEvent::outgoing(InboundEvent::AskResource, payload).is_none());
    }
}
