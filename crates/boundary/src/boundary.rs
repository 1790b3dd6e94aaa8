//! The boundary runtime: routes hub events to a platform adapter.
//!
//! Inbound send/reply events have their body rendered through the inline
//! engine with the payload itself as context; the adapter then delivers the
//! rendered text on its platform. Every inbound frame is handled on its own
//! task, so a slow handler only stalls its own message.

use {
    crate::{
        dispatch::{EventDispatcher, LocalEvent, LocalEventKind},
        error::{Error, Result},
        resources::{ResourceProvider, ResourceRegistry},
        transport::{Transport, TransportEvent},
    },
    async_trait::async_trait,
    hublink_inline::{CommandRegistry, InlineEngine, Resolved},
    hublink_protocol::{
        AskResourcePayload, BoundaryIntroduction, DeleteMessagePayload, EventFrame,
        ForwardableEvent, GroupMembershipChange, InboundEvent, MessageReceived, Platform,
        ReactToMessagePayload, SendMessagePayload, Timestamp, events, sign,
    },
    serde_json::Value,
    std::sync::Arc,
    tokio::sync::mpsc,
    tracing::{debug, error, info, warn},
};

/// Platform side of a boundary.
///
/// Every method defaults to doing nothing, so an adapter implements only the
/// events its platform supports. `rendered` carries the resolved body and the
/// ids it mentioned.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    async fn reply_with_text(
        &self,
        _payload: &SendMessagePayload,
        _rendered: &Resolved,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn reply_with_sticker(
        &self,
        _payload: &SendMessagePayload,
        _rendered: &Resolved,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn reply_with_media(
        &self,
        _payload: &SendMessagePayload,
        _rendered: &Resolved,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_message(
        &self,
        _payload: &SendMessagePayload,
        _rendered: &Resolved,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_message_with_sticker(
        &self,
        _payload: &SendMessagePayload,
        _rendered: &Resolved,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// The body of this event is delivered as-is, without inline rendering.
    async fn send_message_with_media(&self, _payload: &SendMessagePayload) -> anyhow::Result<()> {
        Ok(())
    }

    async fn react_message(&self, _payload: &ReactToMessagePayload) -> anyhow::Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _payload: &DeleteMessagePayload) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Identity a boundary announces to the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryOptions {
    pub name: String,
    pub platform: Platform,
}

/// The signed `introduction` frame for `options`.
pub fn introduction_frame(options: &BoundaryOptions, secret: &[u8]) -> Result<EventFrame> {
    let introduction = BoundaryIntroduction::new(options.platform, options.name.clone());
    let signed = sign(introduction, secret)?;
    Ok(EventFrame::encode(events::INTRODUCTION, &signed)?)
}

fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

struct Inner<A> {
    options: BoundaryOptions,
    engine: InlineEngine<SendMessagePayload>,
    adapter: A,
    transport: Arc<dyn Transport>,
    events: EventDispatcher,
    resources: ResourceRegistry,
}

/// A running boundary. Cloning is cheap and shares all state.
pub struct Boundary<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Boundary<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: PlatformAdapter + 'static> Boundary<A> {
    pub fn new(
        options: BoundaryOptions,
        registry: CommandRegistry<SendMessagePayload>,
        adapter: A,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                engine: InlineEngine::new(registry),
                adapter,
                transport,
                events: EventDispatcher::new(),
                resources: ResourceRegistry::new(),
            }),
        }
    }

    pub fn options(&self) -> &BoundaryOptions {
        &self.inner.options
    }

    pub fn adapter(&self) -> &A {
        &self.inner.adapter
    }

    pub fn engine(&self) -> &InlineEngine<SendMessagePayload> {
        &self.inner.engine
    }

    /// Register a local callback for `kind`.
    pub fn on(
        &self,
        kind: LocalEventKind,
        callback: impl Fn(&LocalEvent) + Send + Sync + 'static,
    ) {
        self.inner.events.on(kind, callback);
    }

    /// Register the provider answering `ask_resource` requests for `name`.
    pub fn on_ask_resource(
        &self,
        name: impl Into<String>,
        provider: impl ResourceProvider + 'static,
    ) {
        self.inner.resources.register(name, provider);
    }

    // ── Outbound ────────────────────────────────────────────────────────────

    /// Emit an arbitrary event to the hub, bypassing local callbacks.
    pub fn emit_forwardable_event(&self, event: &str, payload: Value) -> Result<()> {
        self.inner.transport.emit(EventFrame::new(event, payload))
    }

    /// Forward a platform message to the hub.
    pub fn emit_message(&self, message: MessageReceived) -> Result<()> {
        self.inner
            .transport
            .emit(EventFrame::encode(events::MESSAGE, &message)?)?;
        self.inner.events.trigger(&LocalEvent::Message(message));
        Ok(())
    }

    pub fn emit_user_joined_group(&self, change: GroupMembershipChange) -> Result<()> {
        self.forward(events::USER_JOINED_GROUP, &change)?;
        self.inner
            .events
            .trigger(&LocalEvent::UserJoinedGroup(change));
        Ok(())
    }

    pub fn emit_user_left_group(&self, change: GroupMembershipChange) -> Result<()> {
        self.forward(events::USER_LEFT_GROUP, &change)?;
        self.inner.events.trigger(&LocalEvent::UserLeftGroup(change));
        Ok(())
    }

    fn forward(&self, event_name: &str, change: &GroupMembershipChange) -> Result<()> {
        let envelope = ForwardableEvent::new(event_name, change);
        self.inner
            .transport
            .emit(EventFrame::encode(events::FORWARD_EVENT, &envelope)?)
    }

    // ── Inbound ─────────────────────────────────────────────────────────────

    /// Consume transport events until the transport goes away.
    ///
    /// Each frame is handled on its own task; failures are logged and affect
    /// only that frame.
    pub async fn run(&self, mut transport_rx: mpsc::UnboundedReceiver<TransportEvent>) {
        while let Some(event) = transport_rx.recv().await {
            match event {
                TransportEvent::Connected => {
                    info!(boundary = %self.inner.options.name, "boundary introduced to hub");
                    let introduction = BoundaryIntroduction::new(
                        self.inner.options.platform,
                        self.inner.options.name.clone(),
                    );
                    self.inner.events.trigger(&LocalEvent::Connect(introduction));
                },
                TransportEvent::Disconnected => {
                    warn!(boundary = %self.inner.options.name, "disconnected from hub");
                },
                TransportEvent::Frame(frame) => {
                    let boundary = self.clone();
                    tokio::spawn(async move {
                        let event = frame.event.clone();
                        if let Err(e) = boundary.handle_frame(frame).await {
                            error!(event = %event, error = %e, "failed to handle hub event");
                        }
                    });
                },
            }
        }
        debug!("transport closed, boundary stopping");
    }

    /// Route one inbound frame to the adapter.
    ///
    /// Unknown event names are ignored.
    pub async fn handle_frame(&self, frame: EventFrame) -> Result<()> {
        let Some(event) = InboundEvent::from_name(&frame.event) else {
            debug!(event = %frame.event, "ignoring unknown hub event");
            return Ok(());
        };
        debug!(event = %event, "hub event received");

        match event {
            InboundEvent::AskResource => self.answer_resource(frame.decode()?).await,
            InboundEvent::ReactMessage => {
                let payload: ReactToMessagePayload = frame.decode()?;
                self.inner
                    .events
                    .trigger(&LocalEvent::ReactMessage(payload.clone()));
                self.inner
                    .adapter
                    .react_message(&payload)
                    .await
                    .map_err(|e| Error::adapter(event, e))
            },
            InboundEvent::DeleteMessage => {
                let payload: DeleteMessagePayload = frame.decode()?;
                self.inner
                    .events
                    .trigger(&LocalEvent::DeleteMessage(payload.clone()));
                self.inner
                    .adapter
                    .delete_message(&payload)
                    .await
                    .map_err(|e| Error::adapter(event, e))
            },
            InboundEvent::ReplyWithText
            | InboundEvent::ReplyWithSticker
            | InboundEvent::ReplyWithMedia
            | InboundEvent::SendMessage
            | InboundEvent::SendMessageWithMedia
            | InboundEvent::SendMessageWithSticker => {
                self.deliver(event, frame.decode()?).await
            },
        }
    }

    async fn deliver(&self, event: InboundEvent, payload: SendMessagePayload) -> Result<()> {
        if event.requires_media() && payload.media.is_none() {
            return Err(Error::MissingMedia { event });
        }

        let rendered = if event.renders_body() {
            Some(self.inner.engine.render(&payload.body, &payload).await?)
        } else {
            None
        };

        if let Some(local) = LocalEvent::outgoing(event, payload.clone()) {
            self.inner.events.trigger(&local);
        }

        let adapter = &self.inner.adapter;
        let outcome = match (event, rendered.as_ref()) {
            (InboundEvent::SendMessageWithMedia, _) => {
                adapter.send_message_with_media(&payload).await
            },
            (InboundEvent::ReplyWithText, Some(r)) => adapter.reply_with_text(&payload, r).await,
            (InboundEvent::ReplyWithSticker, Some(r)) => {
                adapter.reply_with_sticker(&payload, r).await
            },
            (InboundEvent::ReplyWithMedia, Some(r)) => adapter.reply_with_media(&payload, r).await,
            (InboundEvent::SendMessage, Some(r)) => adapter.send_message(&payload, r).await,
            (InboundEvent::SendMessageWithSticker, Some(r)) => {
                adapter.send_message_with_sticker(&payload, r).await
            },
            _ => return Err(Error::message(format!("`{event}` is not a send event"))),
        };
        outcome.map_err(|e| Error::adapter(event, e))
    }

    async fn answer_resource(&self, ask: AskResourcePayload) -> Result<()> {
        let resource = ask.request.resource.clone();
        let response = self
            .inner
            .resources
            .gather(&resource, &ask.request.data)
            .await;
        let answer = ask.respond(response, now_millis());
        debug!(resource = %resource, "answering resource request");
        self.inner
            .transport
            .emit(EventFrame::encode(events::REPLY_RESOURCE, &answer)?)
    }
}
