//! Connection to the hub.
//!
//! [`WsTransport`] keeps a WebSocket open in a background task, sending the
//! introduction first on every (re)connect and forwarding inbound frames as
//! [`TransportEvent`]s. Frames emitted while disconnected are queued and
//! flushed after the next introduction. A frame whose send fails is sent
//! again first on the next connection, so delivery is at-least-once.

use {
    crate::error::{Error, Result},
    futures::{SinkExt, StreamExt},
    hublink_protocol::EventFrame,
    std::time::Duration,
    tokio::sync::mpsc,
    tokio_tungstenite::{connect_async, tungstenite::Message},
    tracing::{debug, error, info, warn},
    url::Url,
};

/// What the connection task reports to the boundary runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Frame(EventFrame),
}

/// Outbound half of the hub connection.
pub trait Transport: Send + Sync {
    /// Queue `frame` for delivery to the hub.
    fn emit(&self, frame: EventFrame) -> Result<()>;
}

// ── WebSocket ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WsOptions {
    pub url: Url,
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Sent before anything else on every connection.
    pub introduction: EventFrame,
}

pub struct WsTransport {
    write_tx: mpsc::UnboundedSender<String>,
}

impl WsTransport {
    /// Spawn the connection task and return immediately.
    ///
    /// The task stops once this transport is dropped or `event_tx` is
    /// closed.
    pub fn spawn(options: WsOptions, event_tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        let (write_tx, write_rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(connection_loop(options, event_tx, write_rx));
        Self { write_tx }
    }
}

impl Transport for WsTransport {
    fn emit(&self, frame: EventFrame) -> Result<()> {
        let text = frame.to_text()?;
        self.write_tx
            .send(text)
            .map_err(|_| Error::TransportClosed)
    }
}

/// Outbound queue that holds on to the frame being sent until the socket
/// accepts it.
struct Outbox {
    rx: mpsc::UnboundedReceiver<String>,
    in_flight: Option<String>,
}

impl Outbox {
    fn new(rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self { rx, in_flight: None }
    }

    /// The unsent frame from a failed attempt, else the next queued one.
    /// `None` once every sender is gone.
    ///
    /// Cancel safe: a frame is only taken off the queue after `recv` resolves.
    async fn next(&mut self) -> Option<String> {
        if let Some(text) = &self.in_flight {
            return Some(text.clone());
        }
        let text = self.rx.recv().await?;
        self.in_flight = Some(text.clone());
        Some(text)
    }

    /// The frame returned by the last `next` reached the socket.
    fn sent(&mut self) {
        self.in_flight = None;
    }
}

enum Exit {
    /// Server closed or the socket failed; reconnect.
    Dropped,
    /// The local side is gone; stop for good.
    Shutdown,
}

async fn connection_loop(
    options: WsOptions,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
    write_rx: mpsc::UnboundedReceiver<String>,
) {
    let mut outbox = Outbox::new(write_rx);
    let introduction = match options.introduction.to_text() {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "cannot encode introduction, not connecting");
            return;
        },
    };

    loop {
        info!(url = %options.url, "connecting to hub");

        match connect_and_run(&options.url, &introduction, &event_tx, &mut outbox).await {
            Ok(Exit::Shutdown) => {
                debug!("transport shut down");
                return;
            },
            Ok(Exit::Dropped) => {
                debug!("connection closed by hub");
                let _ = event_tx.send(TransportEvent::Disconnected);
            },
            Err(e) => {
                warn!(error = %e, "hub connection failed");
                let _ = event_tx.send(TransportEvent::Disconnected);
            },
        }

        info!(
            delay_ms = options.reconnect_delay.as_millis(),
            "reconnecting after delay"
        );
        tokio::select! {
            _ = tokio::time::sleep(options.reconnect_delay) => {},
            _ = event_tx.closed() => return,
        }
    }
}

async fn connect_and_run(
    url: &Url,
    introduction: &str,
    event_tx: &mpsc::UnboundedSender<TransportEvent>,
    outbox: &mut Outbox,
) -> Result<Exit> {
    let (ws_stream, _response) = connect_async(url.as_str()).await?;
    let (mut ws_sink, mut ws_reader) = ws_stream.split();

    ws_sink
        .send(Message::Text(introduction.to_owned().into()))
        .await?;
    info!("connected to hub");
    if event_tx.send(TransportEvent::Connected).is_err() {
        let _ = ws_sink.send(Message::Close(None)).await;
        return Ok(Exit::Shutdown);
    }

    loop {
        tokio::select! {
            msg = ws_reader.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match EventFrame::from_text(&text) {
                        Ok(frame) => {
                            if event_tx.send(TransportEvent::Frame(frame)).is_err() {
                                let _ = ws_sink.send(Message::Close(None)).await;
                                return Ok(Exit::Shutdown);
                            }
                        },
                        Err(e) => warn!(error = %e, "ignoring malformed frame from hub"),
                    },
                    Some(Ok(Message::Close(_))) | None => return Ok(Exit::Dropped),
                    Some(Ok(Message::Ping(data))) => {
                        ws_sink.send(Message::Pong(data)).await?;
                    },
                    Some(Ok(_)) => {},
                    Some(Err(e)) => return Err(Error::WebSocket(e)),
                }
            },
            text = outbox.next() => {
                match text {
                    Some(text) => {
                        ws_sink.send(Message::Text(text.into())).await?;
                        outbox.sent();
                    },
                    None => {
                        let _ = ws_sink.send(Message::Close(None)).await;
                        return Ok(Exit::Shutdown);
                    },
                }
            },
        }
    }
}

// ── In-process ──────────────────────────────────────────────────────────────

/// Transport that hands frames to a channel instead of a socket.
///
/// Useful for offline runs and for observing what a boundary emits.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<EventFrame>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EventFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn emit(&self, frame: EventFrame) -> Result<()> {
        self.tx.send(frame).map_err(|_| Error::TransportClosed)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn channel_transport_forwards_frames() {
        let (transport, mut rx) = ChannelTransport::new();
        transport
            .emit(EventFrame::new("message", json!({"id": "m1"})))
            .unwrap();
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.event, "message");
    }

    #[tokio::test]
    async fn outbox_repeats_a_frame_until_it_is_sent() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut outbox = Outbox::new(rx);
        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();

        assert_eq!(outbox.next().await.as_deref(), Some("first"));
        // Send failed: the same frame comes back.
        assert_eq!(outbox.next().await.as_deref(), Some("first"));
        outbox.sent();
        assert_eq!(outbox.next().await.as_deref(), Some("second"));
        outbox.sent();

        drop(tx);
        assert_eq!(outbox.next().await, None);
    }

    #[test]
    fn channel_transport_reports_closed_receiver() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);
        let err = transport
            .emit(EventFrame::new("message", json!(null)))
            .unwrap_err();
        assert!(matches!(err, Error::TransportClosed));
    }
}
