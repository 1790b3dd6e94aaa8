//! Boundary runtime connecting a chat platform to a hublink hub.
//!
//! A boundary announces itself with a signed introduction, forwards platform
//! activity to the hub, and carries out the hub's send/reply/react/delete
//! requests through a [`PlatformAdapter`]. Message bodies from the hub are
//! rendered with [`hublink_inline`] before they reach the adapter.

pub mod boundary;
pub mod dispatch;
pub mod error;
pub mod presets;
pub mod resources;
pub mod transport;

pub use {
    boundary::{Boundary, BoundaryOptions, PlatformAdapter, introduction_frame},
    dispatch::{EventCallback, EventDispatcher, LocalEvent, LocalEventKind},
    error::{Error, Result},
    presets::{ChatContext, ContactDirectory, Markup, StaticDirectory, TagEveryone},
    resources::{FnProvider, ResourceProvider, ResourceRegistry, provider_fn},
    transport::{ChannelTransport, Transport, TransportEvent, WsOptions, WsTransport},
};
