//! Config schema: who this boundary is and which hub it talks to.

use {
    hublink_protocol::{DEFAULT_SOCKET_PATH, Platform},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    std::time::Duration,
    url::Url,
};

use crate::error::{Error, Result};

pub const DEFAULT_HUB_URL: &str = "ws://127.0.0.1:4521";
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HublinkConfig {
    pub boundary: BoundaryConfig,
    pub hub: HubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Name announced to the hub in the introduction.
    pub name: String,
    pub platform: Platform,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            name: "hublink".into(),
            platform: Platform::Console,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base WebSocket URL of the hub (`ws://` or `wss://`).
    pub url: String,
    /// Path of the event endpoint on the hub.
    pub path: String,
    /// Shared secret for signing the introduction.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret: Option<Secret<String>>,
    pub reconnect_delay_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_HUB_URL.into(),
            path: DEFAULT_SOCKET_PATH.into(),
            secret: None,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
        }
    }
}

impl std::fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubConfig")
            .field("url", &self.url)
            .field("path", &self.path)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .finish()
    }
}

impl HubConfig {
    /// Full endpoint URL: `url` with `path` appended.
    pub fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| Error::invalid(format!("hub.url `{}`: {e}", self.url)))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid(format!(
                "hub.url must use ws:// or wss://, got `{}`",
                url.scheme()
            )));
        }
        let base = url.path().trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };
        url.set_path(&joined);
        Ok(url)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Secret bytes used for signing; empty when none is configured.
    pub fn secret_bytes(&self) -> Vec<u8> {
        self.secret
            .as_ref()
            .map(|s| s.expose_secret().as_bytes().to_vec())
            .unwrap_or_default()
    }
}

impl HublinkConfig {
    /// Reject configurations the boundary cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.boundary.name.trim().is_empty() {
            return Err(Error::invalid("boundary.name must not be empty"));
        }
        if self.hub.reconnect_delay_ms == 0 {
            return Err(Error::invalid("hub.reconnect_delay_ms must be positive"));
        }
        self.hub.endpoint()?;
        Ok(())
    }
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
