//! Event source configuration.

use crate::client::HttpClient;
use reqwest::Request;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default maximum size of the `id` field.
pub const DEFAULT_MAX_ID: usize = 256;

/// Default maximum size of the `event` field.
pub const DEFAULT_MAX_EVENT: usize = 256;

/// Default maximum size of the `data` field.
pub const DEFAULT_MAX_DATA: usize = 4 * 1024 * 1024;

/// Reconnect delay used until the server sends a `retry` field.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Room for the longest field name, separator and terminator on top of a value.
const LINE_OVERHEAD: usize = "event: \r\n".len() + 1;

/// Size limits for the buffers of an event source.
///
/// A zero means "use the default". Each message field is copied into its
/// own buffer; the line buffer holds raw lines as they arrive and must be
/// large enough for the longest field line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferLimits {
    /// Maximum size of the `id` field.
    pub max_id: usize,
    /// Maximum size of the `event` field.
    pub max_event: usize,
    /// Maximum size of the `data` field, all lines of a message included.
    pub max_data: usize,
    /// Maximum size of the raw line buffer.
    pub max_line: usize,
}

impl BufferLimits {
    /// Replace zeros with defaults.
    ///
    /// An unset line limit becomes the largest field limit plus framing.
    pub fn resolve(&self) -> ResolvedLimits {
        let or = |value: usize, default: usize| if value == 0 { default } else { value };
        let max_id = or(self.max_id, DEFAULT_MAX_ID);
        let max_event = or(self.max_event, DEFAULT_MAX_EVENT);
        let max_data = or(self.max_data, DEFAULT_MAX_DATA);
        let max_line = or(
            self.max_line,
            max_id.max(max_event).max(max_data).saturating_add(LINE_OVERHEAD),
        );
        ResolvedLimits {
            max_id,
            max_event,
            max_data,
            max_line,
        }
    }
}

/// Buffer limits with all defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLimits {
    /// Maximum size of the `id` field.
    pub max_id: usize,
    /// Maximum size of the `event` field.
    pub max_event: usize,
    /// Maximum size of the `data` field.
    pub max_data: usize,
    /// Maximum size of the raw line buffer.
    pub max_line: usize,
}

/// Configuration for an [`EventSource`](crate::EventSource).
///
/// Either `url` or `request` must be set. When both are, the request wins.
pub struct EventSourceConfig {
    /// URL to `GET`.
    pub url: Option<String>,
    /// Request prototype, cloned for every connection attempt.
    pub request: Option<Request>,
    /// HTTP client. Defaults to a fresh `reqwest::Client`.
    pub client: Option<Arc<dyn HttpClient>>,
    /// Parent cancellation token. Cancelling it stops the event source.
    pub cancellation: Option<CancellationToken>,
    /// Buffer limits.
    pub limits: BufferLimits,
    /// Reconnect delay until the server overrides it.
    pub reconnect_delay: Duration,
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            request: None,
            client: None,
            cancellation: None,
            limits: BufferLimits::default(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl EventSourceConfig {
    /// Create a config for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::default().url(url)
    }

    /// Set the URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Use a prepared request instead of a plain `GET`.
    pub fn request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Set the HTTP client.
    pub fn client(mut self, client: impl HttpClient + 'static) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Set a shared HTTP client.
    pub fn shared_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Tie the event source to a parent cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set buffer limits.
    pub fn limits(mut self, limits: BufferLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the initial reconnect delay.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl fmt::Debug for EventSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSourceConfig")
            .field("url", &self.url)
            .field("request", &self.request.as_ref().map(|r| r.url().as_str()))
            .field("client", &self.client.as_ref().map(|_| "..."))
            .field("cancellation", &self.cancellation)
            .field("limits", &self.limits)
            .field("reconnect_delay", &self.reconnect_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = BufferLimits::default().resolve();
        assert_eq!(limits.max_id, 256);
        assert_eq!(limits.max_event, 256);
        assert_eq!(limits.max_data, 4 * 1024 * 1024);
        assert_eq!(limits.max_line, 4 * 1024 * 1024 + 10);
    }

    #[test]
    fn test_line_limit_follows_largest_field() {
        let limits = BufferLimits {
            max_id: 1000,
            max_event: 0,
            max_data: 100,
            max_line: 0,
        }
        .resolve();
        assert_eq!(limits.max_event, DEFAULT_MAX_EVENT);
        assert_eq!(limits.max_line, 1010);

        let limits = BufferLimits {
            max_line: 64,
            ..Default::default()
        }
        .resolve();
        assert_eq!(limits.max_line, 64);
    }

    #[test]
    fn test_huge_data_limit_saturates_line_limit() {
        let limits = BufferLimits {
            max_data: usize::MAX,
            ..Default::default()
        }
        .resolve();
        assert_eq!(limits.max_line, usize::MAX);
    }

    #[test]
    fn test_limits_from_partial_json() {
        let limits: BufferLimits = serde_json::from_str(r#"{"max_data": 1024}"#).unwrap();
        assert_eq!(limits.max_data, 1024);
        assert_eq!(limits.max_id, 0);
        assert_eq!(limits.resolve().max_line, 1034);
    }

    #[test]
    fn test_config_builder() {
        let token = CancellationToken::new();
        let config = EventSourceConfig::new("http://localhost/events")
            .reconnect_delay(Duration::from_millis(50))
            .cancellation(token)
            .limits(BufferLimits {
                max_data: 10,
                ..Default::default()
            });

        assert_eq!(config.url.as_deref(), Some("http://localhost/events"));
        assert_eq!(config.reconnect_delay, Duration::from_millis(50));
        assert_eq!(config.limits.max_data, 10);
        assert!(config.cancellation.is_some());
        assert!(config.client.is_none());
    }

    #[test]
    fn test_config_default_delay() {
        let config = EventSourceConfig::default();
        assert_eq!(config.reconnect_delay, DEFAULT_RECONNECT_DELAY);
        assert!(format!("{config:?}").contains("EventSourceConfig"));
    }
}
