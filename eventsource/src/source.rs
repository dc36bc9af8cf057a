//! The event source handle.

use crate::client::{self, HttpClient};
use crate::config::EventSourceConfig;
use crate::controller::Controller;
use crate::error::{EventSourceError, Result};
use crate::message::Message;
use crate::session::Session;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A running event source.
///
/// Connects in a background task on the current tokio runtime and calls the
/// callback for every message and every error. Connection failures are
/// retried after the reconnect delay until the source is closed, dropped or
/// its parent token is cancelled.
///
/// ```rust,no_run
/// use eventsource::EventSource;
///
/// # async fn run() -> eventsource::Result<()> {
/// let source = EventSource::connect("http://localhost:8080/events", |result| match result {
///     Ok(message) => println!("{:?}", message.data_str()),
///     Err(e) => eprintln!("{e}"),
/// })?;
///
/// // ...
/// source.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventSource {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl EventSource {
    /// Start an event source.
    ///
    /// Must be called from within a tokio runtime. The callback runs on the
    /// worker task, one invocation at a time; the message it receives is only
    /// valid for the duration of the call.
    pub fn new<F>(config: EventSourceConfig, callback: F) -> Result<Self>
    where
        F: FnMut(Result<Message<'_>>) + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| EventSourceError::NoRuntime)?;

        let EventSourceConfig {
            url,
            request,
            client,
            cancellation,
            limits,
            reconnect_delay,
        } = config;

        let prototype = client::prototype(request, url.as_deref())?;
        let client: Arc<dyn HttpClient> =
            client.unwrap_or_else(|| Arc::new(reqwest::Client::new()));
        let cancel = cancellation
            .map(|parent| parent.child_token())
            .unwrap_or_default();
        let limits = limits.resolve();

        debug!(url = %prototype.url(), ?limits, "Starting event source");

        let controller = Controller {
            client,
            prototype,
            session: Session::new(limits, reconnect_delay),
            max_line: limits.max_line,
            cancel: cancel.clone(),
            callback: Box::new(callback),
        };
        let handle = runtime.spawn(controller.run());

        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    /// Start an event source for a URL with default settings.
    pub fn connect<F>(url: impl Into<String>, callback: F) -> Result<Self>
    where
        F: FnMut(Result<Message<'_>>) + Send + 'static,
    {
        Self::new(EventSourceConfig::new(url), callback)
    }

    /// Token that stops this event source when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stop the event source and wait for the background task to exit.
    ///
    /// Once this returns the callback will not be called again. A callback
    /// already running when `close` is called is allowed to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!("Event source task panicked");
                }
            }
        }
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
