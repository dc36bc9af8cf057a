//! The connect / stream / back off loop.

use crate::client::{self, HttpClient};
use crate::error::EventSourceError;
use crate::message::Message;
use crate::session::Session;
use eventsource_buffer::{LineReader, ReadError};
use futures::TryStreamExt;
use reqwest::{Request, Response};
use std::io;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Consumer callback, invoked on the worker task.
pub(crate) type Callback = Box<dyn FnMut(Result<Message<'_>, EventSourceError>) + Send>;

/// Where the controller is in its reconnect cycle.
#[derive(Debug)]
enum State {
    Connecting,
    Streaming(Response),
    BackingOff,
    Stopped,
}

/// Drives one event source until its token is cancelled.
pub(crate) struct Controller {
    pub(crate) client: Arc<dyn HttpClient>,
    pub(crate) prototype: Request,
    pub(crate) session: Session,
    pub(crate) max_line: usize,
    pub(crate) cancel: CancellationToken,
    pub(crate) callback: Callback,
}

impl Controller {
    /// Run until cancelled. Never gives up on its own.
    pub(crate) async fn run(mut self) {
        let mut state = State::Connecting;
        loop {
            state = match state {
                State::Connecting => self.connect().await,
                State::Streaming(response) => self.stream(response).await,
                State::BackingOff => self.back_off().await,
                State::Stopped => break,
            };
        }
        debug!(url = %self.prototype.url(), "Event source stopped");
    }

    async fn connect(&mut self) -> State {
        let Some(request) = client::prepare(&self.prototype, self.session.last_event_id()) else {
            error!(url = %self.prototype.url(), "Request can no longer be cloned, stopping");
            return State::Stopped;
        };

        debug!(
            url = %request.url(),
            last_event_id = ?self.session.last_event_id().map(String::from_utf8_lossy),
            "Connecting to event stream"
        );

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return State::Stopped,
            result = self.client.execute(request) => result,
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Event stream request failed");
                self.dispatch(Err(EventSourceError::Request(e)));
                return State::BackingOff;
            }
        };

        if let Err(e) = client::check_response(&response) {
            warn!(error = %e, "Rejecting event stream response");
            self.dispatch(Err(e));
            return State::BackingOff;
        }

        self.session.begin_connection();
        State::Streaming(response)
    }

    async fn stream(&mut self, response: Response) -> State {
        let body = response.bytes_stream().map_err(io::Error::other);
        let mut reader = LineReader::new(Box::pin(body), self.max_line);

        loop {
            let (line, err) = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return State::Stopped,
                read = reader.read_line() => read,
            };

            match err {
                None => {
                    let callback = &mut self.callback;
                    self.session
                        .process_line(line, |result| callback(result));
                }
                Some(ReadError::Eof) => {
                    debug!("Event stream closed by server");
                    return State::BackingOff;
                }
                Some(e) => {
                    warn!(error = %e, "Event stream read failed");
                    self.dispatch(Err(EventSourceError::Read(e)));
                    return State::BackingOff;
                }
            }
        }
    }

    async fn back_off(&mut self) -> State {
        let delay = self.session.retry();
        debug!(?delay, "Waiting before reconnect");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => State::Stopped,
            _ = sleep(delay) => State::Connecting,
        }
    }

    fn dispatch(&mut self, result: Result<Message<'_>, EventSourceError>) {
        (self.callback)(result);
    }
}
