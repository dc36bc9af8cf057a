//! HTTP plumbing: the client seam, request preparation and response checks.

use crate::error::{EventSourceError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request, Response, StatusCode};
use tracing::warn;
use url::Url;

/// Media type of an event stream.
pub const EVENT_STREAM: &str = "text/event-stream";

/// Header carrying the id of the last received message on reconnect.
pub const LAST_EVENT_ID: HeaderName = HeaderName::from_static("last-event-id");

/// Something that can execute HTTP requests.
///
/// Implemented for `reqwest::Client`; implement it to route requests through
/// middleware or a test double.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send the request and return the response head; the body is streamed.
    async fn execute(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl HttpClient for reqwest::Client {
    async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        reqwest::Client::execute(self, request).await
    }
}

/// Build the request prototype from an explicit request or a URL.
pub(crate) fn prototype(request: Option<Request>, url: Option<&str>) -> Result<Request> {
    match (request, url) {
        (Some(request), _) => {
            if request.try_clone().is_none() {
                return Err(EventSourceError::UnclonableRequest);
            }
            Ok(request)
        }
        (None, Some(url)) => Ok(Request::new(Method::GET, Url::parse(url)?)),
        (None, None) => Err(EventSourceError::MissingTarget),
    }
}

/// Clone the prototype for one connection attempt.
///
/// Returns `None` if the prototype cannot be cloned.
pub(crate) fn prepare(prototype: &Request, last_event_id: Option<&[u8]>) -> Option<Request> {
    let mut request = prototype.try_clone()?;
    let headers = request.headers_mut();
    if !headers.contains_key(ACCEPT) {
        headers.insert(ACCEPT, HeaderValue::from_static(EVENT_STREAM));
    }
    if let Some(id) = last_event_id {
        match HeaderValue::from_bytes(id) {
            Ok(value) => {
                headers.insert(LAST_EVENT_ID, value);
            }
            Err(_) => warn!(
                last_event_id = %String::from_utf8_lossy(id),
                "Last event id is not a valid header value, not sending it"
            ),
        }
    }
    Some(request)
}

/// Check that a response is a `200 OK` event stream.
pub(crate) fn check_response(response: &Response) -> Result<()> {
    if response.status() != StatusCode::OK {
        return Err(EventSourceError::InvalidStatus(response.status()));
    }

    let content_type = response.headers().get(CONTENT_TYPE);
    let is_event_stream = content_type
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.essence_str() == EVENT_STREAM);
    if !is_event_stream {
        return Err(EventSourceError::InvalidContentType(
            content_type.map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
        ));
    }

    Ok(())
}
