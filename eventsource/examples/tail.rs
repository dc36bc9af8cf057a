//! Print every message of an event stream until Ctrl-C.
//!
//! Run with:
//! ```bash
//! RUST_LOG=eventsource=debug cargo run --example tail -- http://localhost:8080/events
//! ```
//!
//! Buffer limits can be given as JSON in `EVENTSOURCE_LIMITS`, e.g.
//! `{"max_data": 65536}`.

use anyhow::Context;
use eventsource::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .context("usage: tail <url>")?;

    let limits = match std::env::var("EVENTSOURCE_LIMITS") {
        Ok(json) => serde_json::from_str(&json).context("invalid EVENTSOURCE_LIMITS")?,
        Err(_) => BufferLimits::default(),
    };

    let config = EventSourceConfig::new(url).limits(limits);
    let source = EventSource::new(config, |result| match result {
        Ok(message) => {
            let event = message.event_str().unwrap_or("message");
            let data = message
                .data
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            match message.id_str() {
                Some(id) => println!("[{event} #{id}] {data}"),
                None => println!("[{event}] {data}"),
            }
        }
        Err(e) => eprintln!("error: {e}"),
    })?;

    tokio::signal::ctrl_c().await?;
    source.close().await;
    Ok(())
}
