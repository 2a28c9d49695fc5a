//! Server-sent revalidation notices.
//!
//! The server announces changed paths as `revalidate` events on an SSE
//! stream. Each notice invalidates the cache keys mapped to its path.

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::client::QueryClient;
use crate::error::Result;
use crate::models::Revalidation;

const EVENT_NAME: &str = "revalidate";

/// Incremental `text/event-stream` parser that yields revalidation
/// notices. Chunks may split lines anywhere.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feed bytes; returns the notices completed by them.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Revalidation> {
        self.buffer.extend_from_slice(chunk);
        let mut notices = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(notice) = self.line(line) {
                notices.push(notice);
            }
        }
        notices
    }

    fn line(&mut self, line: &str) -> Option<Revalidation> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            // Keep-alive comment.
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<Revalidation> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data).join("\n");
        if event.as_deref() != Some(EVENT_NAME) || data.is_empty() {
            return None;
        }
        match serde_json::from_str(&data) {
            Ok(notice) => Some(notice),
            Err(e) => {
                warn!(error = %e, data = %data, "Malformed revalidation event");
                None
            }
        }
    }
}

/// Apply every notice from `notices` to `client` until the stream ends.
/// Returns how many notices were applied.
pub async fn follow_revalidations<S>(client: QueryClient, notices: S) -> usize
where
    S: Stream<Item = Result<Revalidation>>,
{
    futures::pin_mut!(notices);
    let mut applied = 0;
    while let Some(notice) = notices.next().await {
        match notice {
            Ok(notice) => {
                let prefixes = client.apply_revalidation(&notice.path).await;
                debug!(path = %notice.path, version = notice.version, prefixes = prefixes.len(), "Applied revalidation");
                applied += 1;
            }
            Err(e) => {
                warn!(error = %e, "Revalidation stream failed");
                break;
            }
        }
    }
    info!(applied, "Revalidation stream ended");
    applied
}
