//! Turns a response body into JSON payloads, whatever its content type.

use relay_core::{RelayError, Result};
use serde_json::Value;
use tracing::debug;

use crate::sse::{SseFrame, SseReader};

/// Body decoder chosen from the response `Content-Type`.
#[derive(Debug)]
pub enum PayloadDecoder {
    /// `text/event-stream`: one payload per complete frame.
    EventStream(SseReader),
    /// Anything else: the whole body is one JSON document.
    Document(Vec<u8>),
}

impl PayloadDecoder {
    pub fn new(event_stream: bool) -> Self {
        if event_stream {
            Self::EventStream(SseReader::new())
        } else {
            Self::Document(Vec::new())
        }
    }

    /// Feed a chunk. Frames whose data is not JSON are skipped.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        match self {
            Self::EventStream(reader) => reader
                .feed(chunk)
                .into_iter()
                .filter_map(|frame| decode_frame(&frame))
                .collect(),
            Self::Document(body) => {
                body.extend_from_slice(chunk);
                Vec::new()
            }
        }
    }

    /// End of body.
    ///
    /// For a document body this parses the buffered bytes; `Ok(None)` means the
    /// body was empty. An event stream has nothing left to yield.
    pub fn finish(self) -> std::result::Result<Option<Value>, serde_json::Error> {
        match self {
            Self::EventStream(reader) => {
                if reader.has_pending_frame() {
                    debug!("Dropping unterminated SSE frame at end of body");
                }
                Ok(None)
            }
            Self::Document(body) => {
                if body.iter().all(u8::is_ascii_whitespace) {
                    return Ok(None);
                }
                serde_json::from_slice(&body).map(Some)
            }
        }
    }
}

/// Parse one frame's data as JSON.
pub fn decode_frame_strict(frame: &SseFrame) -> Result<Value> {
    serde_json::from_str(&frame.data)
        .map_err(|e| RelayError::Decode(format!("SSE frame data is not JSON: {}", e)))
}

fn decode_frame(frame: &SseFrame) -> Option<Value> {
    match decode_frame_strict(frame) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Skipping SSE frame (event: {:?}): {}", frame.event, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_stream_skips_bad_frames() {
        let mut decoder = PayloadDecoder::new(true);
        let payloads = decoder.feed(b"data: not json\n\ndata: {\"answer\":\"ok\"}\n\n");
        assert_eq!(payloads, vec![json!({"answer": "ok"})]);
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_strict_frame_decode() {
        let frame = SseFrame {
            data: "{\"ok\": true}".into(),
            ..Default::default()
        };
        assert_eq!(decode_frame_strict(&frame).unwrap(), json!({"ok": true}));

        let frame = SseFrame {
            data: "[DONE]".into(),
            ..Default::default()
        };
        assert!(matches!(decode_frame_strict(&frame), Err(RelayError::Decode(_))));
    }

    #[test]
    fn test_document_is_buffered_until_finish() {
        let mut decoder = PayloadDecoder::new(false);
        assert!(decoder.feed(b"{\"result\":").is_empty());
        assert!(decoder.feed(b"{\"tools\":[]}}").is_empty());
        assert_eq!(decoder.finish().unwrap(), Some(json!({"result": {"tools": []}})));
    }

    #[test]
    fn test_empty_and_invalid_documents() {
        let mut decoder = PayloadDecoder::new(false);
        decoder.feed(b"  \n");
        assert_eq!(decoder.finish().unwrap(), None);

        let mut decoder = PayloadDecoder::new(false);
        decoder.feed(b"<html>");
        assert!(decoder.finish().is_err());
    }
}
