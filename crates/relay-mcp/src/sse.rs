//! Incremental Server-Sent-Events frame reader.
//!
//! Bytes arrive in arbitrary chunks; a chunk may end in the middle of a
//! line, a field name, or a multi-byte character. The reader keeps the
//! unterminated tail as residual bytes and carries the in-progress frame
//! across calls to [`SseReader::feed`], so the frames produced never depend
//! on where the chunk boundaries fell.
//!
//! Lines end in LF, CRLF or a bare CR. A CR that ends one chunk and an LF
//! that starts the next one count as a single line ending.
//!
//! A frame is only emitted once a blank line terminates it. When the body
//! ends without that blank line the pending frame is dropped.

/// One complete event frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub id: Option<String>,
    pub event: Option<String>,
    /// Every `data:` line of the frame, joined with `\n`.
    pub data: String,
    pub retry: Option<u64>,
}

#[derive(Debug, Default)]
struct PendingFrame {
    id: Option<String>,
    event: Option<String>,
    data: Option<String>,
    retry: Option<u64>,
}

impl PendingFrame {
    fn take(&mut self) -> Option<SseFrame> {
        let pending = std::mem::take(self);
        pending.data.map(|data| SseFrame {
            id: pending.id,
            event: pending.event,
            data,
            retry: pending.retry,
        })
    }
}

#[derive(Debug, Default)]
pub struct SseReader {
    residual: Vec<u8>,
    pending: PendingFrame,
    /// The last line ended in CR at the very end of a chunk.
    after_cr: bool,
}

impl SseReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk and return the frames it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.residual.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        if self.after_cr && !self.residual.is_empty() {
            if self.residual[0] == b'\n' {
                start = 1;
            }
            self.after_cr = false;
        }

        while let Some(offset) = self.residual[start..]
            .iter()
            .position(|b| matches!(b, b'\n' | b'\r'))
        {
            let end = start + offset;
            // Complete lines never split a UTF-8 sequence.
            let line = String::from_utf8_lossy(&self.residual[start..end]).into_owned();
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
            start = end + 1;
            if self.residual[end] == b'\r' {
                match self.residual.get(start) {
                    Some(b'\n') => start += 1,
                    Some(_) => {}
                    None => self.after_cr = true,
                }
            }
        }
        self.residual.drain(..start);

        frames
    }

    /// Bytes of the current unterminated line.
    pub fn residual(&self) -> &[u8] {
        &self.residual
    }

    /// True when `data` has accumulated for a frame that is not yet terminated.
    pub fn has_pending_frame(&self) -> bool {
        self.pending.data.is_some()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.pending.take();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "id" => self.pending.id = Some(value.to_string()),
            "event" => self.pending.event = Some(value.to_string()),
            "retry" => {
                if let Ok(retry) = value.trim().parse() {
                    self.pending.retry = Some(retry);
                }
            }
            "data" => match self.pending.data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.pending.data = Some(value.to_string()),
            },
            _ => {}
        }
        None
    }
}
