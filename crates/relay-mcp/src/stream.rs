//! Live event sequence of one `tools/call`.

use futures::Stream;
use relay_core::ExecutionEvent;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events buffered between the decode loop and a slow consumer.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Receiving end of a tool call.
///
/// Yields `Start`, any number of `Chunk`s and exactly one terminal event,
/// then ends. Dropping the stream (or calling [`cancel`](Self::cancel))
/// aborts the producing task, which drops the in-flight HTTP body.
pub struct ExecutionStream {
    events: mpsc::Receiver<ExecutionEvent>,
    producer: JoinHandle<()>,
    finished: bool,
}

impl ExecutionStream {
    pub(crate) fn spawn<F, Fut>(produce: F) -> Self
    where
        F: FnOnce(mpsc::Sender<ExecutionEvent>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let producer = tokio::spawn(produce(tx));
        Self {
            events: rx,
            producer,
            finished: false,
        }
    }

    pub async fn next_event(&mut self) -> Option<ExecutionEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await;
        self.observe(event)
    }

    /// Stop the call. Subsequent reads return `None`.
    pub fn cancel(&mut self) {
        self.producer.abort();
        self.events.close();
        self.finished = true;
    }

    /// Drain the stream into a single outcome.
    pub async fn collect(mut self) -> CallOutcome {
        let mut outcome = CallOutcome::default();
        while let Some(event) = self.next_event().await {
            match event {
                ExecutionEvent::Start => {}
                ExecutionEvent::Chunk { text } => outcome.text.push_str(&text),
                ExecutionEvent::Complete { payload } => outcome.payload = payload,
                ExecutionEvent::Error { message } => outcome.error = Some(message),
            }
        }
        outcome
    }

    fn observe(&mut self, event: Option<ExecutionEvent>) -> Option<ExecutionEvent> {
        match event {
            Some(event) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Some(event)
            }
            None => {
                // The producer went away without a terminal event (it panicked).
                self.finished = true;
                Some(ExecutionEvent::error("tool execution ended unexpectedly"))
            }
        }
    }
}

impl Stream for ExecutionStream {
    type Item = ExecutionEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.events.poll_recv(cx) {
            Poll::Ready(event) => Poll::Ready(this.observe(event)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ExecutionStream {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

impl std::fmt::Debug for ExecutionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionStream")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Folded result of a tool call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOutcome {
    /// Every chunk, concatenated in arrival order.
    pub text: String,
    pub payload: Option<Value>,
    pub error: Option<String>,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
