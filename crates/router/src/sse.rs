//! Server-sent events: the record types, the wire encoder and a
//! channel-backed producer.
//!
//! The dispatcher only ever sees an [`EventStream`]; the wire format lives
//! entirely in [`encode_event`], so the coercion layer treats encoding as
//! a black box.

use crate::error::BoxError;
use bytes::Bytes;
use futures::channel::mpsc::{SendError, Receiver, Sender, channel};
use futures::{SinkExt, Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;

#[derive(Debug)]
pub enum Event {
    Retry(Duration),
    Message(Message),
}

#[derive(Debug)]
pub struct Message {
    // https://html.spec.whatwg.org/multipage/server-sent-events.html#concept-event-stream-last-event-id
    pub id: Option<String>,
    pub name: Option<String>,
    // the message data
    pub data: String,
}

impl Event {
    pub fn message(data: String, id: Option<String>, name: Option<String>) -> Event {
        Event::Message(Message { id, name, data })
    }

    pub fn from_data(data: String) -> Event {
        Event::Message(Message { id: None, name: None, data })
    }

    pub fn retry(duration: impl Into<Duration>) -> Event {
        Event::Retry(duration.into())
    }
}

/// Encodes one event into its wire form.
///
/// Multi-line data is split into one `data:` field per line, per the
/// event-stream format.
pub fn encode_event(event: &Event) -> Bytes {
    match event {
        Event::Message(Message { id, name, data }) => {
            let mut string = String::with_capacity(data.len() + 16);

            if let Some(i) = id {
                string.push_str(&format!("id: {}\n", i));
            }

            if let Some(n) = name {
                string.push_str(&format!("event: {}\n", n));
            }

            for line in data.lines() {
                string.push_str(&format!("data: {}\n", line));
            }

            string.push('\n');
            Bytes::from(string)
        }
        Event::Retry(duration) => Bytes::from(format!("retry: {}\n\n", duration.as_millis())),
    }
}

/// The stream of events a server-push handler returns.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = Event> + Send>>,
}

impl EventStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Event> + Send + 'static,
    {
        Self { inner: Box::pin(stream) }
    }

    pub(crate) fn into_inner(self) -> Pin<Box<dyn Stream<Item = Event> + Send>> {
        self.inner
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct EventEmitter {
    sink: Sender<Event>,
}

impl EventEmitter {
    pub async fn send(&mut self, event: Event) -> Result<(), SendError> {
        self.sink.send(event).await
    }

    pub async fn close(&mut self) -> Result<(), SendError> {
        self.sink.close().await
    }
}

/// Builds a buffered `(stream, emitter)` pair. The producer side holds the
/// emitter, typically from a spawned task; dropping the stream (client
/// disconnect) makes further sends fail, which is the producer's signal to
/// stop.
pub fn event_channel(buffer: usize) -> (EventStream, EventEmitter) {
    let (sender, receiver): (Sender<Event>, Receiver<Event>) = channel(buffer);
    (EventStream::new(receiver), EventEmitter { sink: sender })
}

/// Adapts the event stream into wire-format frames for the response body.
pub(crate) fn wire_stream(
    stream: EventStream,
) -> impl Stream<Item = Result<http_body::Frame<Bytes>, BoxError>> + Send {
    stream.into_inner().map(|event| Ok(http_body::Frame::data(encode_event(&event))))
}
