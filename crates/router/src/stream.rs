//! Generator-backed response bodies.
//!
//! A [`ChunkStream`] is a pull-based producer of text/binary chunks with an
//! explicit cancellation hook. The dispatcher adapts it into a response
//! body; when the transport stops consuming before the producer is done
//! (client disconnect), the hook fires exactly once so the producer can
//! release whatever drives it.

use crate::error::BoxError;
use bytes::Bytes;
use futures::Stream;
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// One produced chunk. Text is UTF-8 encoded on the wire; binary passes
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Text(String),
    Binary(Bytes),
}

impl Chunk {
    pub(crate) fn into_bytes(self) -> Bytes {
        match self {
            Chunk::Text(text) => Bytes::from(text),
            Chunk::Binary(bytes) => bytes,
        }
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Chunk::Text(text)
    }
}

impl From<&'static str> for Chunk {
    fn from(text: &'static str) -> Self {
        Chunk::Text(text.to_string())
    }
}

impl From<Bytes> for Chunk {
    fn from(bytes: Bytes) -> Self {
        Chunk::Binary(bytes)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Chunk::Binary(Bytes::from(bytes))
    }
}

/// A pull-based chunk producer with a cancellation hook.
///
/// `cancel` is only invoked on early termination, never after the stream
/// reported exhaustion or an error.
pub trait ChunkStream: Send {
    fn poll_chunk(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Chunk, BoxError>>>;

    fn cancel(self: Pin<&mut Self>);
}

/// A boxed [`ChunkStream`], the form carried by a handler outcome.
pub type BoxChunkStream = Pin<Box<dyn ChunkStream>>;

pin_project! {
    /// Adapts any [`futures::Stream`] of chunks into a [`ChunkStream`],
    /// optionally running a hook when the consumer cancels.
    pub struct StreamChunks<S, F> {
        #[pin]
        stream: S,
        on_cancel: Option<F>,
    }
}

/// Wraps a chunk stream with no cancellation cleanup.
pub fn chunks<S>(stream: S) -> StreamChunks<S, fn()>
where
    S: Stream<Item = Result<Chunk, BoxError>> + Send,
{
    StreamChunks { stream, on_cancel: None }
}

/// Wraps a chunk stream with a hook that runs once if the consumer stops
/// early. Use it to stop timers or tasks feeding the stream.
pub fn chunks_with_cancel<S, F>(stream: S, on_cancel: F) -> StreamChunks<S, F>
where
    S: Stream<Item = Result<Chunk, BoxError>> + Send,
    F: FnOnce() + Send,
{
    StreamChunks { stream, on_cancel: Some(on_cancel) }
}

impl<S, F> ChunkStream for StreamChunks<S, F>
where
    S: Stream<Item = Result<Chunk, BoxError>> + Send,
    F: FnOnce() + Send,
{
    fn poll_chunk(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Chunk, BoxError>>> {
        self.project().stream.poll_next(cx)
    }

    fn cancel(self: Pin<&mut Self>) {
        if let Some(hook) = self.project().on_cancel.take() {
            hook();
        }
    }
}

/// Response-body adapter over a boxed chunk stream.
///
/// Dropping the body before exhaustion counts as cancellation and fires
/// the stream's hook; a finished or failed stream is left alone.
pub(crate) struct ChunkBody {
    stream: BoxChunkStream,
    finished: bool,
}

impl ChunkBody {
    pub(crate) fn new(stream: BoxChunkStream) -> Self {
        Self { stream, finished: false }
    }
}

impl HttpBody for ChunkBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match this.stream.as_mut().poll_chunk(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(Frame::data(chunk.into_bytes())))),
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.finished
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::default()
    }
}

impl Drop for ChunkBody {
    fn drop(&mut self) {
        if !self.finished {
            self.stream.as_mut().cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Chunk, ChunkBody, chunks, chunks_with_cancel};
    use bytes::Bytes;
    use http_body::Body;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn three_chunks() -> impl futures::Stream<Item = Result<Chunk, crate::error::BoxError>> + Send {
        futures::stream::iter(vec![
            Ok(Chunk::Text("a".to_string())),
            Ok(Chunk::Binary(Bytes::from_static(b"\x01\x02"))),
            Ok(Chunk::Text("b".to_string())),
        ])
    }

    #[tokio::test]
    async fn text_chunks_are_utf8_encoded_and_binary_passes_through() {
        let mut body = ChunkBody::new(Box::pin(chunks(three_chunks())));

        assert_eq!(body.frame().await.unwrap().unwrap().into_data().unwrap(), Bytes::from("a"));
        assert_eq!(body.frame().await.unwrap().unwrap().into_data().unwrap(), Bytes::from_static(b"\x01\x02"));
        assert_eq!(body.frame().await.unwrap().unwrap().into_data().unwrap(), Bytes::from("b"));
        assert!(body.frame().await.is_none());
        assert!(body.is_end_stream());
    }

    #[tokio::test]
    async fn dropping_midway_cancels_exactly_once() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);

        let stream = chunks_with_cancel(three_chunks(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut body = ChunkBody::new(Box::pin(stream));
        let _ = body.frame().await;
        drop(body);

        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_stream_is_not_cancelled() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);

        let stream = chunks_with_cancel(three_chunks(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut body = ChunkBody::new(Box::pin(stream));
        while body.frame().await.is_some() {}
        drop(body);

        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }
}
