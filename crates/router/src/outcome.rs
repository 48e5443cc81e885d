//! Handler return values.
//!
//! Everything a handler can produce is one of the [`Outcome`] variants;
//! the coercion layer turns each into a transport response with an
//! exhaustive match. Handlers rarely name `Outcome` directly: the
//! [`IntoOutcome`] conversions let them return strings, json values,
//! responses, nested routers, payloads, files and streams as-is.

use crate::body::ResponseBody;
use crate::error::BoxError;
use crate::file::NamedFile;
use crate::router::{Router, RouterBuilder};
use crate::sse::EventStream;
use crate::stream::{BoxChunkStream, Chunk, StreamChunks};
use bytes::Bytes;
use futures::Stream;
use http::Response;
use mime::Mime;
use serde::Serialize;
use std::pin::Pin;

/// A lazily produced stream of raw body bytes.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// The closed set of values a handler may return.
pub enum Outcome {
    /// Nothing: reuse the pre-upgraded response when one is attached
    /// (socket case), otherwise an empty 200.
    Empty,
    /// UTF-8 text served as html.
    Text(String),
    /// A fully built response, passed through verbatim.
    Response(Response<ResponseBody>),
    /// A nested router; dispatch recurses with the unmatched remainder.
    Nested(Router),
    /// One of the recognized body container kinds.
    Payload(Payload),
    /// A file-like object, streamed as an attachment.
    File(NamedFile),
    /// Server-sent events; only valid on routes registered via `sse()`.
    Events(EventStream),
    /// A generator of text/binary chunks with cancellation propagation.
    Chunks(BoxChunkStream),
    /// A structured value, json-serialized.
    Value(serde_json::Value),
}

/// The body container kinds of the [`Outcome::Payload`] variant.
///
/// Raw buffers, array buffers and typed byte views all collapse into
/// [`Payload::Bytes`]; the remaining kinds carry their own framing.
pub enum Payload {
    Bytes(Bytes),
    Stream(ByteStream),
    Blob { content_type: Mime, data: Bytes },
    Form(Vec<(String, String)>),
    Multipart(Vec<Part>),
}

/// One part of a multipart payload.
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<Mime>,
    pub data: Bytes,
}

impl Part {
    pub fn field(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { name: name.into(), filename: None, content_type: None, data: data.into() }
    }

    pub fn file(name: impl Into<String>, filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { name: name.into(), filename: Some(filename.into()), content_type: None, data: data.into() }
    }

    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

impl Outcome {
    /// Serializes any `Serialize` value into the structured-value variant.
    pub fn json<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Outcome::Value(serde_json::to_value(value)?))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Outcome::Empty => "empty",
            Outcome::Text(_) => "text",
            Outcome::Response(_) => "response",
            Outcome::Nested(_) => "nested router",
            Outcome::Payload(_) => "payload",
            Outcome::File(_) => "file",
            Outcome::Events(_) => "event stream",
            Outcome::Chunks(_) => "chunk stream",
            Outcome::Value(_) => "json value",
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Outcome").field(&self.kind()).finish()
    }
}

/// Conversion from a handler's native return type into an [`Outcome`].
///
/// Fallible conversions (a nested builder that fails to compile its
/// patterns) surface through the error boundary like any handler failure.
pub trait IntoOutcome {
    fn into_outcome(self) -> Result<Outcome, BoxError>;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(self)
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Empty)
    }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Text(self))
    }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Text(self.to_string()))
    }
}

impl IntoOutcome for Response<ResponseBody> {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Response(self))
    }
}

impl IntoOutcome for Router {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Nested(self))
    }
}

/// A nested builder converts by compiling itself, so handlers can return
/// `ctx.next().path("/posts", handler_fn(h))` fluently.
impl IntoOutcome for RouterBuilder {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Nested(self.build()?))
    }
}

impl IntoOutcome for serde_json::Value {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Value(self))
    }
}

impl IntoOutcome for Payload {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Payload(self))
    }
}

impl IntoOutcome for Bytes {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Payload(Payload::Bytes(self)))
    }
}

impl IntoOutcome for Vec<u8> {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Payload(Payload::Bytes(Bytes::from(self))))
    }
}

impl IntoOutcome for NamedFile {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::File(self))
    }
}

impl IntoOutcome for EventStream {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Events(self))
    }
}

impl IntoOutcome for BoxChunkStream {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Chunks(self))
    }
}

impl<S, F> IntoOutcome for StreamChunks<S, F>
where
    S: Stream<Item = Result<Chunk, BoxError>> + Send + 'static,
    F: FnOnce() + Send + 'static,
{
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        Ok(Outcome::Chunks(Box::pin(self)))
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        match self {
            Some(value) => value.into_outcome(),
            None => Ok(Outcome::Empty),
        }
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<Outcome, BoxError> {
        self.map_err(Into::into)?.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::{IntoOutcome, Outcome};

    #[test]
    fn unit_converts_to_empty() {
        assert!(matches!(().into_outcome().unwrap(), Outcome::Empty));
    }

    #[test]
    fn strings_convert_to_text() {
        assert!(matches!("hi".into_outcome().unwrap(), Outcome::Text(t) if t == "hi"));
        assert!(matches!("hi".to_string().into_outcome().unwrap(), Outcome::Text(t) if t == "hi"));
    }

    #[test]
    fn option_none_converts_to_empty() {
        let none: Option<String> = None;
        assert!(matches!(none.into_outcome().unwrap(), Outcome::Empty));
    }

    #[test]
    fn result_err_surfaces_as_failure() {
        let result: Result<String, std::io::Error> = Err(std::io::Error::other("boom"));
        assert!(result.into_outcome().is_err());
    }

    #[test]
    fn json_helper_produces_value_variant() {
        let outcome = Outcome::json(vec![1, 2, 3]).unwrap();
        assert!(matches!(outcome, Outcome::Value(_)));
    }
}
